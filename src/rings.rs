//! Ring perception: smallest set of smallest rings and its symmetrized
//! extension.
//!
//! Candidates are Horton cycles (for every edge `u-v` and vertex `w`, the
//! shortest paths `w..u` and `w..v` closed by the edge). They are taken
//! shortest first and kept when linearly independent over GF(2) in edge
//! space, until the cyclomatic number `E - V + C` is reached.

use std::collections::VecDeque;

use petgraph::graph::NodeIndex;

use crate::graph_ops::num_components;
use crate::mol::Mol;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingInfo {
    rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let expected = Self::expected_ring_count(mol);
        if expected == 0 {
            return Self::default();
        }
        let candidates = horton_candidates(mol);
        let mut basis = CycleBasis::new(mol.bond_count());
        let mut rings = Vec::with_capacity(expected);
        for ring in candidates {
            if rings.len() == expected {
                break;
            }
            if basis.insert(edge_set(mol, &ring)) {
                rings.push(ring);
            }
        }
        Self { rings }
    }

    /// SSSR plus every other candidate ring no larger than the largest SSSR
    /// ring, so symmetry-equivalent rings (the six faces of cubane) are all
    /// reported.
    pub fn symmetrized_sssr<A, B>(mol: &Mol<A, B>) -> Self {
        let expected = Self::expected_ring_count(mol);
        if expected == 0 {
            return Self::default();
        }
        let candidates = horton_candidates(mol);
        let mut basis = CycleBasis::new(mol.bond_count());
        let mut rings: Vec<Vec<NodeIndex>> = Vec::with_capacity(expected);
        let mut max_len = 0;
        for ring in &candidates {
            if basis.rank() == expected {
                if ring.len() > max_len {
                    break;
                }
                rings.push(ring.clone());
                continue;
            }
            if basis.insert(edge_set(mol, ring)) {
                max_len = max_len.max(ring.len());
                rings.push(ring.clone());
            }
        }
        Self { rings }
    }

    pub fn num_rings(&self) -> usize {
        self.rings.len()
    }

    /// Rings sorted by size, each starting at its lowest atom.
    pub fn rings(&self) -> &[Vec<NodeIndex>] {
        &self.rings
    }

    pub fn is_ring_atom(&self, atom: NodeIndex) -> bool {
        self.rings.iter().any(|ring| ring.contains(&atom))
    }

    pub fn is_ring_bond(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.rings.iter().any(|ring| {
            ring_edges(ring).any(|(x, y)| (x == a && y == b) || (x == b && y == a))
        })
    }

    pub fn num_atom_rings(&self, atom: NodeIndex) -> usize {
        self.rings.iter().filter(|ring| ring.contains(&atom)).count()
    }

    pub fn smallest_ring_size(&self, atom: NodeIndex) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.contains(&atom))
            .map(Vec::len)
            .min()
    }

    /// Cyclomatic number `E - V + C`.
    pub fn expected_ring_count<A, B>(mol: &Mol<A, B>) -> usize {
        (mol.bond_count() + num_components(mol)).saturating_sub(mol.atom_count())
    }
}

/// Consecutive atom pairs of a ring, closing back to the first atom.
pub fn ring_edges(ring: &[NodeIndex]) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
    let len = ring.len();
    (0..len).map(move |i| (ring[i], ring[(i + 1) % len]))
}

/// Row-echelon basis of edge bitsets over GF(2).
struct CycleBasis {
    words: usize,
    rows: Vec<(usize, Vec<u64>)>,
}

impl CycleBasis {
    fn new(num_edges: usize) -> Self {
        Self {
            words: num_edges.div_ceil(64).max(1),
            rows: Vec::new(),
        }
    }

    fn rank(&self) -> usize {
        self.rows.len()
    }

    /// Adds `v` when it is independent of the current rows.
    fn insert(&mut self, mut v: Vec<u64>) -> bool {
        v.resize(self.words, 0);
        for (pivot, row) in &self.rows {
            if v[pivot / 64] & (1u64 << (pivot % 64)) != 0 {
                for (a, b) in v.iter_mut().zip(row) {
                    *a ^= *b;
                }
            }
        }
        match lowest_bit(&v) {
            Some(pivot) => {
                self.rows.push((pivot, v));
                true
            }
            None => false,
        }
    }
}

fn lowest_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, w)| i * 64 + w.trailing_zeros() as usize)
}

fn edge_set<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> Vec<u64> {
    let mut bits = vec![0u64; mol.bond_count().div_ceil(64).max(1)];
    for (a, b) in ring_edges(ring) {
        if let Some(edge) = mol.bond_between(a, b) {
            let i = edge.index();
            bits[i / 64] |= 1u64 << (i % 64);
        }
    }
    bits
}

fn horton_candidates<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let trees: Vec<ShortestPaths> = mol.atoms().map(|w| ShortestPaths::from(mol, w)).collect();

    let mut candidates = Vec::new();
    for edge in mol.bonds() {
        let Some((u, v)) = mol.bond_endpoints(edge) else {
            continue;
        };
        for tree in &trees {
            let (Some(path_u), Some(path_v)) = (tree.path_to(u), tree.path_to(v)) else {
                continue;
            };
            if path_u.len() + path_v.len() < 4 {
                continue;
            }
            // the two branches may only meet at the root
            if path_u[1..].iter().any(|x| path_v[1..].contains(x)) {
                continue;
            }
            let mut ring = path_u;
            ring.extend(path_v[1..].iter().rev());
            if ring.len() <= n {
                candidates.push(normalize_ring(&ring));
            }
        }
    }

    candidates.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    candidates.dedup();
    candidates
}

/// BFS tree from one root.
struct ShortestPaths {
    root: NodeIndex,
    pred: Vec<Option<NodeIndex>>,
    seen: Vec<bool>,
}

impl ShortestPaths {
    fn from<A, B>(mol: &Mol<A, B>, root: NodeIndex) -> Self {
        let n = mol.atom_count();
        let mut pred = vec![None; n];
        let mut seen = vec![false; n];
        seen[root.index()] = true;
        let mut queue = VecDeque::from([root]);
        while let Some(cur) = queue.pop_front() {
            for nb in mol.sorted_neighbors(cur) {
                if !seen[nb.index()] {
                    seen[nb.index()] = true;
                    pred[nb.index()] = Some(cur);
                    queue.push_back(nb);
                }
            }
        }
        Self { root, pred, seen }
    }

    fn path_to(&self, dst: NodeIndex) -> Option<Vec<NodeIndex>> {
        if !self.seen[dst.index()] {
            return None;
        }
        let mut path = vec![dst];
        let mut cur = dst;
        while cur != self.root {
            cur = self.pred[cur.index()]?;
            path.push(cur);
        }
        path.reverse();
        Some(path)
    }
}

/// Rotate so the lowest atom comes first, then pick the direction whose
/// second atom is lower.
fn normalize_ring(ring: &[NodeIndex]) -> Vec<NodeIndex> {
    let len = ring.len();
    let Some(start) = (0..len).min_by_key(|&i| ring[i]) else {
        return Vec::new();
    };
    let mut normalized: Vec<NodeIndex> = (0..len).map(|i| ring[(start + i) % len]).collect();
    if len > 2 && normalized[1] > normalized[len - 1] {
        normalized[1..].reverse();
    }
    normalized
}
