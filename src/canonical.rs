//! Canonical atom ranking.
//!
//! Ranks start from hashed atom invariants and are refined by neighbour
//! ranks paired with bond orders (Morgan), tetrahedral and double-bond
//! configuration, then ties are broken by trial promotion. The result
//! depends only on the labelled graph, never on input atom order.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::atom::Chirality;
use crate::bond::{BondOrder, BondStereo};
use crate::mol::{permutation_parity, Mol};
use crate::traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasBondStereo, HasChirality, HasFormalCharge,
    HasHydrogenCount, HasIsotope, HasMapNumber, HasRadicalElectrons,
};

/// Atom capabilities the ranking reads.
pub trait RankedAtom:
    HasAtomicNum
    + HasHydrogenCount
    + HasFormalCharge
    + HasAromaticity
    + HasIsotope
    + HasRadicalElectrons
    + HasMapNumber
    + HasChirality
{
}

impl<T> RankedAtom for T where
    T: HasAtomicNum
        + HasHydrogenCount
        + HasFormalCharge
        + HasAromaticity
        + HasIsotope
        + HasRadicalElectrons
        + HasMapNumber
        + HasChirality
{
}

/// Bond capabilities the ranking reads.
pub trait RankedBond: HasBondOrder + HasBondStereo {}

impl<T> RankedBond for T where T: HasBondOrder + HasBondStereo {}

struct Fnv1aHasher(u64);

impl Fnv1aHasher {
    fn new() -> Self {
        Self(0xcbf29ce484222325)
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x100000001b3);
        }
    }
}

fn fnv<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut h = Fnv1aHasher::new();
    value.hash(&mut h);
    h.finish()
}

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct AtomInvariant {
    atomic_num: u8,
    degree: u8,
    hydrogen_count: u8,
    formal_charge: i8,
    is_aromatic: bool,
    isotope: u16,
    radicals: u8,
    map_number: u32,
    // single, double, triple, aromatic, quadruple
    bond_counts: [u8; 5],
}

fn order_slot(order: BondOrder) -> u8 {
    match order {
        BondOrder::Single => 0,
        BondOrder::Double => 1,
        BondOrder::Triple => 2,
        BondOrder::Aromatic => 3,
        BondOrder::Quadruple => 4,
    }
}

/// Sorted `(rank, bond order)` pairs for the neighbours of `node`.
fn neighbor_entries<A, B: HasBondOrder>(mol: &Mol<A, B>, node: NodeIndex, ranks: &[usize]) -> Vec<(usize, u8)> {
    let mut entries: Vec<(usize, u8)> = mol
        .bonds_of(node)
        .filter_map(|e| {
            let nb = mol.other_atom(e, node)?;
            Some((ranks[nb.index()], order_slot(mol.bond(e).bond_order())))
        })
        .collect();
    entries.sort_unstable();
    entries
}

fn atom_invariant<A: RankedAtom, B: RankedBond>(mol: &Mol<A, B>, idx: NodeIndex) -> AtomInvariant {
    let atom = mol.atom(idx);
    let mut bond_counts = [0u8; 5];
    for edge in mol.bonds_of(idx) {
        let slot = order_slot(mol.bond(edge).bond_order());
        bond_counts[slot as usize] = bond_counts[slot as usize].saturating_add(1);
    }
    AtomInvariant {
        atomic_num: atom.atomic_num(),
        degree: mol.degree(idx) as u8,
        hydrogen_count: atom.hydrogen_count(),
        formal_charge: atom.formal_charge(),
        is_aromatic: atom.is_aromatic(),
        isotope: atom.isotope(),
        radicals: atom.num_radical_electrons(),
        map_number: atom.map_number(),
        bond_counts,
    }
}

fn ranks_from_values<T: Ord>(values: &[T]) -> Vec<usize> {
    let n = values.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| values[a].cmp(&values[b]));
    let mut ranks = vec![0usize; n];
    for i in 1..n {
        ranks[indices[i]] = if values[indices[i]] == values[indices[i - 1]] {
            ranks[indices[i - 1]]
        } else {
            i
        };
    }
    ranks
}

fn count_distinct(ranks: &[usize]) -> usize {
    let mut sorted: Vec<usize> = ranks.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn morgan_refine<A, B: HasBondOrder>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let mut prev_distinct = count_distinct(ranks);
    loop {
        // own rank first keeps earlier distinctions
        let values: Vec<(usize, Vec<(usize, u8)>)> = mol
            .atoms()
            .map(|node| (ranks[node.index()], neighbor_entries(mol, node, ranks)))
            .collect();
        let new_ranks = ranks_from_values(&values);
        let distinct = count_distinct(&new_ranks);
        if distinct <= prev_distinct {
            return;
        }
        *ranks = new_ranks;
        prev_distinct = distinct;
    }
}

/// Handedness of `center` seen through the current ranks: 1 or 2 for the
/// two configurations, 3 when reference ranks are tied, 0 for no stereo.
fn tetrahedral_code<A: RankedAtom, B>(mol: &Mol<A, B>, center: NodeIndex, ranks: &[usize]) -> u8 {
    let chirality = mol.atom(center).chirality();
    if chirality == Chirality::None {
        return 0;
    }
    let n = ranks.len();
    let ref_ranks: Vec<usize> = mol
        .chiral_reference(center)
        .into_iter()
        .map(|r| r.map_or(n, |v| ranks[v.index()]))
        .collect();
    let mut sorted = ref_ranks.clone();
    sorted.sort_unstable();
    if sorted.windows(2).any(|w| w[0] == w[1]) {
        return 3;
    }
    match chirality.with_parity(permutation_parity(&ref_ranks, &sorted)) {
        Chirality::Cw => 1,
        Chirality::Ccw => 2,
        Chirality::None => 0,
    }
}

/// Cis/trans code of a double bond relative to the highest-ranked
/// neighbour on each side: 1 cis, 2 trans, 3 when a side is tied.
fn double_bond_code<A, B: RankedBond>(
    mol: &Mol<A, B>,
    begin: NodeIndex,
    end: NodeIndex,
    stereo: BondStereo,
    ranks: &[usize],
) -> Option<u8> {
    let (ref_begin, ref_end) = stereo.refs()?;
    let best = |atom: NodeIndex, other: NodeIndex| -> Option<NodeIndex> {
        let mut side: Vec<NodeIndex> = mol.neighbors(atom).filter(|&nb| nb != other).collect();
        side.sort_by_key(|nb| std::cmp::Reverse(ranks[nb.index()]));
        match side.as_slice() {
            [a, b, ..] if ranks[a.index()] == ranks[b.index()] => None,
            [a, ..] => Some(*a),
            [] => None,
        }
    };
    let (Some(best_begin), Some(best_end)) = (best(begin, end), best(end, begin)) else {
        return Some(3);
    };
    let swapped = (best_begin != ref_begin) != (best_end != ref_end);
    let cis = stereo.is_cis() != swapped;
    Some(if cis { 1 } else { 2 })
}

fn stereo_refine<A: RankedAtom, B: RankedBond>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    let mut codes = vec![0u8; ranks.len()];
    let mut bond_codes: Vec<Vec<u8>> = vec![Vec::new(); ranks.len()];
    let mut any_stereo = false;

    for node in mol.atoms() {
        let code = tetrahedral_code(mol, node, ranks);
        codes[node.index()] = code;
        any_stereo |= code != 0;
    }
    for edge in mol.bonds() {
        let Some((begin, end)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let Some(code) = double_bond_code(mol, begin, end, mol.bond(edge).bond_stereo(), ranks) {
            bond_codes[begin.index()].push(code);
            bond_codes[end.index()].push(code);
            any_stereo = true;
        }
    }
    if !any_stereo {
        return;
    }

    let values: Vec<(usize, u8, Vec<u8>)> = (0..ranks.len())
        .map(|i| {
            let mut bc = std::mem::take(&mut bond_codes[i]);
            bc.sort_unstable();
            (ranks[i], codes[i], bc)
        })
        .collect();
    *ranks = ranks_from_values(&values);
}

fn refine<A: RankedAtom, B: RankedBond>(mol: &Mol<A, B>, ranks: &mut Vec<usize>) {
    morgan_refine(mol, ranks);
    loop {
        let prev = count_distinct(ranks);
        stereo_refine(mol, ranks);
        morgan_refine(mol, ranks);
        if count_distinct(ranks) <= prev {
            break;
        }
    }
}

/// Canonical rank of every atom: a permutation of `0..atom_count`.
pub fn canonical_ordering<A: RankedAtom, B: RankedBond>(mol: &Mol<A, B>) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let invariants: Vec<AtomInvariant> = mol.atoms().map(|v| atom_invariant(mol, v)).collect();
    let mut ranks = ranks_from_values(&invariants);
    refine(mol, &mut ranks);
    trace!(
        atoms = n,
        classes = count_distinct(&ranks),
        "refined canonical ranks"
    );

    if count_distinct(&ranks) < n {
        break_ties(mol, &mut ranks, &invariants);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by_key(|&i| ranks[i]);
    let mut final_ranks = vec![0usize; n];
    for (rank, &atom_idx) in indices.iter().enumerate() {
        final_ranks[atom_idx] = rank;
    }
    final_ranks
}

fn break_ties<A: RankedAtom, B: RankedBond>(
    mol: &Mol<A, B>,
    ranks: &mut Vec<usize>,
    invariants: &[AtomInvariant],
) {
    let n = ranks.len();
    let invariant_hashes: Vec<u64> = invariants.iter().map(fnv).collect();

    while count_distinct(ranks) < n {
        let Some(tied_rank) = find_best_tied_rank(mol, ranks) else {
            return;
        };
        let tied_atoms: Vec<usize> = (0..n).filter(|&i| ranks[i] == tied_rank).collect();
        let max_rank = ranks.iter().copied().max().unwrap_or(0);

        // Promote each tied atom in turn and keep the promotion whose
        // invariant trace (sorted by resulting rank) is smallest.
        let mut best: Option<(Vec<u64>, Vec<usize>)> = None;
        for &candidate in &tied_atoms {
            let mut trial = ranks.clone();
            trial[candidate] = max_rank + 1;
            refine(mol, &mut trial);

            let mut by_rank: Vec<usize> = (0..n).collect();
            by_rank.sort_by_key(|&i| trial[i]);
            let trace: Vec<u64> = by_rank
                .iter()
                .map(|&i| {
                    let node = NodeIndex::new(i);
                    fnv(&(
                        invariant_hashes[i],
                        neighbor_entries(mol, node, &trial),
                        tetrahedral_code(mol, node, &trial),
                    ))
                })
                .collect();
            if best.as_ref().is_none_or(|(best_trace, _)| trace < *best_trace) {
                best = Some((trace, trial));
            }
        }
        match best {
            Some((_, trial)) => *ranks = trial,
            None => return,
        }
        trace!(classes = count_distinct(ranks), "broke canonical tie");
    }
}

/// Lowest tied rank, preferring classes without a stereocentre so that
/// promotion does not decide a configuration prematurely.
fn find_best_tied_rank<A: RankedAtom, B>(mol: &Mol<A, B>, ranks: &[usize]) -> Option<usize> {
    let mut counts: HashMap<usize, usize> = HashMap::new();
    for &r in ranks {
        *counts.entry(r).or_insert(0) += 1;
    }
    let tied: Vec<usize> = counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|(rank, _)| rank)
        .collect();

    let has_stereo_at_rank = |r: usize| {
        mol.atoms()
            .any(|v| ranks[v.index()] == r && mol.atom(v).chirality() != Chirality::None)
    };

    tied.iter()
        .copied()
        .filter(|&r| !has_stereo_at_rank(r))
        .min()
        .or_else(|| tied.iter().copied().min())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::Bond;
    use crate::graph_ops::renumber_atoms;
    use crate::smiles::{parse_smiles, to_canonical_smiles};

    fn is_permutation(ranks: &[usize]) -> bool {
        let mut sorted = ranks.to_vec();
        sorted.sort_unstable();
        sorted == (0..ranks.len()).collect::<Vec<_>>()
    }

    #[test]
    fn empty_mol() {
        let mol = Mol::<Atom, Bond>::new();
        assert!(canonical_ordering(&mol).is_empty());
    }

    #[test]
    fn single_atom() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(canonical_ordering(&mol), vec![0]);
    }

    #[test]
    fn ranks_are_total() {
        for smiles in ["CCO", "c1ccccc1", "C1CC1C1CC1", "CC(C)(C)C"] {
            let mol = parse_smiles(smiles).unwrap();
            assert!(is_permutation(&canonical_ordering(&mol)), "{smiles}");
        }
    }

    #[test]
    fn map_numbers_distinguish_atoms() {
        let plain = parse_smiles("CC").unwrap();
        let mapped = parse_smiles("[CH3:2][CH3:1]").unwrap();
        assert_eq!(canonical_ordering(&plain).len(), 2);
        // the atom mapped 1 sorts first
        assert_eq!(canonical_ordering(&mapped), vec![1, 0]);
    }

    #[test]
    fn rotation_invariant_with_stereo() {
        let cases = [
            "[C@@H]1(O)C[C@H](O)C[C@@H](O)C1",
            "[C@@H]1(CC1)[C@H]2CC2",
            "N[C@@H](C)C(=O)O",
            "F/C=C/C=C\\Cl",
            "C/C(F)=C(/Cl)Br",
        ];
        for smiles in cases {
            let mol = parse_smiles(smiles).unwrap();
            let expected = to_canonical_smiles(&mol);
            let n = mol.atom_count();
            for offset in 1..n {
                let perm: Vec<usize> = (0..n).map(|i| (i + offset) % n).collect();
                let renumbered = renumber_atoms(&mol, &perm).unwrap();
                assert_eq!(
                    to_canonical_smiles(&renumbered),
                    expected,
                    "{smiles} offset {offset}"
                );
            }
        }
    }

    #[test]
    fn alternating_ring_bonds_ignore_atom_order() {
        let mol = parse_smiles("C1=CC=CC=CC=C1").unwrap();
        let expected = to_canonical_smiles(&mol);
        for perm in [
            vec![1, 2, 3, 4, 5, 6, 7, 0],
            vec![7, 6, 5, 4, 3, 2, 1, 0],
            vec![3, 0, 6, 1, 7, 2, 5, 4],
        ] {
            let renumbered = renumber_atoms(&mol, &perm).unwrap();
            assert_eq!(to_canonical_smiles(&renumbered), expected, "{perm:?}");
        }
    }

    #[test]
    fn bond_order_splits_neighbour_classes() {
        // the promoted atom's two neighbours differ only by bond order
        let mol = parse_smiles("C1=CC=CC=CC=C1").unwrap();
        let mut ranks = vec![0; 8];
        ranks[0] = 8;
        morgan_refine(&mol, &mut ranks);
        assert_ne!(ranks[1], ranks[7]);
    }

    #[test]
    fn enantiomers_rank_differently_in_output() {
        let r = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        let s = parse_smiles("N[C@H](C)C(=O)O").unwrap();
        assert_ne!(to_canonical_smiles(&r), to_canonical_smiles(&s));
    }

    #[test]
    fn canonical_output_is_idempotent() {
        for smiles in [
            "[C@H]1(O)C[C@@H](O)C[C@H](O)C1",
            "[C@@H]1(CCC1)[C@H]2CCC2",
            "[C@@H]1(CC1)[C@@H](F)CC",
            "C/C=C/C=C/C",
        ] {
            let first = to_canonical_smiles(&parse_smiles(smiles).unwrap());
            let second = to_canonical_smiles(&parse_smiles(&first).unwrap());
            assert_eq!(first, second, "{smiles}");
        }
    }

    #[test]
    fn double_bond_code_follows_highest_rank() {
        // one neighbour per side: the written refs are the canonical ones
        let mol = parse_smiles("F/C=C/F").unwrap();
        let ranks = canonical_ordering(&mol);
        let e = mol.bond_between(NodeIndex::new(1), NodeIndex::new(2)).unwrap();
        let (b, en) = mol.bond_endpoints(e).unwrap();
        assert_eq!(
            double_bond_code(&mol, b, en, mol.bond(e).stereo, &ranks),
            Some(2)
        );
    }
}
