//! Kekulization assigns alternating single and double bonds to aromatic
//! systems.
//!
//! Every [`BondOrder::Aromatic`] bond becomes `Single` or `Double` so that
//! each aromatic atom that still needs a pi bond receives exactly one.
//! Implemented as a maximum matching over the aromatic subgraph grown by
//! augmenting paths. If no valid assignment exists (e.g. an odd ring with
//! the wrong electron count), [`kekulize`] returns a [`KekulizeError`] and
//! the molecule is left untouched.

use std::collections::{HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::valence::{allowed_valences, explicit_valence};

/// Error returned when no valid Kekulé structure exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KekulizeError {
    /// The listed atoms could not be assigned a double bond.
    #[error("cannot kekulize aromatic system: unmatched atoms {0:?}")]
    Unkekulizable(Vec<usize>),
}

/// Replace aromatic bonds with a Kekulé assignment.
///
/// Hydrogen counts must already be known for aromatic atoms. With
/// `clear_aromatic_flags` every atom's `is_aromatic` is reset as well.
pub fn kekulize(mol: &mut Mol<Atom, Bond>, clear_aromatic_flags: bool) -> Result<(), KekulizeError> {
    let n = mol.atom_count();
    let mut aromatic_adj: Vec<Vec<(NodeIndex, EdgeIndex)>> = vec![vec![]; n];
    let mut aromatic_edges = Vec::new();
    for e in mol.bonds() {
        if mol.bond(e).order != BondOrder::Aromatic {
            continue;
        }
        if let Some((a, b)) = mol.bond_endpoints(e) {
            aromatic_adj[a.index()].push((b, e));
            aromatic_adj[b.index()].push((a, e));
            aromatic_edges.push(e);
        }
    }

    let mut needs_double = vec![false; n];
    let mut may_double = vec![false; n];
    for v in mol.atoms() {
        if aromatic_adj[v.index()].is_empty() {
            continue;
        }
        match pi_demand(mol, v) {
            PiDemand::Required => {
                needs_double[v.index()] = true;
                may_double[v.index()] = true;
            }
            PiDemand::Optional => may_double[v.index()] = true,
            PiDemand::None => {}
        }
    }

    let mut matched_edge: Vec<Option<EdgeIndex>> = vec![None; n];
    for start in mol.atoms() {
        if needs_double[start.index()] && matched_edge[start.index()].is_none() {
            augment(mol, &aromatic_adj, &may_double, &mut matched_edge, start);
        }
    }

    let unmatched: Vec<usize> = mol
        .atoms()
        .filter(|v| needs_double[v.index()] && matched_edge[v.index()].is_none())
        .map(|v| v.index())
        .collect();
    if !unmatched.is_empty() {
        return Err(KekulizeError::Unkekulizable(unmatched));
    }

    let doubles: HashSet<EdgeIndex> = matched_edge.iter().flatten().copied().collect();
    for e in aromatic_edges {
        mol.bond_mut(e).order = if doubles.contains(&e) {
            BondOrder::Double
        } else {
            BondOrder::Single
        };
    }
    if clear_aromatic_flags {
        for v in mol.atoms().collect::<Vec<_>>() {
            mol.atom_mut(v).is_aromatic = false;
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PiDemand {
    Required,
    /// May take a double bond and keep the spare electron as a radical.
    Optional,
    None,
}

/// An atom one valence unit short must take a double bond from the
/// aromatic system. So must a charged atom with no hydrogens and a
/// two-unit gap (bare pyridinium nitrogen). A neutral bracket atom with no
/// hydrogens and a two-unit gap (`[c]` in the phenyl radical) may take one.
fn pi_demand(mol: &Mol<Atom, Bond>, v: NodeIndex) -> PiDemand {
    let atom = mol.atom(v);
    let used = explicit_valence(mol, v) + atom.hydrogen_count + atom.num_radical_electrons;
    let Some(target) = allowed_valences(atom.atomic_num, atom.formal_charge)
        .iter()
        .copied()
        .find(|&t| t >= used)
    else {
        return PiDemand::None;
    };
    match target - used {
        1 => PiDemand::Required,
        2 if atom.hydrogen_count == 0 && atom.formal_charge != 0 => PiDemand::Required,
        2 if atom.hydrogen_count == 0 && atom.no_implicit => PiDemand::Optional,
        _ => PiDemand::None,
    }
}

/// BFS for an alternating path from `start` to an unmatched atom; flips it
/// when found.
fn augment(
    mol: &Mol<Atom, Bond>,
    aromatic_adj: &[Vec<(NodeIndex, EdgeIndex)>],
    may_double: &[bool],
    matched_edge: &mut [Option<EdgeIndex>],
    start: NodeIndex,
) -> bool {
    let n = mol.atom_count();
    let mut prev: Vec<Option<(NodeIndex, EdgeIndex)>> = vec![None; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::from([start]);
    visited[start.index()] = true;

    while let Some(u) = queue.pop_front() {
        for &(v, e) in &aromatic_adj[u.index()] {
            if !may_double[v.index()] || visited[v.index()] {
                continue;
            }
            if Some(e) == matched_edge[u.index()] {
                continue;
            }
            visited[v.index()] = true;
            prev[v.index()] = Some((u, e));

            let Some(partner_edge) = matched_edge[v.index()] else {
                flip_path(matched_edge, &prev, start, v);
                return true;
            };
            let Some(w) = mol.other_atom(partner_edge, v) else {
                continue;
            };
            if !visited[w.index()] {
                visited[w.index()] = true;
                prev[w.index()] = Some((v, partner_edge));
                queue.push_back(w);
            }
        }
    }
    false
}

fn flip_path(
    matched_edge: &mut [Option<EdgeIndex>],
    prev: &[Option<(NodeIndex, EdgeIndex)>],
    start: NodeIndex,
    end: NodeIndex,
) {
    let mut cur = end;
    let mut is_new_match = true;
    while cur != start {
        let Some((p, e)) = prev[cur.index()] else {
            return;
        };
        if is_new_match {
            matched_edge[cur.index()] = Some(e);
            matched_edge[p.index()] = Some(e);
        }
        is_new_match = !is_new_match;
        cur = p;
    }
}
