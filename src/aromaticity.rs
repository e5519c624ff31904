//! Hückel aromaticity perception on kekulized rings.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::{ring_edges, RingInfo};
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};

const SP2_CAPABLE: [u8; 9] = [
    5,  // B
    6,  // C
    7,  // N
    8,  // O
    15, // P
    16, // S
    33, // As
    34, // Se
    52, // Te
];

/// Rings of `rings` that satisfy the 4n+2 rule. Every ring is judged on the
/// Kekulé bond orders, so the graph must not contain aromatic bonds yet.
pub fn find_aromatic_rings<'r, A, B>(mol: &Mol<A, B>, rings: &'r RingInfo) -> Vec<&'r [NodeIndex]>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    rings
        .rings()
        .iter()
        .filter(|ring| is_aromatic_ring(mol, ring))
        .map(Vec::as_slice)
        .collect()
}

/// Flag atoms of aromatic rings and turn their ring bonds into
/// [`BondOrder::Aromatic`]. Existing flags are replaced.
pub fn set_aromaticity(mol: &mut Mol<Atom, Bond>, rings: &RingInfo) {
    let aromatic: Vec<Vec<NodeIndex>> = find_aromatic_rings(mol, rings)
        .into_iter()
        .map(<[NodeIndex]>::to_vec)
        .collect();

    for v in mol.atoms().collect::<Vec<_>>() {
        mol.atom_mut(v).is_aromatic = false;
    }
    for ring in &aromatic {
        for &v in ring {
            mol.atom_mut(v).is_aromatic = true;
        }
        for (a, b) in ring_edges(ring) {
            if let Some(e) = mol.bond_between(a, b) {
                mol.bond_mut(e).order = BondOrder::Aromatic;
            }
        }
    }
}

fn is_aromatic_ring<A, B>(mol: &Mol<A, B>, ring: &[NodeIndex]) -> bool
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    if ring.len() < 3 {
        return false;
    }
    if !ring
        .iter()
        .all(|&v| SP2_CAPABLE.contains(&mol.atom(v).atomic_num()))
    {
        return false;
    }
    let in_ring_orders_ok = ring_edges(ring).all(|(a, b)| {
        mol.bond_between(a, b)
            .is_some_and(|e| matches!(mol.bond(e).bond_order(), BondOrder::Single | BondOrder::Double))
    });
    if !in_ring_orders_ok {
        return false;
    }

    let mut pi_total: u8 = 0;
    for (i, &v) in ring.iter().enumerate() {
        match pi_electrons(mol, v, ring, i) {
            Some(e) => pi_total = pi_total.saturating_add(e),
            None => return false,
        }
    }
    is_huckel(pi_total)
}

fn pi_electrons<A, B>(mol: &Mol<A, B>, v: NodeIndex, ring: &[NodeIndex], pos: usize) -> Option<u8>
where
    A: HasAtomicNum + HasFormalCharge + HasHydrogenCount,
    B: HasBondOrder,
{
    let atom = mol.atom(v);
    let double_partner = mol
        .bonds_of(v)
        .find(|&e| mol.bond(e).bond_order() == BondOrder::Double)
        .and_then(|e| mol.other_atom(e, v));
    let double_in_ring = has_double_to_ring_neighbor(mol, v, ring, pos);
    let total_degree = mol.degree(v) + atom.hydrogen_count() as usize;

    match (atom.atomic_num(), atom.formal_charge()) {
        (6, 0) => match double_partner {
            // exocyclic C=O, C=N, C=S donate nothing
            Some(p) if !ring.contains(&p) && matches!(mol.atom(p).atomic_num(), 7 | 8 | 16) => {
                Some(0)
            }
            Some(_) => Some(1),
            None => None,
        },
        (6, -1) => Some(2),
        (6, 1) => Some(if double_partner.is_some() { 1 } else { 0 }),
        (7, 0) | (15, 0) | (33, 0) => {
            if double_partner.is_some() {
                Some(1)
            } else if total_degree <= 3 {
                Some(2)
            } else {
                None
            }
        }
        (7, 1) => double_in_ring.then_some(1),
        (8 | 16 | 34 | 52, _) => {
            if double_in_ring {
                Some(1)
            } else {
                Some(2)
            }
        }
        (5, _) => Some(if double_partner.is_some() { 1 } else { 0 }),
        _ => None,
    }
}

fn has_double_to_ring_neighbor<A, B: HasBondOrder>(
    mol: &Mol<A, B>,
    v: NodeIndex,
    ring: &[NodeIndex],
    pos: usize,
) -> bool {
    let len = ring.len();
    let prev = ring[(pos + len - 1) % len];
    let next = ring[(pos + 1) % len];
    [prev, next].into_iter().any(|nb| {
        mol.bond_between(v, nb)
            .is_some_and(|e| mol.bond(e).bond_order() == BondOrder::Double)
    })
}

fn is_huckel(pi_electrons: u8) -> bool {
    pi_electrons >= 2 && (pi_electrons - 2) % 4 == 0
}
