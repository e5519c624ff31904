use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasBondOrder, HasHydrogenCount};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("atom {atom_idx} ({}): valence {actual_valence} exceeds {allowed_valences:?}", symbol(.atomic_num))]
pub struct ValenceError {
    pub atom_idx: usize,
    pub atomic_num: u8,
    pub actual_valence: u8,
    pub allowed_valences: Vec<u8>,
}

fn symbol(atomic_num: &u8) -> &'static str {
    Element::from_atomic_num(*atomic_num)
        .map(Element::symbol)
        .unwrap_or("*")
}

/// Valences permitted for an atom with the given charge.
///
/// A charged atom takes the valences of its isoelectronic neighbour in the
/// same period (`N+` behaves like `C`, `O-` like `F`, `C+` like `B`). Empty
/// when no such element has a conventional valence, in which case the
/// atom gets no implicit hydrogens and is not checked.
pub fn allowed_valences(atomic_num: u8, formal_charge: i8) -> &'static [u8] {
    let Some(elem) = Element::from_atomic_num(atomic_num) else {
        return &[];
    };
    if formal_charge == 0 {
        return elem.default_valences();
    }
    let shifted = atomic_num as i16 - formal_charge as i16;
    match u8::try_from(shifted).ok().and_then(Element::from_atomic_num) {
        Some(iso) if iso.period() == elem.period() => iso.default_valences(),
        _ => &[],
    }
}

/// Sum of bond valence contributions, counting aromatic bonds as one.
pub fn explicit_valence<A, B: HasBondOrder>(mol: &Mol<A, B>, atom: NodeIndex) -> u8 {
    mol.bonds_of(atom)
        .map(|e| mol.bond(e).bond_order().valence_contribution())
        .sum()
}

pub fn total_valence<A: HasHydrogenCount, B: HasBondOrder>(mol: &Mol<A, B>, atom: NodeIndex) -> u8 {
    explicit_valence(mol, atom) + mol.atom(atom).hydrogen_count()
}

/// Smallest allowed valence not below `used`, minus `used`. `None` when
/// `used` exceeds every allowed valence.
pub fn implicit_hydrogens(atomic_num: u8, formal_charge: i8, used: u8) -> Option<u8> {
    let allowed = allowed_valences(atomic_num, formal_charge);
    if allowed.is_empty() {
        return Some(0);
    }
    allowed.iter().find(|&&v| v >= used).map(|&v| v - used)
}

/// Hydrogen estimate for aromatic atoms before kekulization: one valence
/// unit is reserved for the pi bond the atom may receive.
pub(crate) fn estimate_aromatic_hydrogens(mol: &mut Mol<Atom, Bond>) {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let atom = mol.atom(idx);
        if !atom.is_aromatic || atom.no_implicit {
            continue;
        }
        let used = explicit_valence(mol, idx) + atom.num_radical_electrons;
        let h = implicit_hydrogens(atom.atomic_num, atom.formal_charge, used).unwrap_or(0);
        mol.atom_mut(idx).hydrogen_count = h.saturating_sub(1);
    }
}

/// Recompute `hydrogen_count` for every atom that does not carry an
/// authoritative count. Expects a kekulized graph.
pub fn assign_implicit_hydrogens(mol: &mut Mol<Atom, Bond>) -> Result<(), ValenceError> {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let atom = mol.atom(idx);
        if atom.no_implicit {
            continue;
        }
        let used = explicit_valence(mol, idx) + atom.num_radical_electrons;
        let h = implicit_hydrogens(atom.atomic_num, atom.formal_charge, used).ok_or_else(|| {
            ValenceError {
                atom_idx: idx.index(),
                atomic_num: atom.atomic_num,
                actual_valence: used,
                allowed_valences: allowed_valences(atom.atomic_num, atom.formal_charge).to_vec(),
            }
        })?;
        mol.atom_mut(idx).hydrogen_count = h;
    }
    Ok(())
}

/// First atom whose total valence (bonds, hydrogens and radicals) exceeds
/// every valence allowed for its element and charge.
pub fn check_valence(mol: &Mol<Atom, Bond>) -> Result<(), ValenceError> {
    for idx in mol.atoms() {
        let atom = mol.atom(idx);
        let allowed = allowed_valences(atom.atomic_num, atom.formal_charge);
        let Some(&max) = allowed.last() else {
            continue;
        };
        let v = total_valence(mol, idx) + atom.num_radical_electrons;
        if v > max {
            return Err(ValenceError {
                atom_idx: idx.index(),
                atomic_num: atom.atomic_num,
                actual_valence: v,
                allowed_valences: allowed.to_vec(),
            });
        }
    }
    Ok(())
}
