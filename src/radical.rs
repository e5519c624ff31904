//! Radical electron counting.
//!
//! The count is inferred from the gap between the atom's valence-shell
//! capacity and the electrons it uses for bonding and lone pairs, e.g. one
//! unpaired electron on a methyl radical `[CH3]`.

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

/// Unpaired electrons for an atom with the given total valence (bond
/// orders plus attached hydrogens) and heavy-atom degree.
pub fn radical_electrons_for(
    atomic_num: u8,
    formal_charge: i8,
    total_valence: u8,
    degree: usize,
) -> u8 {
    let Some(elem) = Element::from_atomic_num(atomic_num) else {
        return 0;
    };
    let charge = formal_charge as i16;
    let n_outer = elem.outer_shell_electrons() as i16;

    let valences = elem.default_valences();
    if valences.is_empty() {
        // bonded metals are left alone; a bare ion is a radical when its
        // electron count is odd
        if degree > 0 || total_valence > 0 {
            return 0;
        }
        return (n_outer - charge).rem_euclid(2) as u8;
    }

    let total = total_valence as i16;
    let shell: i16 = if atomic_num <= 2 { 2 } else { 8 };

    let mut radicals = shell - n_outer - total + charge;
    if radicals < 0 {
        // hypervalent: measure against the next allowed valence
        radicals = valences
            .iter()
            .map(|&v| v as i16 - total + charge)
            .find(|&r| r >= 0)
            .filter(|_| valences.len() > 1)
            .unwrap_or(0);
    }
    let alt = n_outer - total - charge;
    if (0..radicals).contains(&alt) {
        radicals = alt;
    }
    radicals.max(0) as u8
}

/// Radical count implied by the graph around `idx`. Aromatic bonds count
/// as single bonds, so the result is only meaningful on kekulized graphs.
pub fn num_radical_electrons<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    radical_electrons_for(
        atom.atomic_num(),
        atom.formal_charge(),
        total_valence(mol, idx),
        mol.degree(idx),
    )
}

/// Fill in radical counts on atoms whose hydrogen count is authoritative
/// and that do not carry one yet.
pub fn assign_radicals(mol: &mut Mol<Atom, Bond>) {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for idx in nodes {
        let atom = mol.atom(idx);
        if !atom.no_implicit || atom.num_radical_electrons != 0 {
            continue;
        }
        let radicals = num_radical_electrons(mol, idx);
        mol.atom_mut(idx).num_radical_electrons = radicals;
    }
}
