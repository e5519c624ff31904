use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::{Atom, Chirality};
use crate::bond::Bond;
use crate::mol::{permutation_parity, Mol};

/// Connected components, each sorted by atom index, in order of their
/// lowest atom.
pub fn connected_components<A, B>(mol: &Mol<A, B>) -> Vec<Vec<NodeIndex>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut components = Vec::new();
    for node in mol.atoms() {
        if visited[node.index()] {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if visited[current.index()] {
                continue;
            }
            visited[current.index()] = true;
            component.push(current);
            for neighbor in mol.neighbors(current) {
                if !visited[neighbor.index()] {
                    stack.push(neighbor);
                }
            }
        }
        component.sort();
        components.push(component);
    }
    components
}

pub fn num_components<A, B>(mol: &Mol<A, B>) -> usize {
    connected_components(mol).len()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenumberError {
    #[error("new_order length {got} != atom count {expected}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("new_order is not a valid permutation")]
    InvalidPermutation,
}

fn validate_permutation(new_order: &[usize], n: usize) -> Result<(), RenumberError> {
    if new_order.len() != n {
        return Err(RenumberError::LengthMismatch {
            expected: n,
            got: new_order.len(),
        });
    }
    let mut seen = vec![false; n];
    for &idx in new_order {
        if idx >= n || seen[idx] {
            return Err(RenumberError::InvalidPermutation);
        }
        seen[idx] = true;
    }
    Ok(())
}

/// Rebuild `mol` with atom `new_order[i]` at index `i`.
///
/// Double-bond reference atoms are remapped and tetrahedral tags are
/// re-expressed against the new reference order, so the stereo
/// configuration is unchanged.
pub fn renumber_atoms(
    mol: &Mol<Atom, Bond>,
    new_order: &[usize],
) -> Result<Mol<Atom, Bond>, RenumberError> {
    let n = mol.atom_count();
    validate_permutation(new_order, n)?;

    let mut old_to_new = vec![NodeIndex::new(0); n];
    for (new_idx, &old_idx) in new_order.iter().enumerate() {
        old_to_new[old_idx] = NodeIndex::new(new_idx);
    }

    let mut new_mol = Mol::new();
    for &old_idx in new_order {
        new_mol.add_atom(mol.atom(NodeIndex::new(old_idx)).clone());
    }

    let mut edges: Vec<_> = mol
        .bonds()
        .filter_map(|e| mol.bond_endpoints(e).map(|(a, b)| (e, a, b)))
        .collect();
    // keep bond indices in step with the new atom numbering
    edges.sort_by_key(|&(_, a, b)| {
        let (x, y) = (old_to_new[a.index()], old_to_new[b.index()]);
        (x.min(y), x.max(y))
    });
    for (edge, a, b) in edges {
        let mut bond = mol.bond(edge).clone();
        if let Some((ra, rb)) = bond.stereo.refs() {
            bond.stereo = bond
                .stereo
                .with_refs(old_to_new[ra.index()], old_to_new[rb.index()]);
        }
        new_mol.add_bond(old_to_new[a.index()], old_to_new[b.index()], bond);
    }

    for old in mol.atoms() {
        if mol.atom(old).chirality == Chirality::None {
            continue;
        }
        let old_ref: Vec<Option<NodeIndex>> = mol
            .chiral_reference(old)
            .into_iter()
            .map(|r| r.map(|x| old_to_new[x.index()]))
            .collect();
        let center = old_to_new[old.index()];
        let even = permutation_parity(&old_ref, &new_mol.chiral_reference(center));
        let atom = new_mol.atom_mut(center);
        atom.chirality = atom.chirality.with_parity(even);
    }

    Ok(new_mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::{BondOrder, BondStereo};

    fn ethanol() -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let c1 = mol.add_atom(Atom::new(6));
        let c2 = mol.add_atom(Atom::new(6));
        let o = mol.add_atom(Atom::new(8));
        mol.add_bond(c1, c2, Bond::new(BondOrder::Single));
        mol.add_bond(c2, o, Bond::new(BondOrder::Single));
        mol
    }

    #[test]
    fn components_of_disconnected_graph() {
        let mut mol = ethanol();
        mol.add_atom(Atom::new(11));
        let comps = connected_components(&mol);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].len(), 3);
        assert_eq!(comps[1], vec![NodeIndex::new(3)]);
        assert_eq!(num_components(&mol), 2);
    }

    #[test]
    fn renumber_reverses_atoms() {
        let mol = ethanol();
        let renumbered = renumber_atoms(&mol, &[2, 1, 0]).unwrap();
        assert_eq!(renumbered.atom(NodeIndex::new(0)).atomic_num, 8);
        assert_eq!(renumbered.atom(NodeIndex::new(2)).atomic_num, 6);
        assert!(renumbered
            .bond_between(NodeIndex::new(0), NodeIndex::new(1))
            .is_some());
        assert!(renumbered
            .bond_between(NodeIndex::new(0), NodeIndex::new(2))
            .is_none());
    }

    #[test]
    fn renumber_rejects_bad_permutations() {
        let mol = ethanol();
        assert_eq!(
            renumber_atoms(&mol, &[0, 1]).unwrap_err(),
            RenumberError::LengthMismatch {
                expected: 3,
                got: 2
            }
        );
        assert_eq!(
            renumber_atoms(&mol, &[0, 0, 1]).unwrap_err(),
            RenumberError::InvalidPermutation
        );
    }

    #[test]
    fn renumber_remaps_double_bond_refs() {
        // F-C=C-F
        let mut mol = Mol::new();
        let f1 = mol.add_atom(Atom::new(9));
        let c1 = mol.add_atom(Atom::new(6));
        let c2 = mol.add_atom(Atom::new(6));
        let f2 = mol.add_atom(Atom::new(9));
        mol.add_bond(f1, c1, Bond::new(BondOrder::Single));
        let db = mol.add_bond(c1, c2, Bond::new(BondOrder::Double));
        mol.add_bond(c2, f2, Bond::new(BondOrder::Single));
        mol.bond_mut(db).stereo = BondStereo::Trans(f1, f2);

        let renumbered = renumber_atoms(&mol, &[3, 2, 1, 0]).unwrap();
        let db = renumbered
            .bond_between(NodeIndex::new(1), NodeIndex::new(2))
            .unwrap();
        assert_eq!(
            renumbered.bond(db).stereo,
            BondStereo::Trans(NodeIndex::new(3), NodeIndex::new(0))
        );
    }

    #[test]
    fn renumber_swapping_two_neighbours_inverts_tag() {
        // C with H, F, Cl, Br neighbours as explicit nodes
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom {
            chirality: Chirality::Ccw,
            ..Atom::new(6)
        });
        for z in [1, 9, 17, 35] {
            let x = mol.add_atom(Atom::new(z));
            mol.add_bond(c, x, Bond::new(BondOrder::Single));
        }
        // swap F and Cl: reference order changes by one transposition
        let renumbered = renumber_atoms(&mol, &[0, 1, 3, 2, 4]).unwrap();
        assert_eq!(renumbered.atom(NodeIndex::new(0)).chirality, Chirality::Cw);
        // cyclic shift of three neighbours is an even permutation
        let renumbered = renumber_atoms(&mol, &[0, 1, 3, 4, 2]).unwrap();
        assert_eq!(renumbered.atom(NodeIndex::new(0)).chirality, Chirality::Ccw);
    }
}
