//! Conversion between explicit hydrogen nodes and per-atom hydrogen counts.

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder};
use crate::error::{MolError, StructureError};
use crate::mol::{permutation_parity, Mol};
use crate::sanitize::sanitize;

/// Atoms used as reference atoms by any double-bond stereo.
fn stereo_referenced_atoms(mol: &Mol<Atom, Bond>) -> Vec<bool> {
    let mut referenced = vec![false; mol.atom_count()];
    for e in mol.bonds() {
        if let Some((a, b)) = mol.bond(e).stereo.refs() {
            referenced[a.index()] = true;
            referenced[b.index()] = true;
        }
    }
    referenced
}

/// Make every hydrogen an explicit graph node.
///
/// New hydrogens are appended after the existing atoms, grouped by parent
/// in parent order. Tetrahedral tags are re-expressed so the implicit
/// hydrogen's position is taken by its new node.
pub fn add_hs(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut result = Mol::new();
    for idx in mol.atoms() {
        result.add_atom(Atom {
            hydrogen_count: 0,
            ..mol.atom(idx).clone()
        });
    }
    for edge in mol.bonds() {
        if let Some((a, b)) = mol.bond_endpoints(edge) {
            result.add_bond(a, b, mol.bond(edge).clone());
        }
    }

    let mut first_h: Vec<Option<NodeIndex>> = vec![None; mol.atom_count()];
    for parent in mol.atoms() {
        for _ in 0..mol.atom(parent).hydrogen_count {
            let h = result.add_atom(Atom {
                no_implicit: true,
                ..Atom::new(1)
            });
            result.add_bond(parent, h, Bond::new(BondOrder::Single));
            first_h[parent.index()].get_or_insert(h);
        }
    }

    for center in mol.atoms() {
        if mol.atom(center).chirality == Chirality::None {
            continue;
        }
        let old_ref: Vec<Option<NodeIndex>> = mol
            .chiral_reference(center)
            .into_iter()
            .map(|r| r.or(first_h[center.index()]))
            .collect();
        let even = permutation_parity(&old_ref, &result.chiral_reference(center));
        let atom = result.atom_mut(center);
        atom.chirality = atom.chirality.with_parity(even);
    }

    debug!(
        atoms = mol.atom_count(),
        added = result.atom_count() - mol.atom_count(),
        "added explicit hydrogens"
    );
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveHsOptions {
    /// Run [`sanitize`] on the result.
    pub sanitize: bool,
}

impl Default for RemoveHsOptions {
    fn default() -> Self {
        Self { sanitize: true }
    }
}

pub fn remove_hs(mol: &Mol<Atom, Bond>) -> Result<Mol<Atom, Bond>, MolError> {
    remove_hs_with(mol, &RemoveHsOptions::default())
}

/// Whether the hydrogen node at `idx` may be folded into its neighbour's
/// hydrogen count. Kept are hydrogens that
/// - have no neighbours,
/// - have two or more neighbours,
/// - are bonded only to another hydrogen,
/// - are bonded to a dummy atom,
/// - carry an isotope label,
/// - serve as reference atom of double-bond stereo.
pub fn is_removable_hydrogen(mol: &Mol<Atom, Bond>, idx: NodeIndex, stereo_refs: &[bool]) -> bool {
    let atom = mol.atom(idx);
    if !atom.is_hydrogen() || atom.isotope != 0 || stereo_refs[idx.index()] {
        return false;
    }
    let mut neighbors = mol.neighbors(idx);
    let (Some(parent), None) = (neighbors.next(), neighbors.next()) else {
        return false;
    };
    !matches!(mol.atom(parent).atomic_num, 0 | 1)
}

/// Fold removable hydrogen nodes into their neighbours' hydrogen counts.
///
/// Returns a new graph; the input is not modified. Bond order, atom order
/// of the survivors and all stereo configurations are preserved.
pub fn remove_hs_with(
    mol: &Mol<Atom, Bond>,
    opts: &RemoveHsOptions,
) -> Result<Mol<Atom, Bond>, MolError> {
    let node_count = mol.atom_count();
    let stereo_refs = stereo_referenced_atoms(mol);

    let mut removable = vec![false; node_count];
    let mut extra_h: Vec<u8> = vec![0; node_count];
    for idx in mol.atoms() {
        if is_removable_hydrogen(mol, idx, &stereo_refs) {
            removable[idx.index()] = true;
            if let Some(parent) = mol.neighbors(idx).next() {
                let count = &mut extra_h[parent.index()];
                *count = count.checked_add(1).ok_or(StructureError::HydrogenCountOverflow {
                    index: parent.index(),
                })?;
            }
        }
    }

    let mut result = Mol::new();
    let mut index_map: Vec<Option<NodeIndex>> = vec![None; node_count];
    for idx in mol.atoms() {
        if removable[idx.index()] {
            continue;
        }
        let atom = mol.atom(idx);
        let hydrogen_count = atom
            .hydrogen_count
            .checked_add(extra_h[idx.index()])
            .ok_or(StructureError::HydrogenCountOverflow { index: idx.index() })?;
        let new_idx = result.add_atom(Atom {
            hydrogen_count,
            ..atom.clone()
        });
        index_map[idx.index()] = Some(new_idx);
    }

    for edge in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(edge) else {
            continue;
        };
        if let (Some(new_a), Some(new_b)) = (index_map[a.index()], index_map[b.index()]) {
            let mut bond = mol.bond(edge).clone();
            if let Some((ra, rb)) = bond.stereo.refs() {
                bond.stereo = match (index_map[ra.index()], index_map[rb.index()]) {
                    (Some(ra), Some(rb)) => bond.stereo.with_refs(ra, rb),
                    _ => crate::bond::BondStereo::None,
                };
            }
            result.add_bond(new_a, new_b, bond);
        }
    }

    for center in mol.atoms() {
        let Some(new_center) = index_map[center.index()] else {
            continue;
        };
        if mol.atom(center).chirality == Chirality::None {
            continue;
        }
        let old_ref: Vec<Option<NodeIndex>> = mol
            .chiral_reference(center)
            .into_iter()
            .map(|r| r.and_then(|x| index_map[x.index()]))
            .collect();
        let even = permutation_parity(&old_ref, &result.chiral_reference(new_center));
        let atom = result.atom_mut(new_center);
        atom.chirality = atom.chirality.with_parity(even);
    }

    debug!(
        removed = node_count - result.atom_count(),
        kept = result.atom_count(),
        "removed hydrogens"
    );

    if opts.sanitize {
        sanitize(&mut result)?;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondStereo;
    use crate::smiles::{parse_smiles, to_smiles};

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    const RAW: RemoveHsOptions = RemoveHsOptions { sanitize: false };

    #[test]
    fn add_hs_methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom(n(0)).hydrogen_count, 4);

        let explicit = add_hs(&mol);
        assert_eq!(explicit.atom_count(), 5);
        assert_eq!(explicit.bond_count(), 4);
        assert_eq!(explicit.atom(n(0)).hydrogen_count, 0);
        for i in 1..5 {
            assert!(explicit.atom(n(i)).is_hydrogen());
        }
    }

    #[test]
    fn add_hs_then_remove_hs_round_trip() {
        let mol = parse_smiles("CCO").unwrap();
        let explicit = add_hs(&mol);
        assert_eq!(explicit.atom_count(), 9);
        let back = remove_hs_with(&explicit, &RAW).unwrap();
        assert_eq!(back.atom_count(), 3);
        let counts: Vec<u8> = back.atoms().map(|v| back.atom(v).hydrogen_count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn metals_get_no_hydrogens() {
        let mol = parse_smiles("[Fe]").unwrap();
        assert_eq!(add_hs(&mol).atom_count(), 1);
    }

    #[test]
    fn chirality_survives_add_and_remove() {
        for smiles in ["N[C@@H](C)C(=O)O", "N[C@H](C)C(=O)O", "F[C@](Cl)(Br)I"] {
            let mol = parse_smiles(smiles).unwrap();
            let explicit = add_hs(&mol);
            let back = remove_hs_with(&explicit, &RAW).unwrap();
            assert_eq!(to_smiles(&back), to_smiles(&mol), "{smiles}");
        }
    }

    #[test]
    fn add_hs_moves_implicit_h_to_last_reference_slot() {
        let mol = parse_smiles("N[C@@H](C)C(=O)O").unwrap();
        let explicit = add_hs(&mol);
        // implicit H was first in the reference order; its node comes last
        // among four neighbours, an odd permutation
        assert_eq!(
            explicit.atom(n(1)).chirality,
            mol.atom(n(1)).chirality.inverted()
        );
    }

    #[test]
    fn six_exceptions_are_kept() {
        // isotopic H, H2, bare H, bridging H, H on a dummy atom
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let c = mol.add_atom(Atom::new(6));
        let d = mol.add_atom(Atom {
            isotope: 2,
            ..Atom::new(1)
        });
        mol.add_bond(c, d, Bond::new(BondOrder::Single));
        let h1 = mol.add_atom(Atom::new(1));
        let h2 = mol.add_atom(Atom::new(1));
        mol.add_bond(h1, h2, Bond::new(BondOrder::Single));
        mol.add_atom(Atom::new(1));
        let b1 = mol.add_atom(Atom::new(5));
        let b2 = mol.add_atom(Atom::new(5));
        let bridge = mol.add_atom(Atom::new(1));
        mol.add_bond(b1, bridge, Bond::new(BondOrder::Single));
        mol.add_bond(b2, bridge, Bond::new(BondOrder::Single));
        let dummy = mol.add_atom(Atom::new(0));
        let hd = mol.add_atom(Atom::new(1));
        mol.add_bond(dummy, hd, Bond::new(BondOrder::Single));
        let plain = mol.add_atom(Atom::new(1));
        mol.add_bond(c, plain, Bond::new(BondOrder::Single));

        let stripped = remove_hs_with(&mol, &RAW).unwrap();
        assert_eq!(stripped.atom_count(), mol.atom_count() - 1);
        assert_eq!(stripped.atom(n(0)).hydrogen_count, 1);
        let hydrogens = stripped
            .atoms()
            .filter(|&v| stripped.atom(v).is_hydrogen())
            .count();
        assert_eq!(hydrogens, 6);
    }

    #[test]
    fn stereo_reference_hydrogen_is_kept() {
        // [H]/C(F)=C/F with the explicit H as reference on the left
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let h = mol.add_atom(Atom::new(1));
        let c1 = mol.add_atom(Atom::new(6));
        let f1 = mol.add_atom(Atom::new(9));
        let c2 = mol.add_atom(Atom::new(6));
        let f2 = mol.add_atom(Atom::new(9));
        mol.add_bond(h, c1, Bond::new(BondOrder::Single));
        mol.add_bond(c1, f1, Bond::new(BondOrder::Single));
        let db = mol.add_bond(c1, c2, Bond::new(BondOrder::Double));
        mol.add_bond(c2, f2, Bond::new(BondOrder::Single));
        mol.bond_mut(db).stereo = BondStereo::Trans(h, f2);

        let stripped = remove_hs_with(&mol, &RAW).unwrap();
        assert_eq!(stripped.atom_count(), 5);
        let db = stripped.bond_between(n(1), n(3)).unwrap();
        assert_eq!(stripped.bond(db).stereo, BondStereo::Trans(n(0), n(4)));
    }

    #[test]
    fn double_bond_refs_remapped_after_removal() {
        let mol = parse_smiles("F/C=C/F").unwrap();
        let explicit = add_hs(&mol);
        let back = remove_hs_with(&explicit, &RAW).unwrap();
        let db = back.bond_between(n(1), n(2)).unwrap();
        assert_eq!(back.bond(db).stereo, mol.bond(db).stereo);
    }

    #[test]
    fn hydrogen_count_overflow_is_an_error() {
        let mut mol: Mol<Atom, Bond> = Mol::new();
        let c = mol.add_atom(Atom {
            hydrogen_count: 255,
            no_implicit: true,
            ..Atom::new(6)
        });
        let h = mol.add_atom(Atom::new(1));
        mol.add_bond(c, h, Bond::new(BondOrder::Single));
        assert_eq!(
            remove_hs_with(&mol, &RAW),
            Err(MolError::MalformedStructure(
                StructureError::HydrogenCountOverflow { index: 0 }
            ))
        );

        let mut mol: Mol<Atom, Bond> = Mol::new();
        let c = mol.add_atom(Atom::new(6));
        for _ in 0..256 {
            let h = mol.add_atom(Atom::new(1));
            mol.add_bond(c, h, Bond::new(BondOrder::Single));
        }
        assert_eq!(
            remove_hs_with(&mol, &RAW),
            Err(MolError::MalformedStructure(
                StructureError::HydrogenCountOverflow { index: 0 }
            ))
        );
    }

    #[test]
    fn sanitizing_removal_perceives_aromaticity() {
        let mol = parse_smiles("C1=CC=CC=C1").unwrap();
        let explicit = add_hs(&mol);
        let stripped = remove_hs(&explicit).unwrap();
        assert_eq!(stripped.atom_count(), 6);
        assert!(stripped.atoms().all(|v| stripped.atom(v).is_aromatic));
        assert!(stripped
            .atoms()
            .all(|v| stripped.atom(v).hydrogen_count == 1));
    }

    #[test]
    fn empty_molecule() {
        let mol: Mol<Atom, Bond> = Mol::new();
        assert_eq!(add_hs(&mol).atom_count(), 0);
        assert_eq!(remove_hs(&mol).unwrap().atom_count(), 0);
    }
}
