//! Conversion between the molecule graph and [`ObMol`].
//!
//! The graph numbers atoms from 0, `ObMol` from 1. Bond orders go through
//! [`BondOrder::from_external`] and [`BondOrder::to_external`]; radical
//! electrons travel as spin multiplicity.

use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::builder::{build_graph, AtomRecord, BondRecord, MolSource};
use crate::error::{MolError, StructureError};
use crate::mol::Mol;
use crate::obmol::ObMol;
use crate::options::BuildOptions;

/// Radical electrons implied by a spin multiplicity. Singlets and triplets
/// both become two radical electrons.
fn radicals_from_spin(spin: u8) -> u8 {
    match spin {
        2 => 1,
        1 | 3 => 2,
        _ => 0,
    }
}

impl MolSource for ObMol {
    fn atom_records(&self) -> Result<Vec<AtomRecord>, MolError> {
        Ok(self
            .atoms()
            .iter()
            .map(|a| AtomRecord {
                atomic_num: a.atomic_num,
                isotope: a.isotope,
                formal_charge: a.formal_charge,
                num_radical_electrons: radicals_from_spin(a.spin_multiplicity),
                implicit_hydrogens: a.implicit_h_count,
            })
            .collect())
    }

    fn bond_records(&self) -> Result<Vec<BondRecord>, MolError> {
        let atom_count = self.num_atoms();
        self.bonds()
            .iter()
            .map(|b| {
                let (begin, end) = (b.begin_idx(), b.end_idx());
                let (Some(begin0), Some(end0)) = (begin.checked_sub(1), end.checked_sub(1)) else {
                    return Err(StructureError::BondOutOfRange {
                        begin,
                        end,
                        atom_count,
                    }
                    .into());
                };
                Ok(BondRecord {
                    begin: begin0,
                    end: end0,
                    order: BondOrder::from_external(b.order, b.is_aromatic())?,
                })
            })
            .collect()
    }
}

/// Build a graph from an [`ObMol`]. No atom is dropped during the copy;
/// hydrogen removal and sanitization follow `opts`.
pub fn obmol_to_mol(obmol: &ObMol, opts: &BuildOptions) -> Result<Mol<Atom, Bond>, MolError> {
    let mol = build_graph(obmol, opts)?;
    debug!(
        atoms_in = obmol.num_atoms(),
        bonds_in = obmol.num_bonds(),
        atoms = mol.atom_count(),
        "converted ObMol to graph"
    );
    Ok(mol)
}

/// Copy `mol` into a new [`ObMol`]. Radical electrons are not copied;
/// spin multiplicities are assigned from valence once all bonds exist.
pub fn mol_to_obmol(mol: &Mol<Atom, Bond>) -> Result<ObMol, MolError> {
    let mut obmol = ObMol::new();
    for v in mol.atoms() {
        let atom = mol.atom(v);
        let ob_atom = obmol.new_atom(atom.atomic_num);
        if atom.isotope != 0 {
            ob_atom.isotope = atom.isotope;
        }
        ob_atom.formal_charge = atom.formal_charge;
        ob_atom.implicit_h_count = Some(atom.hydrogen_count);
    }
    for e in mol.bonds() {
        let Some((a, b)) = mol.bond_endpoints(e) else {
            continue;
        };
        obmol.add_bond(a.index() + 1, b.index() + 1, mol.bond(e).order.to_external())?;
    }
    obmol.assign_spin_multiplicity();
    debug!(
        atoms = obmol.num_atoms(),
        bonds = obmol.num_bonds(),
        "converted graph to ObMol"
    );
    Ok(obmol)
}
