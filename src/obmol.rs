//! OpenBabel-style molecule: 1-based atom indices, integer bond orders
//! (`5` for aromatic) and per-atom spin multiplicity.

use tracing::trace;

use crate::bond::AROMATIC_EXTERNAL_CODE;
use crate::error::{MolError, StructureError};
use crate::radical::radical_electrons_for;
use crate::valence::implicit_hydrogens;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObAtom {
    idx: usize,
    pub atomic_num: u8,
    /// `0` means unset.
    pub isotope: u16,
    pub formal_charge: i8,
    /// `0` when unset, `1` singlet, `2` doublet (one unpaired electron),
    /// `3` triplet.
    pub spin_multiplicity: u8,
    /// Implicit hydrogens, when known.
    pub implicit_h_count: Option<u8>,
}

impl ObAtom {
    /// 1-based position in the owning molecule.
    pub fn idx(&self) -> usize {
        self.idx
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObBond {
    begin: usize,
    end: usize,
    /// Integer bond order; `5` marks an aromatic bond.
    pub order: u8,
    pub aromatic: bool,
}

impl ObBond {
    pub fn begin_idx(&self) -> usize {
        self.begin
    }

    pub fn end_idx(&self) -> usize {
        self.end
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObMol {
    atoms: Vec<ObAtom>,
    bonds: Vec<ObBond>,
}

impl ObMol {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an atom and return it for further setup.
    pub fn new_atom(&mut self, atomic_num: u8) -> &mut ObAtom {
        let idx = self.atoms.len() + 1;
        self.atoms.push(ObAtom {
            idx,
            atomic_num,
            ..ObAtom::default()
        });
        let last = self.atoms.len() - 1;
        &mut self.atoms[last]
    }

    /// Bond the atoms at 1-based positions `begin` and `end`. Order `5`
    /// sets the aromatic flag. The order itself is not checked.
    pub fn add_bond(&mut self, begin: usize, end: usize, order: u8) -> Result<(), MolError> {
        self.add_bond_with_aromaticity(begin, end, order, order == AROMATIC_EXTERNAL_CODE)
    }

    pub fn add_bond_with_aromaticity(
        &mut self,
        begin: usize,
        end: usize,
        order: u8,
        aromatic: bool,
    ) -> Result<(), MolError> {
        let atom_count = self.atoms.len();
        if !(1..=atom_count).contains(&begin) || !(1..=atom_count).contains(&end) {
            return Err(StructureError::BondOutOfRange {
                begin,
                end,
                atom_count,
            }
            .into());
        }
        if begin == end {
            return Err(StructureError::SelfBond(begin).into());
        }
        self.bonds.push(ObBond {
            begin,
            end,
            order,
            aromatic,
        });
        Ok(())
    }

    /// Atom at the 1-based position `idx`.
    pub fn atom(&self, idx: usize) -> Option<&ObAtom> {
        self.atoms.get(idx.checked_sub(1)?)
    }

    pub fn atom_mut(&mut self, idx: usize) -> Option<&mut ObAtom> {
        self.atoms.get_mut(idx.checked_sub(1)?)
    }

    pub fn atoms(&self) -> &[ObAtom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[ObBond] {
        &self.bonds
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.len()
    }

    /// Infer spin multiplicities from valence: one unpaired electron gives
    /// a doublet, two or more a triplet, none leaves the atom unset.
    /// Atoms on aromatic bonds are skipped.
    pub fn assign_spin_multiplicity(&mut self) {
        let mut bond_sum = vec![0u8; self.atoms.len()];
        let mut degree = vec![0usize; self.atoms.len()];
        let mut aromatic = vec![false; self.atoms.len()];
        for bond in &self.bonds {
            for i in [bond.begin - 1, bond.end - 1] {
                bond_sum[i] = bond_sum[i].saturating_add(bond.order);
                degree[i] += 1;
                aromatic[i] |= bond.aromatic;
            }
        }

        for (i, atom) in self.atoms.iter_mut().enumerate() {
            if aromatic[i] {
                continue;
            }
            let h = atom.implicit_h_count.unwrap_or_else(|| {
                implicit_hydrogens(atom.atomic_num, atom.formal_charge, bond_sum[i]).unwrap_or(0)
            });
            let radicals = radical_electrons_for(
                atom.atomic_num,
                atom.formal_charge,
                bond_sum[i].saturating_add(h),
                degree[i],
            );
            atom.spin_multiplicity = match radicals {
                0 => 0,
                1 => 2,
                _ => 3,
            };
            trace!(atom = atom.idx, radicals, spin = atom.spin_multiplicity, "spin assigned");
        }
    }
}
