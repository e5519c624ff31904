use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::error::{MolError, StructureError};
use crate::mol::Mol;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasIsotope {
    fn isotope(&self) -> u16;
}

pub trait HasChirality {
    fn chirality(&self) -> Chirality;
}

pub trait HasHydrogenCount {
    fn hydrogen_count(&self) -> u8;
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasRadicalElectrons {
    fn num_radical_electrons(&self) -> u8;
}

pub trait HasMapNumber {
    fn map_number(&self) -> u32;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}

pub trait HasBondStereo {
    fn bond_stereo(&self) -> BondStereo;
}

/// Index-based editing and query surface of a molecule graph.
///
/// Implemented by [`Mol<Atom, Bond>`] and by wrappers that own one, so
/// callers can work with either without unwrapping. Atom and bond indices
/// are 0-based positions; `add_atom` and `add_bond` validate their input.
pub trait MolGraph {
    fn num_atoms(&self) -> usize;
    fn num_bonds(&self) -> usize;
    fn atom_at(&self, idx: usize) -> Option<&Atom>;
    fn atom_at_mut(&mut self, idx: usize) -> Option<&mut Atom>;
    fn bond_at(&self, idx: usize) -> Option<&Bond>;
    /// Endpoints of the bond at `idx`.
    fn bond_atoms(&self, idx: usize) -> Option<(usize, usize)>;
    fn bond_between_atoms(&self, a: usize, b: usize) -> Option<&Bond>;
    fn atom_neighbors(&self, idx: usize) -> Vec<usize>;
    fn try_add_atom(&mut self, atom: Atom) -> Result<usize, MolError>;
    fn try_add_bond(&mut self, begin: usize, end: usize, order: BondOrder)
        -> Result<usize, MolError>;
}

impl MolGraph for Mol<Atom, Bond> {
    fn num_atoms(&self) -> usize {
        self.atom_count()
    }

    fn num_bonds(&self) -> usize {
        self.bond_count()
    }

    fn atom_at(&self, idx: usize) -> Option<&Atom> {
        (idx < self.atom_count()).then(|| self.atom(NodeIndex::new(idx)))
    }

    fn atom_at_mut(&mut self, idx: usize) -> Option<&mut Atom> {
        if idx < self.atom_count() {
            Some(self.atom_mut(NodeIndex::new(idx)))
        } else {
            None
        }
    }

    fn bond_at(&self, idx: usize) -> Option<&Bond> {
        self.graph().edge_weight(petgraph::graph::EdgeIndex::new(idx))
    }

    fn bond_atoms(&self, idx: usize) -> Option<(usize, usize)> {
        self.bond_endpoints(petgraph::graph::EdgeIndex::new(idx))
            .map(|(a, b)| (a.index(), b.index()))
    }

    fn bond_between_atoms(&self, a: usize, b: usize) -> Option<&Bond> {
        if a >= self.atom_count() || b >= self.atom_count() {
            return None;
        }
        self.bond_between(NodeIndex::new(a), NodeIndex::new(b))
            .map(|e| self.bond(e))
    }

    fn atom_neighbors(&self, idx: usize) -> Vec<usize> {
        if idx >= self.atom_count() {
            return Vec::new();
        }
        self.sorted_neighbors(NodeIndex::new(idx))
            .into_iter()
            .map(|n| n.index())
            .collect()
    }

    fn try_add_atom(&mut self, atom: Atom) -> Result<usize, MolError> {
        if atom.atomic_num == 0 {
            return Err(StructureError::InvalidAtomicNumber {
                index: self.atom_count(),
            }
            .into());
        }
        Ok(self.add_atom(atom).index())
    }

    fn try_add_bond(
        &mut self,
        begin: usize,
        end: usize,
        order: BondOrder,
    ) -> Result<usize, MolError> {
        let atom_count = self.atom_count();
        if begin >= atom_count || end >= atom_count {
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
        let (a, b) = (NodeIndex::new(begin), NodeIndex::new(end));
        if self.bond_between(a, b).is_some() {
            return Err(StructureError::DuplicateBond(begin, end).into());
        }
        Ok(self.add_bond(a, b, Bond::new(order)).index())
    }
}
