//! Molecule wrapper with cached ring information and positional atom-map
//! numbers.

use std::any::Any;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::bridge::{mol_to_obmol, obmol_to_mol};
use crate::error::MolError;
use crate::graph_ops::renumber_atoms;
use crate::hydrogen::add_hs;
use crate::mol::Mol;
use crate::obmol::ObMol;
use crate::options::{BuildOptions, SmilesWriteOptions};
use crate::rings::RingInfo;
use crate::sanitize::{prepare_output_mol, sanitize};
use crate::smiles::{parse_smiles, write_smiles};
use crate::traits::MolGraph;

/// An owned molecule graph whose atoms carry their index as map number.
///
/// # Examples
///
/// ```
/// use molbridge::{Atom, Bond, BondOrder, Mol, MolGraph, RdMol, SmilesWriteOptions};
///
/// let mut mol: Mol<Atom, Bond> = Mol::new();
/// mol.try_add_atom(Atom::new(6)).unwrap();
/// mol.try_add_atom(Atom::new(6)).unwrap();
/// mol.try_add_bond(0, 1, BondOrder::Single).unwrap();
///
/// let rd = RdMol::new(mol);
/// assert_eq!(rd.atom_at(1).unwrap().map_number, 1);
/// assert_eq!(rd.to_smiles(&SmilesWriteOptions::default()).unwrap(), "CC");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RdMol {
    mol: Mol<Atom, Bond>,
    ring_info: RingInfo,
}

impl RdMol {
    /// Take ownership of `mol`, stamp map numbers and perceive rings.
    pub fn new(mol: Mol<Atom, Bond>) -> Self {
        let ring_info = RingInfo::symmetrized_sssr(&mol);
        let mut rd = Self { mol, ring_info };
        rd.set_atom_map_numbers();
        rd
    }

    pub fn from_mol(mol: &Mol<Atom, Bond>) -> Self {
        Self::new(mol.clone())
    }

    pub fn from_obmol(obmol: &ObMol, opts: &BuildOptions) -> Result<Self, MolError> {
        Ok(Self::new(obmol_to_mol(obmol, opts)?))
    }

    /// Parse `smiles`. Hydrogens become explicit nodes unless `remove_h`
    /// is set; the graph is sanitized when `sanitize_mol` is set.
    pub fn from_smiles(smiles: &str, remove_h: bool, sanitize_mol: bool) -> Result<Self, MolError> {
        let mut mol = parse_smiles(smiles)?;
        if !remove_h {
            mol = add_hs(&mol);
        }
        if sanitize_mol {
            sanitize(&mut mol)?;
        }
        debug!(smiles, atoms = mol.atom_count(), "parsed molecule");
        Ok(Self::new(mol))
    }

    /// Accept a molecule of any supported kind: `RdMol`, `Mol<Atom, Bond>`
    /// or `ObMol` (converted with default [`BuildOptions`]).
    pub fn from_any<T: Any>(input: T) -> Result<Self, MolError> {
        let type_name = std::any::type_name::<T>();
        let boxed: Box<dyn Any> = Box::new(input);
        let boxed = match boxed.downcast::<RdMol>() {
            Ok(rd) => return Ok(*rd),
            Err(other) => other,
        };
        let boxed = match boxed.downcast::<Mol<Atom, Bond>>() {
            Ok(mol) => return Ok(Self::new(*mol)),
            Err(other) => other,
        };
        match boxed.downcast::<ObMol>() {
            Ok(obmol) => Self::from_obmol(&obmol, &BuildOptions::default()),
            Err(_) => Err(MolError::InvalidInputType { type_name }),
        }
    }

    pub fn mol(&self) -> &Mol<Atom, Bond> {
        &self.mol
    }

    pub fn into_mol(self) -> Mol<Atom, Bond> {
        self.mol
    }

    pub fn ring_info(&self) -> &RingInfo {
        &self.ring_info
    }

    pub fn to_obmol(&self) -> Result<ObMol, MolError> {
        mol_to_obmol(&self.mol)
    }

    /// A copy for output; `self` is never modified.
    pub fn prepare_output_mol(&self, remove_h: bool, sanitize_mol: bool) -> Result<Mol<Atom, Bond>, MolError> {
        prepare_output_mol(&self.mol, remove_h, sanitize_mol)
    }

    /// Set every atom's map number to its index.
    pub fn set_atom_map_numbers(&mut self) {
        let nodes: Vec<NodeIndex> = self.mol.atoms().collect();
        for v in nodes {
            self.mol.atom_mut(v).map_number = v.index() as u32;
        }
    }

    pub fn to_smiles(&self, opts: &SmilesWriteOptions) -> Result<String, MolError> {
        write_smiles(&self.mol, opts)
    }

    /// A copy with atom `new_order[i]` at index `i`, map numbers restamped.
    pub fn renumber_atoms(&self, new_order: &[usize]) -> Result<Self, MolError> {
        Ok(Self::new(renumber_atoms(&self.mol, new_order)?))
    }
}

impl From<Mol<Atom, Bond>> for RdMol {
    fn from(mol: Mol<Atom, Bond>) -> Self {
        Self::new(mol)
    }
}

impl MolGraph for RdMol {
    fn num_atoms(&self) -> usize {
        self.mol.num_atoms()
    }

    fn num_bonds(&self) -> usize {
        self.mol.num_bonds()
    }

    fn atom_at(&self, idx: usize) -> Option<&Atom> {
        self.mol.atom_at(idx)
    }

    fn atom_at_mut(&mut self, idx: usize) -> Option<&mut Atom> {
        self.mol.atom_at_mut(idx)
    }

    fn bond_at(&self, idx: usize) -> Option<&Bond> {
        self.mol.bond_at(idx)
    }

    fn bond_atoms(&self, idx: usize) -> Option<(usize, usize)> {
        self.mol.bond_atoms(idx)
    }

    fn bond_between_atoms(&self, a: usize, b: usize) -> Option<&Bond> {
        self.mol.bond_between_atoms(a, b)
    }

    fn atom_neighbors(&self, idx: usize) -> Vec<usize> {
        self.mol.atom_neighbors(idx)
    }

    fn try_add_atom(&mut self, atom: Atom) -> Result<usize, MolError> {
        self.mol.try_add_atom(atom)
    }

    fn try_add_bond(&mut self, begin: usize, end: usize, order: BondOrder) -> Result<usize, MolError> {
        let idx = self.mol.try_add_bond(begin, end, order)?;
        self.ring_info = RingInfo::symmetrized_sssr(&self.mol);
        Ok(idx)
    }
}
