//! Crate-level error types.
//!
//! Every fallible public operation returns [`MolError`]. Component errors
//! convert into it with `?`.

use thiserror::Error;

use crate::graph_ops::RenumberError;
use crate::kekulize::KekulizeError;
use crate::smiles::SmilesError;
use crate::valence::ValenceError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MolError {
    /// A dynamically typed input was neither a molecule graph nor an
    /// OpenBabel-style molecule.
    #[error("expected a molecule graph or an OpenBabel-style molecule, got {type_name}")]
    InvalidInputType { type_name: &'static str },
    /// The structure violates a graph or chemistry invariant.
    #[error("malformed structure: {0}")]
    MalformedStructure(#[from] StructureError),
    /// A bond order with no counterpart in the closed bond-order set.
    #[error("unknown bond order {0}")]
    UnknownBondOrder(String),
    #[error("failed to parse SMILES: {0}")]
    ParseFailure(#[from] SmilesError),
}

/// Why a structure was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructureError {
    #[error("atom {index} has atomic number 0")]
    InvalidAtomicNumber { index: usize },
    #[error("bond {begin}-{end} references an atom outside 0..{atom_count}")]
    BondOutOfRange {
        begin: usize,
        end: usize,
        atom_count: usize,
    },
    #[error("bond joins atom {0} to itself")]
    SelfBond(usize),
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
    /// Folding hydrogens would push an atom's count past 255.
    #[error("hydrogen count of atom {index} overflows")]
    HydrogenCountOverflow { index: usize },
    #[error(transparent)]
    Valence(#[from] ValenceError),
    #[error(transparent)]
    Kekulize(#[from] KekulizeError),
    #[error(transparent)]
    Renumber(#[from] RenumberError),
}

impl From<ValenceError> for MolError {
    fn from(e: ValenceError) -> Self {
        Self::MalformedStructure(e.into())
    }
}

impl From<KekulizeError> for MolError {
    fn from(e: KekulizeError) -> Self {
        Self::MalformedStructure(e.into())
    }
}

impl From<RenumberError> for MolError {
    fn from(e: RenumberError) -> Self {
        Self::MalformedStructure(e.into())
    }
}
