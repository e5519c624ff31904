pub mod aromaticity;
pub mod atom;
pub mod bond;
pub mod bridge;
pub mod builder;
pub mod canonical;
pub mod element;
pub mod error;
pub mod graph_ops;
pub mod hydrogen;
pub mod kekulize;
pub mod mol;
pub mod obmol;
pub mod options;
pub mod radical;
pub mod rdmol;
pub mod rings;
pub mod sanitize;
pub mod smiles;
pub mod traits;
pub mod valence;

pub use atom::{Atom, Chirality};
pub use bond::{Bond, BondOrder, BondStereo, AROMATIC_EXTERNAL_CODE};
pub use bridge::{mol_to_obmol, obmol_to_mol};
pub use builder::{build_graph, AtomRecord, BondRecord, MolSource, SourceRecords};
pub use canonical::canonical_ordering;
pub use element::Element;
pub use error::{MolError, StructureError};
pub use graph_ops::{connected_components, renumber_atoms, RenumberError};
pub use hydrogen::{add_hs, remove_hs, remove_hs_with, RemoveHsOptions};
pub use kekulize::{kekulize, KekulizeError};
pub use mol::Mol;
pub use obmol::{ObAtom, ObBond, ObMol};
pub use options::{BuildOptions, SmilesWriteOptions};
pub use rdmol::RdMol;
pub use rings::RingInfo;
pub use sanitize::{prepare_output_mol, sanitize};
pub use smiles::{parse_smiles, to_canonical_smiles, to_smiles, write_smiles, SmilesError};
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasBondStereo, HasChirality, HasFormalCharge,
    HasHydrogenCount, HasIsotope, HasMapNumber, HasRadicalElectrons, MolGraph,
};
pub use valence::ValenceError;
