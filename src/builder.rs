//! Graph construction from per-atom and per-bond records.
//!
//! Any representation that can list its atoms and bonds implements
//! [`MolSource`]; [`build_graph`] turns it into a validated
//! [`Mol<Atom, Bond>`] and applies the hydrogen and sanitization
//! post-processing selected by [`BuildOptions`].

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::error::MolError;
use crate::hydrogen::{remove_hs_with, RemoveHsOptions};
use crate::mol::Mol;
use crate::options::BuildOptions;
use crate::sanitize::sanitize;
use crate::traits::MolGraph;

/// Attributes carried per atom between representations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomRecord {
    pub atomic_num: u8,
    /// `0` means natural abundance.
    pub isotope: u16,
    pub formal_charge: i8,
    pub num_radical_electrons: u8,
    /// Hydrogens the source attaches implicitly. `None` leaves the count
    /// to the valence model.
    pub implicit_hydrogens: Option<u8>,
}

impl AtomRecord {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }
}

impl From<&Atom> for AtomRecord {
    fn from(atom: &Atom) -> Self {
        Self {
            atomic_num: atom.atomic_num,
            isotope: atom.isotope,
            formal_charge: atom.formal_charge,
            num_radical_electrons: atom.num_radical_electrons,
            implicit_hydrogens: atom.no_implicit.then_some(atom.hydrogen_count),
        }
    }
}

/// A bond between two 0-based atom positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BondRecord {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

/// Something that can enumerate its atoms and bonds as records.
pub trait MolSource {
    fn atom_records(&self) -> Result<Vec<AtomRecord>, MolError>;
    fn bond_records(&self) -> Result<Vec<BondRecord>, MolError>;
}

/// Plain record lists, for callers that already hold the data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRecords {
    pub atoms: Vec<AtomRecord>,
    pub bonds: Vec<BondRecord>,
}

impl MolSource for SourceRecords {
    fn atom_records(&self) -> Result<Vec<AtomRecord>, MolError> {
        Ok(self.atoms.clone())
    }

    fn bond_records(&self) -> Result<Vec<BondRecord>, MolError> {
        Ok(self.bonds.clone())
    }
}

impl MolSource for Mol<Atom, Bond> {
    fn atom_records(&self) -> Result<Vec<AtomRecord>, MolError> {
        Ok(self.atoms().map(|v| AtomRecord::from(self.atom(v))).collect())
    }

    fn bond_records(&self) -> Result<Vec<BondRecord>, MolError> {
        Ok(self
            .bonds()
            .filter_map(|e| {
                let (a, b) = self.bond_endpoints(e)?;
                Some(BondRecord {
                    begin: a.index(),
                    end: b.index(),
                    order: self.bond(e).order,
                })
            })
            .collect())
    }
}

/// Build a molecule graph from `source`.
///
/// Atoms and bonds are copied in source order, so atom `i` of the result
/// is record `i`. Atoms touching an aromatic bond are flagged aromatic.
/// With `opts.remove_h` hydrogen nodes are then folded into their
/// neighbours (see [`is_removable_hydrogen`] for the ones that stay) and
/// the result sanitized when `opts.sanitize` is set; otherwise the graph is
/// only sanitized. Nothing is returned on failure.
///
/// [`is_removable_hydrogen`]: crate::hydrogen::is_removable_hydrogen
pub fn build_graph<S: MolSource + ?Sized>(
    source: &S,
    opts: &BuildOptions,
) -> Result<Mol<Atom, Bond>, MolError> {
    let atoms = source.atom_records()?;
    let bonds = source.bond_records()?;

    let mut mol: Mol<Atom, Bond> = Mol::new();
    for record in &atoms {
        mol.try_add_atom(Atom {
            atomic_num: record.atomic_num,
            isotope: record.isotope,
            formal_charge: record.formal_charge,
            num_radical_electrons: record.num_radical_electrons,
            hydrogen_count: record.implicit_hydrogens.unwrap_or(0),
            no_implicit: record.implicit_hydrogens.is_some(),
            ..Atom::default()
        })?;
    }
    for record in &bonds {
        mol.try_add_bond(record.begin, record.end, record.order)?;
        if record.order == BondOrder::Aromatic {
            mol.atom_mut(NodeIndex::new(record.begin)).is_aromatic = true;
            mol.atom_mut(NodeIndex::new(record.end)).is_aromatic = true;
        }
    }
    debug!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        remove_h = opts.remove_h,
        sanitize = opts.sanitize,
        "built molecule graph"
    );

    if opts.remove_h {
        return remove_hs_with(
            &mol,
            &RemoveHsOptions {
                sanitize: opts.sanitize,
            },
        );
    }
    if opts.sanitize {
        sanitize(&mut mol)?;
    }
    Ok(mol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;

    fn bond(begin: usize, end: usize, order: BondOrder) -> BondRecord {
        BondRecord { begin, end, order }
    }

    fn records(zs: &[u8], bonds: &[BondRecord]) -> SourceRecords {
        SourceRecords {
            atoms: zs.iter().map(|&z| AtomRecord::new(z)).collect(),
            bonds: bonds.to_vec(),
        }
    }

    const RAW: BuildOptions = BuildOptions {
        remove_h: false,
        sanitize: false,
    };

    #[test]
    fn copies_atoms_and_bonds_in_order() {
        let mut src = records(&[6, 8, 7], &[bond(0, 1, BondOrder::Double), bond(0, 2, BondOrder::Single)]);
        src.atoms[2].isotope = 15;
        src.atoms[1].formal_charge = -1;
        let mol = build_graph(&src, &RAW).unwrap();
        assert_eq!(mol.num_atoms(), 3);
        assert_eq!(mol.atom_at(2).unwrap().isotope, 15);
        assert_eq!(mol.atom_at(1).unwrap().formal_charge, -1);
        assert_eq!(mol.bond_atoms(1), Some((0, 2)));
        assert_eq!(mol.bond_at(0).unwrap().order, BondOrder::Double);
    }

    #[test]
    fn sanitizing_fills_hydrogens() {
        let src = records(&[6, 6], &[bond(0, 1, BondOrder::Single)]);
        let mol = build_graph(&src, &BuildOptions::default()).unwrap();
        assert_eq!(mol.atom_at(0).unwrap().hydrogen_count, 3);
        assert_eq!(mol.atom_at(1).unwrap().hydrogen_count, 3);
    }

    #[test]
    fn carried_hydrogen_counts_are_kept() {
        let mut src = records(&[6], &[]);
        src.atoms[0].implicit_hydrogens = Some(3);
        let mol = build_graph(&src, &BuildOptions::default()).unwrap();
        let atom = mol.atom_at(0).unwrap();
        assert_eq!(atom.hydrogen_count, 3);
        assert_eq!(atom.num_radical_electrons, 1);
    }

    #[test]
    fn aromatic_ring_from_records() {
        let ring: Vec<BondRecord> = (0..6).map(|i| bond(i, (i + 1) % 6, BondOrder::Aromatic)).collect();
        let src = records(&[6; 6], &ring);
        let mol = build_graph(&src, &BuildOptions::default()).unwrap();
        assert!(mol.atoms().all(|v| mol.atom(v).is_aromatic));
        assert!(mol.atoms().all(|v| mol.atom(v).hydrogen_count == 1));
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
    }

    #[test]
    fn hydrogens_removed_on_request() {
        // H-C-H plus an isolated H2
        let src = records(
            &[6, 1, 1, 1, 1],
            &[bond(0, 1, BondOrder::Single), bond(0, 2, BondOrder::Single), bond(3, 4, BondOrder::Single)],
        );
        let opts = BuildOptions {
            remove_h: true,
            sanitize: false,
        };
        let mol = build_graph(&src, &opts).unwrap();
        assert_eq!(mol.num_atoms(), 3);
        assert_eq!(mol.atom_at(0).unwrap().hydrogen_count, 2);
        assert_eq!(mol.atom_at(1).unwrap().atomic_num, 1);
        assert_eq!(mol.bond_atoms(0), Some((1, 2)));
    }

    #[test]
    fn malformed_records_rejected() {
        let src = records(&[6, 0], &[]);
        assert!(matches!(
            build_graph(&src, &RAW),
            Err(MolError::MalformedStructure(StructureError::InvalidAtomicNumber { index: 1 }))
        ));

        let src = records(&[6, 6], &[bond(1, 1, BondOrder::Single)]);
        assert!(matches!(
            build_graph(&src, &RAW),
            Err(MolError::MalformedStructure(StructureError::SelfBond(1)))
        ));

        let src = records(&[6, 6], &[bond(0, 2, BondOrder::Single)]);
        assert!(matches!(
            build_graph(&src, &RAW),
            Err(MolError::MalformedStructure(StructureError::BondOutOfRange { end: 2, .. }))
        ));
    }

    #[test]
    fn carried_hydrogen_count_cannot_overflow_on_removal() {
        let mut src = records(&[6, 1], &[bond(0, 1, BondOrder::Single)]);
        src.atoms[0].implicit_hydrogens = Some(255);
        let opts = BuildOptions {
            remove_h: true,
            sanitize: false,
        };
        assert!(matches!(
            build_graph(&src, &opts),
            Err(MolError::MalformedStructure(StructureError::HydrogenCountOverflow { index: 0 }))
        ));
    }

    #[test]
    fn sanitize_failure_returns_no_graph() {
        let bonds: Vec<BondRecord> = (1..6).map(|i| bond(0, i, BondOrder::Single)).collect();
        let src = records(&[6; 6], &bonds);
        assert!(matches!(
            build_graph(&src, &BuildOptions::default()),
            Err(MolError::MalformedStructure(StructureError::Valence(_)))
        ));
    }

    #[test]
    fn graph_is_its_own_source() {
        let src = records(&[6, 8], &[bond(0, 1, BondOrder::Double)]);
        let mol = build_graph(&src, &BuildOptions::default()).unwrap();
        let again = build_graph(&mol, &BuildOptions::default()).unwrap();
        assert_eq!(again.num_atoms(), 2);
        assert_eq!(again.bond_at(0).unwrap().order, BondOrder::Double);
        assert_eq!(again.atom_at(0).unwrap().hydrogen_count, 2);
    }
}
