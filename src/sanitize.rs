//! Chemistry validity pass run after graph construction.

use petgraph::graph::NodeIndex;
use tracing::{debug, warn};

use crate::aromaticity::set_aromaticity;
use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::error::{MolError, StructureError};
use crate::hydrogen::{remove_hs_with, RemoveHsOptions};
use crate::kekulize::kekulize;
use crate::mol::Mol;
use crate::radical::assign_radicals;
use crate::rings::RingInfo;
use crate::valence::{assign_implicit_hydrogens, check_valence, estimate_aromatic_hydrogens};

/// Validate and normalize `mol` in place.
///
/// Aromatic bonds are kekulized, implicit hydrogens recomputed and
/// checked against the allowed valences, radicals inferred on atoms with
/// authoritative hydrogen counts, and aromaticity perceived again on the
/// symmetrized SSSR. On error `mol` is left as it was.
pub fn sanitize(mol: &mut Mol<Atom, Bond>) -> Result<(), StructureError> {
    let mut work = mol.clone();
    if let Err(e) = run(&mut work) {
        warn!(error = %e, atoms = mol.atom_count(), "sanitization failed");
        return Err(e);
    }
    *mol = work;
    Ok(())
}

/// Copy of `mol` ready for output. With `remove_h` hydrogens are folded
/// (sanitizing as part of the removal when asked); otherwise the copy is
/// only sanitized when `sanitize_mol` is set.
pub fn prepare_output_mol(
    mol: &Mol<Atom, Bond>,
    remove_h: bool,
    sanitize_mol: bool,
) -> Result<Mol<Atom, Bond>, MolError> {
    if remove_h {
        return remove_hs_with(
            mol,
            &RemoveHsOptions {
                sanitize: sanitize_mol,
            },
        );
    }
    let mut out = mol.clone();
    if sanitize_mol {
        sanitize(&mut out)?;
    }
    Ok(out)
}

fn run(mol: &mut Mol<Atom, Bond>) -> Result<(), StructureError> {
    let nodes: Vec<NodeIndex> = mol.atoms().collect();
    for &v in &nodes {
        let touches_aromatic = mol
            .bonds_of(v)
            .any(|e| mol.bond(e).order == BondOrder::Aromatic);
        mol.atom_mut(v).is_aromatic = touches_aromatic;
    }
    estimate_aromatic_hydrogens(mol);
    kekulize(mol, true)?;

    assign_implicit_hydrogens(mol)?;
    check_valence(mol)?;
    assign_radicals(mol);

    let rings = RingInfo::symmetrized_sssr(mol);
    set_aromaticity(mol, &rings);
    debug!(
        atoms = mol.atom_count(),
        bonds = mol.bond_count(),
        rings = rings.num_rings(),
        aromatic = nodes.iter().filter(|&&v| mol.atom(v).is_aromatic).count(),
        "sanitized"
    );
    Ok(())
}
