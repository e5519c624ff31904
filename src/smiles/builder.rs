use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::mol::{permutation_parity, Mol};
use crate::radical::radical_electrons_for;
use crate::smiles::parse_tree::{ParseBond, ParseTree};
use crate::smiles::tokenizer::{BondToken, ChiralityToken};
use crate::valence::{explicit_valence, implicit_hydrogens};

pub fn build_mol(tree: &ParseTree) -> Mol<Atom, Bond> {
    let mut mol = Mol::new();
    for parse_atom in &tree.atoms {
        mol.add_atom(Atom {
            atomic_num: parse_atom.element.atomic_num(),
            isotope: parse_atom.isotope,
            formal_charge: parse_atom.charge,
            map_number: parse_atom.atom_class,
            hydrogen_count: parse_atom.hcount.unwrap_or(0),
            no_implicit: parse_atom.is_bracket,
            is_aromatic: parse_atom.is_aromatic,
            ..Atom::default()
        });
    }

    for pb in &tree.bonds {
        let order = resolve_bond_order(
            pb.bond,
            tree.atoms[pb.begin].is_aromatic,
            tree.atoms[pb.end].is_aromatic,
        );
        mol.add_bond(
            NodeIndex::new(pb.begin),
            NodeIndex::new(pb.end),
            Bond::new(order),
        );
    }

    resolve_hydrogen_counts(&mut mol, tree);
    resolve_chirality(&mut mol, tree);
    resolve_double_bond_stereo(&mut mol, tree);
    mol
}

fn resolve_bond_order(bond_tok: Option<BondToken>, from_aromatic: bool, to_aromatic: bool) -> BondOrder {
    match bond_tok {
        Some(BondToken::Double) => BondOrder::Double,
        Some(BondToken::Triple) => BondOrder::Triple,
        Some(BondToken::Quadruple) => BondOrder::Quadruple,
        Some(BondToken::Aromatic) => BondOrder::Aromatic,
        Some(BondToken::Single | BondToken::Up | BondToken::Down) => BondOrder::Single,
        None if from_aromatic && to_aromatic => BondOrder::Aromatic,
        None => BondOrder::Single,
    }
}

/// Organic-subset atoms get the hydrogens that fill their lowest fitting
/// valence, less one for the pi bond an aromatic atom takes. Bracket atoms
/// keep their written count and get radicals for any unfilled valence.
fn resolve_hydrogen_counts(mol: &mut Mol<Atom, Bond>, tree: &ParseTree) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let idx = NodeIndex::new(i);
        let used = explicit_valence(mol, idx);
        let atom = mol.atom(idx);
        if parse_atom.is_bracket {
            if !atom.is_aromatic {
                let radicals = radical_electrons_for(
                    atom.atomic_num,
                    atom.formal_charge,
                    used + atom.hydrogen_count,
                    mol.degree(idx),
                );
                mol.atom_mut(idx).num_radical_electrons = radicals;
            }
            continue;
        }
        let h = implicit_hydrogens(atom.atomic_num, 0, used).unwrap_or(0);
        mol.atom_mut(idx).hydrogen_count = if atom.is_aromatic {
            h.saturating_sub(1)
        } else {
            h
        };
    }
}

/// `@`/`@@` describe the written neighbour order: predecessor, bracket
/// hydrogen, ring closures and branches as they appear. Stored tags are
/// relative to [`Mol::chiral_reference`].
fn resolve_chirality(mol: &mut Mol<Atom, Bond>, tree: &ParseTree) {
    for (i, parse_atom) in tree.atoms.iter().enumerate() {
        let tag = match parse_atom.chirality {
            ChiralityToken::None => continue,
            ChiralityToken::CounterClockwise => Chirality::Ccw,
            ChiralityToken::Clockwise => Chirality::Cw,
        };
        let mut written: Vec<Option<NodeIndex>> = parse_atom
            .neighbors
            .iter()
            .map(|n| Some(NodeIndex::new(n.atom_idx)))
            .collect();
        if parse_atom.hcount.unwrap_or(0) > 0 {
            let at = usize::from(parse_atom.has_predecessor).min(written.len());
            written.insert(at, None);
        }
        let idx = NodeIndex::new(i);
        let even = permutation_parity(&written, &mol.chiral_reference(idx));
        mol.atom_mut(idx).chirality = tag.with_parity(even);
    }
}

/// Side of `neighbor` relative to the double-bond atom `atom`, as `true`
/// for up. `a/b` puts `b` above `a`, so the position flips when the symbol
/// was written from the neighbour's side.
fn directional_side(bond: &ParseBond, atom: usize) -> Option<bool> {
    let up = match bond.bond? {
        BondToken::Up => true,
        BondToken::Down => false,
        _ => return None,
    };
    Some(if bond.written_from == atom { up } else { !up })
}

fn stereo_reference(tree: &ParseTree, atom: usize, partner: usize) -> Option<(usize, bool)> {
    tree.atoms[atom]
        .neighbors
        .iter()
        .filter(|n| n.atom_idx != partner)
        .find_map(|n| {
            directional_side(&tree.bonds[n.bond_idx], atom).map(|side| (n.atom_idx, side))
        })
}

fn resolve_double_bond_stereo(mol: &mut Mol<Atom, Bond>, tree: &ParseTree) {
    for (bond_idx, pb) in tree.bonds.iter().enumerate() {
        let edge = petgraph::graph::EdgeIndex::new(bond_idx);
        if mol.bond(edge).order != BondOrder::Double {
            continue;
        }
        let (Some((ref_begin, side_begin)), Some((ref_end, side_end))) = (
            stereo_reference(tree, pb.begin, pb.end),
            stereo_reference(tree, pb.end, pb.begin),
        ) else {
            continue;
        };
        let (a, b) = (NodeIndex::new(ref_begin), NodeIndex::new(ref_end));
        mol.bond_mut(edge).stereo = if side_begin == side_end {
            BondStereo::Cis(a, b)
        } else {
            BondStereo::Trans(a, b)
        };
    }
}
