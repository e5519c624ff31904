mod builder;
pub mod error;
mod parse_tree;
mod tokenizer;
mod writer;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
pub use error::SmilesError;
pub use writer::{to_canonical_smiles, to_smiles, write_smiles};

/// Parse a SMILES string into a molecule graph.
///
/// Hydrogens stay implicit: organic-subset atoms get the count that fills
/// their lowest fitting valence, bracket atoms keep the written count.
/// Aromatic bonds are kept as written; run
/// [`sanitize`](crate::sanitize::sanitize) to kekulize and check valences.
pub fn parse_smiles(s: &str) -> Result<Mol<Atom, Bond>, SmilesError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tokens = tokenizer::tokenize(trimmed)?;
    if tokens.is_empty() {
        return Err(SmilesError::EmptyInput);
    }
    let tree = parse_tree::build_parse_tree(&tokens)?;
    Ok(builder::build_mol(&tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Chirality;
    use crate::bond::{BondOrder, BondStereo};
    use petgraph::graph::NodeIndex;

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    fn atom(mol: &Mol<Atom, Bond>, i: usize) -> &Atom {
        mol.atom(n(i))
    }

    fn h_counts(smiles: &str) -> Vec<u8> {
        let mol = parse_smiles(smiles).unwrap();
        mol.atoms().map(|v| mol.atom(v).hydrogen_count).collect()
    }

    fn order(mol: &Mol<Atom, Bond>, a: usize, b: usize) -> BondOrder {
        let edge = mol.bond_between(n(a), n(b)).unwrap();
        mol.bond(edge).order
    }

    #[test]
    fn methane() {
        let mol = parse_smiles("C").unwrap();
        assert_eq!(mol.atom_count(), 1);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 0).atomic_num, 6);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
        assert!(!atom(&mol, 0).no_implicit);
    }

    #[test]
    fn organic_subset_hydrogens() {
        assert_eq!(h_counts("CC"), vec![3, 3]);
        assert_eq!(h_counts("C=C"), vec![2, 2]);
        assert_eq!(h_counts("C#C"), vec![1, 1]);
        assert_eq!(h_counts("O"), vec![2]);
        assert_eq!(h_counts("N"), vec![3]);
        assert_eq!(h_counts("Cl"), vec![1]);
        assert_eq!(h_counts("CC(=O)O"), vec![3, 0, 0, 1]);
        assert_eq!(h_counts("CC(C)(C)C"), vec![3, 0, 3, 3, 3]);
        assert_eq!(h_counts("CS(=O)C"), vec![3, 0, 0, 3]);
        assert_eq!(h_counts("P(=O)(O)(O)O"), vec![0, 0, 1, 1, 1]);
        assert_eq!(h_counts("B"), vec![3]);
    }

    #[test]
    fn explicit_bond_orders() {
        let mol = parse_smiles("C-C=C#C").unwrap();
        assert_eq!(order(&mol, 0, 1), BondOrder::Single);
        assert_eq!(order(&mol, 1, 2), BondOrder::Double);
        assert_eq!(order(&mol, 2, 3), BondOrder::Triple);

        let mol = parse_smiles("[Mo]$[Mo]").unwrap();
        assert_eq!(order(&mol, 0, 1), BondOrder::Quadruple);
    }

    #[test]
    fn rings() {
        let mol = parse_smiles("C1CCCCC1").unwrap();
        assert_eq!(mol.bond_count(), 6);
        assert!(mol.atoms().all(|v| mol.atom(v).hydrogen_count == 2));

        let mol = parse_smiles("C%10CC%10").unwrap();
        assert_eq!(mol.bond_count(), 3);

        let mol = parse_smiles("C1CC2C1CC2").unwrap();
        assert_eq!(mol.bond_count(), 7);
    }

    #[test]
    fn aromatic_rings() {
        let mol = parse_smiles("c1ccccc1").unwrap();
        assert!(mol.bonds().all(|e| mol.bond(e).order == BondOrder::Aromatic));
        assert!(mol.atoms().all(|v| mol.atom(v).is_aromatic));
        assert_eq!(h_counts("c1ccccc1"), vec![1; 6]);
        assert_eq!(h_counts("c1ccncc1"), vec![1, 1, 1, 0, 1, 1]);
        assert_eq!(h_counts("o1cccc1"), vec![0, 1, 1, 1, 1]);
        assert_eq!(h_counts("[nH]1cccc1"), vec![1, 1, 1, 1, 1]);

        // a single bond written between aromatic atoms stays single
        let mol = parse_smiles("c1ccccc1-c1ccccc1").unwrap();
        assert_eq!(order(&mol, 5, 6), BondOrder::Single);
    }

    #[test]
    fn bracket_atoms() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(atom(&mol, 0).formal_charge, 1);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);
        assert!(atom(&mol, 0).no_implicit);
        assert_eq!(atom(&mol, 0).num_radical_electrons, 0);

        let mol = parse_smiles("[13CH4]").unwrap();
        assert_eq!(atom(&mol, 0).isotope, 13);
        assert_eq!(atom(&mol, 0).hydrogen_count, 4);

        let mol = parse_smiles("[2H]").unwrap();
        assert_eq!(atom(&mol, 0).atomic_num, 1);
        assert_eq!(atom(&mol, 0).isotope, 2);

        let mol = parse_smiles("[Na+].[Cl-]").unwrap();
        assert_eq!(mol.atom_count(), 2);
        assert_eq!(mol.bond_count(), 0);
        assert_eq!(atom(&mol, 1).formal_charge, -1);
    }

    #[test]
    fn bracket_radicals() {
        let mol = parse_smiles("[CH3]").unwrap();
        assert_eq!(atom(&mol, 0).num_radical_electrons, 1);
        let mol = parse_smiles("C[O]").unwrap();
        assert_eq!(atom(&mol, 1).num_radical_electrons, 1);
        assert_eq!(atom(&mol, 0).num_radical_electrons, 0);
        let mol = parse_smiles("[CH2]").unwrap();
        assert_eq!(atom(&mol, 0).num_radical_electrons, 2);
    }

    #[test]
    fn map_numbers_from_atom_class() {
        let mol = parse_smiles("[CH3:4]C").unwrap();
        assert_eq!(atom(&mol, 0).map_number, 4);
        assert_eq!(atom(&mol, 1).map_number, 0);
    }

    #[test]
    fn tetrahedral_tags_against_reference_order() {
        let mol = parse_smiles("[C@](F)(Cl)(Br)I").unwrap();
        assert_eq!(atom(&mol, 0).chirality, Chirality::Ccw);
        let mol = parse_smiles("[C@@](F)(Cl)(Br)I").unwrap();
        assert_eq!(atom(&mol, 0).chirality, Chirality::Cw);

        // hydrogen written first matches the reference order
        let mol = parse_smiles("[C@@H](F)(Cl)Br").unwrap();
        assert_eq!(atom(&mol, 0).chirality, Chirality::Cw);

        // predecessor before the hydrogen: one swap from the reference
        let mol = parse_smiles("F[C@H](Cl)Br").unwrap();
        assert_eq!(atom(&mol, 1).chirality, Chirality::Cw);

        // ring closure neighbour sits where its digit appears
        let mol = parse_smiles("F[C@]1(Cl)CC1").unwrap();
        assert_eq!(mol.chiral_reference(n(1)), vec![Some(n(0)), Some(n(2)), Some(n(3)), Some(n(4))]);
        // written: F, C4, Cl, C3 against reference F, Cl, C3, C4
        assert_eq!(atom(&mol, 1).chirality, Chirality::Ccw);
    }

    #[test]
    fn double_bond_configuration() {
        let trans = parse_smiles("F/C=C/F").unwrap();
        assert_eq!(trans.bond(order_edge(&trans, 1, 2)).stereo, BondStereo::Trans(n(0), n(3)));

        let cis = parse_smiles("F/C=C\\F").unwrap();
        assert_eq!(cis.bond(order_edge(&cis, 1, 2)).stereo, BondStereo::Cis(n(0), n(3)));

        // symbol written inside a branch, from the double-bond atom
        let cis = parse_smiles("C(/F)=C/F").unwrap();
        assert_eq!(cis.bond(order_edge(&cis, 0, 2)).stereo, BondStereo::Cis(n(1), n(3)));

        // only one side marked: no configuration
        let none = parse_smiles("F/C=CF").unwrap();
        assert_eq!(none.bond(order_edge(&none, 1, 2)).stereo, BondStereo::None);
    }

    fn order_edge(mol: &Mol<Atom, Bond>, a: usize, b: usize) -> petgraph::graph::EdgeIndex {
        mol.bond_between(n(a), n(b)).unwrap()
    }

    #[test]
    fn bigger_molecules() {
        let mol = parse_smiles("Cn1cnc2c1c(=O)n(c(=O)n2C)C").unwrap();
        assert_eq!(mol.atom_count(), 14);
        assert_eq!(mol.bond_count(), 15);

        let mol = parse_smiles("c1ccc2ccccc2c1").unwrap();
        assert_eq!(mol.atom_count(), 10);
        assert_eq!(mol.bond_count(), 11);
    }

    #[test]
    fn surrounding_whitespace_ignored() {
        let mol = parse_smiles("  CCO\n").unwrap();
        assert_eq!(mol.atom_count(), 3);
    }

    #[test]
    fn errors() {
        assert_eq!(parse_smiles(""), Err(SmilesError::EmptyInput));
        assert_eq!(parse_smiles("   "), Err(SmilesError::EmptyInput));
        assert!(parse_smiles("C(C").is_err());
        assert!(parse_smiles("C)C").is_err());
        assert!(parse_smiles("C1CC").is_err());
        assert!(parse_smiles("X").is_err());
        assert!(parse_smiles("[C").is_err());
    }
}
