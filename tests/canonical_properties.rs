use molbridge::{parse_smiles, renumber_atoms, sanitize, to_canonical_smiles, Atom, Bond, Mol};

fn from_smiles(smiles: &str) -> Result<Mol<Atom, Bond>, molbridge::MolError> {
    let mut mol = parse_smiles(smiles)?;
    sanitize(&mut mol)?;
    Ok(mol)
}

fn canonical(smiles: &str) -> String {
    let mol = from_smiles(smiles).unwrap();
    to_canonical_smiles(&mol)
}

// fragments are ordered by their lowest canonical rank
#[test]
fn fragment_ordering_nacl() {
    let a = canonical("[Na+].[Cl-]");
    let b = canonical("[Cl-].[Na+]");
    assert_eq!(a, b, "fragment ordering: '{a}' vs '{b}'");
}

#[test]
fn fragment_ordering_three() {
    let a = canonical("[Na+].[Cl-].O");
    let b = canonical("O.[Na+].[Cl-]");
    assert_eq!(a, b, "fragment ordering: '{a}' vs '{b}'");
}

// tetrahedral tags survive any input order
#[test]
fn chirality_stability_1() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("F[C@H](Cl)Br");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_2() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("Cl[C@@H](F)Br");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_3() {
    let a = canonical("[C@@H](F)(Cl)Br");
    let b = canonical("Br[C@H](F)Cl");
    assert_eq!(a, b, "chirality stability: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_4() {
    let a = canonical("[C@](F)(Cl)(Br)I");
    let b = canonical("F[C@](Cl)(Br)I");
    assert_eq!(a, b, "chirality stability 4h: '{a}' vs '{b}'");
}

#[test]
fn chirality_stability_alanine() {
    let a = canonical("N[C@@H](C)C(=O)O");
    let b = canonical("[C@H](N)(C)C(=O)O");
    assert_eq!(a, b, "chirality stability alanine: '{a}' vs '{b}'");
}

// double-bond configuration survives renumbering
#[test]
fn ez_renumber_trans() {
    let mol = from_smiles("F/C=C/F").unwrap();
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = renumber_atoms(&mol, &reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber trans: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_cis() {
    let mol = from_smiles(r"F/C=C\F").unwrap();
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = renumber_atoms(&mol, &reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber cis: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_chlorine() {
    let mol = from_smiles("Cl/C=C/Cl").unwrap();
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = renumber_atoms(&mol, &reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber chlorine: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_mixed() {
    let mol = from_smiles(r"F/C=C/[C@@H](Cl)Br").unwrap();
    let n = mol.atom_count();
    let reversed: Vec<usize> = (0..n).rev().collect();
    let renum = renumber_atoms(&mol, &reversed).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber mixed: '{s1}' vs '{s2}'");
}

#[test]
fn ez_renumber_shifted() {
    let mol = from_smiles("F/C=C/F").unwrap();
    let renum = renumber_atoms(&mol, &[1, 2, 3, 0]).unwrap();
    let s1 = to_canonical_smiles(&mol);
    let s2 = to_canonical_smiles(&renum);
    assert_eq!(s1, s2, "E/Z renumber shifted: '{s1}' vs '{s2}'");
}

// aromatic and Kekulé input give the same string
#[test]
fn caffeine_kekule_vs_aromatic() {
    let a = canonical("CN1C=NC2=C1C(=O)N(C(=O)N2C)C");
    let b = canonical("Cn1c(=O)c2c(ncn2C)n(C)c1=O");
    assert_eq!(a, b, "caffeine kekule vs aromatic: '{a}' vs '{b}'");
}

// writing a parsed canonical string reproduces it
#[test]
fn glucose_idempotence() {
    let first = canonical("OC[C@H]1OC(O)[C@H](O)[C@@H](O)[C@@H]1O");
    let second = canonical(&first);
    assert_eq!(first, second, "glucose idempotence: '{first}' vs '{second}'");
}

#[test]
fn caller_graph_not_reordered() {
    let mol = from_smiles("OCC").unwrap();
    let before = mol.clone();
    assert_eq!(to_canonical_smiles(&mol), "CCO");
    assert_eq!(mol, before);
}

#[test]
fn every_rotation_of_a_ring_gives_one_string() {
    let mol = from_smiles("c1ccncc1C(=O)O").unwrap();
    let n = mol.atom_count();
    let expected = to_canonical_smiles(&mol);
    for shift in 1..n {
        let order: Vec<usize> = (0..n).map(|i| (i + shift) % n).collect();
        let renum = renumber_atoms(&mol, &order).unwrap();
        assert_eq!(to_canonical_smiles(&renum), expected, "shift {shift}");
    }
}

/// Fisher-Yates over `0..n` driven by a fixed xorshift seed.
fn shuffled(n: usize, seed: u64) -> Vec<usize> {
    let mut state = seed;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };
    let mut order: Vec<usize> = (0..n).collect();
    for i in (1..n).rev() {
        let j = (next() % (i as u64 + 1)) as usize;
        order.swap(i, j);
    }
    order
}

#[test]
fn shuffled_atom_order_gives_one_string() {
    for smiles in [
        "c1ccc2ccccc2c1",
        "C1=CC=CC=CC=C1",
        "C12C3C4C1C5C2C3C45",
        "C1=CCC=CC1",
        "C=CC=C",
        "C[C@@H]1CCCC[C@H]1O",
        "N[C@@H](Cc1ccccc1)C(=O)O",
    ] {
        let mol = from_smiles(smiles).unwrap();
        let expected = to_canonical_smiles(&mol);
        for seed in [0x9e37_79b9_7f4a_7c15, 7, 42, 1234, 99_991, 0xdead_beef] {
            let order = shuffled(mol.atom_count(), seed);
            let renum = renumber_atoms(&mol, &order).unwrap();
            assert_eq!(to_canonical_smiles(&renum), expected, "{smiles} seed {seed}");
        }
    }
}
