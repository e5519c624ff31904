/// A chemical element, identified by its atomic number (1–118).
///
/// Only the properties the valence model and the SMILES layer need are
/// tabulated: symbol, default valences, period and outer-shell electrons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Element(u8);

impl Element {
    pub const H: Element = Element(1);
    pub const HE: Element = Element(2);
    pub const B: Element = Element(5);
    pub const C: Element = Element(6);
    pub const N: Element = Element(7);
    pub const O: Element = Element(8);
    pub const F: Element = Element(9);
    pub const SI: Element = Element(14);
    pub const P: Element = Element(15);
    pub const S: Element = Element(16);
    pub const CL: Element = Element(17);
    pub const AS: Element = Element(33);
    pub const SE: Element = Element(34);
    pub const BR: Element = Element(35);
    pub const TE: Element = Element(52);
    pub const I: Element = Element(53);

    pub fn from_atomic_num(n: u8) -> Option<Element> {
        (1..=118).contains(&n).then_some(Element(n))
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .position(|sym| *sym == s)
            .map(|i| Element(i as u8 + 1))
    }

    pub fn atomic_num(self) -> u8 {
        self.0
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self.0 as usize - 1]
    }

    /// Row of the periodic table, 1-based.
    pub fn period(self) -> u8 {
        NOBLE_GASES.iter().position(|&z| self.0 <= z).unwrap_or(6) as u8 + 1
    }

    /// Valences an uncharged atom of this element may take, smallest first.
    /// Empty for elements without a conventional covalent valence.
    pub fn default_valences(self) -> &'static [u8] {
        match self.0 {
            1 => &[1],
            5 => &[3],
            6 | 14 | 32 => &[4],
            7 | 15 | 33 => &[3, 5],
            8 => &[2],
            9 | 17 | 35 | 85 => &[1],
            16 | 34 | 52 => &[2, 4, 6],
            53 => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    /// Elements that may be written without brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }

    /// Elements with a lower-case aromatic SMILES symbol.
    pub fn has_aromatic_symbol(self) -> bool {
        matches!(self.0, 5 | 6 | 7 | 8 | 15 | 16 | 33 | 34 | 52)
    }

    /// Valence-shell electron count of the neutral atom. For transition
    /// metals and f-block elements this counts the outer s electrons plus
    /// the filling d/f electrons.
    pub fn outer_shell_electrons(self) -> u8 {
        let z = self.0;
        let prev = NOBLE_GASES
            .iter()
            .rev()
            .copied()
            .find(|&g| g < z)
            .unwrap_or(0);
        let pos = z - prev;
        match prev {
            0 | 2 | 10 => pos,
            18 | 36 if pos > 12 => pos - 10,
            18 | 36 => pos,
            _ if pos > 26 => pos - 24,
            _ if pos > 16 => pos - 14,
            _ => pos,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

const NOBLE_GASES: [u8; 7] = [2, 10, 18, 36, 54, 86, 118];

#[rustfmt::skip]
const SYMBOLS: [&str; 118] = [
    "H", "He",
    "Li", "Be", "B", "C", "N", "O", "F", "Ne",
    "Na", "Mg", "Al", "Si", "P", "S", "Cl", "Ar",
    "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn",
    "Ga", "Ge", "As", "Se", "Br", "Kr",
    "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd",
    "In", "Sn", "Sb", "Te", "I", "Xe",
    "Cs", "Ba",
    "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb",
    "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg",
    "Tl", "Pb", "Bi", "Po", "At", "Rn",
    "Fr", "Ra",
    "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk", "Cf", "Es", "Fm", "Md", "No",
    "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn",
    "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];
