use crate::element::Element;

/// Tetrahedral handedness of a stereocentre.
///
/// The tag is relative to the atom's *reference order*: a single implicit
/// hydrogen first (when [`Atom::hydrogen_count`] is nonzero), then the graph
/// neighbours in ascending index order (see
/// [`Mol::chiral_reference`](crate::Mol::chiral_reference)). Looking from
/// the first reference neighbour, the remaining ones run counterclockwise
/// for [`Chirality::Ccw`] (SMILES `@`) and clockwise for [`Chirality::Cw`]
/// (SMILES `@@`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// Clockwise (`@@`).
    Cw,
    /// Counterclockwise (`@`).
    Ccw,
}

impl Chirality {
    pub fn inverted(self) -> Self {
        match self {
            Chirality::None => Chirality::None,
            Chirality::Cw => Chirality::Ccw,
            Chirality::Ccw => Chirality::Cw,
        }
    }

    /// Re-express the tag for a neighbour list that differs from the
    /// reference by a permutation of the given parity.
    pub fn with_parity(self, even: bool) -> Self {
        if even {
            self
        } else {
            self.inverted()
        }
    }
}

/// Atom type of the editable molecule graph.
///
/// # Examples
///
/// ```
/// use molbridge::Atom;
///
/// let carbon = Atom::new(6);
/// assert_eq!(carbon.atomic_num, 6);
/// assert_eq!(carbon.map_number, 0);
/// assert!(!carbon.is_hydrogen());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number (1 = H, 6 = C, …). Zero only for dummy atoms.
    pub atomic_num: u8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    pub formal_charge: i8,
    pub num_radical_electrons: u8,
    /// Atom-map number. `0` means absent.
    pub map_number: u32,
    /// Hydrogens attached to this atom that are not graph nodes.
    pub hydrogen_count: u8,
    /// When set, `hydrogen_count` is authoritative and sanitization never
    /// recomputes it (bracket atoms, atoms whose hydrogens became nodes).
    pub no_implicit: bool,
    pub is_aromatic: bool,
    pub chirality: Chirality,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn is_hydrogen(&self) -> bool {
        self.atomic_num == 1
    }

    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.hydrogen_count
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

impl crate::traits::HasRadicalElectrons for Atom {
    fn num_radical_electrons(&self) -> u8 {
        self.num_radical_electrons
    }
}

impl crate::traits::HasMapNumber for Atom {
    fn map_number(&self) -> u32 {
        self.map_number
    }
}

impl crate::traits::HasChirality for Atom {
    fn chirality(&self) -> Chirality {
        self.chirality
    }
}
