use petgraph::graph::NodeIndex;

use crate::error::MolError;

/// The closed set of bond orders the molecule graph supports.
///
/// Three lookup directions exist: numeric orders ([`from_order`]),
/// single-letter codes ([`from_symbol`]) and the integer codes of the
/// OpenBabel-style representation ([`from_external`] / [`to_external`]).
/// The external mapping is deliberately asymmetric: an aromatic bond is
/// written out as `5`, while on the way in it is recognized by its
/// aromatic flag regardless of the stored integer.
///
/// [`from_order`]: BondOrder::from_order
/// [`from_symbol`]: BondOrder::from_symbol
/// [`from_external`]: BondOrder::from_external
/// [`to_external`]: BondOrder::to_external
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
    Quadruple,
}

/// External integer code for aromatic bonds.
pub const AROMATIC_EXTERNAL_CODE: u8 = 5;

impl BondOrder {
    /// Numeric bond order: `1`, `2`, `3`, `1.5` or `4`.
    pub fn from_order(order: f64) -> Result<Self, MolError> {
        match order {
            o if o == 1.0 => Ok(BondOrder::Single),
            o if o == 2.0 => Ok(BondOrder::Double),
            o if o == 3.0 => Ok(BondOrder::Triple),
            o if o == 1.5 => Ok(BondOrder::Aromatic),
            o if o == 4.0 => Ok(BondOrder::Quadruple),
            o => Err(MolError::UnknownBondOrder(o.to_string())),
        }
    }

    /// Letter code: `S`, `D`, `T`, `B` (aromatic) or `Q`.
    pub fn from_symbol(symbol: char) -> Result<Self, MolError> {
        match symbol {
            'S' => Ok(BondOrder::Single),
            'D' => Ok(BondOrder::Double),
            'T' => Ok(BondOrder::Triple),
            'B' => Ok(BondOrder::Aromatic),
            'Q' => Ok(BondOrder::Quadruple),
            c => Err(MolError::UnknownBondOrder(format!("'{c}'"))),
        }
    }

    /// Decode an external bond. The aromatic flag wins over the code.
    pub fn from_external(code: u8, aromatic: bool) -> Result<Self, MolError> {
        if aromatic {
            return Ok(BondOrder::Aromatic);
        }
        match code {
            1 => Ok(BondOrder::Single),
            2 => Ok(BondOrder::Double),
            3 => Ok(BondOrder::Triple),
            4 => Ok(BondOrder::Quadruple),
            c => Err(MolError::UnknownBondOrder(c.to_string())),
        }
    }

    pub fn to_external(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
            BondOrder::Aromatic => AROMATIC_EXTERNAL_CODE,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
            BondOrder::Quadruple => 4.0,
        }
    }

    /// Valence units the bond contributes, counting aromatic as one; the
    /// extra aromatic electron is settled by kekulization.
    pub fn valence_contribution(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }
}

/// Configuration of a double bond, given by one reference neighbour on
/// each side. The first reference is attached to the bond's begin atom and
/// the second to its end atom; `Cis` places them on the same side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondStereo {
    #[default]
    None,
    Cis(NodeIndex, NodeIndex),
    Trans(NodeIndex, NodeIndex),
}

impl BondStereo {
    pub fn refs(self) -> Option<(NodeIndex, NodeIndex)> {
        match self {
            BondStereo::None => None,
            BondStereo::Cis(a, b) | BondStereo::Trans(a, b) => Some((a, b)),
        }
    }

    pub fn is_cis(self) -> bool {
        matches!(self, BondStereo::Cis(..))
    }

    /// Same configuration with the reference atoms replaced.
    pub fn with_refs(self, a: NodeIndex, b: NodeIndex) -> Self {
        match self {
            BondStereo::None => BondStereo::None,
            BondStereo::Cis(..) => BondStereo::Cis(a, b),
            BondStereo::Trans(..) => BondStereo::Trans(a, b),
        }
    }

    /// Cis becomes trans and vice versa; used when one reference is swapped
    /// for the other substituent on the same atom.
    pub fn flipped(self) -> Self {
        match self {
            BondStereo::None => BondStereo::None,
            BondStereo::Cis(a, b) => BondStereo::Trans(a, b),
            BondStereo::Trans(a, b) => BondStereo::Cis(a, b),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bond {
    pub order: BondOrder,
    pub stereo: BondStereo,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            stereo: BondStereo::None,
        }
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasBondStereo for Bond {
    fn bond_stereo(&self) -> BondStereo {
        self.stereo
    }
}
