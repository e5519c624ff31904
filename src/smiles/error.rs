use thiserror::Error;

/// Errors produced when parsing a SMILES string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    /// Input ended before a complete token could be read.
    #[error("unexpected end of SMILES")]
    UnexpectedEnd,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { pos: usize, ch: char },
    #[error("invalid element '{text}' at position {pos}")]
    InvalidElement { pos: usize, text: String },
    /// A bracket atom `[` was opened but never closed with `]`.
    #[error("unclosed bracket atom starting at position {pos}")]
    UnclosedBracket { pos: usize },
    /// A ring-opening digit was never matched by a ring-closing digit.
    #[error("unclosed ring {digit}")]
    UnclosedRing { digit: u16 },
    #[error("unmatched parenthesis at position {pos}")]
    UnmatchedParen { pos: usize },
    #[error("invalid charge at position {pos}")]
    InvalidCharge { pos: usize },
    /// More than one digit after `H` in a bracket atom.
    #[error("hydrogen count longer than one digit in bracket atom at position {pos}")]
    InvalidHydrogenCount { pos: usize },
    #[error("isotope overflow at position {pos}")]
    InvalidIsotope { pos: usize },
    #[error("atom class overflow at position {pos}")]
    InvalidAtomClass { pos: usize },
    /// A ring closure joins an atom to itself or duplicates an existing bond.
    #[error("invalid ring bond {digit} at position {pos}")]
    InvalidRingBond { digit: u16, pos: usize },
    /// The input string was empty or contained only whitespace.
    #[error("empty SMILES string")]
    EmptyInput,
    /// The opening and closing halves of a ring closure disagree on the bond.
    #[error("conflicting bond types on ring closure {digit}")]
    RingBondConflict { digit: u16 },
}
