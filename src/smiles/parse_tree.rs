use crate::element::Element;
use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, ChiralityToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u32,
    pub is_bracket: bool,
    /// Whether the atom was bonded to a preceding atom when written; the
    /// bracket hydrogen then comes second in the written neighbour order.
    pub has_predecessor: bool,
    /// Neighbours in written order; ring-closure partners sit where their
    /// digit appeared.
    pub neighbors: Vec<Neighbor>,
}

#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub atom_idx: usize,
    pub bond_idx: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ParseBond {
    pub begin: usize,
    pub end: usize,
    pub bond: Option<BondToken>,
    /// Atom the bond symbol was written after; decides the meaning of `/`
    /// and `\`.
    pub written_from: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
    pub bonds: Vec<ParseBond>,
}

struct RingOpen {
    atom: usize,
    slot: usize,
    bond: Option<BondToken>,
}

impl ParseTree {
    fn add_bond(&mut self, begin: usize, end: usize, bond: Option<BondToken>, written_from: usize) -> usize {
        self.bonds.push(ParseBond {
            begin,
            end,
            bond,
            written_from,
        });
        self.bonds.len() - 1
    }
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut tree = ParseTree {
        atoms: Vec::new(),
        bonds: Vec::new(),
    };
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<BondToken> = None;
    let mut ring_opens: Vec<Option<RingOpen>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = tree.atoms.len();
                tree.atoms.push(parse_atom_from_token(atom_tok, current.is_some()));
                if let Some(cur) = current {
                    let bond_idx = tree.add_bond(cur, idx, pending_bond.take(), cur);
                    tree.atoms[cur].neighbors.push(Neighbor {
                        atom_idx: idx,
                        bond_idx,
                    });
                    tree.atoms[idx].neighbors.push(Neighbor {
                        atom_idx: cur,
                        bond_idx,
                    });
                }
                current = Some(idx);
            }
            Token::Bond(b) => {
                pending_bond = Some(*b);
            }
            Token::RingClosure { bond, digit, pos } => {
                let invalid = SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                };
                let cur = current.ok_or(invalid.clone())?;
                let slot = &mut ring_opens[*digit as usize];

                match slot.take() {
                    Some(open) => {
                        if open.atom == cur
                            || tree.atoms[cur].neighbors.iter().any(|n| n.atom_idx == open.atom)
                        {
                            return Err(invalid);
                        }
                        let (ring_bond, written_from) = match (open.bond, *bond) {
                            (None, None) => (None, open.atom),
                            (Some(b), None) => (Some(b), open.atom),
                            (None, Some(b)) => (Some(b), cur),
                            (Some(b1), Some(b2)) if b1 == b2 || (b1.is_directional() && b2.is_directional()) => {
                                (Some(b1), open.atom)
                            }
                            (Some(_), Some(_)) => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                        };
                        let bond_idx = tree.add_bond(open.atom, cur, ring_bond, written_from);
                        tree.atoms[open.atom].neighbors[open.slot] = Neighbor {
                            atom_idx: cur,
                            bond_idx,
                        };
                        tree.atoms[cur].neighbors.push(Neighbor {
                            atom_idx: open.atom,
                            bond_idx,
                        });
                    }
                    None => {
                        // placeholder, filled in when the ring closes
                        let neighbors = &mut tree.atoms[cur].neighbors;
                        neighbors.push(Neighbor {
                            atom_idx: cur,
                            bond_idx: usize::MAX,
                        });
                        *slot = Some(RingOpen {
                            atom: cur,
                            slot: neighbors.len() - 1,
                            bond: *bond,
                        });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                if pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '(' });
                }
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                if pending_bond.is_some() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: ')' });
                }
                let (atom, _) = stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(atom);
            }
            Token::Dot(pos) => {
                if pending_bond.is_some() || !stack.is_empty() {
                    return Err(SmilesError::UnexpectedChar { pos: *pos, ch: '.' });
                }
                current = None;
            }
        }
    }

    if pending_bond.is_some() {
        return Err(SmilesError::UnexpectedEnd);
    }
    if let Some(&(_, pos)) = stack.first() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(digit) = ring_opens.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }

    Ok(tree)
}

fn parse_atom_from_token(tok: &AtomToken, has_predecessor: bool) -> ParseAtom {
    ParseAtom {
        element: tok.element,
        is_aromatic: tok.is_aromatic,
        isotope: tok.isotope,
        chirality: tok.chirality,
        hcount: tok.hcount,
        charge: tok.charge,
        atom_class: tok.atom_class,
        is_bracket: tok.is_bracket,
        has_predecessor,
        neighbors: Vec::new(),
    }
}
