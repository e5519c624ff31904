use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    pub element: Element,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u32,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiralityToken {
    None,
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
    Up,
    Down,
}

impl BondToken {
    pub fn is_directional(self) -> bool {
        matches!(self, BondToken::Up | BondToken::Down)
    }

    fn from_char(ch: char) -> Option<Self> {
        Some(match ch {
            '-' => BondToken::Single,
            '=' => BondToken::Double,
            '#' => BondToken::Triple,
            '$' => BondToken::Quadruple,
            ':' => BondToken::Aromatic,
            '/' => BondToken::Up,
            '\\' => BondToken::Down,
            _ => return None,
        })
    }
}

/// Organic-subset symbols allowed outside brackets, two-letter ones first.
const ORGANIC: [(&str, Element, bool); 16] = [
    ("Cl", Element::CL, false),
    ("Br", Element::BR, false),
    ("B", Element::B, false),
    ("C", Element::C, false),
    ("N", Element::N, false),
    ("O", Element::O, false),
    ("P", Element::P, false),
    ("S", Element::S, false),
    ("F", Element::F, false),
    ("I", Element::I, false),
    ("b", Element::B, true),
    ("c", Element::C, true),
    ("n", Element::N, true),
    ("o", Element::O, true),
    ("p", Element::P, true),
    ("s", Element::S, true),
];

/// Aromatic symbols allowed inside brackets, two-letter ones first.
const BRACKET_AROMATIC: [(&str, Element); 9] = [
    ("se", Element::SE),
    ("te", Element::TE),
    ("as", Element::AS),
    ("b", Element::B),
    ("c", Element::C),
    ("n", Element::N),
    ("o", Element::O),
    ("p", Element::P),
    ("s", Element::S),
];

fn starts_with_at(chars: &[char], i: usize, pat: &str) -> bool {
    let len = pat.chars().count();
    i + len <= chars.len() && chars[i..i + len].iter().copied().eq(pat.chars())
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    'outer: while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }
        for (sym, element, aromatic) in ORGANIC {
            if starts_with_at(&chars, i, sym) {
                tokens.push(Token::Atom(bare_atom(element, aromatic, i)));
                i += sym.len();
                continue 'outer;
            }
        }
        if let Some(bond) = BondToken::from_char(ch) {
            if !looks_like_bond(&tokens) {
                return Err(SmilesError::UnexpectedChar { pos: i, ch });
            }
            tokens.push(Token::Bond(bond));
            i += 1;
            continue;
        }
        match ch {
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let (digit, next) = parse_percent_ring(&chars, i)?;
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit,
                    pos: i,
                });
                i = next;
            }
            d @ '0'..='9' => {
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: (d as u16) - b'0' as u16,
                    pos: i,
                });
                i += 1;
            }
            ch => return Err(SmilesError::UnexpectedChar { pos: i, ch }),
        }
    }

    Ok(tokens)
}

fn bare_atom(element: Element, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        chirality: ChiralityToken::None,
        hcount: None,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

fn looks_like_bond(tokens: &[Token]) -> bool {
    matches!(
        tokens.last(),
        Some(Token::Atom(_))
            | Some(Token::RingClosure { .. })
            | Some(Token::OpenParen(_))
            | Some(Token::CloseParen(_))
    )
}

fn take_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    match tokens.last() {
        Some(Token::Bond(b)) => {
            let b = *b;
            tokens.pop();
            Some(b)
        }
        _ => None,
    }
}

fn parse_percent_ring(chars: &[char], start: usize) -> Result<(u16, usize), SmilesError> {
    let i = start + 1;
    match (chars.get(i), chars.get(i + 1)) {
        (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit() => {
            let digit = (*d1 as u16 - b'0' as u16) * 10 + (*d2 as u16 - b'0' as u16);
            Ok((digit, i + 2))
        }
        (None, _) | (_, None) => Err(SmilesError::UnexpectedEnd),
        _ => Err(SmilesError::UnexpectedChar {
            pos: start,
            ch: '%',
        }),
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1;

    let isotope = parse_number::<u16>(chars, &mut i)
        .map_err(|_| SmilesError::InvalidIsotope { pos: start })?
        .unwrap_or(0);
    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    let chirality = parse_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i, start)?;
    let charge = parse_charge(chars, &mut i, start)?;
    let atom_class = if chars.get(i) == Some(&':') {
        i += 1;
        parse_number::<u32>(chars, &mut i)
            .map_err(|_| SmilesError::InvalidAtomClass { pos: start })?
            .ok_or(SmilesError::InvalidAtomClass { pos: start })?
    } else {
        0
    };

    if chars.get(i) != Some(&']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            chirality,
            hcount: Some(hcount.unwrap_or(0)),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i + 1,
    ))
}

/// Decimal digits at `*i`; `Ok(None)` when there are none, `Err` on
/// overflow.
fn parse_number<T>(chars: &[char], i: &mut usize) -> Result<Option<T>, ()>
where
    T: TryFrom<u64>,
{
    let begin = *i;
    let mut val: u64 = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        val = val.checked_mul(10).and_then(|v| v.checked_add(d as u64)).ok_or(())?;
        *i += 1;
    }
    if *i == begin {
        return Ok(None);
    }
    T::try_from(val).map(Some).map_err(|_| ())
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Element, bool), SmilesError> {
    if *i >= chars.len() {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    }

    for (pat, elem) in BRACKET_AROMATIC {
        if starts_with_at(chars, *i, pat) {
            *i += pat.len();
            return Ok((elem, true));
        }
    }

    if chars[*i].is_ascii_uppercase() {
        if let Some(&next) = chars.get(*i + 1).filter(|c| c.is_ascii_lowercase()) {
            let sym: String = [chars[*i], next].iter().collect();
            if let Some(e) = Element::from_symbol(&sym) {
                *i += 2;
                return Ok((e, false));
            }
        }
        if let Some(e) = Element::from_symbol(&chars[*i].to_string()) {
            *i += 1;
            return Ok((e, false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: chars[*i].to_string(),
    })
}

fn parse_chirality(chars: &[char], i: &mut usize) -> ChiralityToken {
    if chars.get(*i) != Some(&'@') {
        return ChiralityToken::None;
    }
    *i += 1;
    if chars.get(*i) == Some(&'@') {
        *i += 1;
        ChiralityToken::Clockwise
    } else {
        ChiralityToken::CounterClockwise
    }
}

/// `H` with an optional single digit.
fn parse_hcount(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<Option<u8>, SmilesError> {
    if chars.get(*i) != Some(&'H') {
        return Ok(None);
    }
    *i += 1;
    let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) else {
        return Ok(Some(1));
    };
    *i += 1;
    if chars.get(*i).is_some_and(|c| c.is_ascii_digit()) {
        return Err(SmilesError::InvalidHydrogenCount { pos: bracket_start });
    }
    Ok(Some(d as u8))
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let sign_char = chars[*i];
    *i += 1;
    let invalid = SmilesError::InvalidCharge { pos: bracket_start };

    if chars.get(*i) == Some(&sign_char) {
        // ++ and -- forms
        let mut count: i8 = 1;
        while chars.get(*i) == Some(&sign_char) {
            count = count.checked_add(1).ok_or(invalid.clone())?;
            *i += 1;
        }
        return Ok(sign * count);
    }
    match parse_number::<i8>(chars, i) {
        Ok(Some(magnitude)) => Ok(sign * magnitude),
        Ok(None) => Ok(sign),
        Err(()) => Err(invalid),
    }
}
