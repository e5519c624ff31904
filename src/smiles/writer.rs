use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, Chirality};
use crate::bond::{Bond, BondOrder, BondStereo};
use crate::canonical::canonical_ordering;
use crate::element::Element;
use crate::error::MolError;
use crate::graph_ops::connected_components;
use crate::kekulize::kekulize;
use crate::mol::{permutation_parity, Mol};
use crate::options::SmilesWriteOptions;
use crate::sanitize::prepare_output_mol;
use crate::valence::{explicit_valence, implicit_hydrogens};

#[derive(Debug, Clone, Copy)]
struct WriteFlags {
    stereo: bool,
    canonical: bool,
}

/// SMILES in input atom order, with stereo.
pub fn to_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_with(
        mol,
        WriteFlags {
            stereo: true,
            canonical: false,
        },
    )
}

/// Canonical SMILES with stereo. The graph is written as is; no hydrogen
/// removal or sanitization happens first.
pub fn to_canonical_smiles(mol: &Mol<Atom, Bond>) -> String {
    write_with(
        mol,
        WriteFlags {
            stereo: true,
            canonical: true,
        },
    )
}

/// Serialize a prepared copy of `mol`: hydrogens folded when
/// `opts.remove_h`, sanitized, map numbers cleared unless
/// `opts.map_numbers`, kekulized when `opts.kekule`. `mol` is not touched.
pub fn write_smiles(mol: &Mol<Atom, Bond>, opts: &SmilesWriteOptions) -> Result<String, MolError> {
    let mut out = prepare_output_mol(mol, opts.remove_h, true)?;
    if !opts.map_numbers {
        for v in out.atoms().collect::<Vec<_>>() {
            out.atom_mut(v).map_number = 0;
        }
    }
    if opts.kekule {
        kekulize(&mut out, true)?;
    }
    Ok(write_with(
        &out,
        WriteFlags {
            stereo: opts.stereo,
            canonical: opts.canonical,
        },
    ))
}

fn write_with(mol: &Mol<Atom, Bond>, flags: WriteFlags) -> String {
    if flags.stereo {
        write_fragments(mol, flags.canonical)
    } else {
        write_fragments(&without_stereo(mol), flags.canonical)
    }
}

/// Copy with tetrahedral tags, double-bond configurations and isotope
/// labels removed, so ranking ignores them too.
fn without_stereo(mol: &Mol<Atom, Bond>) -> Mol<Atom, Bond> {
    let mut flat = mol.clone();
    for v in mol.atoms() {
        let atom = flat.atom_mut(v);
        atom.chirality = Chirality::None;
        atom.isotope = 0;
    }
    for e in mol.bonds() {
        flat.bond_mut(e).stereo = BondStereo::None;
    }
    flat
}

fn write_fragments(mol: &Mol<Atom, Bond>, canonical: bool) -> String {
    let ranks: Vec<usize> = if canonical {
        canonical_ordering(mol)
    } else {
        (0..mol.atom_count()).collect()
    };
    let mut components = connected_components(mol);
    components.sort_by_key(|c| c.iter().map(|v| ranks[v.index()]).min());

    let mut parts = Vec::with_capacity(components.len());
    for component in &components {
        let Some(&start) = component.iter().min_by_key(|v| ranks[v.index()]) else {
            continue;
        };
        let traversal = Traversal::new(mol, &ranks, start);
        let bond_dirs = bond_directions(mol, &ranks, &traversal, canonical);
        let writer = FragmentWriter {
            mol,
            traversal,
            bond_dirs,
        };
        let mut out = String::new();
        writer.write_node(start, &mut RingDigits::default(), &mut out);
        parts.push(out);
    }
    parts.join(".")
}

/// DFS spanning tree of one fragment plus its ring-closure bonds.
struct Traversal {
    visit_order: Vec<Option<usize>>,
    parent: Vec<Option<NodeIndex>>,
    children: Vec<Vec<(NodeIndex, EdgeIndex)>>,
    /// At the ancestor: ring bonds it opens, in discovery order.
    ring_opens: Vec<Vec<(NodeIndex, EdgeIndex)>>,
    /// At the descendant: ring bonds it closes.
    ring_closes: Vec<Vec<(NodeIndex, EdgeIndex)>>,
}

impl Traversal {
    fn new(mol: &Mol<Atom, Bond>, ranks: &[usize], start: NodeIndex) -> Self {
        let n = mol.atom_count();
        let neighbor_lists: Vec<Vec<(NodeIndex, EdgeIndex)>> = mol
            .atoms()
            .map(|v| {
                let mut neighbors: Vec<(NodeIndex, EdgeIndex)> = mol
                    .bonds_of(v)
                    .filter_map(|e| mol.other_atom(e, v).map(|w| (w, e)))
                    .collect();
                neighbors.sort_by_key(|&(w, _)| ranks[w.index()]);
                neighbors
            })
            .collect();

        let mut t = Traversal {
            visit_order: vec![None; n],
            parent: vec![None; n],
            children: vec![Vec::new(); n],
            ring_opens: vec![Vec::new(); n],
            ring_closes: vec![Vec::new(); n],
        };
        let mut ring_bonds: HashSet<EdgeIndex> = HashSet::new();
        let mut visited = 1;
        t.visit_order[start.index()] = Some(0);
        let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];

        loop {
            let Some(&mut (node, ref mut next)) = stack.last_mut() else {
                break;
            };
            let Some(&(neighbor, edge)) = neighbor_lists[node.index()].get(*next) else {
                stack.pop();
                continue;
            };
            *next += 1;

            if t.visit_order[neighbor.index()].is_none() {
                t.visit_order[neighbor.index()] = Some(visited);
                visited += 1;
                t.parent[neighbor.index()] = Some(node);
                t.children[node.index()].push((neighbor, edge));
                stack.push((neighbor, 0));
            } else if t.parent[node.index()] != Some(neighbor) && ring_bonds.insert(edge) {
                t.ring_opens[neighbor.index()].push((node, edge));
                t.ring_closes[node.index()].push((neighbor, edge));
            }
        }
        t
    }

    /// Neighbours in the order the atom's SMILES lists them: parent,
    /// hydrogen, ring closures, ring openings, branches.
    fn written_order(&self, node: NodeIndex, has_h: bool) -> Vec<Option<NodeIndex>> {
        let i = node.index();
        let mut order = Vec::with_capacity(4);
        if let Some(p) = self.parent[i] {
            order.push(Some(p));
        }
        if has_h {
            order.push(None);
        }
        order.extend(self.ring_closes[i].iter().map(|&(w, _)| Some(w)));
        order.extend(self.ring_opens[i].iter().map(|&(w, _)| Some(w)));
        order.extend(self.children[i].iter().map(|&(w, _)| Some(w)));
        order
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Direction {
    Up,
    Down,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    fn as_char(self) -> char {
        match self {
            Direction::Up => '/',
            Direction::Down => '\\',
        }
    }
}

/// `dirs[(a, b)]` is the symbol written when the bond is written from `a`
/// to `b`; it also says on which side of `a` the atom `b` lies.
type BondDirs = HashMap<(NodeIndex, NodeIndex), Direction>;

fn is_single(mol: &Mol<Atom, Bond>, a: NodeIndex, b: NodeIndex) -> bool {
    mol.bond_between(a, b)
        .is_some_and(|e| mol.bond(e).order == BondOrder::Single)
}

/// Highest-ranked singly bonded neighbour of `atom` other than `partner`;
/// `None` when that rank is shared.
fn best_reference(
    mol: &Mol<Atom, Bond>,
    ranks: &[usize],
    atom: NodeIndex,
    partner: NodeIndex,
) -> Option<NodeIndex> {
    let mut side: Vec<NodeIndex> = mol
        .neighbors(atom)
        .filter(|&w| w != partner && is_single(mol, atom, w))
        .collect();
    side.sort_by_key(|w| std::cmp::Reverse(ranks[w.index()]));
    match side.as_slice() {
        [a, b, ..] if ranks[a.index()] == ranks[b.index()] => None,
        [a, ..] => Some(*a),
        [] => None,
    }
}

/// Side of `reference` at double-bond atom `atom`, if already fixed by
/// an earlier double bond: directly, through the other substituent of
/// `atom`, or through the other substituent of a doubly bonded
/// `reference`.
fn known_side(
    dirs: &BondDirs,
    mol: &Mol<Atom, Bond>,
    atom: NodeIndex,
    partner: NodeIndex,
    reference: NodeIndex,
) -> Option<Direction> {
    if let Some(&d) = dirs.get(&(atom, reference)) {
        return Some(d);
    }
    let via_atom = mol
        .neighbors(atom)
        .filter(|&w| w != partner && w != reference)
        .find_map(|w| dirs.get(&(atom, w)).map(|d| d.flip()));
    if via_atom.is_some() {
        return via_atom;
    }
    let reference_is_sp2 = mol
        .bonds_of(reference)
        .any(|e| mol.bond(e).order == BondOrder::Double);
    if !reference_is_sp2 {
        return None;
    }
    mol.neighbors(reference)
        .filter(|&w| w != atom)
        .find_map(|w| dirs.get(&(reference, w)).copied())
}

fn set_side(dirs: &mut BondDirs, atom: NodeIndex, reference: NodeIndex, side: Direction) {
    dirs.entry((atom, reference)).or_insert(side);
    dirs.entry((reference, atom)).or_insert(side.flip());
}

fn bond_directions(
    mol: &Mol<Atom, Bond>,
    ranks: &[usize],
    t: &Traversal,
    canonical: bool,
) -> BondDirs {
    let mut doubles: Vec<(usize, NodeIndex, NodeIndex, BondStereo)> = mol
        .bonds()
        .filter_map(|e| {
            let bond = mol.bond(e);
            if bond.order != BondOrder::Double || bond.stereo == BondStereo::None {
                return None;
            }
            let (a, b) = mol.bond_endpoints(e)?;
            let first = t.visit_order[a.index()]?.min(t.visit_order[b.index()]?);
            Some((first, a, b, bond.stereo))
        })
        .collect();
    doubles.sort_by_key(|&(first, ..)| first);

    let mut dirs = BondDirs::new();
    for (_, begin, end, stereo) in doubles {
        let Some((mut ref_begin, mut ref_end)) = stereo.refs() else {
            continue;
        };
        let mut stereo = stereo;
        if canonical {
            let (Some(best_begin), Some(best_end)) = (
                best_reference(mol, ranks, begin, end),
                best_reference(mol, ranks, end, begin),
            ) else {
                continue;
            };
            if best_begin != ref_begin {
                stereo = stereo.flipped();
                ref_begin = best_begin;
            }
            if best_end != ref_end {
                stereo = stereo.flipped();
                ref_end = best_end;
            }
        }
        if !is_single(mol, begin, ref_begin) || !is_single(mol, end, ref_end) {
            continue;
        }

        let same = stereo.is_cis();
        let relate = |d: Direction| if same { d } else { d.flip() };
        let (side_begin, side_end) = match (
            known_side(&dirs, mol, begin, end, ref_begin),
            known_side(&dirs, mol, end, begin, ref_end),
        ) {
            (Some(s), _) => (s, relate(s)),
            (None, Some(s)) => (relate(s), s),
            (None, None) => {
                // the endpoint written first gets its reference below
                if t.visit_order[begin.index()] <= t.visit_order[end.index()] {
                    (Direction::Down, relate(Direction::Down))
                } else {
                    (relate(Direction::Down), Direction::Down)
                }
            }
        };
        set_side(&mut dirs, begin, ref_begin, side_begin);
        set_side(&mut dirs, end, ref_end, side_end);
    }
    dirs
}

/// Ring-closure digits in use; the lowest free one is handed out next.
#[derive(Default)]
struct RingDigits {
    in_use: BTreeSet<u16>,
    by_bond: HashMap<EdgeIndex, u16>,
}

impl RingDigits {
    fn open(&mut self, edge: EdgeIndex) -> u16 {
        let digit = (1..).find(|d| !self.in_use.contains(d)).unwrap_or(1);
        self.in_use.insert(digit);
        self.by_bond.insert(edge, digit);
        digit
    }

    fn close(&mut self, edge: EdgeIndex) -> Option<u16> {
        self.by_bond.remove(&edge)
    }

    fn release(&mut self, digit: u16) {
        self.in_use.remove(&digit);
    }
}

struct FragmentWriter<'a> {
    mol: &'a Mol<Atom, Bond>,
    traversal: Traversal,
    bond_dirs: BondDirs,
}

impl FragmentWriter<'_> {
    fn write_node(&self, node: NodeIndex, digits: &mut RingDigits, out: &mut String) {
        let i = node.index();
        self.write_atom(node, out);

        let mut closed = Vec::new();
        for &(_, edge) in &self.traversal.ring_closes[i] {
            if let Some(digit) = digits.close(edge) {
                write_ring_digit(digit, out);
                closed.push(digit);
            }
        }
        for &(other, edge) in &self.traversal.ring_opens[i] {
            self.write_bond(node, other, edge, out);
            write_ring_digit(digits.open(edge), out);
        }
        for digit in closed {
            digits.release(digit);
        }

        let children = &self.traversal.children[i];
        let last = children.len().saturating_sub(1);
        for (k, &(child, edge)) in children.iter().enumerate() {
            let is_branch = k < last;
            if is_branch {
                out.push('(');
            }
            self.write_bond(node, child, edge, out);
            self.write_node(child, digits, out);
            if is_branch {
                out.push(')');
            }
        }
    }

    fn write_bond(&self, from: NodeIndex, to: NodeIndex, edge: EdgeIndex, out: &mut String) {
        if let Some(dir) = self.bond_dirs.get(&(from, to)) {
            out.push(dir.as_char());
            return;
        }
        let both_aromatic = self.mol.atom(from).is_aromatic && self.mol.atom(to).is_aromatic;
        match self.mol.bond(edge).order {
            BondOrder::Single if both_aromatic => out.push('-'),
            BondOrder::Single => {}
            BondOrder::Double => out.push('='),
            BondOrder::Triple => out.push('#'),
            BondOrder::Quadruple => out.push('$'),
            BondOrder::Aromatic if both_aromatic => {}
            BondOrder::Aromatic => out.push(':'),
        }
    }

    /// Tag as seen through the written neighbour order.
    fn written_chirality(&self, node: NodeIndex) -> Chirality {
        let atom = self.mol.atom(node);
        if atom.chirality == Chirality::None {
            return Chirality::None;
        }
        let written = self.traversal.written_order(node, atom.hydrogen_count > 0);
        let even = permutation_parity(&self.mol.chiral_reference(node), &written);
        atom.chirality.with_parity(even)
    }

    fn write_atom(&self, node: NodeIndex, out: &mut String) {
        let atom = self.mol.atom(node);
        let Some(elem) = atom.element() else {
            out.push('*');
            return;
        };
        if can_write_bare(self.mol, node, elem) {
            push_symbol(elem, atom.is_aromatic, out);
        } else {
            write_bracket_atom(atom, elem, self.written_chirality(node), out);
        }
    }
}

fn push_symbol(elem: Element, aromatic: bool, out: &mut String) {
    if aromatic && elem.has_aromatic_symbol() {
        out.push_str(&elem.symbol().to_ascii_lowercase());
    } else {
        out.push_str(elem.symbol());
    }
}

/// Whether a reader would rebuild this exact atom from its bare symbol.
fn can_write_bare(mol: &Mol<Atom, Bond>, node: NodeIndex, elem: Element) -> bool {
    let atom = mol.atom(node);
    if !elem.is_organic_subset() || (atom.is_aromatic && !elem.has_aromatic_symbol()) {
        return false;
    }
    if atom.isotope != 0
        || atom.formal_charge != 0
        || atom.chirality != Chirality::None
        || atom.map_number != 0
        || atom.num_radical_electrons != 0
    {
        return false;
    }
    let h = implicit_hydrogens(atom.atomic_num, 0, explicit_valence(mol, node)).unwrap_or(0);
    let expected = if atom.is_aromatic { h.saturating_sub(1) } else { h };
    atom.hydrogen_count == expected
}

fn write_ring_digit(digit: u16, out: &mut String) {
    match digit {
        0..=9 => out.push_str(&digit.to_string()),
        10..=99 => {
            out.push('%');
            out.push_str(&digit.to_string());
        }
        _ => out.push_str(&format!("%({digit})")),
    }
}

fn write_bracket_atom(atom: &Atom, elem: Element, chirality: Chirality, out: &mut String) {
    out.push('[');
    if atom.isotope != 0 {
        out.push_str(&atom.isotope.to_string());
    }
    push_symbol(elem, atom.is_aromatic, out);
    match chirality {
        Chirality::Ccw => out.push('@'),
        Chirality::Cw => out.push_str("@@"),
        Chirality::None => {}
    }
    match atom.hydrogen_count {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        c if c > 0 => out.push_str(&format!("+{c}")),
        c => out.push_str(&c.to_string()),
    }
    if atom.map_number != 0 {
        out.push(':');
        out.push_str(&atom.map_number.to_string());
    }
    out.push(']');
}
