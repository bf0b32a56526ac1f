//! SMILES reader.
//!
//! Reads the subset of SMILES found in reaction datasets: organic-subset and
//! bracket atoms, aromatic lowercase atoms, explicit bonds, branches, ring
//! closures and dot-separated components. Stereo marks (`@`, `/`, `\`) and
//! atom classes are accepted and dropped. Kekulé rings are aromatized after
//! hydrogens are assigned, so both notations give the same molecule.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::aromaticity::perceive_aromaticity;
use crate::element::{can_be_aromatic, element_by_symbol, implicit_hydrogens, is_organic_subset};
use crate::molecule::{Atom, Bond, BondOrder, Molecule};

/// Errors produced while reading SMILES text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SmilesError {
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedCharacter { ch: char, pos: usize },

    #[error("unknown element '{symbol}' at position {pos}")]
    UnknownElement { symbol: String, pos: usize },

    #[error("unterminated bracket atom starting at position {pos}")]
    UnterminatedBracket { pos: usize },

    #[error("unbalanced parenthesis at position {pos}")]
    UnbalancedParenthesis { pos: usize },

    #[error("ring closure {digit} was opened but never closed")]
    UnclosedRing { digit: u16 },

    #[error("invalid ring closure {digit} at position {pos}")]
    InvalidRingClosure { digit: u16, pos: usize },

    #[error("bond at position {pos} is not followed by an atom")]
    DanglingBond { pos: usize },
}

/// Parse SMILES text into a [`Molecule`].
///
/// Empty text yields an empty molecule rather than an error.
pub fn parse_smiles(text: &str) -> Result<Molecule, SmilesError> {
    Reader::new(text).read()
}

struct PendingBond {
    begin: usize,
    end: usize,
    order: Option<BondOrder>,
}

struct OpenRing {
    atom: usize,
    order: Option<BondOrder>,
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
    atoms: Vec<Atom>,
    bonds: Vec<PendingBond>,
    rings: BTreeMap<u16, OpenRing>,
    branches: Vec<(Option<usize>, usize)>,
    prev: Option<usize>,
    pending: Option<(BondOrder, usize)>,
}

impl Reader {
    fn new(text: &str) -> Self {
        Self {
            chars: text.trim().chars().collect(),
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            rings: BTreeMap::new(),
            branches: Vec::new(),
            prev: None,
            pending: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn unexpected(&self) -> SmilesError {
        SmilesError::UnexpectedCharacter {
            ch: self.peek().unwrap_or('\0'),
            pos: self.pos,
        }
    }

    fn read(mut self) -> Result<Molecule, SmilesError> {
        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.branches.push((self.prev, self.pos));
                    self.pos += 1;
                }
                ')' => {
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond { pos: self.pos });
                    }
                    let (anchor, _) = self
                        .branches
                        .pop()
                        .ok_or(SmilesError::UnbalancedParenthesis { pos: self.pos })?;
                    self.prev = anchor;
                    self.pos += 1;
                }
                '.' => {
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond { pos: self.pos });
                    }
                    self.prev = None;
                    self.pos += 1;
                }
                '-' | '=' | '#' | '$' | ':' | '/' | '\\' => {
                    if self.prev.is_none() || self.pending.is_some() {
                        return Err(self.unexpected());
                    }
                    self.pending = Some((bond_order_for(ch), self.pos));
                    self.pos += 1;
                }
                '%' | '0'..='9' => self.read_ring_closure()?,
                '[' => {
                    let atom = self.read_bracket_atom()?;
                    self.attach(atom);
                }
                _ => {
                    let atom = self.read_organic_atom()?;
                    self.attach(atom);
                }
            }
        }

        if let Some((_, pos)) = self.pending {
            return Err(SmilesError::DanglingBond { pos });
        }
        if let Some(&(_, pos)) = self.branches.last() {
            return Err(SmilesError::UnbalancedParenthesis { pos });
        }
        if let Some((&digit, _)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing { digit });
        }

        Ok(self.finish())
    }

    fn attach(&mut self, atom: Atom) {
        let idx = self.atoms.len();
        self.atoms.push(atom);
        if let Some(prev) = self.prev {
            let order = self.pending.take().map(|(order, _)| order);
            self.bonds.push(PendingBond {
                begin: prev,
                end: idx,
                order,
            });
        }
        self.prev = Some(idx);
    }

    fn read_ring_closure(&mut self) -> Result<(), SmilesError> {
        let start = self.pos;
        let Some(current) = self.prev else {
            return Err(self.unexpected());
        };
        let digit = if self.peek() == Some('%') {
            let tens = self.peek_at(1).and_then(|c| c.to_digit(10));
            let ones = self.peek_at(2).and_then(|c| c.to_digit(10));
            match (tens, ones) {
                (Some(t), Some(o)) => {
                    self.pos += 3;
                    (t * 10 + o) as u16
                }
                _ => return Err(self.unexpected()),
            }
        } else {
            let d = self.peek().and_then(|c| c.to_digit(10)).unwrap_or(0);
            self.pos += 1;
            d as u16
        };
        let order = self.pending.take().map(|(order, _)| order);

        match self.rings.remove(&digit) {
            None => {
                self.rings.insert(
                    digit,
                    OpenRing {
                        atom: current,
                        order,
                    },
                );
            }
            Some(open) => {
                let duplicate = self.bonds.iter().any(|b| {
                    (b.begin == open.atom && b.end == current)
                        || (b.begin == current && b.end == open.atom)
                });
                if open.atom == current || duplicate {
                    return Err(SmilesError::InvalidRingClosure { digit, pos: start });
                }
                self.bonds.push(PendingBond {
                    begin: open.atom,
                    end: current,
                    order: open.order.or(order),
                });
            }
        }
        Ok(())
    }

    fn read_organic_atom(&mut self) -> Result<Atom, SmilesError> {
        let ch = self.peek().ok_or_else(|| self.unexpected())?;
        let (symbol, aromatic, width) = match (ch, self.peek_at(1)) {
            ('C', Some('l')) => ("Cl", false, 2),
            ('B', Some('r')) => ("Br", false, 2),
            ('B', _) => ("B", false, 1),
            ('C', _) => ("C", false, 1),
            ('N', _) => ("N", false, 1),
            ('O', _) => ("O", false, 1),
            ('P', _) => ("P", false, 1),
            ('S', _) => ("S", false, 1),
            ('F', _) => ("F", false, 1),
            ('I', _) => ("I", false, 1),
            ('*', _) => ("*", false, 1),
            ('b', _) => ("B", true, 1),
            ('c', _) => ("C", true, 1),
            ('n', _) => ("N", true, 1),
            ('o', _) => ("O", true, 1),
            ('p', _) => ("P", true, 1),
            ('s', _) => ("S", true, 1),
            _ => return Err(self.unexpected()),
        };
        let element = element_by_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
            symbol: symbol.to_string(),
            pos: self.pos,
        })?;
        debug_assert!(is_organic_subset(element.atomic_number));
        self.pos += width;

        let mut atom = Atom::new(element.atomic_number);
        atom.aromatic = aromatic;
        Ok(atom)
    }

    fn read_bracket_atom(&mut self) -> Result<Atom, SmilesError> {
        let open = self.pos;
        self.pos += 1;

        let isotope = self.read_number().map(|n| n as u16);

        let sym_pos = self.pos;
        let first = self
            .peek()
            .ok_or(SmilesError::UnterminatedBracket { pos: open })?;
        let (element, aromatic) = if first.is_ascii_uppercase() || first == '*' {
            let two: Option<String> = self
                .peek_at(1)
                .filter(|c| c.is_ascii_lowercase())
                .map(|c| format!("{first}{c}"));
            match two.as_deref().and_then(element_by_symbol) {
                Some(element) => {
                    self.pos += 2;
                    (element, false)
                }
                None => {
                    self.pos += 1;
                    let symbol = first.to_string();
                    let element = element_by_symbol(&symbol).ok_or(
                        SmilesError::UnknownElement {
                            symbol,
                            pos: sym_pos,
                        },
                    )?;
                    (element, false)
                }
            }
        } else if first.is_ascii_lowercase() {
            let two = self
                .peek_at(1)
                .filter(|c| c.is_ascii_lowercase())
                .map(|c| format!("{}{c}", first.to_ascii_uppercase()));
            let aromatic_two = two
                .as_deref()
                .and_then(element_by_symbol)
                .filter(|e| can_be_aromatic(e.atomic_number));
            match aromatic_two {
                Some(element) => {
                    self.pos += 2;
                    (element, true)
                }
                None => {
                    self.pos += 1;
                    let symbol = first.to_ascii_uppercase().to_string();
                    let element = element_by_symbol(&symbol)
                        .filter(|e| can_be_aromatic(e.atomic_number))
                        .ok_or(SmilesError::UnknownElement {
                            symbol: first.to_string(),
                            pos: sym_pos,
                        })?;
                    (element, true)
                }
            }
        } else {
            return Err(self.unexpected());
        };

        self.skip_chirality();

        let mut hydrogens = 0u8;
        if self.peek() == Some('H') {
            self.pos += 1;
            hydrogens = self.read_number().map(|n| n as u8).unwrap_or(1);
        }

        let formal_charge = self.read_charge();

        if self.peek() == Some(':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(self.unexpected());
            }
        }

        match self.peek() {
            Some(']') => self.pos += 1,
            Some(_) => return Err(self.unexpected()),
            None => return Err(SmilesError::UnterminatedBracket { pos: open }),
        }

        Ok(Atom {
            atomic_number: element.atomic_number,
            isotope,
            formal_charge,
            aromatic,
            hydrogens,
            bracket: true,
        })
    }

    fn read_number(&mut self) -> Option<u32> {
        let mut value: Option<u32> = None;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = Some(value.unwrap_or(0).saturating_mul(10).saturating_add(d));
            self.pos += 1;
        }
        value
    }

    fn skip_chirality(&mut self) {
        if self.peek() != Some('@') {
            return;
        }
        while self.peek() == Some('@') {
            self.pos += 1;
        }
        let class: String = [self.peek(), self.peek_at(1)]
            .iter()
            .flatten()
            .collect();
        if matches!(class.as_str(), "TH" | "AL" | "SP" | "TB" | "OH") {
            self.pos += 2;
            let _ = self.read_number();
        }
    }

    fn read_charge(&mut self) -> i8 {
        let sign = match self.peek() {
            Some('+') => 1i8,
            Some('-') => -1i8,
            _ => return 0,
        };
        let symbol = self.peek();
        self.pos += 1;
        if let Some(n) = self.read_number() {
            return sign.saturating_mul(n.min(i8::MAX as u32) as i8);
        }
        let mut magnitude = 1i8;
        while self.peek() == symbol {
            magnitude = magnitude.saturating_add(1);
            self.pos += 1;
        }
        sign * magnitude
    }

    fn finish(self) -> Molecule {
        let Reader {
            mut atoms, bonds, ..
        } = self;

        let bonds: Vec<Bond> = bonds
            .into_iter()
            .map(|b| {
                let order = b.order.unwrap_or_else(|| {
                    if atoms[b.begin].aromatic && atoms[b.end].aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    }
                });
                Bond {
                    begin: b.begin,
                    end: b.end,
                    order,
                }
            })
            .collect();

        let mut valence_sum = vec![0u8; atoms.len()];
        for bond in &bonds {
            valence_sum[bond.begin] = valence_sum[bond.begin].saturating_add(bond.order.valence());
            valence_sum[bond.end] = valence_sum[bond.end].saturating_add(bond.order.valence());
        }
        for (atom, &sum) in atoms.iter_mut().zip(valence_sum.iter()) {
            if !atom.bracket {
                atom.hydrogens = implicit_hydrogens(atom.atomic_number, sum, atom.aromatic);
            }
        }

        perceive_aromaticity(Molecule::new(atoms, bonds))
    }
}

fn bond_order_for(ch: char) -> BondOrder {
    match ch {
        '=' => BondOrder::Double,
        '#' => BondOrder::Triple,
        '$' => BondOrder::Quadruple,
        ':' => BondOrder::Aromatic,
        _ => BondOrder::Single,
    }
}
