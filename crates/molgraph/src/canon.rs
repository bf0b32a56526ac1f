//! Canonical SMILES text.
//!
//! Atoms are ranked by iterative refinement of local invariants (element,
//! aromaticity, degree, hydrogens, charge, isotope, root flag) over sorted
//! neighbour ranks. Remaining ties are broken one class at a time and the
//! refinement rerun, so every atom ends with a distinct rank. The writer
//! then walks the graph depth first in rank order: a planning pass fixes
//! the spanning tree and ring-closure bonds, a second pass prints.
//!
//! Marking the root in the invariants makes the rooted text depend only on
//! the graph around the root, so symmetry-equivalent roots print the same.

use std::collections::{BTreeMap, BTreeSet};

use crate::element::{is_organic_subset, symbol_for};
use crate::molecule::{Atom, BondOrder, Molecule};

/// Canonical ranks (0-based, all distinct) for every atom.
pub fn canonical_ranks(mol: &Molecule, root: Option<usize>) -> Vec<usize> {
    let n = mol.atom_count();
    if n == 0 {
        return Vec::new();
    }

    let invariants: Vec<(u8, bool, usize, u8, i8, u16, bool)> = (0..n)
        .map(|i| {
            let atom = mol.atom(i);
            (
                atom.atomic_number,
                atom.aromatic,
                mol.degree(i),
                atom.hydrogens,
                atom.formal_charge,
                atom.isotope.unwrap_or(0),
                // Sorts the root last; only the partition matters.
                root == Some(i),
            )
        })
        .collect();
    let mut ranks = dense_rank(&invariants);

    loop {
        ranks = refine(mol, ranks);
        if class_count(&ranks) == n {
            return ranks;
        }
        let Some(tied) = lowest_tied_rank(&ranks) else {
            return ranks;
        };
        let chosen = (0..n).find(|&i| ranks[i] == tied).unwrap_or(0);
        let keys: Vec<(usize, bool)> = (0..n).map(|i| (ranks[i], i != chosen)).collect();
        ranks = dense_rank(&keys);
    }
}

fn refine(mol: &Molecule, mut ranks: Vec<usize>) -> Vec<usize> {
    let n = mol.atom_count();
    let mut classes = class_count(&ranks);
    loop {
        let keys: Vec<(usize, Vec<(usize, u8)>)> = (0..n)
            .map(|i| {
                let mut nbrs: Vec<(usize, u8)> = mol
                    .neighbors(i)
                    .iter()
                    .map(|&(nbr, bond)| (ranks[nbr], mol.bond(bond).order.code()))
                    .collect();
                nbrs.sort_unstable();
                (ranks[i], nbrs)
            })
            .collect();
        let next = dense_rank(&keys);
        let next_classes = class_count(&next);
        if next_classes == classes {
            return next;
        }
        classes = next_classes;
        ranks = next;
    }
}

fn dense_rank<K: Ord>(keys: &[K]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
    let mut ranks = vec![0usize; keys.len()];
    let mut rank = 0usize;
    for (pos, &idx) in order.iter().enumerate() {
        if pos > 0 && keys[idx] != keys[order[pos - 1]] {
            rank += 1;
        }
        ranks[idx] = rank;
    }
    ranks
}

fn class_count(ranks: &[usize]) -> usize {
    ranks.iter().collect::<BTreeSet<_>>().len()
}

fn lowest_tied_rank(ranks: &[usize]) -> Option<usize> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &r in ranks {
        *counts.entry(r).or_default() += 1;
    }
    counts.into_iter().find(|&(_, c)| c > 1).map(|(r, _)| r)
}

/// Write canonical SMILES for `mol`.
///
/// With `root`, the text starts at that atom. With `explicit_hydrogens`,
/// every atom is written in bracket form with its hydrogen count, which
/// keeps substructure text independent of implicit-valence rules.
/// An out-of-range root yields empty text.
pub fn canonical_smiles(mol: &Molecule, root: Option<usize>, explicit_hydrogens: bool) -> String {
    let n = mol.atom_count();
    if n == 0 || root.is_some_and(|r| r >= n) {
        return String::new();
    }
    let ranks = canonical_ranks(mol, root);
    let plan = Plan::build(mol, &ranks, root);

    let mut writer = Writer {
        mol,
        plan: &plan,
        explicit_hydrogens,
        written: vec![false; n],
        open_digits: BTreeMap::new(),
        in_use: BTreeSet::new(),
        out: String::new(),
    };
    for (i, &start) in plan.starts.iter().enumerate() {
        if i > 0 {
            writer.out.push('.');
        }
        writer.emit(start);
    }
    writer.out
}

/// Spanning forest and ring closures fixed before any text is written.
struct Plan {
    starts: Vec<usize>,
    preorder: Vec<usize>,
    children: Vec<Vec<(usize, usize)>>,
    closures: Vec<Vec<(usize, usize)>>,
}

impl Plan {
    fn build(mol: &Molecule, ranks: &[usize], root: Option<usize>) -> Self {
        let n = mol.atom_count();
        let mut plan = Plan {
            starts: Vec::new(),
            preorder: vec![usize::MAX; n],
            children: vec![Vec::new(); n],
            closures: vec![Vec::new(); n],
        };
        let mut visited = vec![false; n];
        let mut bond_used = vec![false; mol.bond_count()];
        let mut counter = 0usize;

        let mut next_start = root;
        loop {
            let start = match next_start.take() {
                Some(start) => start,
                None => match (0..n).filter(|&i| !visited[i]).min_by_key(|&i| ranks[i]) {
                    Some(start) => start,
                    None => break,
                },
            };
            plan.starts.push(start);
            plan.visit(
                mol,
                ranks,
                start,
                None,
                &mut visited,
                &mut bond_used,
                &mut counter,
            );
        }
        plan
    }

    #[allow(clippy::too_many_arguments)]
    fn visit(
        &mut self,
        mol: &Molecule,
        ranks: &[usize],
        atom: usize,
        via: Option<usize>,
        visited: &mut [bool],
        bond_used: &mut [bool],
        counter: &mut usize,
    ) {
        visited[atom] = true;
        self.preorder[atom] = *counter;
        *counter += 1;

        let mut nbrs: Vec<(usize, usize)> = mol
            .neighbors(atom)
            .iter()
            .copied()
            .filter(|&(_, bond)| Some(bond) != via)
            .collect();
        nbrs.sort_by_key(|&(nbr, _)| ranks[nbr]);

        for (nbr, bond) in nbrs {
            if bond_used[bond] {
                continue;
            }
            bond_used[bond] = true;
            if visited[nbr] {
                self.closures[nbr].push((atom, bond));
                self.closures[atom].push((nbr, bond));
            } else {
                self.children[atom].push((nbr, bond));
                self.visit(mol, ranks, nbr, Some(bond), visited, bond_used, counter);
            }
        }
    }
}

struct Writer<'a> {
    mol: &'a Molecule,
    plan: &'a Plan,
    explicit_hydrogens: bool,
    written: Vec<bool>,
    /// ring-closure bond -> digit while the ring is open
    open_digits: BTreeMap<usize, usize>,
    in_use: BTreeSet<usize>,
    out: String,
}

impl Writer<'_> {
    fn emit(&mut self, atom: usize) {
        let text = atom_text(self.mol.atom(atom), self.explicit_hydrogens);
        self.out.push_str(&text);
        self.written[atom] = true;

        let mut closures = self.plan.closures[atom].clone();
        closures.sort_by_key(|&(partner, _)| self.plan.preorder[partner]);

        let mut freed = Vec::new();
        for &(partner, bond) in &closures {
            if !self.written[partner] || partner == atom {
                continue;
            }
            if let Some(digit) = self.open_digits.remove(&bond) {
                push_digit(&mut self.out, digit);
                freed.push(digit);
            }
        }
        for &(partner, bond) in &closures {
            if self.written[partner] && partner != atom {
                continue;
            }
            let digit = (1..)
                .find(|d| !self.in_use.contains(d))
                .unwrap_or(1);
            self.in_use.insert(digit);
            self.open_digits.insert(bond, digit);
            let symbol = self.bond_symbol(bond);
            self.out.push_str(symbol);
            push_digit(&mut self.out, digit);
        }
        for digit in freed {
            self.in_use.remove(&digit);
        }

        let plan = self.plan;
        let children = &plan.children[atom];
        let last = children.len().saturating_sub(1);
        for (i, &(child, bond)) in children.iter().enumerate() {
            let symbol = self.bond_symbol(bond);
            if i < last {
                self.out.push('(');
                self.out.push_str(symbol);
                self.emit(child);
                self.out.push(')');
            } else {
                self.out.push_str(symbol);
                self.emit(child);
            }
        }
    }

    fn bond_symbol(&self, bond_idx: usize) -> &'static str {
        let bond = self.mol.bond(bond_idx);
        let both_aromatic = self.mol.atom(bond.begin).aromatic && self.mol.atom(bond.end).aromatic;
        match bond.order {
            BondOrder::Single if both_aromatic => "-",
            BondOrder::Single => "",
            BondOrder::Double => "=",
            BondOrder::Triple => "#",
            BondOrder::Quadruple => "$",
            BondOrder::Aromatic if both_aromatic => "",
            BondOrder::Aromatic => ":",
        }
    }
}

fn push_digit(out: &mut String, digit: usize) {
    if digit < 10 {
        out.push_str(&digit.to_string());
    } else {
        out.push('%');
        out.push_str(&digit.to_string());
    }
}

/// SMILES text for a single atom.
///
/// Without `explicit_hydrogens`, organic-subset atoms that were not written
/// in brackets print bare; everything else prints in bracket form.
pub fn atom_text(atom: &Atom, explicit_hydrogens: bool) -> String {
    let symbol = if atom.aromatic {
        symbol_for(atom.atomic_number).to_ascii_lowercase()
    } else {
        symbol_for(atom.atomic_number).to_string()
    };

    let bare = !explicit_hydrogens
        && !atom.bracket
        && is_organic_subset(atom.atomic_number)
        && atom.formal_charge == 0
        && atom.isotope.is_none();
    if bare {
        return symbol;
    }

    let mut text = String::from("[");
    if let Some(isotope) = atom.isotope {
        text.push_str(&isotope.to_string());
    }
    text.push_str(&symbol);
    match atom.hydrogens {
        0 => {}
        1 => text.push('H'),
        h => {
            text.push('H');
            text.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => text.push('+'),
        -1 => text.push('-'),
        c if c > 0 => text.push_str(&format!("+{c}")),
        c => text.push_str(&format!("-{}", c.unsigned_abs())),
    }
    text.push(']');
    text
}
