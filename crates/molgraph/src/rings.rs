//! Ring perception: smallest set of smallest rings.
//!
//! Candidate cycles are the shortest cycle through every bond. They are
//! taken smallest first and kept while they are linearly independent over
//! GF(2) (bond incidence vectors), until the cyclomatic number is reached.

use std::collections::{BTreeSet, VecDeque};

use crate::molecule::Molecule;

/// A perceived ring: atoms in cycle order and the bonds closing the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ring {
    pub atoms: Vec<usize>,
    pub bonds: Vec<usize>,
}

impl Ring {
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

/// Smallest set of smallest rings, ordered by size then by atom indices.
pub fn sssr(mol: &Molecule) -> Vec<Ring> {
    let cyclomatic =
        (mol.bond_count() + mol.component_count()).saturating_sub(mol.atom_count());
    if cyclomatic == 0 {
        return Vec::new();
    }

    let mut seen: BTreeSet<Vec<usize>> = BTreeSet::new();
    let mut candidates: Vec<Ring> = Vec::new();
    for bond_idx in 0..mol.bond_count() {
        if let Some(ring) = shortest_cycle_through(mol, bond_idx) {
            let mut key = ring.bonds.clone();
            key.sort_unstable();
            if seen.insert(key) {
                candidates.push(ring);
            }
        }
    }
    candidates.sort_by(|a, b| {
        let mut ka = a.atoms.clone();
        let mut kb = b.atoms.clone();
        ka.sort_unstable();
        kb.sort_unstable();
        a.len().cmp(&b.len()).then(ka.cmp(&kb))
    });

    let words = mol.bond_count().div_ceil(64);
    let mut basis: Vec<Vec<u64>> = Vec::new();
    let mut rings = Vec::new();
    for ring in candidates {
        if rings.len() == cyclomatic {
            break;
        }
        let mut vector = vec![0u64; words];
        for &b in &ring.bonds {
            vector[b / 64] |= 1u64 << (b % 64);
        }
        if reduce_and_insert(&mut basis, vector) {
            rings.push(ring);
        }
    }
    rings
}

/// Shortest cycle containing `bond_idx`: the shortest path between its two
/// ends that avoids the bond itself, closed by the bond.
fn shortest_cycle_through(mol: &Molecule, bond_idx: usize) -> Option<Ring> {
    let bond = mol.bond(bond_idx);
    let (source, target) = (bond.begin, bond.end);

    // parent[atom] = (previous atom, bond used)
    let mut parent: Vec<Option<(usize, usize)>> = vec![None; mol.atom_count()];
    let mut visited = vec![false; mol.atom_count()];
    let mut queue = VecDeque::new();
    visited[source] = true;
    queue.push_back(source);

    while let Some(atom) = queue.pop_front() {
        if atom == target {
            break;
        }
        let mut nbrs: Vec<(usize, usize)> = mol.neighbors(atom).to_vec();
        nbrs.sort_unstable();
        for (nbr, via) in nbrs {
            if via == bond_idx || visited[nbr] {
                continue;
            }
            visited[nbr] = true;
            parent[nbr] = Some((atom, via));
            queue.push_back(nbr);
        }
    }

    if !visited[target] {
        return None;
    }

    let mut atoms = vec![target];
    let mut bonds = vec![bond_idx];
    let mut cursor = target;
    while let Some((prev, via)) = parent[cursor] {
        bonds.push(via);
        atoms.push(prev);
        cursor = prev;
    }
    Some(Ring { atoms, bonds })
}

/// Gaussian elimination over GF(2). Returns `true` when `vector` was
/// independent of the basis and has been added to it.
fn reduce_and_insert(basis: &mut Vec<Vec<u64>>, mut vector: Vec<u64>) -> bool {
    for row in basis.iter() {
        let pivot = leading_bit(row);
        if let Some(p) = pivot {
            if vector[p / 64] & (1u64 << (p % 64)) != 0 {
                for (v, r) in vector.iter_mut().zip(row.iter()) {
                    *v ^= r;
                }
            }
        }
    }
    if leading_bit(&vector).is_none() {
        return false;
    }
    basis.push(vector);
    // Keep pivots unique: reduce existing rows by the new one.
    let new_row = basis[basis.len() - 1].clone();
    if let Some(p) = leading_bit(&new_row) {
        let last = basis.len() - 1;
        for row in basis.iter_mut().take(last) {
            if row[p / 64] & (1u64 << (p % 64)) != 0 {
                for (r, n) in row.iter_mut().zip(new_row.iter()) {
                    *r ^= n;
                }
            }
        }
    }
    true
}

fn leading_bit(vector: &[u64]) -> Option<usize> {
    vector
        .iter()
        .enumerate()
        .find(|(_, &w)| w != 0)
        .map(|(i, &w)| i * 64 + w.trailing_zeros() as usize)
}
