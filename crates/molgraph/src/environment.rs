//! Atom environments and bond-induced substructures.

use std::collections::BTreeMap;

use crate::molecule::{Bond, Molecule};

/// A substructure cut out of a parent molecule by a set of bonds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substructure {
    pub molecule: Molecule,
    /// parent atom index -> substructure atom index
    pub atom_map: BTreeMap<usize, usize>,
}

impl Substructure {
    /// Substructure index of a parent atom, if the atom survived the cut.
    pub fn local_index(&self, parent_atom: usize) -> Option<usize> {
        self.atom_map.get(&parent_atom).copied()
    }
}

/// Bonds within `radius` bond steps of `atom`, layer by layer.
///
/// Each layer adds every not-yet-seen bond touching the previous shell,
/// including bonds that close a ring inside the shell. When the molecule
/// runs out of bonds before `radius` layers are complete, the environment
/// is empty: a fragment smaller than the requested radius is not reported
/// under that radius.
pub fn atom_environment(mol: &Molecule, radius: usize, atom: usize) -> Vec<usize> {
    if radius == 0 || atom >= mol.atom_count() {
        return Vec::new();
    }

    let mut in_env = vec![false; mol.bond_count()];
    let mut result = Vec::new();
    let mut frontier: Vec<(usize, usize)> = mol
        .neighbors(atom)
        .iter()
        .map(|&(_, bond)| (atom, bond))
        .collect();

    let mut layers = 0;
    while layers < radius {
        if frontier.is_empty() {
            break;
        }
        let mut next = Vec::new();
        for (start, bond_idx) in frontier {
            if in_env[bond_idx] {
                continue;
            }
            in_env[bond_idx] = true;
            result.push(bond_idx);
            if layers + 1 < radius {
                if let Some(other) = mol.bond(bond_idx).other(start) {
                    for &(_, nb) in mol.neighbors(other) {
                        if !in_env[nb] {
                            next.push((other, nb));
                        }
                    }
                }
            }
        }
        frontier = next;
        layers += 1;
    }

    if layers != radius {
        result.clear();
    }
    result
}

/// Build the substructure induced by `bonds`.
///
/// Atoms are numbered in the order they are first touched by the bond list.
/// Every atom keeps its element, charge, aromaticity and hydrogen count from
/// the parent.
pub fn induced_substructure(mol: &Molecule, bonds: &[usize]) -> Substructure {
    let mut atom_map: BTreeMap<usize, usize> = BTreeMap::new();
    let mut atoms = Vec::new();
    let mut sub_bonds = Vec::with_capacity(bonds.len());

    for &bond_idx in bonds {
        if bond_idx >= mol.bond_count() {
            continue;
        }
        let bond = mol.bond(bond_idx);
        let mut local = |parent: usize| -> usize {
            *atom_map.entry(parent).or_insert_with(|| {
                atoms.push(mol.atom(parent).clone());
                atoms.len() - 1
            })
        };
        let begin = local(bond.begin);
        let end = local(bond.end);
        sub_bonds.push(Bond {
            begin,
            end,
            order: bond.order,
        });
    }

    Substructure {
        molecule: Molecule::new(atoms, sub_bonds),
        atom_map,
    }
}
