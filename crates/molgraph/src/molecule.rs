//! Molecular graph representation.
//!
//! Atoms carry their total hydrogen count so that any substructure cut out
//! of a molecule still prints with the hydrogens of its parent.

use serde::{Deserialize, Serialize};

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Quadruple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution of the bond. Aromatic bonds count as one; the
    /// extra aromatic unit is added per atom.
    pub fn valence(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
        }
    }

    /// Small stable code used by canonical ranking.
    pub(crate) fn code(self) -> u8 {
        match self {
            BondOrder::Single => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
            BondOrder::Quadruple => 4,
            BondOrder::Aromatic => 5,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Atom {
    pub atomic_number: u8,
    pub isotope: Option<u16>,
    pub formal_charge: i8,
    pub aromatic: bool,
    /// Total attached hydrogens that are not graph nodes.
    pub hydrogens: u8,
    /// Written in bracket form in the source text (no implicit hydrogens).
    pub bracket: bool,
}

impl Atom {
    pub fn new(atomic_number: u8) -> Self {
        Self {
            atomic_number,
            isotope: None,
            formal_charge: 0,
            aromatic: false,
            hydrogens: 0,
            bracket: false,
        }
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

impl Bond {
    /// The atom at the other end of the bond, if `atom` is one of its ends.
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.begin == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.begin)
        } else {
            None
        }
    }
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    /// adjacency[atom] = [(neighbor, bond_idx)]
    adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Build a molecule and its adjacency list. Bonds must reference atoms
    /// inside `atoms`.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (idx, bond) in bonds.iter().enumerate() {
            adjacency[bond.begin].push((bond.end, idx));
            adjacency[bond.end].push((bond.begin, idx));
        }
        Self {
            atoms,
            bonds,
            adjacency,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn atom(&self, idx: usize) -> &Atom {
        &self.atoms[idx]
    }

    pub fn bond(&self, idx: usize) -> &Bond {
        &self.bonds[idx]
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// `(neighbor, bond_idx)` pairs for an atom.
    pub fn neighbors(&self, atom: usize) -> &[(usize, usize)] {
        &self.adjacency[atom]
    }

    pub fn degree(&self, atom: usize) -> usize {
        self.adjacency[atom].len()
    }

    /// Index of the bond joining two atoms, if any.
    pub fn bond_between(&self, a: usize, b: usize) -> Option<usize> {
        self.adjacency
            .get(a)?
            .iter()
            .find(|&&(n, _)| n == b)
            .map(|&(_, bond)| bond)
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        let n = self.atom_count();
        let mut seen = vec![false; n];
        let mut components = 0;
        let mut stack = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            components += 1;
            seen[start] = true;
            stack.push(start);
            while let Some(atom) = stack.pop() {
                for &(nbr, _) in &self.adjacency[atom] {
                    if !seen[nbr] {
                        seen[nbr] = true;
                        stack.push(nbr);
                    }
                }
            }
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanol() -> Molecule {
        let atoms = vec![Atom::new(6), Atom::new(6), Atom::new(8)];
        let bonds = vec![
            Bond {
                begin: 0,
                end: 1,
                order: BondOrder::Single,
            },
            Bond {
                begin: 1,
                end: 2,
                order: BondOrder::Single,
            },
        ];
        Molecule::new(atoms, bonds)
    }

    #[test]
    fn adjacency_is_symmetric() {
        let mol = ethanol();
        assert_eq!(mol.degree(1), 2);
        assert_eq!(mol.bond_between(0, 1), Some(0));
        assert_eq!(mol.bond_between(1, 0), Some(0));
        assert_eq!(mol.bond_between(0, 2), None);
        assert_eq!(mol.bond_between(7, 0), None);
    }

    #[test]
    fn bond_other_end() {
        let mol = ethanol();
        assert_eq!(mol.bond(1).other(2), Some(1));
        assert_eq!(mol.bond(1).other(0), None);
    }

    #[test]
    fn components_counted() {
        let mut atoms = ethanol().atoms().to_vec();
        atoms.push(Atom::new(17));
        let mol = Molecule::new(atoms, ethanol().bonds().to_vec());
        assert_eq!(mol.component_count(), 2);
        assert_eq!(Molecule::empty().component_count(), 0);
    }
}
