//! The molecular graph service consumed by the fingerprint encoder.
//!
//! The encoder never looks inside molecules itself. Everything it needs
//! (parsing, ring perception, bond lookup, environment extraction and
//! canonical text) goes through [`MolecularGraph`], so another toolkit can be
//! plugged in by implementing the trait.

use std::collections::BTreeMap;

use tracing::debug;

use crate::canon::{atom_text, canonical_smiles};
use crate::environment::{atom_environment, induced_substructure, Substructure};
use crate::molecule::Molecule;
use crate::rings::sssr;
use crate::smiles::parse_smiles;

/// Capabilities a molecular toolkit must provide to the encoder.
///
/// Implementations must be deterministic: the same input always gives the
/// same output, and canonical text must not depend on input atom order.
pub trait MolecularGraph {
    type Molecule;
    type Substructure;

    /// Parse structural text. Invalid text yields `None`; this never panics.
    fn parse(&self, text: &str) -> Option<Self::Molecule>;

    fn atom_count(&self, mol: &Self::Molecule) -> usize;

    /// Smallest set of smallest rings as atom-index lists.
    ///
    /// This is the plain SSSR, one ring per independent cycle. It is not the
    /// symmetrized set: on symmetric cages such as cubane, rings equivalent to
    /// a kept ring are not added. Other implementations should return the
    /// same set, since every ring becomes a shingle.
    fn minimal_rings(&self, mol: &Self::Molecule) -> Vec<Vec<usize>>;

    /// Index of the bond between two atoms, if they are bonded.
    fn bond_between(&self, mol: &Self::Molecule, a: usize, b: usize) -> Option<usize>;

    /// Substructure induced by `bonds`, with the parent -> local atom map.
    fn induced_substructure(
        &self,
        mol: &Self::Molecule,
        bonds: &[usize],
    ) -> (Self::Substructure, BTreeMap<usize, usize>);

    /// Canonical text of a substructure, optionally rooted at a local atom.
    fn canonical_text(
        &self,
        sub: &Self::Substructure,
        root: Option<usize>,
        explicit_hydrogens: bool,
    ) -> String;

    /// Bonds within `radius` of `atom`; empty when the radius cannot be met.
    fn atom_environment(&self, mol: &Self::Molecule, radius: usize, atom: usize) -> Vec<usize>;

    /// Canonical pattern for a single atom.
    fn atom_pattern(&self, mol: &Self::Molecule, atom: usize) -> String;
}

/// Built-in SMILES-backed graph service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmilesGraph;

impl SmilesGraph {
    pub fn new() -> Self {
        Self
    }
}

impl MolecularGraph for SmilesGraph {
    type Molecule = Molecule;
    type Substructure = Substructure;

    fn parse(&self, text: &str) -> Option<Molecule> {
        match parse_smiles(text) {
            Ok(mol) => Some(mol),
            Err(err) => {
                debug!(smiles = %text, error = %err, "smiles_parse_failure");
                None
            }
        }
    }

    fn atom_count(&self, mol: &Molecule) -> usize {
        mol.atom_count()
    }

    fn minimal_rings(&self, mol: &Molecule) -> Vec<Vec<usize>> {
        sssr(mol).into_iter().map(|ring| ring.atoms).collect()
    }

    fn bond_between(&self, mol: &Molecule, a: usize, b: usize) -> Option<usize> {
        mol.bond_between(a, b)
    }

    fn induced_substructure(
        &self,
        mol: &Molecule,
        bonds: &[usize],
    ) -> (Substructure, BTreeMap<usize, usize>) {
        let sub = induced_substructure(mol, bonds);
        let map = sub.atom_map.clone();
        (sub, map)
    }

    fn canonical_text(
        &self,
        sub: &Substructure,
        root: Option<usize>,
        explicit_hydrogens: bool,
    ) -> String {
        canonical_smiles(&sub.molecule, root, explicit_hydrogens)
    }

    fn atom_environment(&self, mol: &Molecule, radius: usize, atom: usize) -> Vec<usize> {
        atom_environment(mol, radius, atom)
    }

    fn atom_pattern(&self, mol: &Molecule, atom: usize) -> String {
        atom_text(mol.atom(atom), true)
    }
}
