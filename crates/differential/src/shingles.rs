//! Molecular shingling: rings, single atoms and rooted radius fragments.

use std::collections::{BTreeMap, BTreeSet};

use molgraph::MolecularGraph;

use crate::config::EncoderConfig;
use crate::fingerprint::AtomIndexMap;

/// Shingles of one molecule plus the atoms behind each of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoleculeShingling {
    /// Unique shingle texts.
    pub shingles: BTreeSet<String>,
    pub atom_indices: AtomIndexMap,
}

impl MoleculeShingling {
    fn push(&mut self, shingle: String, atoms: BTreeSet<usize>) {
        self.atom_indices
            .entry(shingle.clone())
            .or_default()
            .push(atoms);
        self.shingles.insert(shingle);
    }
}

/// Decompose a molecule into shingles.
///
/// 1. Rings (when `include_rings`): the substructure on all bonds between
///    atoms of each minimal ring.
/// 2. Atoms (when `min_radius == 0`): the explicit-hydrogen atom pattern.
/// 3. Fragments: for every atom and every radius from `max(1, min_radius)`
///    to `radius`, the neighbourhood rooted at that atom.
pub fn shingle_molecule<G>(graph: &G, mol: &G::Molecule, cfg: &EncoderConfig) -> MoleculeShingling
where
    G: MolecularGraph,
{
    let mut out = MoleculeShingling::default();

    if cfg.include_rings {
        for ring in graph.minimal_rings(mol) {
            let mut bonds = BTreeSet::new();
            for (i, &a) in ring.iter().enumerate() {
                for &b in &ring[i + 1..] {
                    if let Some(bond) = graph.bond_between(mol, a, b) {
                        bonds.insert(bond);
                    }
                }
            }
            let bonds: Vec<usize> = bonds.into_iter().collect();
            let (sub, _) = graph.induced_substructure(mol, &bonds);
            let text = graph.canonical_text(&sub, None, true);
            out.push(text, ring.into_iter().collect());
        }
    }

    let atom_count = graph.atom_count(mol);

    if cfg.min_radius == 0 {
        for atom in 0..atom_count {
            out.push(graph.atom_pattern(mol, atom), BTreeSet::from([atom]));
        }
    }

    let first_radius = cfg.min_radius.max(1);
    for atom in 0..atom_count {
        for r in first_radius..=cfg.radius {
            let env = graph.atom_environment(mol, r, atom);
            let (sub, atom_map) = graph.induced_substructure(mol, &env);
            let Some(&root) = atom_map.get(&atom) else {
                continue;
            };
            let text = graph.canonical_text(&sub, Some(root), true);
            if text.is_empty() {
                continue;
            }
            out.push(text, parent_atoms(&atom_map));
        }
    }

    out
}

fn parent_atoms(atom_map: &BTreeMap<usize, usize>) -> BTreeSet<usize> {
    atom_map.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use molgraph::SmilesGraph;

    fn shingle(smiles: &str, cfg: &EncoderConfig) -> MoleculeShingling {
        let graph = SmilesGraph::new();
        let mol = graph.parse(smiles).unwrap();
        shingle_molecule(&graph, &mol, cfg)
    }

    #[test]
    fn radius_zero_gives_atom_patterns() {
        let cfg = EncoderConfig::new().with_radius(0).with_rings(false);
        let out = shingle("CCO", &cfg);
        let expected: BTreeSet<String> = ["[CH3]", "[CH2]", "[OH]"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(out.shingles, expected);
        assert_eq!(out.atom_indices["[CH2]"], vec![BTreeSet::from([1])]);
    }

    #[test]
    fn symmetric_atoms_keep_every_index_set() {
        let cfg = EncoderConfig::new().with_radius(1).with_rings(false);
        let out = shingle("CC", &cfg);
        // One atom shingle and one rooted fragment, each seen from both atoms.
        assert_eq!(out.shingles.len(), 2);
        assert_eq!(
            out.atom_indices["[CH3]"],
            vec![BTreeSet::from([0]), BTreeSet::from([1])]
        );
        assert_eq!(
            out.atom_indices["[CH3][CH3]"],
            vec![BTreeSet::from([0, 1]), BTreeSet::from([0, 1])]
        );
    }

    #[test]
    fn fragments_are_rooted() {
        let cfg = EncoderConfig::new().with_radius(1).with_rings(false);
        let out = shingle("CCO", &cfg);
        assert!(out.shingles.contains("[OH][CH2]"));
        assert!(out.shingles.contains("[CH3][CH2]"));
        assert_eq!(out.atom_indices["[OH][CH2]"], vec![BTreeSet::from([1, 2])]);
    }

    #[test]
    fn rings_are_shingled_with_ring_atoms() {
        let cfg = EncoderConfig::new().with_radius(0).with_min_radius(0);
        let out = shingle("C1CC1", &cfg);
        assert!(out.shingles.contains("[CH2]1[CH2][CH2]1"));
        assert_eq!(
            out.atom_indices["[CH2]1[CH2][CH2]1"],
            vec![BTreeSet::from([0, 1, 2])]
        );

        let no_rings = shingle("C1CC1", &cfg.clone().with_rings(false));
        assert!(!no_rings.shingles.contains("[CH2]1[CH2][CH2]1"));
    }

    #[test]
    fn min_radius_drops_atoms_and_small_fragments() {
        let cfg = EncoderConfig::new()
            .with_radius(2)
            .with_min_radius(2)
            .with_rings(false);
        let out = shingle("CCO", &cfg);
        assert!(!out.shingles.contains("[CH3]"));
        assert!(!out.shingles.contains("[OH][CH2]"));
        // Only the terminal atoms reach radius 2.
        assert_eq!(out.shingles.len(), 2);
        assert!(out.shingles.contains("[OH][CH2][CH3]"));
        assert!(out.shingles.contains("[CH3][CH2][OH]"));
    }

    #[test]
    fn min_radius_keeps_rings() {
        let cfg = EncoderConfig::new().with_radius(2).with_min_radius(2);
        let out = shingle("C1CC1", &cfg);
        assert!(out.shingles.contains("[CH2]1[CH2][CH2]1"));
        // The ring comes first; radius-2 fragments of the same ring may follow.
        let sets = &out.atom_indices["[CH2]1[CH2][CH2]1"];
        assert_eq!(sets[0], BTreeSet::from([0, 1, 2]));
        assert!(sets.iter().all(|set| *set == BTreeSet::from([0, 1, 2])));
        assert!(!out.shingles.contains("[CH2]"));
    }

    #[test]
    fn radius_beyond_molecule_adds_nothing() {
        let small = EncoderConfig::new().with_radius(1).with_rings(false);
        let large = EncoderConfig::new().with_radius(5).with_rings(false);
        let a = shingle("CO", &small);
        let b = shingle("CO", &large);
        assert_eq!(a.shingles, b.shingles);
    }

    #[test]
    fn empty_molecule_has_no_shingles() {
        let out = shingle("", &EncoderConfig::default());
        assert!(out.shingles.is_empty());
        assert!(out.atom_indices.is_empty());
    }
}
