//! Reaction splitting and the reactant/product symmetric difference.

use std::collections::BTreeSet;

use molgraph::MolecularGraph;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DifferentialError, EncoderConfig};
use crate::fingerprint::{AtomIndexMap, Sided};
use crate::hash::hash_shingles;
use crate::shingles::shingle_molecule;

const SIDE_SEPARATOR: char = '>';
const MOLECULE_SEPARATOR: char = '.';

/// Structural delta of one reaction, before folding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionDelta {
    /// Hash of each delta shingle, aligned with `shingles`.
    pub hashes: Vec<u32>,
    /// Shingles present on exactly one side, sorted by text.
    pub shingles: Vec<String>,
    /// Per-molecule shingle -> atom-index sets; `None` where parsing failed.
    pub atom_indices: Sided<Option<AtomIndexMap>>,
}

/// Split a reaction string into reactant and product molecule texts.
///
/// Reagents (the middle segment) are appended to the reactants when present.
/// Anything after the third segment is ignored.
pub fn split_reaction(reaction: &str) -> Result<(Vec<&str>, Vec<&str>), DifferentialError> {
    let mut sides = reaction.split(SIDE_SEPARATOR);
    let (Some(reactants), Some(reagents), Some(products)) = (sides.next(), sides.next(), sides.next())
    else {
        return Err(DifferentialError::MalformedReaction {
            reaction: reaction.to_string(),
        });
    };

    let mut left: Vec<&str> = reactants.split(MOLECULE_SEPARATOR).collect();
    if !reagents.is_empty() {
        left.extend(reagents.split(MOLECULE_SEPARATOR));
    }
    let right = products.split(MOLECULE_SEPARATOR).collect();
    Ok((left, right))
}

/// Compute the shingle delta between the reactant and product sides.
///
/// A molecule that fails to parse contributes no shingles and leaves `None`
/// at its position in the atom-index record.
pub fn differentiate<G>(
    graph: &G,
    reaction: &str,
    cfg: &EncoderConfig,
) -> Result<ReactionDelta, DifferentialError>
where
    G: MolecularGraph,
{
    let (left, right) = split_reaction(reaction)?;

    let mut atom_indices = Sided::new();
    let (reactant_shingles, reactant_maps) = shingle_side(graph, &left, cfg);
    let (product_shingles, product_maps) = shingle_side(graph, &right, cfg);
    atom_indices.reactants = reactant_maps;
    atom_indices.products = product_maps;

    let shingles: Vec<String> = reactant_shingles
        .symmetric_difference(&product_shingles)
        .cloned()
        .collect();
    let hashes = hash_shingles(&shingles);

    Ok(ReactionDelta {
        hashes,
        shingles,
        atom_indices,
    })
}

fn shingle_side<G>(
    graph: &G,
    molecules: &[&str],
    cfg: &EncoderConfig,
) -> (BTreeSet<String>, Vec<Option<AtomIndexMap>>)
where
    G: MolecularGraph,
{
    let mut union = BTreeSet::new();
    let mut maps = Vec::with_capacity(molecules.len());
    for (position, text) in molecules.iter().enumerate() {
        let Some(mol) = graph.parse(text) else {
            debug!(position, smiles = %text, "molecule_skipped");
            maps.push(None);
            continue;
        };
        let shingling = shingle_molecule(graph, &mol, cfg);
        union.extend(shingling.shingles);
        maps.push(Some(shingling.atom_indices));
    }
    (union, maps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use molgraph::SmilesGraph;

    fn atoms_only() -> EncoderConfig {
        EncoderConfig::new().with_radius(0).with_rings(false)
    }

    #[test]
    fn split_merges_reagents() {
        let (left, right) = split_reaction("CC.O>[Na+]>CCO").unwrap();
        assert_eq!(left, vec!["CC", "O", "[Na+]"]);
        assert_eq!(right, vec!["CCO"]);

        let (left, _) = split_reaction("CC>>CCO").unwrap();
        assert_eq!(left, vec!["CC"]);
    }

    #[test]
    fn split_rejects_missing_sides() {
        for bad in ["CCO", "CCO>CC=O", ""] {
            assert_eq!(
                split_reaction(bad),
                Err(DifferentialError::MalformedReaction {
                    reaction: bad.to_string()
                })
            );
        }
    }

    #[test]
    fn ethanol_to_acetaldehyde_delta() {
        let graph = SmilesGraph::new();
        let delta = differentiate(&graph, "CCO>>CC=O", &atoms_only()).unwrap();
        // [CH3] is on both sides and cancels.
        assert_eq!(delta.shingles, vec!["[CH2]", "[CH]", "[OH]", "[O]"]);
        assert_eq!(delta.hashes.len(), delta.shingles.len());
        assert_eq!(delta.hashes[2], 2_355_295_018);
    }

    #[test]
    fn identical_sides_cancel() {
        let graph = SmilesGraph::new();
        let delta = differentiate(&graph, "c1ccccc1O>>Oc1ccccc1", &EncoderConfig::default())
            .unwrap();
        assert!(delta.shingles.is_empty());
        assert!(delta.hashes.is_empty());
    }

    #[test]
    fn failed_molecule_keeps_position() {
        let graph = SmilesGraph::new();
        let delta = differentiate(&graph, "CC.C1CC.O>>CCO", &atoms_only()).unwrap();
        assert_eq!(delta.atom_indices.reactants.len(), 3);
        assert!(delta.atom_indices.reactants[0].is_some());
        assert!(delta.atom_indices.reactants[1].is_none());
        assert!(delta.atom_indices.reactants[2].is_some());
        assert_eq!(delta.atom_indices.products.len(), 1);
    }

    #[test]
    fn reagents_count_as_reactants() {
        let graph = SmilesGraph::new();
        let with_reagent = differentiate(&graph, "CC>O>CCO", &atoms_only()).unwrap();
        let merged = differentiate(&graph, "CC.O>>CCO", &atoms_only()).unwrap();
        assert_eq!(with_reagent, merged);
    }
}
