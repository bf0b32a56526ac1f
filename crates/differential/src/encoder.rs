//! Batch encoder and reverse-map bookkeeping.
//!
//! [`DifferentialEncoder`] owns a graph service and a validated
//! [`EncoderConfig`]. Reactions are independent, so a batch can fan out over
//! the rayon pool; results are gathered back in input order before the
//! optional bit maps are accumulated on the calling thread.

use std::time::Instant;

use molgraph::{MolecularGraph, SmilesGraph};
use rayon::prelude::*;
use tracing::{info, warn, Level};

use crate::config::{DifferentialError, EncoderConfig};
use crate::fingerprint::{
    AtomIndexMap, BatchEncoding, BitAtomMap, BitShingleMap, FingerprintMeta, ReactionFingerprint,
    Sided,
};
use crate::fold::fold;
use crate::reaction::{differentiate, ReactionDelta};
use crate::{DIFFERENTIAL_ALGORITHM, DIFFERENTIAL_VERSION};

/// Differential reaction fingerprint encoder.
#[derive(Debug, Clone)]
pub struct DifferentialEncoder<G = SmilesGraph> {
    graph: G,
    cfg: EncoderConfig,
}

impl DifferentialEncoder<SmilesGraph> {
    /// Encoder backed by the built-in SMILES graph service.
    pub fn new(cfg: EncoderConfig) -> Result<Self, DifferentialError> {
        Self::with_graph(SmilesGraph::new(), cfg)
    }
}

/// One reaction after folding, before intermediates are dropped.
struct Encoded {
    fingerprint: ReactionFingerprint,
    atom_indices: Sided<Option<AtomIndexMap>>,
}

impl<G> DifferentialEncoder<G>
where
    G: MolecularGraph + Sync,
{
    /// Encoder over any graph service. The config is validated here once.
    pub fn with_graph(graph: G, cfg: EncoderConfig) -> Result<Self, DifferentialError> {
        cfg.validate()?;
        Ok(Self { graph, cfg })
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.cfg
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn meta(&self) -> FingerprintMeta {
        FingerprintMeta {
            differential_version: DIFFERENTIAL_VERSION,
            algorithm_name: DIFFERENTIAL_ALGORITHM.to_string(),
            radius: self.cfg.radius,
            min_radius: self.cfg.min_radius,
            include_rings: self.cfg.include_rings,
            folded_length: self.cfg.folded_length,
            use_parallel: self.cfg.use_parallel,
            config_version: self.cfg.version,
        }
    }

    /// Unfolded delta of one reaction.
    pub fn delta(&self, reaction: &str) -> Result<ReactionDelta, DifferentialError> {
        differentiate(&self.graph, reaction, &self.cfg)
    }

    /// Encode one reaction.
    pub fn encode(&self, reaction: &str) -> Result<ReactionFingerprint, DifferentialError> {
        let start = Instant::now();
        match self.encode_one(reaction) {
            Ok(encoded) => {
                let fingerprint = self.finish(encoded.fingerprint);
                info!(
                    on_bits = fingerprint.on_bit_count(),
                    elapsed_micros = start.elapsed().as_micros(),
                    "encode_success"
                );
                Ok(fingerprint)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "encode_failure"
                );
                Err(err)
            }
        }
    }

    /// Encode a batch of reactions, in input order.
    ///
    /// A malformed reaction aborts the whole call; molecules that fail to
    /// parse only lose their own shingles.
    pub fn encode_batch<I, S>(&self, reactions: I) -> Result<BatchEncoding, DifferentialError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str> + Sync,
    {
        let start = Instant::now();
        let inputs: Vec<S> = reactions.into_iter().collect();

        let span = tracing::span!(
            Level::INFO,
            "differential.encode_batch",
            reactions = inputs.len(),
            parallel = self.cfg.use_parallel
        );
        let _guard = span.enter();

        let results: Vec<Result<Encoded, DifferentialError>> = if self.cfg.use_parallel {
            inputs
                .par_iter()
                .map(|r| self.encode_one(r.as_ref()))
                .collect()
        } else {
            inputs.iter().map(|r| self.encode_one(r.as_ref())).collect()
        };

        let mut maps = BitMaps::for_config(&self.cfg);
        let mut fingerprints = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            let encoded = match result {
                Ok(encoded) => encoded,
                Err(err) => {
                    warn!(
                        index,
                        error = %err,
                        elapsed_micros = start.elapsed().as_micros(),
                        "encode_batch_failure"
                    );
                    return Err(err);
                }
            };
            maps.record(&encoded);
            fingerprints.push(self.finish(encoded.fingerprint));
        }

        info!(
            reactions = fingerprints.len(),
            mapped_bits = maps.shingles.as_ref().map_or(0, |m| m.len()),
            elapsed_micros = start.elapsed().as_micros(),
            "encode_batch_success"
        );

        Ok(BatchEncoding {
            fingerprints,
            bit_to_shingles: maps.shingles,
            bit_to_atoms: maps.atoms,
            meta: self.meta(),
        })
    }

    fn encode_one(&self, reaction: &str) -> Result<Encoded, DifferentialError> {
        let ReactionDelta {
            hashes,
            shingles,
            atom_indices,
        } = differentiate(&self.graph, reaction, &self.cfg)?;
        let (bits, on_bits) = fold(&hashes, self.cfg.folded_length);
        Ok(Encoded {
            fingerprint: ReactionFingerprint {
                bits,
                on_bits,
                hashes,
                shingles,
            },
            atom_indices,
        })
    }

    fn finish(&self, mut fingerprint: ReactionFingerprint) -> ReactionFingerprint {
        if !self.cfg.include_intermediates {
            fingerprint.on_bits.clear();
            fingerprint.hashes.clear();
            fingerprint.shingles.clear();
        }
        fingerprint
    }
}

/// Reverse maps owned by a single batch call.
struct BitMaps {
    shingles: Option<BitShingleMap>,
    atoms: Option<Vec<Sided<Option<BitAtomMap>>>>,
}

impl BitMaps {
    fn for_config(cfg: &EncoderConfig) -> Self {
        Self {
            shingles: cfg.wants_shingle_map().then(BitShingleMap::new),
            atoms: cfg.bit_to_atom_map.then(Vec::new),
        }
    }

    fn record(&mut self, encoded: &Encoded) {
        let fp = &encoded.fingerprint;
        if let Some(map) = self.shingles.as_mut() {
            for (shingle, &bit) in fp.shingles.iter().zip(&fp.on_bits) {
                map.entry(bit).or_default().insert(shingle.clone());
            }
        }
        if let Some(atoms) = self.atoms.as_mut() {
            atoms.push(bit_atom_maps(fp, &encoded.atom_indices));
        }
    }
}

/// Map each molecule's delta shingles onto folded bits.
///
/// Shingles that cancelled out are absent from the fingerprint and are
/// skipped. Failed molecules stay `None`.
fn bit_atom_maps(
    fp: &ReactionFingerprint,
    atom_indices: &Sided<Option<AtomIndexMap>>,
) -> Sided<Option<BitAtomMap>> {
    atom_indices.map(|molecule| {
        molecule.as_ref().map(|per_shingle| {
            let mut bits = BitAtomMap::new();
            for (shingle, sets) in per_shingle {
                // `fp.shingles` is sorted.
                if let Ok(idx) = fp.shingles.binary_search(shingle) {
                    bits.entry(fp.on_bits[idx])
                        .or_default()
                        .push(sets.clone());
                }
            }
            bits
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn atoms_only() -> EncoderConfig {
        EncoderConfig::new().with_radius(0).with_rings(false)
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let err = DifferentialEncoder::new(EncoderConfig::new().with_folded_length(0));
        assert!(matches!(
            err,
            Err(DifferentialError::InvalidFoldedLength { length: 0 })
        ));
    }

    #[test]
    fn encode_sets_bits_for_delta() {
        let encoder = DifferentialEncoder::new(atoms_only()).unwrap();
        let fp = encoder.encode("CCO>>CC=O").unwrap();
        assert_eq!(fp.len(), 2048);
        assert_eq!(fp.shingles.len(), 4);
        assert_eq!(fp.on_bits.len(), 4);
        // [OH] hashes to 2355295018, which folds to 810.
        assert_eq!(fp.bits[810], 1);
        assert!(fp.on_bits.iter().all(|&b| b < 2048));
    }

    #[test]
    fn intermediates_can_be_dropped() {
        let encoder =
            DifferentialEncoder::new(atoms_only().with_intermediates(false)).unwrap();
        let fp = encoder.encode("CCO>>CC=O").unwrap();
        assert!(fp.hashes.is_empty());
        assert!(fp.shingles.is_empty());
        assert!(fp.on_bits.is_empty());
        assert!(fp.on_bit_count() > 0);
    }

    #[test]
    fn batch_without_maps() {
        let encoder = DifferentialEncoder::new(atoms_only()).unwrap();
        let batch = encoder.encode_batch(["CCO>>CC=O", "CC>>CC"]).unwrap();
        assert_eq!(batch.fingerprints.len(), 2);
        assert!(batch.bit_to_shingles.is_none());
        assert!(batch.bit_to_atoms.is_none());
        assert_eq!(batch.fingerprints[1].on_bit_count(), 0);
        assert_eq!(batch.meta.folded_length, 2048);
        assert_eq!(batch.meta.algorithm_name, DIFFERENTIAL_ALGORITHM);
    }

    #[test]
    fn shingle_map_collects_across_batch() {
        let cfg = atoms_only().with_bit_to_shingle_map(true);
        let encoder = DifferentialEncoder::new(cfg).unwrap();
        let batch = encoder.encode_batch(["CCO>>CC=O", "O>>N"]).unwrap();
        let map = batch.bit_to_shingles.unwrap();
        assert!(map[&810].contains("[OH]"));
        assert!(map.values().any(|s| s.contains("[NH3]")));
        assert!(map.values().any(|s| s.contains("[OH2]")));
        assert!(batch.bit_to_atoms.is_none());
    }

    #[test]
    fn atom_map_implies_shingle_map() {
        let cfg = atoms_only().with_bit_to_atom_map(true);
        let encoder = DifferentialEncoder::new(cfg).unwrap();
        let batch = encoder.encode_batch(["CCO>>CC=O"]).unwrap();
        assert!(batch.bit_to_shingles.is_some());

        let atoms = batch.bit_to_atoms.unwrap();
        assert_eq!(atoms.len(), 1);
        let reactant = atoms[0].reactants[0].as_ref().unwrap();
        // [OH] is atom 2 of ethanol; [CH3] cancelled and is not mapped.
        assert_eq!(reactant[&810], vec![vec![BTreeSet::from([2])]]);
        assert_eq!(reactant.len(), 2);
        let product = atoms[0].products[0].as_ref().unwrap();
        assert_eq!(product.len(), 2);
    }

    #[test]
    fn colliding_shingles_keep_separate_atom_entries() {
        let cfg = atoms_only()
            .with_folded_length(1)
            .with_bit_to_atom_map(true);
        let encoder = DifferentialEncoder::new(cfg).unwrap();
        let batch = encoder.encode_batch(["CCO>>CC=O"]).unwrap();
        let atoms = batch.bit_to_atoms.unwrap();
        let reactant = atoms[0].reactants[0].as_ref().unwrap();
        // [CH2] and [OH] both fold onto bit 0.
        assert_eq!(
            reactant[&0],
            vec![vec![BTreeSet::from([1])], vec![BTreeSet::from([2])]]
        );
    }

    #[test]
    fn atom_map_keeps_failed_molecules_as_none() {
        let cfg = atoms_only().with_bit_to_atom_map(true);
        let encoder = DifferentialEncoder::new(cfg).unwrap();
        let batch = encoder.encode_batch(["CC.C1CC>>CCO"]).unwrap();
        let atoms = batch.bit_to_atoms.unwrap();
        assert!(atoms[0].reactants[0].is_some());
        assert!(atoms[0].reactants[1].is_none());
    }

    #[test]
    fn parallel_matches_sequential() {
        let reactions = [
            "CCO>>CC=O",
            "c1ccccc1>>c1ccccc1Br",
            "CC(=O)O.OCC>[H+]>CC(=O)OCC.O",
            "C1CCCCC1>>C1=CCCCC1",
        ];
        let seq = DifferentialEncoder::new(EncoderConfig::new().with_bit_to_atom_map(true))
            .unwrap()
            .encode_batch(reactions)
            .unwrap();
        let par = DifferentialEncoder::new(
            EncoderConfig::new()
                .with_bit_to_atom_map(true)
                .with_parallel(true),
        )
        .unwrap()
        .encode_batch(reactions)
        .unwrap();

        assert_eq!(seq.fingerprints, par.fingerprints);
        assert_eq!(seq.bit_to_shingles, par.bit_to_shingles);
        assert_eq!(seq.bit_to_atoms, par.bit_to_atoms);
        assert!(par.meta.use_parallel);
    }

    #[test]
    fn batch_reports_first_malformed_reaction() {
        let cfg = atoms_only().with_parallel(true);
        let encoder = DifferentialEncoder::new(cfg).unwrap();
        let err = encoder
            .encode_batch(["CCO>>CC=O", "CCO", "C>C"])
            .unwrap_err();
        assert_eq!(
            err,
            DifferentialError::MalformedReaction {
                reaction: "CCO".to_string()
            }
        );
    }
}
