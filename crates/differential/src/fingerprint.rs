//! Fingerprint, reverse-map and metadata types for the differential layer.
//!
//! The fingerprint schema and metadata are part of the public contract: any
//! incompatible change must result in a new `differential_version`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Shingle text -> every atom-index set that produced it within one molecule.
///
/// Sets are kept in generation order and are not deduplicated: symmetric
/// environments contribute one entry each.
pub type AtomIndexMap = BTreeMap<String, Vec<BTreeSet<usize>>>;

/// Folded bit -> one entry per delta shingle that set it, for one molecule.
///
/// Each entry holds that shingle's atom-index sets, so shingles colliding on
/// the same bit stay separate.
pub type BitAtomMap = BTreeMap<usize, Vec<Vec<BTreeSet<usize>>>>;

/// Folded bit -> every shingle that set it anywhere in a batch.
pub type BitShingleMap = BTreeMap<usize, BTreeSet<String>>;

/// A value per molecule, split by reaction side.
///
/// Positions follow the molecule order of the reaction string, with reagents
/// appended to the reactants.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sided<T> {
    pub reactants: Vec<T>,
    pub products: Vec<T>,
}

impl<T> Sided<T> {
    pub fn new() -> Self {
        Self {
            reactants: Vec::new(),
            products: Vec::new(),
        }
    }

    /// Apply `f` to every entry, keeping side and position.
    pub fn map<U, F>(&self, mut f: F) -> Sided<U>
    where
        F: FnMut(&T) -> U,
    {
        Sided {
            reactants: self.reactants.iter().map(&mut f).collect(),
            products: self.products.iter().map(&mut f).collect(),
        }
    }
}

impl<T> Default for Sided<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Folded differential fingerprint of one reaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReactionFingerprint {
    /// Folded bit vector, one `0`/`1` byte per position.
    pub bits: Vec<u8>,
    /// Folded position of every delta shingle, aligned with `hashes` and
    /// `shingles`. May contain repeats when hashes collide.
    ///
    /// Emptied when intermediates are not requested.
    pub on_bits: Vec<usize>,
    /// 32-bit hash of every delta shingle.
    pub hashes: Vec<u32>,
    /// The delta shingles, sorted by text.
    pub shingles: Vec<String>,
}

impl ReactionFingerprint {
    /// Length of the folded vector.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Number of set positions in the folded vector.
    pub fn on_bit_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b != 0).count()
    }

    /// Sorted, deduplicated set positions, recomputed from `bits`.
    pub fn set_positions(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| (b != 0).then_some(i))
            .collect()
    }
}

/// Tanimoto (Jaccard) similarity of two folded fingerprints.
///
/// Returns `None` when the lengths differ. Two all-zero vectors score `1.0`.
pub fn tanimoto(a: &ReactionFingerprint, b: &ReactionFingerprint) -> Option<f64> {
    if a.bits.len() != b.bits.len() {
        return None;
    }
    let mut both = 0usize;
    let mut either = 0usize;
    for (&x, &y) in a.bits.iter().zip(&b.bits) {
        let (x, y) = (x != 0, y != 0);
        if x && y {
            both += 1;
        }
        if x || y {
            either += 1;
        }
    }
    if either == 0 {
        return Some(1.0);
    }
    Some(both as f64 / either as f64)
}

/// Metadata for traceability and determinism.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintMeta {
    /// Differential algorithm version, bumped whenever shingling, hashing or
    /// folding changes in a way that can affect fingerprints.
    pub differential_version: u16,
    /// Human-readable algorithm identifier.
    pub algorithm_name: String,
    pub radius: usize,
    pub min_radius: usize,
    pub include_rings: bool,
    pub folded_length: usize,
    /// Whether the batch was encoded on the rayon pool.
    pub use_parallel: bool,
    /// Configuration schema version supplied for this encoding.
    pub config_version: u32,
}

/// Output of one batch encode call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BatchEncoding {
    /// One fingerprint per input reaction, in input order.
    pub fingerprints: Vec<ReactionFingerprint>,
    /// Present when the shingle map (or the atom map) was requested.
    pub bit_to_shingles: Option<BitShingleMap>,
    /// Present when the atom map was requested: one entry per reaction, with
    /// `None` at molecules that failed to parse.
    pub bit_to_atoms: Option<Vec<Sided<Option<BitAtomMap>>>>,
    pub meta: FingerprintMeta,
}
