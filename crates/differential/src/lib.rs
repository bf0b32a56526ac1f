//! # RXNFP Differential Fingerprinting
//!
//! Encodes the structural change of a chemical reaction as a fixed-length
//! bit vector. Each molecule is decomposed into canonical substructure texts
//! ("shingles"), the reactant and product shingle sets are combined by
//! symmetric difference, and every surviving shingle is hashed and folded
//! into the vector by modulo indexing.
//!
//! ## Contract
//!
//! - Molecules are only reached through a [`molgraph::MolecularGraph`]
//!   service. This crate treats the canonical texts it returns as opaque.
//! - The output is a pure function of `(reaction, config)`: no clocks, no
//!   randomness, no process state.
//! - A reaction without the `reactants>agents>products` shape is rejected
//!   with [`DifferentialError::MalformedReaction`]. A molecule that fails to
//!   parse is not an error; it just contributes no shingles.
//!
//! ## Pipeline
//!
//! 1. **Shingling**: rings, single atoms and rooted radius fragments.
//! 2. **Differencing**: reagents join the reactants; shingles present on
//!    both sides cancel.
//! 3. **Hashing**: BLAKE2b with a 4-byte digest, read big-endian.
//! 4. **Folding**: `hash % folded_length` sets one bit per shingle.
//!
//! ## Example Usage
//!
//! ```
//! use differential::{encode_single, EncoderConfig};
//!
//! let cfg = EncoderConfig::new().with_radius(0).with_rings(false);
//! let fp = encode_single("CCO>>CC=O", &cfg).unwrap();
//!
//! assert_eq!(fp.len(), 2048);
//! assert!(fp.on_bit_count() > 0);
//! ```

pub mod config;
pub mod encoder;
pub mod fingerprint;
pub mod fold;
pub mod hash;
pub mod reaction;
pub mod shingles;

pub use crate::config::{DifferentialError, EncoderConfig};
pub use crate::encoder::DifferentialEncoder;
pub use crate::fingerprint::{
    tanimoto, AtomIndexMap, BatchEncoding, BitAtomMap, BitShingleMap, FingerprintMeta,
    ReactionFingerprint, Sided,
};
pub use crate::fold::fold;
pub use crate::hash::{hash_shingle, hash_shingles};
pub use crate::reaction::{differentiate, split_reaction, ReactionDelta};
pub use crate::shingles::{shingle_molecule, MoleculeShingling};

/// Current differential algorithm version for this crate.
pub const DIFFERENTIAL_VERSION: u16 = 1;

/// Human-readable algorithm identifier.
pub const DIFFERENTIAL_ALGORITHM: &str = "drfp_blake2b32_mod_v1";

/// Encode one reaction with the built-in SMILES graph service.
pub fn encode_single(
    reaction: &str,
    cfg: &EncoderConfig,
) -> Result<ReactionFingerprint, DifferentialError> {
    DifferentialEncoder::new(cfg.clone())?.encode(reaction)
}

/// Encode a batch of reactions with the built-in SMILES graph service.
///
/// The optional reverse maps are controlled by `cfg.bit_to_shingle_map` and
/// `cfg.bit_to_atom_map`.
pub fn encode_batch<I, S>(reactions: I, cfg: &EncoderConfig) -> Result<BatchEncoding, DifferentialError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Sync,
{
    DifferentialEncoder::new(cfg.clone())?.encode_batch(reactions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_batch_agree() {
        let cfg = EncoderConfig::default();
        let single = encode_single("CC(=O)Cl.OCC>>CC(=O)OCC", &cfg).unwrap();
        let batch = encode_batch(["CC(=O)Cl.OCC>>CC(=O)OCC"], &cfg).unwrap();
        assert_eq!(batch.fingerprints, vec![single]);
    }

    #[test]
    fn no_op_reaction_is_all_zero() {
        let fp = encode_single("CCO>>CCO", &EncoderConfig::default()).unwrap();
        assert_eq!(fp.bits, vec![0u8; 2048]);
        assert!(fp.shingles.is_empty());
    }

    #[test]
    fn custom_length_bounds_on_bits() {
        let cfg = EncoderConfig::new().with_folded_length(64);
        let fp = encode_single("c1ccccc1>>c1ccncc1", &cfg).unwrap();
        assert_eq!(fp.len(), 64);
        assert!(fp.on_bits.iter().all(|&b| b < 64));
        assert!(fp.on_bit_count() > 0);
    }

    #[test]
    fn invalid_config_is_reported() {
        let cfg = EncoderConfig::new().with_radius(0).with_min_radius(1);
        assert!(matches!(
            encode_single("C>>C", &cfg),
            Err(DifferentialError::InvalidMinRadius { .. })
        ));
    }
}
