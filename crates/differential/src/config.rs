//! Configuration and error types for differential reaction fingerprinting.
//!
//! [`EncoderConfig`] is the single immutable parameter record for one encode
//! call. It is validated once at the entry point; the stages below trust it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Parameters for the differential fingerprint encoder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Configuration schema version.
    ///
    /// Any algorithmic change that can affect the fingerprint must bump this
    /// version.
    pub version: u32,
    /// Largest bond radius of the neighbourhood fragments (3 gives DRFP6).
    pub radius: usize,
    /// Smallest radius reported. At 0, single-atom shingles are included.
    pub min_radius: usize,
    /// Include every minimal ring as its own shingle.
    pub include_rings: bool,
    /// Length of the folded bit vector.
    pub folded_length: usize,
    /// Build the folded bit -> substructure text map across the batch.
    pub bit_to_shingle_map: bool,
    /// Build the per-reaction folded bit -> atom indices map. Implies
    /// `bit_to_shingle_map`.
    pub bit_to_atom_map: bool,
    /// Encode the reactions of a batch on the rayon pool.
    pub use_parallel: bool,
    /// Keep hashes, shingles and on-bits on each fingerprint.
    ///
    /// When `false` they are still computed but cleared from the returned
    /// fingerprints.
    pub include_intermediates: bool,
}

impl EncoderConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_min_radius(mut self, min_radius: usize) -> Self {
        self.min_radius = min_radius;
        self
    }

    pub fn with_rings(mut self, include_rings: bool) -> Self {
        self.include_rings = include_rings;
        self
    }

    /// Set the folded length. Typical values: 256-4096.
    pub fn with_folded_length(mut self, folded_length: usize) -> Self {
        self.folded_length = folded_length;
        self
    }

    pub fn with_bit_to_shingle_map(mut self, enabled: bool) -> Self {
        self.bit_to_shingle_map = enabled;
        self
    }

    pub fn with_bit_to_atom_map(mut self, enabled: bool) -> Self {
        self.bit_to_atom_map = enabled;
        self
    }

    pub fn with_parallel(mut self, use_parallel: bool) -> Self {
        self.use_parallel = use_parallel;
        self
    }

    pub fn with_intermediates(mut self, include_intermediates: bool) -> Self {
        self.include_intermediates = include_intermediates;
        self
    }

    /// Whether the batch should accumulate the bit -> shingle map.
    pub fn wants_shingle_map(&self) -> bool {
        self.bit_to_shingle_map || self.bit_to_atom_map
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), DifferentialError> {
        if self.version < 1 {
            return Err(DifferentialError::InvalidConfigVersion {
                version: self.version,
            });
        }
        if self.folded_length == 0 {
            return Err(DifferentialError::InvalidFoldedLength {
                length: self.folded_length,
            });
        }
        if self.min_radius > self.radius {
            return Err(DifferentialError::InvalidMinRadius {
                min_radius: self.min_radius,
                radius: self.radius,
            });
        }
        Ok(())
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            version: 1,
            radius: 3,
            min_radius: 0,
            include_rings: true,
            folded_length: 2048,
            bit_to_shingle_map: false,
            bit_to_atom_map: false,
            use_parallel: false,
            include_intermediates: true,
        }
    }
}

/// Errors returned by the differential fingerprinting pipeline.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DifferentialError {
    #[error("not a valid reaction SMILES (expected reactants>agents>products): '{reaction}'")]
    MalformedReaction { reaction: String },

    #[error("invalid config version {version}; expected >= 1")]
    InvalidConfigVersion { version: u32 },

    #[error("invalid config: folded_length must be >= 1 (got {length})")]
    InvalidFoldedLength { length: usize },

    #[error("invalid config: min_radius {min_radius} exceeds radius {radius}")]
    InvalidMinRadius { min_radius: usize, radius: usize },
}
