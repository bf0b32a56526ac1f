//! Workspace umbrella crate for RXNFP differential reaction fingerprints.
//!
//! This crate stitches the molecular graph service and the differential
//! encoder together so callers can go from reaction SMILES to folded
//! fingerprints with a single API entry point, optionally observed by a
//! process-wide [`PipelineMetrics`] recorder.

pub mod config;

pub use crate::config::{ConfigLoadError, EncoderYamlConfig, RxnfpConfig};
pub use differential::{
    BatchEncoding, BitAtomMap, BitShingleMap, DIFFERENTIAL_ALGORITHM, DIFFERENTIAL_VERSION,
    DifferentialEncoder, DifferentialError, EncoderConfig, FingerprintMeta, ReactionDelta,
    ReactionFingerprint, Sided, differentiate, encode_batch, encode_single, fold, hash_shingle,
    tanimoto,
};
pub use molgraph::{MolecularGraph, SmilesError, SmilesGraph, parse_smiles};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

/// Errors that can occur while fingerprinting reactions through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The encoder configuration was rejected before any reaction was read.
    InvalidConfig(DifferentialError),
    /// A reaction could not be encoded.
    Encode(DifferentialError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::InvalidConfig(err) => write!(f, "encoder configuration rejected: {err}"),
            PipelineError::Encode(err) => write!(f, "reaction encoding failed: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::InvalidConfig(err) | PipelineError::Encode(err) => Some(err),
        }
    }
}

impl From<DifferentialError> for PipelineError {
    fn from(value: DifferentialError) -> Self {
        match value {
            DifferentialError::MalformedReaction { .. } => PipelineError::Encode(value),
            _ => PipelineError::InvalidConfig(value),
        }
    }
}

/// Metrics observer for pipeline calls.
pub trait PipelineMetrics: Send + Sync {
    fn record_encode(&self, latency: Duration, result: Result<(), PipelineError>);
    fn record_batch(&self, latency: Duration, reactions: usize, result: Result<(), PipelineError>);
}

/// Install or clear the global pipeline metrics recorder.
pub fn set_pipeline_metrics(recorder: Option<Arc<dyn PipelineMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn PipelineMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn PipelineMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

fn metrics_recorder() -> Option<Arc<dyn PipelineMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

struct MetricsSpan {
    recorder: Arc<dyn PipelineMetrics>,
    start: Instant,
}

impl MetricsSpan {
    fn start() -> Option<Self> {
        metrics_recorder().map(|recorder| Self {
            recorder,
            start: Instant::now(),
        })
    }

    fn record_encode(self, result: Result<(), PipelineError>) {
        self.recorder.record_encode(self.start.elapsed(), result);
    }

    fn record_batch(self, reactions: usize, result: Result<(), PipelineError>) {
        self.recorder
            .record_batch(self.start.elapsed(), reactions, result);
    }
}

/// Fingerprint one reaction SMILES.
pub fn fingerprint_reaction(
    reaction: &str,
    cfg: &EncoderConfig,
) -> Result<ReactionFingerprint, PipelineError> {
    let mut metrics = MetricsSpan::start();
    let result = encode_single(reaction, cfg).map_err(PipelineError::from);
    if let Some(span) = metrics.take() {
        span.record_encode(result.as_ref().map(|_| ()).map_err(|err| err.clone()));
    }
    result
}

/// Fingerprint a batch of reaction SMILES, in input order.
pub fn fingerprint_batch<I, S>(reactions: I, cfg: &EncoderConfig) -> Result<BatchEncoding, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Sync,
{
    let inputs: Vec<S> = reactions.into_iter().collect();
    let count = inputs.len();
    let mut metrics = MetricsSpan::start();
    let result = encode_batch(inputs, cfg).map_err(PipelineError::from);
    if let Some(span) = metrics.take() {
        span.record_batch(count, result.as_ref().map(|_| ()).map_err(|err| err.clone()));
    }
    result
}

/// Fingerprint a batch with the encoder settings of a loaded YAML config.
pub fn fingerprint_batch_with_config<I, S>(
    reactions: I,
    cfg: &RxnfpConfig,
) -> Result<BatchEncoding, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str> + Sync,
{
    fingerprint_batch(reactions, &cfg.encoder.to_encoder_config())
}

const DEMO_REACTIONS: &str = include_str!("../data/demo_reactions.smi");

/// The bundled demo reactions, one reaction SMILES per line.
pub fn demo_reactions() -> Vec<&'static str> {
    DEMO_REACTIONS
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Feed the bundled `demo_reactions.smi` sample through the batch encoder.
/// Useful for demos and integration smoke tests.
pub fn reaction_demo(cfg: &EncoderConfig) -> Result<BatchEncoding, PipelineError> {
    fingerprint_batch(demo_reactions(), cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex, RwLock};
    use std::time::Duration;

    #[test]
    fn fingerprint_reaction_sets_bits() {
        let cfg = EncoderConfig::new().with_radius(0).with_rings(false);
        let fp = fingerprint_reaction("CCO>>CC=O", &cfg).expect("encoding should succeed");
        assert_eq!(fp.len(), 2048);
        assert_eq!(fp.on_bit_count(), 4);
    }

    #[test]
    fn malformed_reaction_maps_to_encode_error() {
        let result = fingerprint_reaction("CCO>CC=O", &EncoderConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::Encode(DifferentialError::MalformedReaction { .. }))
        ));
    }

    #[test]
    fn invalid_config_maps_to_config_error() {
        let cfg = EncoderConfig::new().with_folded_length(0);
        let result = fingerprint_reaction("CCO>>CC=O", &cfg);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
        let err = result.unwrap_err();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("folded_length"));
    }

    #[test]
    fn demo_reactions_encode() {
        let batch = reaction_demo(&EncoderConfig::default()).expect("demo batch");
        assert_eq!(batch.fingerprints.len(), demo_reactions().len());
        assert!(batch.fingerprints.iter().all(|fp| fp.on_bit_count() > 0));
    }

    struct CountingMetrics {
        events: Arc<RwLock<Vec<&'static str>>>,
        batch_sizes: Mutex<Vec<usize>>,
    }

    impl CountingMetrics {
        fn new() -> Self {
            Self {
                events: Arc::new(RwLock::new(Vec::new())),
                batch_sizes: Mutex::new(Vec::new()),
            }
        }

        fn snapshot(&self) -> Vec<&'static str> {
            self.events.read().unwrap().clone()
        }
    }

    impl PipelineMetrics for CountingMetrics {
        fn record_encode(&self, _latency: Duration, result: Result<(), PipelineError>) {
            let label = if result.is_ok() {
                "encode_ok"
            } else {
                "encode_err"
            };
            self.events.write().unwrap().push(label);
        }

        fn record_batch(
            &self,
            _latency: Duration,
            reactions: usize,
            result: Result<(), PipelineError>,
        ) {
            let label = if result.is_ok() {
                "batch_ok"
            } else {
                "batch_err"
            };
            self.events.write().unwrap().push(label);
            self.batch_sizes.lock().unwrap().push(reactions);
        }
    }

    // The recorder is process-wide, so all metrics assertions live in one
    // test to keep them from racing each other.
    #[test]
    fn metrics_recorder_tracks_pipeline_outcome() {
        let metrics = Arc::new(CountingMetrics::new());
        set_pipeline_metrics(Some(metrics.clone()));

        let cfg = EncoderConfig::default();
        assert!(fingerprint_reaction("CCO>>CC=O", &cfg).is_ok());
        assert!(fingerprint_reaction("CCO", &cfg).is_err());
        assert!(fingerprint_batch(["CCO>>CC=O", "C>>N"], &cfg).is_ok());

        set_pipeline_metrics(None);

        let events = metrics.snapshot();
        assert!(events.contains(&"encode_ok"));
        assert!(events.contains(&"encode_err"));
        assert!(events.contains(&"batch_ok"));
        assert!(metrics.batch_sizes.lock().unwrap().contains(&2));
    }
}
