use std::error::Error;

use rxnfp::{RxnfpConfig, demo_reactions, fingerprint_batch_with_config};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .json()
        .init();

    // An optional YAML file pins the encoder settings.
    let mut config = match std::env::var("RXNFP_CONFIG") {
        Ok(path) => RxnfpConfig::from_file(path)?,
        Err(_) => RxnfpConfig::default(),
    };
    config.encoder.use_parallel = true;

    let reactions = demo_reactions();
    let batch = fingerprint_batch_with_config(&reactions, &config)?;

    for (reaction, fingerprint) in reactions.iter().zip(&batch.fingerprints) {
        println!(
            "{reaction}: {} of {} bits set",
            fingerprint.on_bit_count(),
            fingerprint.len()
        );
    }
    println!("{}", serde_json::to_string_pretty(&batch.meta)?);

    Ok(())
}
