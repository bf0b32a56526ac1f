//! YAML Configuration File Support for RXNFP
//!
//! This module loads the encoder settings from a YAML file so batch jobs can
//! pin their fingerprint parameters next to the data they produce.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # RXNFP Configuration
//! version: "1.0"
//! name: "drfp6-2048"
//!
//! encoder:
//!   version: 1
//!   radius: 3
//!   min_radius: 0
//!   include_rings: true
//!   folded_length: 2048
//!   bit_to_shingle_map: false
//!   bit_to_atom_map: false
//!   use_parallel: true
//!   include_intermediates: false
//! ```

use std::fs;
use std::path::Path;

use differential::EncoderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RxnfpConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Differential encoder configuration
    #[serde(default)]
    pub encoder: EncoderYamlConfig,
}

impl RxnfpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: RxnfpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.encoder.validate()?;

        Ok(())
    }
}

impl Default for RxnfpConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            encoder: EncoderYamlConfig::default(),
        }
    }
}

/// Differential encoder YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_radius")]
    pub radius: usize,

    #[serde(default)]
    pub min_radius: usize,

    #[serde(default = "true_value")]
    pub include_rings: bool,

    #[serde(default = "default_folded_length")]
    pub folded_length: usize,

    #[serde(default)]
    pub bit_to_shingle_map: bool,

    #[serde(default)]
    pub bit_to_atom_map: bool,

    #[serde(default)]
    pub use_parallel: bool,

    #[serde(default = "true_value")]
    pub include_intermediates: bool,
}

impl EncoderYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "encoder.version must be >= 1".to_string(),
            ));
        }
        if self.folded_length == 0 {
            return Err(ConfigLoadError::Validation(
                "encoder.folded_length must be >= 1".to_string(),
            ));
        }
        if self.min_radius > self.radius {
            return Err(ConfigLoadError::Validation(format!(
                "encoder.min_radius ({}) must be <= encoder.radius ({})",
                self.min_radius, self.radius
            )));
        }
        Ok(())
    }

    /// The runtime encoder parameters for this section.
    pub fn to_encoder_config(&self) -> EncoderConfig {
        EncoderConfig {
            version: self.version,
            radius: self.radius,
            min_radius: self.min_radius,
            include_rings: self.include_rings,
            folded_length: self.folded_length,
            bit_to_shingle_map: self.bit_to_shingle_map,
            bit_to_atom_map: self.bit_to_atom_map,
            use_parallel: self.use_parallel,
            include_intermediates: self.include_intermediates,
        }
    }
}

impl Default for EncoderYamlConfig {
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

impl From<&EncoderConfig> for EncoderYamlConfig {
    fn from(cfg: &EncoderConfig) -> Self {
        Self {
            version: cfg.version,
            radius: cfg.radius,
            min_radius: cfg.min_radius,
            include_rings: cfg.include_rings,
            folded_length: cfg.folded_length,
            bit_to_shingle_map: cfg.bit_to_shingle_map,
            bit_to_atom_map: cfg.bit_to_atom_map,
            use_parallel: cfg.use_parallel,
            include_intermediates: cfg.include_intermediates,
        }
    }
}

// Helper functions for serde defaults
fn default_version() -> u32 {
    1
}
fn true_value() -> bool {
    true
}
fn default_radius() -> usize {
    3
}
fn default_folded_length() -> usize {
    2048
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
encoder:
  radius: 2
  folded_length: 1024
"#;

        let config = RxnfpConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.encoder.radius, 2);
        assert_eq!(config.encoder.folded_length, 1024);
        // Unset fields fall back to the encoder defaults.
        assert!(config.encoder.include_rings);
        assert_eq!(config.encoder.min_radius, 0);
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
encoder:
  version: 1
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = RxnfpConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.version, "1");
        assert_eq!(config.encoder.to_encoder_config(), EncoderConfig::default());
    }

    #[test]
    fn test_missing_file() {
        let result = RxnfpConfig::from_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }

    #[test]
    fn test_default_config() {
        let config = RxnfpConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.encoder.to_encoder_config(), EncoderConfig::default());
    }

    #[test]
    fn test_unsupported_version() {
        let result = RxnfpConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_encoder_validation() {
        let yaml = r#"
version: "1.0"
encoder:
  folded_length: 0
"#;
        let result = RxnfpConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("folded_length must be >= 1"));

        let yaml = r#"
version: "1.0"
encoder:
  radius: 1
  min_radius: 2
"#;
        let result = RxnfpConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("min_radius"));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = RxnfpConfig::from_yaml("version: [unterminated");
        assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let cfg = EncoderConfig::new()
            .with_radius(2)
            .with_bit_to_atom_map(true)
            .with_parallel(true);
        let config = RxnfpConfig {
            version: "1.0".to_string(),
            name: Some("roundtrip".to_string()),
            encoder: EncoderYamlConfig::from(&cfg),
        };

        let yaml = config.to_yaml().unwrap();
        let loaded = RxnfpConfig::from_yaml(&yaml).unwrap();
        assert_eq!(loaded.name.as_deref(), Some("roundtrip"));
        assert_eq!(loaded.encoder.to_encoder_config(), cfg);
    }
}
