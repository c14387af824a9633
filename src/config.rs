//! YAML configuration file support.
//!
//! A single YAML file carries the tokenizer, comparison, and output settings
//! for a run, so repeated screenings use identical parameters without
//! repeating flags.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "coursework screening"
//!
//! tokenize:
//!   version: 1
//!   normalize_unicode: true
//!   lowercase: true
//!   strip_punctuation: false
//!
//! comparison:
//!   block_size: 2
//!
//! output:
//!   root: "results"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use docsim_extract::TokenizeConfig;

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
pub struct DocsimConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Tokenizer configuration
    #[serde(default)]
    pub tokenize: TokenizeYamlConfig,

    /// Comparison configuration
    #[serde(default)]
    pub comparison: ComparisonYamlConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputYamlConfig,
}

impl DocsimConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: DocsimConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.tokenize.validate()?;
        self.comparison.validate()?;

        Ok(())
    }
}

impl Default for DocsimConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            tokenize: TokenizeYamlConfig::default(),
            comparison: ComparisonYamlConfig::default(),
            output: OutputYamlConfig::default(),
        }
    }
}

/// Tokenizer YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizeYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "true_value")]
    pub normalize_unicode: bool,

    #[serde(default = "true_value")]
    pub lowercase: bool,

    #[serde(default)]
    pub strip_punctuation: bool,
}

impl TokenizeYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "tokenize.version must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert into the extractor's tokenizer settings.
    pub fn to_tokenize_config(&self) -> TokenizeConfig {
        TokenizeConfig {
            version: self.version,
            normalize_unicode: self.normalize_unicode,
            strip_punctuation: self.strip_punctuation,
            lowercase: self.lowercase,
        }
    }
}

impl Default for TokenizeYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            normalize_unicode: true,
            lowercase: true,
            strip_punctuation: false,
        }
    }
}

/// Comparison YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonYamlConfig {
    #[serde(default = "default_block_size")]
    pub block_size: usize,
}

impl ComparisonYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.block_size == 0 {
            return Err(ConfigLoadError::Validation(
                "comparison.block_size must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ComparisonYamlConfig {
    fn default() -> Self {
        Self { block_size: 2 }
    }
}

/// Output YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputYamlConfig {
    #[serde(default = "default_output_root")]
    pub root: PathBuf,
}

impl Default for OutputYamlConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
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
fn default_block_size() -> usize {
    2
}
fn default_output_root() -> PathBuf {
    PathBuf::from("results")
}
