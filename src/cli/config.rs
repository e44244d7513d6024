//! TOML configuration file support.
//!
//! The calibration line location moves between acquisition-software
//! versions and the converter tuning occasionally needs adjusting, so both
//! live in an optional config file rather than in code:
//!
//! ```toml
//! # msextract.toml
//! [calibration]
//! file = "_extern.inf"
//! line = 2
//! marker = "Cal Function 1"
//!
//! [converter]
//! ms_bin = 0.0
//! im_bin = 5.0
//! aux_im_file = "IM-data.txt"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use msextract::calibration::CalibrationSettings;
use msextract::convert::ConverterSettings;

/// Root configuration structure for msextract.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where each acquisition's calibration line lives.
    #[serde(default)]
    pub calibration: CalibrationSettings,

    /// External converter tuning.
    #[serde(default)]
    pub converter: ConverterSettings,
}

impl Config {
    /// Load configuration from an optional TOML file; `None` yields the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
