//! Engine configuration, loadable from JSON.
//!
//! Every field has a default, so `{}` is a complete configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tuning for the WAV import resampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Time nudge, in ms, applied to each output frame when the source
    /// rate differs from 44100 Hz: added on even frames, subtracted on odd
    /// ones. Spreads truncation error across neighbouring source frames.
    /// Zero disables it.
    pub bias_ms: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        ResampleConfig { bias_ms: 0.01 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resample: ResampleConfig,
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
