// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! model_topology = "./model.json"
//! model_weights = "./model.bin"
//! input_volume = "./t1_crop.nii.gz"
//! output_volume = "./output.nii.gz"
//! enable_profiling = true
//! ```

use std::path::{Path, PathBuf};

/// Configuration for the segmentation runtime.
///
/// The defaults match the conventional export layout: topology and
/// weights next to each other, a cropped T1 volume as input, and the
/// mask written beside it.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RuntimeConfig {
    /// Path to the topology JSON.
    pub model_topology: PathBuf,
    /// Path to the raw little-endian f32 weight binary.
    pub model_weights: PathBuf,
    /// Path to the input NIfTI volume.
    pub input_volume: PathBuf,
    /// Path the output label mask is written to.
    pub output_volume: PathBuf,
    /// Whether to record per-layer profiling metrics.
    #[serde(default = "default_true")]
    pub enable_profiling: bool,
}

fn default_true() -> bool {
    true
}

impl RuntimeConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model_topology: PathBuf::from("model.json"),
            model_weights: PathBuf::from("model.bin"),
            input_volume: PathBuf::from("t1_crop.nii.gz"),
            output_volume: PathBuf::from("output.nii.gz"),
            enable_profiling: true,
        }
    }
}
