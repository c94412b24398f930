// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! TF.js topology JSON parsing.
//!
//! The topology file nests the layer list under
//! `modelTopology.model_config.config.layers`; each entry carries a
//! `class_name` tag and a `config` mapping.
//!
//! # Format
//! ```json
//! {
//!   "modelTopology": {
//!     "model_config": {
//!       "config": {
//!         "name": "meshnet",
//!         "layers": [
//!           { "class_name": "InputLayer", "config": { "name": "input" } },
//!           {
//!             "class_name": "Conv3D",
//!             "config": {
//!               "name": "conv3d_1",
//!               "filters": 21,
//!               "kernel_size": [3, 3, 3],
//!               "strides": [1, 1, 1],
//!               "dilation_rate": [1, 1, 1]
//!             }
//!           },
//!           { "class_name": "Activation", "config": { "activation": "relu" } }
//!         ]
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Parsing rules (export-format semantics, preserved):
//! - The first entry is the input placeholder and is always skipped.
//! - Unrecognized `class_name` tags are skipped without advancing the
//!   input-channel counter; a warning is logged for each.
//! - Per-axis fields (`kernel_size`, `strides`, `dilation_rate`) accept
//!   either a bare integer or a per-axis list.

use crate::graph::{Loaded, ModelGraph};
use crate::{ActivationKind, ConvSpec, LayerDef, LayerOp, ModelError};

/// Input channel count of the first convolution: one-channel volumes.
const INPUT_CHANNELS: usize = 1;

#[derive(Debug, serde::Deserialize)]
struct TopologyFile {
    #[serde(rename = "modelTopology")]
    model_topology: ModelTopology,
}

#[derive(Debug, serde::Deserialize)]
struct ModelTopology {
    model_config: ModelConfig,
}

#[derive(Debug, serde::Deserialize)]
struct ModelConfig {
    config: NetworkConfig,
}

#[derive(Debug, serde::Deserialize)]
struct NetworkConfig {
    #[serde(default)]
    name: Option<String>,
    layers: Vec<RawLayer>,
}

/// A layer entry as stored on disk: a class tag plus an untyped config map.
#[derive(Debug, serde::Deserialize)]
struct RawLayer {
    class_name: String,
    #[serde(default)]
    config: serde_json::Value,
}

/// A per-axis integer field that the export writes either as a scalar
/// or as a list.
#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum PerAxis {
    Uniform(usize),
    List(Vec<usize>),
}

impl PerAxis {
    /// Expands to three axes; a scalar is broadcast, a list shorter than
    /// three entries is padded with its first element.
    fn as_triple(&self) -> Result<[usize; 3], String> {
        match self {
            PerAxis::Uniform(v) => Ok([*v; 3]),
            PerAxis::List(values) => {
                let first = *values.first().ok_or("empty per-axis list")?;
                let mut out = [first; 3];
                for (slot, &v) in out.iter_mut().zip(values.iter()) {
                    *slot = v;
                }
                Ok(out)
            }
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct ConvRawConfig {
    #[serde(default)]
    name: Option<String>,
    filters: usize,
    kernel_size: PerAxis,
    strides: PerAxis,
    dilation_rate: PerAxis,
}

#[derive(Debug, serde::Deserialize)]
struct ActivationRawConfig {
    #[serde(default)]
    name: Option<String>,
    activation: String,
}

/// Parses a topology JSON document into a [`ModelGraph`] in the `Loaded`
/// state.
///
/// The input-channel count of each convolution is resolved here by
/// threading the previous convolution's `filters` through the list,
/// starting from [`INPUT_CHANNELS`].
pub fn parse_topology(json: &str) -> Result<ModelGraph<Loaded>, ModelError> {
    let file: TopologyFile = serde_json::from_str(json)?;
    let network = file.model_topology.model_config.config;

    if network.layers.is_empty() {
        return Err(ModelError::InvalidTopology(
            "topology declares no layers".into(),
        ));
    }

    let mut layers = Vec::new();
    let mut in_channels = INPUT_CHANNELS;

    // The first entry is the input placeholder — always skipped.
    for (position, raw) in network.layers.iter().enumerate().skip(1) {
        match raw.class_name.as_str() {
            "Conv3D" => {
                let config: ConvRawConfig =
                    serde_json::from_value(raw.config.clone()).map_err(|e| {
                        ModelError::InvalidLayer {
                            layer: format!("#{position} (Conv3D)"),
                            detail: format!("bad config: {e}"),
                        }
                    })?;
                let name = config
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("conv3d_{position}"));

                let spec = ConvSpec {
                    in_channels,
                    filters: config.filters,
                    kernel_size: triple(&config.kernel_size, &name, "kernel_size")?,
                    strides: triple(&config.strides, &name, "strides")?,
                    dilation_rate: triple(&config.dilation_rate, &name, "dilation_rate")?,
                };
                in_channels = spec.filters;

                layers.push(LayerDef {
                    name,
                    index: layers.len(),
                    op: LayerOp::Conv3d(spec),
                });
            }
            "Activation" => {
                let config: ActivationRawConfig =
                    serde_json::from_value(raw.config.clone()).map_err(|e| {
                        ModelError::InvalidLayer {
                            layer: format!("#{position} (Activation)"),
                            detail: format!("bad config: {e}"),
                        }
                    })?;
                let name = config
                    .name
                    .clone()
                    .unwrap_or_else(|| format!("activation_{position}"));

                let kind = ActivationKind::from_name(&config.activation).ok_or_else(|| {
                    ModelError::UnsupportedActivation {
                        layer: name.clone(),
                        name: config.activation.clone(),
                    }
                })?;

                layers.push(LayerDef {
                    name,
                    index: layers.len(),
                    op: LayerOp::Activation(kind),
                });
            }
            other => {
                // Skipped layers contribute nothing to the computation and
                // leave the channel counter untouched.
                tracing::warn!(
                    "skipping unsupported layer class '{other}' at position {position}"
                );
            }
        }
    }

    let name = network.name.unwrap_or_else(|| "model".to_string());
    Ok(ModelGraph::new(name, layers))
}

fn triple(field: &PerAxis, layer: &str, field_name: &str) -> Result<[usize; 3], ModelError> {
    field.as_triple().map_err(|detail| ModelError::InvalidLayer {
        layer: layer.to_string(),
        detail: format!("{field_name}: {detail}"),
    })
}
