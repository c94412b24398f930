// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for model loading and IR construction.

/// Errors that can occur when working with model representations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The topology or weight file could not be read.
    #[error("failed to read model file: {0}")]
    FileReadError(#[from] std::io::Error),

    /// The topology JSON is malformed.
    #[error("failed to parse topology: {0}")]
    TopologyParseError(#[from] serde_json::Error),

    /// The topology is missing the expected nesting or a required field.
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    /// A layer definition is invalid (e.g., anisotropic kernel).
    #[error("invalid layer '{layer}': {detail}")]
    InvalidLayer { layer: String, detail: String },

    /// An activation layer names a nonlinearity the engine does not support.
    #[error("unsupported activation '{name}' in layer '{layer}'")]
    UnsupportedActivation { layer: String, name: String },

    /// The weight binary is not a whole number of 32-bit floats.
    #[error("weight file length {len} is not a multiple of 4 bytes")]
    WeightDecodeError { len: usize },

    /// The weight buffer length disagrees with the topology's implied layout.
    #[error(
        "weight buffer length mismatch: topology implies {expected} f32 values, file holds {actual}"
    )]
    WeightLengthMismatch { expected: usize, actual: usize },

    /// The layer list is empty or otherwise malformed as a whole.
    #[error("invalid model graph: {0}")]
    InvalidGraph(String),
}
