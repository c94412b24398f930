// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Runtime error types.

/// Errors that can occur in the segmentation runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Model loading or validation failed.
    #[error("model error: {0}")]
    ModelError(#[from] model_ir::ModelError),

    /// Volume reading or mask writing failed.
    #[error("volume error: {0}")]
    VolumeError(#[from] volume_io::VolumeError),

    /// A layer computation failed during the forward pass.
    #[error("execution failed in layer '{layer}': {source}")]
    ExecutionError {
        layer: String,
        source: tensor_core::TensorError,
    },

    /// A layer asked for more weight values than the buffer holds.
    #[error("weight buffer exhausted: layer '{layer}' requested {requested} values, {remaining} remaining")]
    WeightBufferExhausted {
        layer: String,
        requested: usize,
        remaining: usize,
    },

    /// Configuration loading or parsing failed.
    #[error("configuration error: {0}")]
    ConfigError(String),
}
