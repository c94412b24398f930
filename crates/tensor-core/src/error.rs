// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for tensor operations.

use crate::Shape;

/// Errors that can occur during tensor operations.
#[derive(Debug, thiserror::Error)]
pub enum TensorError {
    /// The provided buffer length does not match the expected element count for the shape.
    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Two tensors have incompatible shapes for the requested operation.
    #[error("incompatible shapes for {op}: {lhs} vs {rhs}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// A tensor has the wrong rank for the requested operation.
    #[error("wrong rank for {op}: expected rank {expected}, got shape {shape}")]
    RankMismatch {
        op: &'static str,
        expected: usize,
        shape: Shape,
    },

    /// A numeric computation failed (e.g., empty reduction or degenerate output size).
    #[error("numeric error in {op}: {detail}")]
    Numeric { op: &'static str, detail: String },
}
