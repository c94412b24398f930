// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model graph: the ordered layer list the interpreter walks.
//!
//! # Type-State Pattern
//!
//! The graph transitions through states enforced at compile time:
//!
//! ```text
//! ModelGraph<Loaded>     — layers parsed, not yet checked.
//!       │  .validate()
//!       ▼
//! ModelGraph<Validated>  — structure verified, ready for the interpreter.
//! ```
//!
//! The interpreter only accepts a `Validated` graph, so a malformed
//! topology can never reach the forward pass. The transition consumes the
//! old state and returns the new one at zero runtime cost — the marker
//! types are `PhantomData` (ZST).

use crate::{LayerDef, LayerOp, ModelError};
use std::fmt;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: graph has been parsed but not validated.
#[derive(Debug, Clone)]
pub struct Loaded;

/// Marker: graph has been validated and is ready for interpretation.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for graph states.
pub trait GraphState: fmt::Debug + Clone {}
impl GraphState for Loaded {}
impl GraphState for Validated {}

// ── ModelGraph ─────────────────────────────────────────────────────

/// The model as an ordered sequence of layers (a linear chain — the
/// export format has no branches). The generic parameter `S` encodes the
/// validation state at compile time.
#[derive(Debug, Clone)]
pub struct ModelGraph<S: GraphState = Loaded> {
    /// Model name from the topology (or `"model"`).
    pub name: String,
    /// Ordered list of layer definitions.
    pub layers: Vec<LayerDef>,
    /// State marker (zero-sized, compile-time only).
    _state: std::marker::PhantomData<S>,
}

// ── Loaded state ───────────────────────────────────────────────────

impl ModelGraph<Loaded> {
    /// Creates a new graph in the `Loaded` state.
    pub fn new(name: String, layers: Vec<LayerDef>) -> Self {
        Self {
            name,
            layers,
            _state: std::marker::PhantomData,
        }
    }

    /// Validates the graph and transitions to the `Validated` state.
    ///
    /// # Checks
    /// - The graph is non-empty (a topology holding only the input
    ///   placeholder has nothing to execute).
    /// - Layer indices are consecutive starting from 0.
    /// - Every convolution has a cubic kernel — the flat-buffer reshape
    ///   assumes all three kernel dimensions are equal, and an
    ///   anisotropic kernel would silently mis-slice the weight buffer.
    /// - Kernel dims, filters, strides, and dilation are all nonzero.
    pub fn validate(self) -> Result<ModelGraph<Validated>, ModelError> {
        if self.layers.is_empty() {
            return Err(ModelError::InvalidGraph(
                "model graph contains no executable layers".into(),
            ));
        }

        for (i, layer) in self.layers.iter().enumerate() {
            if layer.index != i {
                return Err(ModelError::InvalidLayer {
                    layer: layer.name.clone(),
                    detail: format!("expected index {i}, got {}", layer.index),
                });
            }

            if let LayerOp::Conv3d(spec) = &layer.op {
                if !spec.is_cubic() {
                    return Err(ModelError::InvalidLayer {
                        layer: layer.name.clone(),
                        detail: format!(
                            "anisotropic kernel {:?} is not supported",
                            spec.kernel_size
                        ),
                    });
                }
                if spec.filters == 0 || spec.kernel_size[0] == 0 {
                    return Err(ModelError::InvalidLayer {
                        layer: layer.name.clone(),
                        detail: "filters and kernel size must be nonzero".into(),
                    });
                }
                if spec.strides[0] == 0 || spec.dilation_rate[0] == 0 {
                    return Err(ModelError::InvalidLayer {
                        layer: layer.name.clone(),
                        detail: "stride and dilation must be nonzero".into(),
                    });
                }
            }
        }

        Ok(ModelGraph {
            name: self.name,
            layers: self.layers,
            _state: std::marker::PhantomData,
        })
    }
}

// ── Validated state ────────────────────────────────────────────────

impl ModelGraph<Validated> {
    /// Returns the total number of layers.
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Total f32 values the weight buffer must hold: the sum of every
    /// convolution's `filters·in_channels·k³ + filters`, in layer order.
    pub fn expected_weight_len(&self) -> usize {
        self.layers.iter().map(|l| l.weight_count()).sum()
    }

    /// Output channel count of the final convolution (the number of
    /// segmentation classes), if the graph has one.
    pub fn output_channels(&self) -> Option<usize> {
        self.layers.iter().rev().find_map(|l| match &l.op {
            LayerOp::Conv3d(spec) => Some(spec.filters),
            _ => None,
        })
    }

    /// Returns an iterator over the layers in execution order.
    pub fn iter_layers(&self) -> impl Iterator<Item = &LayerDef> {
        self.layers.iter()
    }

    /// Returns a reference to a layer by index.
    pub fn layer(&self, index: usize) -> Option<&LayerDef> {
        self.layers.get(index)
    }

    /// Returns a summary string describing the model.
    pub fn summary(&self) -> String {
        let convs = self
            .layers
            .iter()
            .filter(|l| matches!(l.op, LayerOp::Conv3d(_)))
            .count();
        format!(
            "Model '{}': {} layers ({} convolutions), {} weight values expected",
            self.name,
            self.num_layers(),
            convs,
            self.expected_weight_len(),
        )
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: GraphState> fmt::Display for ModelGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ModelGraph '{}' ({} layers):", self.name, self.layers.len())?;
        for layer in &self.layers {
            writeln!(f, "  {}", layer.summary())?;
        }
        Ok(())
    }
}
