// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Model loading from the topology JSON + raw weight binary pair.
//!
//! The weight file is a headerless concatenation of little-endian 32-bit
//! floats. It is memory-mapped for the decode pass and copied into an
//! immutable [`WeightBuffer`]; the interpreter consumes it through a
//! strictly advancing cursor, never through the mapping itself.

use crate::graph::Validated;
use crate::{parse_topology, ModelError, ModelGraph};
use std::path::Path;

/// The flat weight blob, decoded once into host-order f32 values.
///
/// Immutable after construction. Layer weights are consumed by sequential
/// offset advancement in layer order: per convolution, the kernel block
/// first, then one bias value per output channel.
#[derive(Debug, Clone)]
pub struct WeightBuffer {
    values: Vec<f32>,
}

impl WeightBuffer {
    /// Wraps an already-decoded value vector (used by tests and synthetic
    /// models).
    pub fn from_vec(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Decodes a raw little-endian f32 byte blob.
    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, ModelError> {
        if bytes.len() % 4 != 0 {
            return Err(ModelError::WeightDecodeError { len: bytes.len() });
        }
        let values = bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { values })
    }

    /// Number of f32 values in the buffer.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if the buffer holds no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The full value slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }
}

/// Loads a model from disk into a validated graph plus its weight buffer.
///
/// # Example
/// ```no_run
/// use model_ir::ModelLoader;
/// use std::path::Path;
///
/// let (graph, weights) =
///     ModelLoader::load(Path::new("model.json"), Path::new("model.bin")).unwrap();
/// println!("{}", graph.summary());
/// ```
pub struct ModelLoader;

impl ModelLoader {
    /// Loads and validates a model from the given file pair.
    ///
    /// Steps:
    /// 1. Parse the topology JSON and validate the graph.
    /// 2. Memory-map and decode the weight binary.
    /// 3. Check the buffer length against the topology's implied layout —
    ///    a mismatch fails here with a descriptive error instead of
    ///    surfacing as a slice failure deep in the forward pass.
    pub fn load(
        topology_path: &Path,
        weights_path: &Path,
    ) -> Result<(ModelGraph<Validated>, WeightBuffer), ModelError> {
        let json = std::fs::read_to_string(topology_path)?;
        let graph = parse_topology(&json)?.validate()?;

        let weights = Self::read_weights(weights_path)?;
        tracing::info!(
            "loaded '{}' from {}: {} weight values ({:.2} MB)",
            graph.name,
            weights_path.display(),
            weights.len(),
            (weights.len() * 4) as f64 / (1024.0 * 1024.0),
        );

        Self::check_weight_len(&graph, &weights)?;
        Ok((graph, weights))
    }

    /// Builds a model from in-memory parts (used for testing without
    /// actual model files).
    pub fn from_parts(
        topology_json: &str,
        values: Vec<f32>,
    ) -> Result<(ModelGraph<Validated>, WeightBuffer), ModelError> {
        let graph = parse_topology(topology_json)?.validate()?;
        let weights = WeightBuffer::from_vec(values);
        Self::check_weight_len(&graph, &weights)?;
        Ok((graph, weights))
    }

    /// Memory-maps the weight file and decodes it into a [`WeightBuffer`].
    fn read_weights(path: &Path) -> Result<WeightBuffer, ModelError> {
        let file = std::fs::File::open(path)?;
        // The mapping lives only for the decode pass; the buffer owns a copy.
        let mmap = unsafe { memmap2::Mmap::map(&file) }?;
        WeightBuffer::from_le_bytes(&mmap)
    }

    /// Verifies the buffer length equals the sum of every convolution's
    /// kernel + bias counts, in layer order.
    fn check_weight_len(
        graph: &ModelGraph<Validated>,
        weights: &WeightBuffer,
    ) -> Result<(), ModelError> {
        let expected = graph.expected_weight_len();
        if weights.len() != expected {
            return Err(ModelError::WeightLengthMismatch {
                expected,
                actual: weights.len(),
            });
        }
        Ok(())
    }
}
