// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The segmentation runtime: a straight-line interpreter that walks the
//! model's layer list, consuming the flat weight buffer through a
//! forward-only cursor, and turns an input volume into a per-voxel
//! label mask.
//!
//! ## Pipeline
//! 1. Load the topology + weight pair ([`model_ir::ModelLoader`]).
//! 2. Read the input NIfTI volume ([`volume_io::Volume`]).
//! 3. Normalise intensities to the unit interval.
//! 4. Run each layer: conv3d with export-to-engine kernel remap, or an
//!    elementwise activation.
//! 5. Argmax the class scores per voxel.
//! 6. Write the mask with the input volume's header.

mod config;
mod engine;
mod error;
mod metrics;
mod weights;

pub use config::RuntimeConfig;
pub use engine::{EngineState, Idle, Ready, SegmentationEngine, SegmentationOutput};
pub use error::RuntimeError;
pub use metrics::{InferenceMetrics, LayerMetrics};
pub use weights::{remap_conv_kernel, WeightCursor};
