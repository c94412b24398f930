// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # model-ir
//!
//! A lightweight intermediate representation (IR) for TF.js-exported 3D
//! convolutional segmentation models.
//!
//! Rather than depending on a full graph framework, this crate defines the
//! minimal IR the interpreter needs:
//!
//! - [`LayerOp`] / [`LayerDef`] — the two layer kinds the export format
//!   uses in practice (3D convolution and elementwise activation) plus
//!   their configuration.
//! - [`ModelGraph`] — the ordered layer list with a **type-state pattern**
//!   (`Loaded` → `Validated`).
//! - [`ModelLoader`] — loads models from the topology JSON + raw weight
//!   binary pair.
//! - [`WeightBuffer`] — the flat little-endian f32 weight blob, decoded
//!   once and held immutably.
//!
//! # Supported Model Format
//! A model is stored as:
//! - `model.json` — TF.js topology: `modelTopology.model_config.config.layers`,
//!   an ordered list of `{ class_name, config }` entries. The first entry
//!   is the input placeholder and is always skipped.
//! - `model.bin` — concatenated little-endian 32-bit floats, no header,
//!   consumed in file order (kernel then bias, per convolution layer).
//!
//! # Example
//! ```no_run
//! use model_ir::ModelLoader;
//! use std::path::Path;
//!
//! let (graph, weights) =
//!     ModelLoader::load(Path::new("model.json"), Path::new("model.bin")).unwrap();
//! println!("{}", graph.summary());
//! assert_eq!(weights.len(), graph.expected_weight_len());
//! ```

mod error;
pub mod graph;
mod layer;
mod loader;
mod topology;

pub use error::ModelError;
pub use graph::ModelGraph;
pub use layer::{ActivationKind, ConvSpec, LayerDef, LayerOp};
pub use loader::{ModelLoader, WeightBuffer};
pub use topology::parse_topology;
