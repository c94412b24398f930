// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # tensor-core
//!
//! Tensor types and compute kernels for volumetric segmentation inference.
//!
//! This crate provides:
//! - [`Tensor`] — an owned, contiguous, row-major f32 tensor.
//! - [`Shape`] — runtime shape descriptors with stride computation.
//! - 3D convolution ([`conv3d`]) with symmetric zero padding, stride,
//!   and dilation.
//! - Elementwise activations: [`relu`], [`elu`], [`sigmoid`], [`tanh`],
//!   [`leaky_relu`].
//! - [`argmax_channels`] — per-voxel class reduction over the channel axis.
//! - [`normalize_unit`] — unit-interval rescaling for input volumes.
//!
//! # Design Goals
//! - Operations write into pre-allocated output tensors; no hidden
//!   allocation in the convolution inner loops.
//! - Every kernel validates shapes before touching data.
//! - Clean error types via `thiserror`.

mod error;
mod ops;
mod shape;
mod tensor;

pub use error::TensorError;
pub use ops::{
    argmax_channels, conv3d, conv3d_output_shape, elu, leaky_relu, normalize_unit, relu,
    sigmoid, tanh, Conv3dParams, DEFAULT_NEGATIVE_SLOPE,
};
pub use shape::Shape;
pub use tensor::{Tensor, TensorView};
