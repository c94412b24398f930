// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor compute kernels.
//!
//! Each operation works on pre-allocated output buffers to avoid heap
//! allocations in the inference hot path.

mod activation_ops;
mod argmax_op;
mod conv3d_op;
mod normalize_op;

pub use activation_ops::{elu, leaky_relu, relu, sigmoid, tanh, DEFAULT_NEGATIVE_SLOPE};
pub use argmax_op::argmax_channels;
pub use conv3d_op::{conv3d, conv3d_output_shape, Conv3dParams};
pub use normalize_op::normalize_unit;
