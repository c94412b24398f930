// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Unit-interval normalization for input volumes.

use crate::Tensor;

/// Rescales the tensor in place to the unit interval:
/// `x ← (x − min) / (max − min)`.
///
/// A constant tensor (zero range) maps to all zeros rather than NaN.
/// An empty tensor is left untouched.
pub fn normalize_unit(tensor: &mut Tensor) {
    let data = tensor.as_mut_slice();
    if data.is_empty() {
        return;
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &x in data.iter() {
        min = min.min(x);
        max = max.max(x);
    }

    let range = max - min;
    if range == 0.0 {
        data.iter_mut().for_each(|x| *x = 0.0);
        return;
    }

    for x in data.iter_mut() {
        *x = (*x - min) / range;
    }
}
