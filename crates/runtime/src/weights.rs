// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Weight buffer consumption and kernel layout conversion.
//!
//! The weight binary stores each convolution's kernel in export order
//! `[k, k, k, in, out]` followed by its bias vector. The interpreter walks
//! the buffer through a strictly advancing [`WeightCursor`] and permutes
//! every kernel block into the engine order `[out, in, k, k, k]` that
//! [`tensor_core::conv3d`] expects.

/// A forward-only cursor over the decoded weight values.
///
/// The cursor never rewinds. Layer order in the graph is the only thing
/// binding a value range to a layer, so any skipped or reordered
/// consumption would silently corrupt every later layer.
#[derive(Debug)]
pub struct WeightCursor<'a> {
    values: &'a [f32],
    offset: usize,
}

impl<'a> WeightCursor<'a> {
    /// Creates a cursor at the start of the buffer.
    pub fn new(values: &'a [f32]) -> Self {
        Self { values, offset: 0 }
    }

    /// Takes the next `n` values, advancing the cursor.
    ///
    /// Returns `None` if fewer than `n` values remain; the cursor is left
    /// unchanged in that case.
    pub fn take(&mut self, n: usize) -> Option<&'a [f32]> {
        if self.remaining() < n {
            return None;
        }
        let slice = &self.values[self.offset..self.offset + n];
        self.offset += n;
        Some(slice)
    }

    /// Current position in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Values left to consume.
    pub fn remaining(&self) -> usize {
        self.values.len() - self.offset
    }

    /// `true` once every value has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}

/// Permutes a kernel block from export order `[k, k, k, in, out]` to
/// engine order `[out, in, k, k, k]`.
///
/// `block` must hold exactly `out_c · in_c · k³` values.
pub fn remap_conv_kernel(block: &[f32], out_c: usize, in_c: usize, k: usize) -> Vec<f32> {
    debug_assert_eq!(block.len(), out_c * in_c * k * k * k);

    let mut dst = vec![0.0f32; block.len()];
    for z in 0..k {
        for y in 0..k {
            for x in 0..k {
                let tap = (z * k + y) * k + x;
                for i in 0..in_c {
                    let src_base = (tap * in_c + i) * out_c;
                    for o in 0..out_c {
                        let dst_idx = (((o * in_c + i) * k + z) * k + y) * k + x;
                        dst[dst_idx] = block[src_base + o];
                    }
                }
            }
        }
    }
    dst
}
