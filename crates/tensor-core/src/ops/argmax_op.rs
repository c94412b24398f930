// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Channel-axis argmax reduction.

use crate::{TensorError, TensorView};

/// Reduces a `[N, C, D, H, W]` activation tensor to per-voxel class
/// indices over the channel axis.
///
/// Returns a flat `Vec<u32>` of length `N·D·H·W` in row-major
/// `[N, D, H, W]` order. Ties resolve to the first (lowest-index)
/// maximum channel.
///
/// # Errors
/// Returns [`TensorError::RankMismatch`] if the input is not rank 5 and
/// [`TensorError::Numeric`] if the channel axis is empty.
pub fn argmax_channels(input: &TensorView<'_>) -> Result<Vec<u32>, TensorError> {
    if input.shape().rank() != 5 {
        return Err(TensorError::RankMismatch {
            op: "argmax_channels",
            expected: 5,
            shape: input.shape().clone(),
        });
    }

    let dims = input.shape().dims();
    let (n, c, voxels) = (dims[0], dims[1], dims[2] * dims[3] * dims[4]);
    if c == 0 {
        return Err(TensorError::Numeric {
            op: "argmax_channels",
            detail: "channel axis is empty".into(),
        });
    }

    let data = input.as_slice();
    let mut labels = Vec::with_capacity(n * voxels);

    for batch in 0..n {
        let base = batch * c * voxels;
        for v in 0..voxels {
            let mut best = 0u32;
            let mut best_val = data[base + v];
            for ch in 1..c {
                let val = data[base + ch * voxels + v];
                // Strict comparison keeps the first maximum on ties.
                if val > best_val {
                    best_val = val;
                    best = ch as u32;
                }
            }
            labels.push(best);
        }
    }

    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Shape, Tensor};

    #[test]
    fn test_two_channels() {
        // Channel 0: [1, 5], channel 1: [3, 2] over a 1x2x1x1x2 tensor.
        let t = Tensor::from_f32(Shape::activation(1, 2, 1, 1, 2), &[1.0, 5.0, 3.0, 2.0]).unwrap();
        let labels = argmax_channels(&t.view()).unwrap();
        assert_eq!(labels, vec![1, 0]);
    }

    #[test]
    fn test_single_channel_is_all_zero() {
        let t = Tensor::from_f32(Shape::activation(1, 1, 2, 1, 1), &[0.3, -4.0]).unwrap();
        assert_eq!(argmax_channels(&t.view()).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_tie_prefers_first_channel() {
        let t = Tensor::from_f32(Shape::activation(1, 3, 1, 1, 1), &[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(argmax_channels(&t.view()).unwrap(), vec![0]);
    }

    #[test]
    fn test_batch_handling() {
        let t = Tensor::from_f32(
            Shape::activation(2, 2, 1, 1, 1),
            &[0.0, 1.0, 2.0, -1.0], // batch 0: ch1 wins; batch 1: ch0 wins
        )
        .unwrap();
        assert_eq!(argmax_channels(&t.view()).unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_rank_rejected() {
        let t = Tensor::zeros(Shape::new(vec![2, 3]));
        assert!(matches!(
            argmax_channels(&t.view()),
            Err(TensorError::RankMismatch { .. })
        ));
    }
}
