// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 3D convolution with symmetric zero padding, stride, and dilation.

use crate::{Shape, Tensor, TensorError, TensorView};

/// Spatial parameters for a 3D convolution.
///
/// All three parameters apply identically to the depth, height, and width
/// axes (isotropic). The export format declares per-axis values, but only
/// the first is honoured by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv3dParams {
    /// Step between successive kernel placements.
    pub stride: usize,
    /// Spacing between kernel taps.
    pub dilation: usize,
    /// Zero padding applied symmetrically on both sides of each spatial axis.
    pub padding: usize,
}

impl Default for Conv3dParams {
    fn default() -> Self {
        Self {
            stride: 1,
            dilation: 1,
            padding: 0,
        }
    }
}

/// Computes the output shape of [`conv3d`] for the given input and kernel.
///
/// Input must be `[N, C, D, H, W]`, weight `[O, I, kd, kh, kw]`. Each
/// spatial output dimension is
/// `(dim + 2·padding − dilation·(k − 1) − 1) / stride + 1`.
///
/// # Errors
/// Returns [`TensorError::RankMismatch`] on wrong ranks,
/// [`TensorError::ShapeMismatch`] if the kernel's input-channel count
/// disagrees with the input, and [`TensorError::Numeric`] if any output
/// dimension would collapse to zero or below.
pub fn conv3d_output_shape(
    input: &Shape,
    weight: &Shape,
    params: Conv3dParams,
) -> Result<Shape, TensorError> {
    if input.rank() != 5 {
        return Err(TensorError::RankMismatch {
            op: "conv3d",
            expected: 5,
            shape: input.clone(),
        });
    }
    if weight.rank() != 5 {
        return Err(TensorError::RankMismatch {
            op: "conv3d (weight)",
            expected: 5,
            shape: weight.clone(),
        });
    }
    if input.dims()[1] != weight.dims()[1] {
        return Err(TensorError::ShapeMismatch {
            op: "conv3d (channels)",
            lhs: input.clone(),
            rhs: weight.clone(),
        });
    }
    if params.stride == 0 || params.dilation == 0 {
        return Err(TensorError::Numeric {
            op: "conv3d",
            detail: format!(
                "stride and dilation must be nonzero (stride={}, dilation={})",
                params.stride, params.dilation
            ),
        });
    }

    let n = input.dims()[0];
    let out_c = weight.dims()[0];
    let mut out_dims = vec![n, out_c];
    for axis in 0..3 {
        let dim = input.dims()[2 + axis];
        let k = weight.dims()[2 + axis];
        let span = params.dilation * (k - 1) + 1;
        let padded = dim + 2 * params.padding;
        if padded < span {
            return Err(TensorError::Numeric {
                op: "conv3d",
                detail: format!(
                    "spatial dim {dim} too small for kernel {k} with dilation {} and padding {}",
                    params.dilation, params.padding
                ),
            });
        }
        out_dims.push((padded - span) / params.stride + 1);
    }
    Ok(Shape::new(out_dims))
}

/// Performs a grouped-by-1 3D convolution: `output = input ⊛ weight + bias`.
///
/// - `input` is `[N, C, D, H, W]`.
/// - `weight` is `[O, I, kd, kh, kw]` with `I == C`.
/// - `bias` is `[O]`.
/// - `output` must be pre-allocated to [`conv3d_output_shape`].
///
/// Padding is zero-valued and symmetric on every spatial axis.
///
/// # Errors
/// Returns the shape/rank errors of [`conv3d_output_shape`], plus
/// [`TensorError::ShapeMismatch`] if `bias` or `output` have the wrong shape.
pub fn conv3d(
    input: &TensorView<'_>,
    weight: &TensorView<'_>,
    bias: &TensorView<'_>,
    params: Conv3dParams,
    output: &mut Tensor,
) -> Result<(), TensorError> {
    let expected = conv3d_output_shape(input.shape(), weight.shape(), params)?;
    if output.shape() != &expected {
        return Err(TensorError::ShapeMismatch {
            op: "conv3d (output)",
            lhs: expected,
            rhs: output.shape().clone(),
        });
    }

    let out_c = weight.shape().dims()[0];
    if bias.shape().rank() != 1 || bias.shape().dims()[0] != out_c {
        return Err(TensorError::ShapeMismatch {
            op: "conv3d (bias)",
            lhs: Shape::vector(out_c),
            rhs: bias.shape().clone(),
        });
    }

    let [n, in_c, d, h, w] = dims5(input.shape());
    let [_, _, kd, kh, kw] = dims5(weight.shape());
    let out_dims = output.shape().dims();
    let (od, oh, ow) = (out_dims[2], out_dims[3], out_dims[4]);

    let x = input.as_slice();
    let wgt = weight.as_slice();
    let b = bias.as_slice();
    let y = output.as_mut_slice();

    let in_strides = input.shape().strides();
    let w_strides = weight.shape().strides();

    let stride = params.stride;
    let dilation = params.dilation;
    let pad = params.padding as isize;

    let mut out_idx = 0usize;
    for batch in 0..n {
        let x_batch = batch * in_strides[0];
        for o in 0..out_c {
            let w_out = o * w_strides[0];
            for z in 0..od {
                let z0 = (z * stride) as isize - pad;
                for row in 0..oh {
                    let y0 = (row * stride) as isize - pad;
                    for col in 0..ow {
                        let x0 = (col * stride) as isize - pad;
                        let mut acc = b[o];
                        for i in 0..in_c {
                            let x_chan = x_batch + i * in_strides[1];
                            let w_chan = w_out + i * w_strides[1];
                            for tz in 0..kd {
                                let iz = z0 + (tz * dilation) as isize;
                                if iz < 0 || iz >= d as isize {
                                    continue;
                                }
                                for ty in 0..kh {
                                    let iy = y0 + (ty * dilation) as isize;
                                    if iy < 0 || iy >= h as isize {
                                        continue;
                                    }
                                    for tx in 0..kw {
                                        let ix = x0 + (tx * dilation) as isize;
                                        if ix < 0 || ix >= w as isize {
                                            continue;
                                        }
                                        let xi = x_chan
                                            + iz as usize * in_strides[2]
                                            + iy as usize * in_strides[3]
                                            + ix as usize;
                                        let wi = w_chan
                                            + tz * w_strides[2]
                                            + ty * w_strides[3]
                                            + tx;
                                        acc += x[xi] * wgt[wi];
                                    }
                                }
                            }
                        }
                        y[out_idx] = acc;
                        out_idx += 1;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Extracts the five dimensions of a rank-5 shape.
fn dims5(shape: &Shape) -> [usize; 5] {
    let d = shape.dims();
    [d[0], d[1], d[2], d[3], d[4]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_conv(
        input: &Tensor,
        weight: &Tensor,
        bias: &Tensor,
        params: Conv3dParams,
    ) -> Tensor {
        let shape = conv3d_output_shape(input.shape(), weight.shape(), params).unwrap();
        let mut out = Tensor::zeros(shape);
        conv3d(&input.view(), &weight.view(), &bias.view(), params, &mut out).unwrap();
        out
    }

    #[test]
    fn test_output_shape_same_padding() {
        // k=3, d=1, pad=1, stride=1 preserves spatial size.
        let input = Shape::activation(1, 1, 8, 8, 8);
        let weight = Shape::new(vec![4, 1, 3, 3, 3]);
        let params = Conv3dParams {
            stride: 1,
            dilation: 1,
            padding: 1,
        };
        let out = conv3d_output_shape(&input, &weight, params).unwrap();
        assert_eq!(out, Shape::activation(1, 4, 8, 8, 8));
    }

    #[test]
    fn test_output_shape_even_kernel_shifts_by_one() {
        // k=4, pad=(4-1)*1/2=1: output is one voxel smaller. Inherited
        // export-format semantics.
        let input = Shape::activation(1, 1, 8, 8, 8);
        let weight = Shape::new(vec![1, 1, 4, 4, 4]);
        let params = Conv3dParams {
            stride: 1,
            dilation: 1,
            padding: 1,
        };
        let out = conv3d_output_shape(&input, &weight, params).unwrap();
        assert_eq!(out, Shape::activation(1, 1, 7, 7, 7));
    }

    #[test]
    fn test_output_shape_stride() {
        let input = Shape::activation(1, 2, 8, 8, 8);
        let weight = Shape::new(vec![3, 2, 3, 3, 3]);
        let params = Conv3dParams {
            stride: 2,
            dilation: 1,
            padding: 1,
        };
        let out = conv3d_output_shape(&input, &weight, params).unwrap();
        assert_eq!(out, Shape::activation(1, 3, 4, 4, 4));
    }

    #[test]
    fn test_channel_mismatch() {
        let input = Shape::activation(1, 2, 4, 4, 4);
        let weight = Shape::new(vec![1, 3, 3, 3, 3]);
        let result = conv3d_output_shape(&input, &weight, Conv3dParams::default());
        assert!(matches!(result, Err(TensorError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_pointwise_conv_is_scaled_copy() {
        // k=1, stride=1, dilation=1, one output channel: y = x*w + b.
        let input =
            Tensor::from_f32(Shape::activation(1, 1, 2, 2, 2), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0])
                .unwrap();
        let weight = Tensor::from_f32(Shape::new(vec![1, 1, 1, 1, 1]), &[2.5]).unwrap();
        let bias = Tensor::from_f32(Shape::vector(1), &[-1.0]).unwrap();

        let out = run_conv(&input, &weight, &bias, Conv3dParams::default());
        let expected: Vec<f32> = input.as_slice().iter().map(|&x| x * 2.5 - 1.0).collect();
        assert_eq!(out.as_slice(), &expected[..]);
    }

    #[test]
    fn test_all_ones_kernel_interior_sum() {
        // Constant input 1.0, 3³ all-ones kernel, same padding: the interior
        // voxel sees all 27 taps, the corner voxel only 8.
        let input = Tensor::from_f32(Shape::activation(1, 1, 3, 3, 3), &[1.0; 27]).unwrap();
        let weight = Tensor::from_f32(Shape::new(vec![1, 1, 3, 3, 3]), &[1.0; 27]).unwrap();
        let bias = Tensor::from_f32(Shape::vector(1), &[0.0]).unwrap();
        let params = Conv3dParams {
            stride: 1,
            dilation: 1,
            padding: 1,
        };

        let out = run_conv(&input, &weight, &bias, params);
        assert_eq!(out.shape(), &Shape::activation(1, 1, 3, 3, 3));
        let y = out.as_slice();
        // Center of the 3³ output.
        assert_eq!(y[13], 27.0);
        // Corner.
        assert_eq!(y[0], 8.0);
    }

    #[test]
    fn test_bias_per_output_channel() {
        let input = Tensor::from_f32(Shape::activation(1, 1, 1, 1, 1), &[0.0]).unwrap();
        let weight = Tensor::from_f32(Shape::new(vec![2, 1, 1, 1, 1]), &[1.0, 1.0]).unwrap();
        let bias = Tensor::from_f32(Shape::vector(2), &[0.5, -0.5]).unwrap();

        let out = run_conv(&input, &weight, &bias, Conv3dParams::default());
        assert_eq!(out.as_slice(), &[0.5, -0.5]);
    }

    #[test]
    fn test_two_input_channels_sum() {
        // Both channels constant, kernel 1x1x1 with per-channel weights:
        // y = c0*w0 + c1*w1 + b.
        let mut data = vec![2.0f32; 8];
        data.extend_from_slice(&[3.0; 8]);
        let input = Tensor::from_f32(Shape::activation(1, 2, 2, 2, 2), &data).unwrap();
        let weight = Tensor::from_f32(Shape::new(vec![1, 2, 1, 1, 1]), &[10.0, 100.0]).unwrap();
        let bias = Tensor::from_f32(Shape::vector(1), &[1.0]).unwrap();

        let out = run_conv(&input, &weight, &bias, Conv3dParams::default());
        assert!(out.as_slice().iter().all(|&y| y == 2.0 * 10.0 + 3.0 * 100.0 + 1.0));
    }

    #[test]
    fn test_dilation_reach() {
        // 5-wide axis, k=3, dilation=2, pad=(3-1)*2/2=2: output size preserved.
        let input = Shape::activation(1, 1, 5, 5, 5);
        let weight = Shape::new(vec![1, 1, 3, 3, 3]);
        let params = Conv3dParams {
            stride: 1,
            dilation: 2,
            padding: 2,
        };
        let out = conv3d_output_shape(&input, &weight, params).unwrap();
        assert_eq!(out, Shape::activation(1, 1, 5, 5, 5));
    }

    #[test]
    fn test_output_shape_validation() {
        let input = Tensor::zeros(Shape::activation(1, 1, 4, 4, 4));
        let weight = Tensor::zeros(Shape::new(vec![1, 1, 3, 3, 3]));
        let bias = Tensor::zeros(Shape::vector(1));
        // Wrong output shape must be rejected.
        let mut out = Tensor::zeros(Shape::activation(1, 1, 4, 4, 4));
        let result = conv3d(
            &input.view(),
            &weight.view(),
            &bias.view(),
            Conv3dParams::default(),
            &mut out,
        );
        assert!(matches!(result, Err(TensorError::ShapeMismatch { .. })));
    }
}
