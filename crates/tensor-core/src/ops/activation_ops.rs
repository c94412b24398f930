// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Elementwise activation functions.
//!
//! Each activation maps a tensor elementwise into a pre-allocated output
//! of the same shape. The set matches the nonlinearities the export
//! format can declare: relu, elu, sigmoid, tanh, and leaky relu.

use crate::{Tensor, TensorError, TensorView};

/// Negative slope used by [`leaky_relu`] — the engine default.
pub const DEFAULT_NEGATIVE_SLOPE: f32 = 0.01;

/// Rectified linear unit: `max(x, 0)`.
pub fn relu(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    apply(input, output, "relu", |x| x.max(0.0))
}

/// Exponential linear unit with α = 1: `x` for `x > 0`, `eˣ − 1` otherwise.
pub fn elu(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    apply(input, output, "elu", |x| {
        if x > 0.0 {
            x
        } else {
            x.exp() - 1.0
        }
    })
}

/// Logistic sigmoid: `1 / (1 + e⁻ˣ)`.
pub fn sigmoid(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    apply(input, output, "sigmoid", |x| 1.0 / (1.0 + (-x).exp()))
}

/// Hyperbolic tangent.
pub fn tanh(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    apply(input, output, "tanh", f32::tanh)
}

/// Leaky rectified linear unit with the default negative slope
/// ([`DEFAULT_NEGATIVE_SLOPE`]): `x` for `x ≥ 0`, `slope·x` otherwise.
pub fn leaky_relu(input: &TensorView<'_>, output: &mut Tensor) -> Result<(), TensorError> {
    apply(input, output, "leaky_relu", |x| {
        if x >= 0.0 {
            x
        } else {
            DEFAULT_NEGATIVE_SLOPE * x
        }
    })
}

/// Shared elementwise driver: validates shapes, then maps `f` over the input.
fn apply(
    input: &TensorView<'_>,
    output: &mut Tensor,
    op: &'static str,
    f: impl Fn(f32) -> f32,
) -> Result<(), TensorError> {
    if input.shape() != output.shape() {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: input.shape().clone(),
            rhs: output.shape().clone(),
        });
    }

    let src = input.as_slice();
    let dst = output.as_mut_slice();
    for (d, &x) in dst.iter_mut().zip(src.iter()) {
        *d = f(x);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
        (a - b).abs() < tol
    }

    fn eval(f: impl Fn(&TensorView<'_>, &mut Tensor) -> Result<(), TensorError>, xs: &[f32]) -> Vec<f32> {
        let input = Tensor::from_f32(Shape::vector(xs.len()), xs).unwrap();
        let mut output = Tensor::zeros(Shape::vector(xs.len()));
        f(&input.view(), &mut output).unwrap();
        output.into_vec()
    }

    #[test]
    fn test_relu_clips_negatives() {
        let y = eval(relu, &[-2.0, -0.5, 0.0, 0.5, 2.0]);
        assert_eq!(y, vec![0.0, 0.0, 0.0, 0.5, 2.0]);
    }

    #[test]
    fn test_sigmoid_reference_points() {
        let y = eval(sigmoid, &[0.0, 10.0, -10.0]);
        assert!(approx_eq(y[0], 0.5, 1e-6));
        assert!(y[1] > 0.9999);
        assert!(y[2] < 0.0001);
    }

    #[test]
    fn test_tanh_reference_points() {
        let y = eval(tanh, &[0.0, 1.0, -1.0]);
        assert!(approx_eq(y[0], 0.0, 1e-6));
        assert!(approx_eq(y[1], 0.7616, 1e-3));
        assert!(approx_eq(y[2], -0.7616, 1e-3));
    }

    #[test]
    fn test_elu_negative_branch() {
        let y = eval(elu, &[-1.0, 0.0, 2.0]);
        // e^-1 - 1 ≈ -0.6321
        assert!(approx_eq(y[0], -0.6321, 1e-3));
        assert!(approx_eq(y[1], 0.0, 1e-6));
        assert!(approx_eq(y[2], 2.0, 1e-6));
    }

    #[test]
    fn test_leaky_relu_slope() {
        let y = eval(leaky_relu, &[-3.0, 0.0, 3.0]);
        assert!(approx_eq(y[0], -0.03, 1e-6));
        assert_eq!(y[1], 0.0);
        assert_eq!(y[2], 3.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let input = Tensor::zeros(Shape::vector(3));
        let mut output = Tensor::zeros(Shape::vector(4));
        assert!(relu(&input.view(), &mut output).is_err());
    }
}
