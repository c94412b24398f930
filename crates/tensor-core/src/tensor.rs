// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Core tensor type and view abstractions.

use crate::{Shape, TensorError};

/// An owned, n-dimensional f32 tensor stored in contiguous memory.
///
/// `Tensor` is the primary data carrier in the segmentation pipeline.
/// It owns its data buffer and exposes immutable views via [`TensorView`].
///
/// # Memory Layout
/// Data is stored in row-major (C) order as a flat `Vec<f32>`. The
/// pipeline computes exclusively in f32 — the export format stores
/// 32-bit floats and the convolution kernels operate on them directly.
#[derive(Debug, Clone)]
pub struct Tensor {
    shape: Shape,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a new tensor filled with zeros.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::zeros(Shape::new(vec![2, 3]));
    /// assert_eq!(t.num_elements(), 6);
    /// ```
    pub fn zeros(shape: Shape) -> Self {
        let n = shape.num_elements();
        Self {
            shape,
            data: vec![0.0; n],
        }
    }

    /// Creates a tensor by copying a slice of `f32` values.
    ///
    /// The values are copied into a freshly owned buffer; the tensor never
    /// aliases the source slice.
    ///
    /// # Examples
    /// ```
    /// use tensor_core::{Tensor, Shape};
    /// let t = Tensor::from_f32(Shape::vector(3), &[1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(t.as_slice(), &[1.0, 2.0, 3.0]);
    /// ```
    pub fn from_f32(shape: Shape, values: &[f32]) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if values.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self {
            shape,
            data: values.to_vec(),
        })
    }

    /// Creates a tensor by taking ownership of an existing buffer.
    pub fn from_vec(shape: Shape, data: Vec<f32>) -> Result<Self, TensorError> {
        let expected = shape.num_elements();
        if data.len() != expected {
            return Err(TensorError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { shape, data })
    }

    /// Returns the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the total number of elements.
    pub fn num_elements(&self) -> usize {
        self.data.len()
    }

    /// Returns an immutable view over this tensor's data.
    pub fn view(&self) -> TensorView<'_> {
        TensorView {
            shape: &self.shape,
            data: &self.data,
        }
    }

    /// Returns the flat element slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Returns the flat element slice mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Consumes the tensor and returns its backing buffer.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Fills the tensor with a constant value.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|x| *x = value);
    }
}

/// A borrowed, read-only view over a [`Tensor`]'s data.
///
/// Views are zero-copy and tied to the lifetime of the source tensor,
/// enforced by the borrow checker.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    shape: &'a Shape,
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    /// Creates a view from raw parts (used internally by tensor ops).
    pub fn from_parts(shape: &'a Shape, data: &'a [f32]) -> Self {
        Self { shape, data }
    }

    /// Returns the shape of the viewed tensor.
    pub fn shape(&self) -> &Shape {
        self.shape
    }

    /// Returns the flat element slice.
    pub fn as_slice(&self) -> &[f32] {
        self.data
    }
}
