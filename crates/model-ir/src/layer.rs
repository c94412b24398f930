// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Layer definitions for the convolutional model IR.
//!
//! Each [`LayerDef`] describes a single computation in the forward pass.
//! Weight *data* is **not** stored here — convolution layers consume their
//! kernel and bias from the shared [`crate::WeightBuffer`] at run time,
//! in layer order.

use tensor_core::Shape;

/// The elementwise nonlinearity an activation layer applies.
///
/// This is a closed set: the export format names activations as free-form
/// strings, but the engine dispatches on an exhaustive enum so an
/// unsupported name fails at load time instead of passing data through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    /// Rectified linear unit.
    Relu,
    /// Exponential linear unit (α = 1).
    Elu,
    /// Logistic sigmoid.
    Sigmoid,
    /// Hyperbolic tangent.
    Tanh,
    /// Leaky rectified linear unit with the engine-default negative slope.
    LeakyRelu,
}

impl ActivationKind {
    /// Parses an activation name as the export format spells it.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "relu" => Some(Self::Relu),
            "elu" => Some(Self::Elu),
            "sigmoid" => Some(Self::Sigmoid),
            "tanh" => Some(Self::Tanh),
            "leaky_relu" => Some(Self::LeakyRelu),
            _ => None,
        }
    }

    /// Returns a human-readable label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relu => "relu",
            Self::Elu => "elu",
            Self::Sigmoid => "sigmoid",
            Self::Tanh => "tanh",
            Self::LeakyRelu => "leaky_relu",
        }
    }
}

impl std::fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration of a single 3D convolution layer.
///
/// `in_channels` is resolved while parsing the topology by threading the
/// previous convolution's `filters` through the layer list — the export
/// format never states it explicitly.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConvSpec {
    /// Input channel count (1 for the first convolution).
    pub in_channels: usize,
    /// Output channel count (`filters` in the export config).
    pub filters: usize,
    /// Kernel size per spatial axis. Only cubic kernels are accepted —
    /// the flat-buffer reshape assumes all three are equal.
    pub kernel_size: [usize; 3],
    /// Stride per spatial axis. Only the first value is honoured.
    pub strides: [usize; 3],
    /// Dilation per spatial axis. Only the first value is honoured.
    pub dilation_rate: [usize; 3],
}

impl ConvSpec {
    /// Symmetric zero padding per axis: `((k − 1) · d) / 2`, integer division.
    ///
    /// Reproduces "same"-style padding for odd kernel sizes; even kernels
    /// shift the output by one voxel, which is inherited export semantics.
    pub fn padding(&self) -> [usize; 3] {
        let mut pad = [0usize; 3];
        for (p, (&k, &d)) in pad
            .iter_mut()
            .zip(self.kernel_size.iter().zip(self.dilation_rate.iter()))
        {
            *p = (k - 1) * d / 2;
        }
        pad
    }

    /// Number of f32 values in the kernel block: `filters · in_channels · k³`.
    pub fn kernel_weight_count(&self) -> usize {
        self.filters * self.in_channels * self.kernel_size.iter().product::<usize>()
    }

    /// Total f32 values this layer consumes from the weight buffer
    /// (kernel block followed by one bias value per output channel).
    pub fn weight_count(&self) -> usize {
        self.kernel_weight_count() + self.filters
    }

    /// The engine-order kernel shape `[filters, in_channels, k, k, k]`.
    pub fn kernel_shape(&self) -> Shape {
        Shape::new(vec![
            self.filters,
            self.in_channels,
            self.kernel_size[0],
            self.kernel_size[1],
            self.kernel_size[2],
        ])
    }

    /// `true` if all three kernel dimensions are equal.
    pub fn is_cubic(&self) -> bool {
        self.kernel_size[0] == self.kernel_size[1] && self.kernel_size[1] == self.kernel_size[2]
    }
}

/// The computation a layer performs.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum LayerOp {
    /// Grouped-by-1 3D convolution with bias.
    Conv3d(ConvSpec),
    /// Elementwise nonlinearity.
    Activation(ActivationKind),
}

/// Metadata describing a single layer in execution order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayerDef {
    /// Layer name from the topology (e.g., `"conv3d_2"`).
    pub name: String,
    /// Index in the execution order (0-based, after the input placeholder).
    pub index: usize,
    /// The operation this layer performs.
    pub op: LayerOp,
}

impl LayerDef {
    /// f32 values this layer consumes from the weight buffer.
    pub fn weight_count(&self) -> usize {
        match &self.op {
            LayerOp::Conv3d(spec) => spec.weight_count(),
            LayerOp::Activation(_) => 0,
        }
    }

    /// Returns a concise summary string for display.
    pub fn summary(&self) -> String {
        match &self.op {
            LayerOp::Conv3d(spec) => format!(
                "[{}] {} (conv3d) — {}→{} ch, kernel {}³, stride {}, dilation {}, {} weights",
                self.index,
                self.name,
                spec.in_channels,
                spec.filters,
                spec.kernel_size[0],
                spec.strides[0],
                spec.dilation_rate[0],
                spec.weight_count(),
            ),
            LayerOp::Activation(kind) => {
                format!("[{}] {} (activation) — {}", self.index, self.name, kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(k: usize, d: usize) -> ConvSpec {
        ConvSpec {
            in_channels: 2,
            filters: 4,
            kernel_size: [k; 3],
            strides: [1; 3],
            dilation_rate: [d; 3],
        }
    }

    #[test]
    fn test_padding_odd_kernel() {
        assert_eq!(spec(3, 1).padding(), [1, 1, 1]);
        assert_eq!(spec(5, 1).padding(), [2, 2, 2]);
    }

    #[test]
    fn test_padding_with_dilation() {
        assert_eq!(spec(5, 2).padding(), [4, 4, 4]);
        assert_eq!(spec(3, 3).padding(), [3, 3, 3]);
    }

    #[test]
    fn test_padding_even_kernel_floors() {
        // (4-1)*1/2 = 1 (integer division).
        assert_eq!(spec(4, 1).padding(), [1, 1, 1]);
    }

    #[test]
    fn test_weight_counts() {
        let s = spec(3, 1);
        assert_eq!(s.kernel_weight_count(), 4 * 2 * 27);
        assert_eq!(s.weight_count(), 4 * 2 * 27 + 4);
    }

    #[test]
    fn test_kernel_shape() {
        let s = spec(3, 1);
        assert_eq!(s.kernel_shape(), Shape::new(vec![4, 2, 3, 3, 3]));
    }

    #[test]
    fn test_is_cubic() {
        assert!(spec(3, 1).is_cubic());
        let mut aniso = spec(3, 1);
        aniso.kernel_size = [3, 3, 5];
        assert!(!aniso.is_cubic());
    }

    #[test]
    fn test_activation_from_name() {
        assert_eq!(ActivationKind::from_name("relu"), Some(ActivationKind::Relu));
        assert_eq!(ActivationKind::from_name("elu"), Some(ActivationKind::Elu));
        assert_eq!(
            ActivationKind::from_name("leaky_relu"),
            Some(ActivationKind::LeakyRelu)
        );
        // Unsupported names must not map to anything.
        assert_eq!(ActivationKind::from_name("swish"), None);
        assert_eq!(ActivationKind::from_name("RELU"), None);
    }

    #[test]
    fn test_activation_layer_consumes_no_weights() {
        let layer = LayerDef {
            name: "activation_1".into(),
            index: 1,
            op: LayerOp::Activation(ActivationKind::Relu),
        };
        assert_eq!(layer.weight_count(), 0);
    }

    #[test]
    fn test_summary() {
        let layer = LayerDef {
            name: "conv3d_1".into(),
            index: 0,
            op: LayerOp::Conv3d(spec(3, 1)),
        };
        let s = layer.summary();
        assert!(s.contains("conv3d_1"));
        assert!(s.contains("2→4 ch"));
    }
}
