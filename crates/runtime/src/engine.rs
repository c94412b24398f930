// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The segmentation engine with type-state–enforced pipeline.
//!
//! ```text
//! SegmentationEngine<Idle>
//!     │  .load_model()
//!     ▼
//! SegmentationEngine<Ready>
//!     │  .run() / .segment()
//!     ▼
//!   SegmentationOutput
//! ```
//!
//! Each state transition consumes the old value and returns a new one,
//! making invalid state sequences a compile error: the forward pass only
//! exists on an engine that holds a validated graph and a length-checked
//! weight buffer.

use crate::weights::{remap_conv_kernel, WeightCursor};
use crate::{InferenceMetrics, RuntimeConfig, RuntimeError};
use model_ir::{graph::Validated, ActivationKind, LayerOp, ModelGraph, ModelLoader, WeightBuffer};
use std::time::Instant;
use tensor_core::{
    argmax_channels, conv3d, conv3d_output_shape, elu, leaky_relu, normalize_unit, relu, sigmoid,
    tanh, Conv3dParams, Shape, Tensor, TensorError,
};
use volume_io::Volume;

// ── Type-state markers ─────────────────────────────────────────────

/// Engine is created but no model is loaded.
#[derive(Debug)]
pub struct Idle;

/// Model and weights are loaded; the engine can run inference.
#[derive(Debug)]
pub struct Ready;

/// Sealed trait for engine states.
pub trait EngineState: std::fmt::Debug {}
impl EngineState for Idle {}
impl EngineState for Ready {}

// ── Segmentation output ────────────────────────────────────────────

/// The result of a single segmentation run.
#[derive(Debug)]
pub struct SegmentationOutput {
    /// Per-voxel class indices in flat row-major order.
    pub labels: Vec<u32>,
    /// Spatial dimensions of the labelled volume.
    pub dims: [usize; 3],
    /// Per-layer and overall timing metrics.
    pub metrics: InferenceMetrics,
}

// ── Engine ─────────────────────────────────────────────────────────

/// The segmentation engine: a straight-line interpreter over the layer
/// list, consuming the weight buffer through a forward-only cursor.
///
/// `S` is a type-state marker that enforces the pipeline ordering at
/// compile time. You cannot call `.run()` on an `Idle` engine — the
/// compiler catches it.
///
/// # Example
/// ```no_run
/// use runtime::{RuntimeConfig, SegmentationEngine};
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let engine = SegmentationEngine::new(RuntimeConfig::default()).load_model()?;
/// let output = engine.run()?;
/// println!("{}", output.metrics.summary());
/// # Ok(())
/// # }
/// ```
pub struct SegmentationEngine<S: EngineState = Idle> {
    config: RuntimeConfig,
    _state: std::marker::PhantomData<S>,
    // Populated on the Idle → Ready transition:
    graph: Option<ModelGraph<Validated>>,
    weights: Option<WeightBuffer>,
}

// ── Idle → Ready ───────────────────────────────────────────────────

impl SegmentationEngine<Idle> {
    /// Creates a new engine from the given configuration.
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            _state: std::marker::PhantomData,
            graph: None,
            weights: None,
        }
    }

    /// Loads the topology and weight files named by the configuration.
    /// Transitions to the `Ready` state.
    pub fn load_model(self) -> Result<SegmentationEngine<Ready>, RuntimeError> {
        let (graph, weights) =
            ModelLoader::load(&self.config.model_topology, &self.config.model_weights)?;
        tracing::info!("{}", graph.summary());

        Ok(SegmentationEngine {
            config: self.config,
            _state: std::marker::PhantomData,
            graph: Some(graph),
            weights: Some(weights),
        })
    }

    /// Builds a ready engine from in-memory parts (used for testing
    /// without model files).
    pub fn with_model(
        config: RuntimeConfig,
        graph: ModelGraph<Validated>,
        weights: WeightBuffer,
    ) -> SegmentationEngine<Ready> {
        SegmentationEngine {
            config,
            _state: std::marker::PhantomData,
            graph: Some(graph),
            weights: Some(weights),
        }
    }
}

// ── Ready: run inference ───────────────────────────────────────────

impl SegmentationEngine<Ready> {
    /// Returns the model graph.
    pub fn graph(&self) -> &ModelGraph<Validated> {
        self.graph.as_ref().expect("graph exists in Ready state")
    }

    /// Runs the full file pipeline: read the configured input volume,
    /// segment it, and write the label mask to the configured output
    /// path with the input's header.
    pub fn run(&self) -> Result<SegmentationOutput, RuntimeError> {
        let volume = Volume::open(&self.config.input_volume)?;
        tracing::info!(
            "segmenting {} ({:?} voxels)",
            self.config.input_volume.display(),
            volume.dims(),
        );

        let output = self.segment(&volume.to_flat_vec(), volume.dims())?;

        let mask: Vec<u16> = output.labels.iter().map(|&l| l as u16).collect();
        volume.write_labels(&self.config.output_volume, &mask)?;
        Ok(output)
    }

    /// Segments an in-memory voxel buffer of the given dimensions.
    ///
    /// Normalises intensities to the unit interval, runs the forward
    /// pass, and argmaxes the class scores per voxel.
    pub fn segment(
        &self,
        voxels: &[f32],
        dims: [usize; 3],
    ) -> Result<SegmentationOutput, RuntimeError> {
        let run_start = Instant::now();
        let [d, h, w] = dims;
        let mut input = Tensor::from_f32(Shape::activation(1, 1, d, h, w), voxels)
            .map_err(|e| exec_err("input", e))?;
        normalize_unit(&mut input);

        let (scores, mut metrics) = self.forward(input)?;
        let labels = argmax_channels(&scores.view()).map_err(|e| exec_err("argmax", e))?;

        metrics.finalise(run_start.elapsed(), labels.len());
        tracing::info!("{}", metrics.summary());

        Ok(SegmentationOutput {
            labels,
            dims,
            metrics,
        })
    }

    /// Runs the raw layer chain on an already-prepared input tensor,
    /// without normalisation or argmax.
    ///
    /// Weight consumption is strictly sequential: per convolution, the
    /// kernel block is taken and permuted to engine order, then one bias
    /// value per output channel.
    pub fn forward(&self, input: Tensor) -> Result<(Tensor, InferenceMetrics), RuntimeError> {
        let graph = self.graph();
        let weights = self.weights.as_ref().expect("weights exist in Ready state");
        let profiling = self.config.enable_profiling;

        let mut cursor = WeightCursor::new(weights.as_slice());
        let mut current = input;
        let mut metrics = InferenceMetrics::new(graph.num_layers());

        for layer in graph.iter_layers() {
            let prep_start = Instant::now();
            let (prep, compute) = match &layer.op {
                LayerOp::Conv3d(spec) => {
                    let kernel_block = take(&mut cursor, &layer.name, spec.kernel_weight_count())?;
                    let bias_values = take(&mut cursor, &layer.name, spec.filters)?;

                    let kernel = remap_conv_kernel(
                        kernel_block,
                        spec.filters,
                        spec.in_channels,
                        spec.kernel_size[0],
                    );
                    let weight = Tensor::from_vec(spec.kernel_shape(), kernel)
                        .map_err(|e| exec_err(&layer.name, e))?;
                    let bias = Tensor::from_f32(Shape::vector(spec.filters), bias_values)
                        .map_err(|e| exec_err(&layer.name, e))?;
                    let params = Conv3dParams {
                        stride: spec.strides[0],
                        dilation: spec.dilation_rate[0],
                        padding: spec.padding()[0],
                    };
                    let prep = prep_start.elapsed();

                    let compute_start = Instant::now();
                    let out_shape = conv3d_output_shape(current.shape(), weight.shape(), params)
                        .map_err(|e| exec_err(&layer.name, e))?;
                    let mut output = Tensor::zeros(out_shape);
                    conv3d(&current.view(), &weight.view(), &bias.view(), params, &mut output)
                        .map_err(|e| exec_err(&layer.name, e))?;
                    current = output;
                    (prep, compute_start.elapsed())
                }
                LayerOp::Activation(kind) => {
                    let prep = prep_start.elapsed();
                    let compute_start = Instant::now();
                    let mut output = Tensor::zeros(current.shape().clone());
                    let f = match kind {
                        ActivationKind::Relu => relu,
                        ActivationKind::Elu => elu,
                        ActivationKind::Sigmoid => sigmoid,
                        ActivationKind::Tanh => tanh,
                        ActivationKind::LeakyRelu => leaky_relu,
                    };
                    f(&current.view(), &mut output).map_err(|e| exec_err(&layer.name, e))?;
                    current = output;
                    (prep, compute_start.elapsed())
                }
            };

            tracing::debug!("{} done, output shape {}", layer.summary(), current.shape());
            if profiling {
                metrics.record_layer(layer.name.clone(), prep, compute);
            }
        }

        // The loader checked the buffer length against the graph, so the
        // cursor must land exactly at the end.
        if !cursor.is_exhausted() {
            tracing::warn!(
                "{} weight values left unconsumed after the forward pass",
                cursor.remaining(),
            );
        }

        Ok((current, metrics))
    }
}

/// Takes `n` values from the cursor, attributing an overrun to `layer`.
fn take<'a>(
    cursor: &mut WeightCursor<'a>,
    layer: &str,
    n: usize,
) -> Result<&'a [f32], RuntimeError> {
    cursor
        .take(n)
        .ok_or_else(|| RuntimeError::WeightBufferExhausted {
            layer: layer.to_string(),
            requested: n,
            remaining: cursor.remaining(),
        })
}

fn exec_err(layer: &str, source: TensorError) -> RuntimeError {
    RuntimeError::ExecutionError {
        layer: layer.to_string(),
        source,
    }
}

impl<S: EngineState> std::fmt::Debug for SegmentationEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationEngine")
            .field("state", &std::any::type_name::<S>())
            .field("has_graph", &self.graph.is_some())
            .field("has_weights", &self.weights.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_from(topology: &str, values: Vec<f32>) -> SegmentationEngine<Ready> {
        let (graph, weights) = ModelLoader::from_parts(topology, values).unwrap();
        SegmentationEngine::with_model(RuntimeConfig::default(), graph, weights)
    }

    fn pointwise_topology(activation: Option<&str>) -> String {
        let mut layers = vec![
            r#"{ "class_name": "InputLayer", "config": { "name": "input_1" } }"#.to_string(),
            r#"{ "class_name": "Conv3D", "config": {
                "name": "conv3d_1", "filters": 1,
                "kernel_size": [1, 1, 1], "strides": [1, 1, 1],
                "dilation_rate": [1, 1, 1]
            } }"#
                .to_string(),
        ];
        if let Some(act) = activation {
            layers.push(format!(
                r#"{{ "class_name": "Activation", "config": {{ "name": "act_1", "activation": "{act}" }} }}"#
            ));
        }
        format!(
            r#"{{ "modelTopology": {{ "model_config": {{ "config": {{
                "name": "pointwise", "layers": [{}]
            }} }} }} }}"#,
            layers.join(",")
        )
    }

    #[test]
    fn test_forward_pointwise_scaled_copy() {
        // weight 2.0, bias 0.5: y = 2x + 0.5 at every voxel.
        let engine = engine_from(&pointwise_topology(None), vec![2.0, 0.5]);
        let input =
            Tensor::from_f32(Shape::activation(1, 1, 2, 2, 2), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0])
                .unwrap();
        let (out, _) = engine.forward(input).unwrap();
        let expected: Vec<f32> = (0..8).map(|v| 2.0 * v as f32 + 0.5).collect();
        assert_eq!(out.as_slice(), &expected[..]);
    }

    #[test]
    fn test_forward_relu_clamps() {
        let engine = engine_from(&pointwise_topology(Some("relu")), vec![1.0, -3.5]);
        let input = Tensor::from_f32(Shape::activation(1, 1, 1, 1, 2), &[1.0, 10.0]).unwrap();
        let (out, _) = engine.forward(input).unwrap();
        // 1 - 3.5 = -2.5 → 0, 10 - 3.5 = 6.5.
        assert_eq!(out.as_slice(), &[0.0, 6.5]);
    }

    #[test]
    fn test_segment_two_class_argmax() {
        // Two pointwise filters: channel 0 scores x, channel 1 scores 1-x
        // (post-normalisation x is in [0,1]). Bright voxels get class 0.
        let topology = r#"{ "modelTopology": { "model_config": { "config": {
            "name": "two_class",
            "layers": [
                { "class_name": "InputLayer", "config": { "name": "input_1" } },
                { "class_name": "Conv3D", "config": {
                    "name": "conv3d_1", "filters": 2,
                    "kernel_size": [1, 1, 1], "strides": [1, 1, 1],
                    "dilation_rate": [1, 1, 1]
                } }
            ]
        } } } }"#;
        // Kernel export order [k,k,k,in,out] = [w_out0, w_out1], then biases.
        let engine = engine_from(topology, vec![1.0, -1.0, 0.0, 1.0]);

        let voxels = [0.0f32, 10.0, 2.0, 8.0, 0.0, 10.0, 3.0, 9.0];
        let out = engine.segment(&voxels, [2, 2, 2]).unwrap();
        assert_eq!(out.dims, [2, 2, 2]);
        // x >= 0.5 → channel 0 wins (x > 1-x); ties go to channel 0.
        let expected: Vec<u32> = voxels
            .iter()
            .map(|&v| if v / 10.0 >= 0.5 { 0 } else { 1 })
            .collect();
        assert_eq!(out.labels, expected);
    }

    #[test]
    fn test_metrics_recorded_per_layer() {
        let engine = engine_from(&pointwise_topology(Some("tanh")), vec![1.0, 0.0]);
        let out = engine.segment(&[0.0, 1.0], [1, 1, 2]).unwrap();
        assert_eq!(out.metrics.layer_metrics.len(), 2);
        assert_eq!(out.metrics.voxels_labelled, 2);
    }

    #[test]
    fn test_profiling_disabled_skips_layer_metrics() {
        let (graph, weights) =
            ModelLoader::from_parts(&pointwise_topology(None), vec![1.0, 0.0]).unwrap();
        let config = RuntimeConfig {
            enable_profiling: false,
            ..Default::default()
        };
        let engine = SegmentationEngine::with_model(config, graph, weights);
        let out = engine.segment(&[0.0, 1.0], [1, 1, 2]).unwrap();
        assert!(out.metrics.layer_metrics.is_empty());
    }

    #[test]
    fn test_debug_format() {
        let engine = SegmentationEngine::new(RuntimeConfig::default());
        let debug = format!("{engine:?}");
        assert!(debug.contains("SegmentationEngine"));
        assert!(debug.contains("has_graph: false"));
    }
}
