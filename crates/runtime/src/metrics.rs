// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Inference profiling metrics.
//!
//! [`InferenceMetrics`] collects per-layer and aggregate timing data for a
//! forward pass. Weight preparation (cursor slicing plus the kernel
//! permutation) is tracked separately from the convolution itself, since
//! the remap cost scales with kernel size while compute scales with the
//! volume.

use std::time::Duration;

/// Metrics for a single layer's execution.
#[derive(Debug, Clone, serde::Serialize)]
pub struct LayerMetrics {
    /// Layer name.
    pub layer_name: String,
    /// Time spent slicing and remapping this layer's weights.
    pub weight_prep_duration: Duration,
    /// Time spent executing the layer computation.
    pub compute_duration: Duration,
}

/// Aggregate metrics for a complete segmentation run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InferenceMetrics {
    /// Total wall-clock time for the forward pass.
    pub total_duration: Duration,
    /// Total time spent preparing weights.
    pub total_weight_prep_duration: Duration,
    /// Total time spent on computation.
    pub total_compute_duration: Duration,
    /// Per-layer metrics.
    pub layer_metrics: Vec<LayerMetrics>,
    /// Number of voxels labelled.
    pub voxels_labelled: usize,
}

impl InferenceMetrics {
    /// Creates an empty metrics container with capacity for `num_layers`.
    pub fn new(num_layers: usize) -> Self {
        Self {
            total_duration: Duration::ZERO,
            total_weight_prep_duration: Duration::ZERO,
            total_compute_duration: Duration::ZERO,
            layer_metrics: Vec::with_capacity(num_layers),
            voxels_labelled: 0,
        }
    }

    /// Records metrics for a single layer.
    pub fn record_layer(&mut self, name: String, weight_prep: Duration, compute: Duration) {
        self.total_weight_prep_duration += weight_prep;
        self.total_compute_duration += compute;
        self.layer_metrics.push(LayerMetrics {
            layer_name: name,
            weight_prep_duration: weight_prep,
            compute_duration: compute,
        });
    }

    /// Finalises metrics with the total wall-clock time and voxel count.
    pub fn finalise(&mut self, total: Duration, voxels: usize) {
        self.total_duration = total;
        self.voxels_labelled = voxels;
    }

    /// Returns voxels per second throughput.
    pub fn voxels_per_second(&self) -> f64 {
        let secs = self.total_duration.as_secs_f64();
        if secs <= 0.0 || self.voxels_labelled == 0 {
            return 0.0;
        }
        self.voxels_labelled as f64 / secs
    }

    /// Returns a human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Segmentation: {:.2}ms total, {} layers, \
             {:.2}ms weight prep, {:.2}ms compute, \
             {} voxels ({:.0} vox/s)",
            self.total_duration.as_secs_f64() * 1000.0,
            self.layer_metrics.len(),
            self.total_weight_prep_duration.as_secs_f64() * 1000.0,
            self.total_compute_duration.as_secs_f64() * 1000.0,
            self.voxels_labelled,
            self.voxels_per_second(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = InferenceMetrics::new(3);
        assert_eq!(m.voxels_per_second(), 0.0);
        assert!(m.layer_metrics.is_empty());
    }

    #[test]
    fn test_record_and_finalise() {
        let mut m = InferenceMetrics::new(2);
        m.record_layer("l0".into(), Duration::from_millis(5), Duration::from_millis(10));
        m.record_layer("l1".into(), Duration::from_millis(3), Duration::from_millis(8));
        m.finalise(Duration::from_millis(30), 1000);

        assert_eq!(m.layer_metrics.len(), 2);
        assert_eq!(m.voxels_labelled, 1000);
        assert_eq!(m.total_weight_prep_duration, Duration::from_millis(8));
        assert_eq!(m.total_compute_duration, Duration::from_millis(18));
        assert!(m.voxels_per_second() > 0.0);
    }

    #[test]
    fn test_summary_format() {
        let mut m = InferenceMetrics::new(1);
        m.record_layer("l0".into(), Duration::from_millis(1), Duration::from_millis(5));
        m.finalise(Duration::from_millis(10), 64);

        let s = m.summary();
        assert!(s.contains("Segmentation:"));
        assert!(s.contains("1 layers"));
        assert!(s.contains("64 voxels"));
    }

    #[test]
    fn test_voxels_per_second() {
        let mut m = InferenceMetrics::new(1);
        m.finalise(Duration::from_secs(2), 100);
        assert!((m.voxels_per_second() - 50.0).abs() < 0.01);
    }
}
