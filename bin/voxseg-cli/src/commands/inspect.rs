// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `voxseg inspect` command: display the model's layer list and the
//! weight layout it implies.

use model_ir::{parse_topology, LayerOp};
use std::path::PathBuf;

pub fn execute(topology: PathBuf, weights: Option<PathBuf>) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&topology).map_err(|e| {
        anyhow::anyhow!("failed to read topology '{}': {e}", topology.display())
    })?;
    let graph = parse_topology(&json)?.validate()?;

    // ── Summary ────────────────────────────────────────────────
    println!("  Model: {}", graph.name);
    println!("  Layers: {}", graph.num_layers());
    if let Some(classes) = graph.output_channels() {
        println!("  Output classes: {classes}");
    }
    println!(
        "  Expected weights: {} values ({:.2} MB)",
        graph.expected_weight_len(),
        (graph.expected_weight_len() * 4) as f64 / (1024.0 * 1024.0),
    );
    println!();

    // ── Per-Layer Detail ───────────────────────────────────────
    println!(
        "  {:<4} {:<24} {:<12} {:<10} {:>10}",
        "Idx", "Name", "Op", "Shape", "Weights",
    );
    println!("  {}", "-".repeat(64));

    for layer in graph.iter_layers() {
        let (op, shape) = match &layer.op {
            LayerOp::Conv3d(spec) => (
                "conv3d",
                format!("{}→{}·{}³", spec.in_channels, spec.filters, spec.kernel_size[0]),
            ),
            LayerOp::Activation(kind) => ("activation", kind.to_string()),
        };
        println!(
            "  {:<4} {:<24} {:<12} {:<10} {:>10}",
            layer.index,
            layer.name,
            op,
            shape,
            layer.weight_count(),
        );
    }
    println!();

    // ── Weight binary check ────────────────────────────────────
    if let Some(weights_path) = weights {
        let expected_bytes = graph.expected_weight_len() as u64 * 4;
        let actual_bytes = std::fs::metadata(&weights_path)
            .map_err(|e| {
                anyhow::anyhow!("failed to stat '{}': {e}", weights_path.display())
            })?
            .len();

        if actual_bytes == expected_bytes {
            println!(
                "  Weight binary {} matches ({} bytes)",
                weights_path.display(),
                actual_bytes,
            );
        } else {
            println!(
                "  Weight binary {} MISMATCH: expected {} bytes, found {}",
                weights_path.display(),
                expected_bytes,
                actual_bytes,
            );
        }
        println!();
    }

    Ok(())
}
