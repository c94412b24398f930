// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `voxseg run` command: segment a volume end to end.
//!
//! Drives the full type-state pipeline:
//! ```text
//! SegmentationEngine<Idle> → load_model → <Ready> → run
//! ```

use runtime::{RuntimeConfig, SegmentationEngine};
use std::path::PathBuf;

pub fn execute(
    config_file: Option<PathBuf>,
    topology: PathBuf,
    weights: PathBuf,
    input: PathBuf,
    output: PathBuf,
    enable_profiling: bool,
) -> anyhow::Result<()> {
    // A config file, when given, wins over the individual flags.
    let config = match config_file {
        Some(path) => RuntimeConfig::from_file(&path)?,
        None => RuntimeConfig {
            model_topology: topology,
            model_weights: weights,
            input_volume: input,
            output_volume: output,
            enable_profiling,
        },
    };

    println!("  Model:  {}", config.model_topology.display());
    println!("  Input:  {}", config.input_volume.display());
    println!();

    let engine = SegmentationEngine::new(config.clone()).load_model()?;
    println!("  {}", engine.graph().summary());
    println!();

    let result = engine.run()?;

    let [d, h, w] = result.dims;
    println!("  Labelled {}×{}×{} voxels", d, h, w);
    if config.enable_profiling {
        println!("  {}", result.metrics.summary());
    }
    println!();
    println!("Output saved as {}", config.output_volume.display());

    Ok(())
}
