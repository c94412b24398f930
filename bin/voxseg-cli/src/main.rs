// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # voxseg
//!
//! Command-line interface for the voxseg segmentation runtime.
//!
//! ## Usage
//! ```bash
//! # Segment a volume
//! voxseg run --topology model.json --weights model.bin \
//!     --input t1_crop.nii.gz --output output.nii.gz
//!
//! # Inspect a model's layer list and weight layout
//! voxseg inspect --topology model.json --weights model.bin
//! ```

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "voxseg",
    about = "Volumetric segmentation runtime for exported convolutional models",
    version,
    author
)]
struct Cli {
    /// Path to a TOML configuration file (overrides CLI arguments).
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Enable verbose logging (repeat for more: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Segment a NIfTI volume and write the label mask.
    Run {
        /// Path to the topology JSON.
        #[arg(short, long, default_value = "model.json")]
        topology: std::path::PathBuf,

        /// Path to the raw f32 weight binary.
        #[arg(short, long, default_value = "model.bin")]
        weights: std::path::PathBuf,

        /// Path to the input NIfTI volume.
        #[arg(short, long, default_value = "t1_crop.nii.gz")]
        input: std::path::PathBuf,

        /// Path the output label mask is written to.
        #[arg(short, long, default_value = "output.nii.gz")]
        output: std::path::PathBuf,

        /// Disable per-layer profiling metrics.
        #[arg(long)]
        no_profiling: bool,
    },

    /// Inspect a model: print the layer list and weight layout.
    Inspect {
        /// Path to the topology JSON.
        #[arg(short, long, default_value = "model.json")]
        topology: std::path::PathBuf,

        /// Path to the weight binary (checks its length against the topology).
        #[arg(short, long)]
        weights: Option<std::path::PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    commands::init_tracing(cli.verbose);

    match cli.command {
        Commands::Run {
            topology,
            weights,
            input,
            output,
            no_profiling,
        } => commands::run::execute(
            cli.config,
            topology,
            weights,
            input,
            output,
            !no_profiling,
        ),
        Commands::Inspect { topology, weights } => commands::inspect::execute(topology, weights),
    }
}
