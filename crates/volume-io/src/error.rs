// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for volume I/O.

/// Errors that can occur reading or writing NIfTI volumes.
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// The NIfTI file could not be read or parsed.
    #[error("failed to read volume: {0}")]
    ReadError(String),

    /// The NIfTI file could not be written.
    #[error("failed to write volume: {0}")]
    WriteError(String),

    /// The volume is not a 3-D array.
    #[error("expected a 3-D volume, got {rank} dimensions")]
    NotThreeDimensional { rank: usize },

    /// A label buffer does not cover the volume voxel-for-voxel.
    #[error("label count mismatch: volume has {expected} voxels, got {actual} labels")]
    LabelCountMismatch { expected: usize, actual: usize },
}
