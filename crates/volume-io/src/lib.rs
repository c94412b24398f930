// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # volume-io
//!
//! NIfTI volume reading and label-mask writing.
//!
//! This crate is the pipeline's seam to the medical-image format: it
//! loads a `.nii`/`.nii.gz` file into a dense f32 array and retains the
//! header so the output mask can be written with the input's spatial
//! orientation metadata unchanged.

mod error;

pub use error::VolumeError;

use ndarray::{Array3, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use std::path::Path;

/// A 3-D volume plus the header it was read with.
///
/// The header is carried along untouched; [`Volume::write_labels`]
/// re-applies it to the newly computed class-index array so affine and
/// orientation metadata survive the pipeline.
#[derive(Debug, Clone)]
pub struct Volume {
    data: Array3<f32>,
    header: NiftiHeader,
}

impl Volume {
    /// Reads a NIfTI file into memory as f32.
    ///
    /// # Errors
    /// Fails if the file cannot be read or parsed, or if the stored
    /// array is not three-dimensional.
    pub fn open(path: &Path) -> Result<Self, VolumeError> {
        let object = ReaderOptions::new()
            .read_file(path)
            .map_err(|e| VolumeError::ReadError(format!("{}: {e}", path.display())))?;

        let header = object.header().clone();
        let dynamic = object
            .into_volume()
            .into_ndarray::<f32>()
            .map_err(|e| VolumeError::ReadError(format!("{}: {e}", path.display())))?;

        let rank = dynamic.ndim();
        let data = dynamic
            .into_dimensionality::<Ix3>()
            .map_err(|_| VolumeError::NotThreeDimensional { rank })?;

        tracing::debug!(
            "read volume {}: dims {:?}",
            path.display(),
            data.shape(),
        );

        Ok(Self { data, header })
    }

    /// Wraps an in-memory array with a default header (used by tests).
    pub fn from_array(data: Array3<f32>) -> Self {
        Self {
            data,
            header: NiftiHeader::default(),
        }
    }

    /// Volume dimensions as `[depth, height, width]` in storage order.
    pub fn dims(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    /// Total voxel count.
    pub fn num_voxels(&self) -> usize {
        self.data.len()
    }

    /// The voxel data as a flat row-major `Vec<f32>`.
    pub fn to_flat_vec(&self) -> Vec<f32> {
        self.data.as_standard_layout().iter().copied().collect()
    }

    /// The retained header.
    pub fn header(&self) -> &NiftiHeader {
        &self.header
    }

    /// Writes a per-voxel class-index mask of this volume's dimensions,
    /// reusing this volume's header for orientation metadata.
    ///
    /// `labels` must be in the same flat row-major order as
    /// [`Volume::to_flat_vec`].
    pub fn write_labels(&self, path: &Path, labels: &[u16]) -> Result<(), VolumeError> {
        if labels.len() != self.num_voxels() {
            return Err(VolumeError::LabelCountMismatch {
                expected: self.num_voxels(),
                actual: labels.len(),
            });
        }

        let [d, h, w] = self.dims();
        let mask = Array3::from_shape_vec((d, h, w), labels.to_vec())
            .map_err(|e| VolumeError::WriteError(format!("label reshape failed: {e}")))?;

        nifti::writer::WriterOptions::new(path)
            .reference_header(&self.header)
            .write_nifti(&mask)
            .map_err(|e| VolumeError::WriteError(format!("{}: {e}", path.display())))?;

        tracing::info!("wrote label mask to {}", path.display());
        Ok(())
    }
}
