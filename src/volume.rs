use crate::frame::FrameOfReference;
use crate::series_writer::{SeriesOptions, SeriesWriteError, SeriesWriter};

use ndarray::{Array3, ArrayD};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("array holds {actual} elements but the frame of reference describes {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("expected a 2- or 3-dimensional array, got {0} dimensions")]
    UnsupportedDimensions(usize),

    #[error("array memory cannot be reinterpreted in row-major order")]
    NotContiguous,
}

/// Volumetric voxel intensities placed in a DICOM frame of reference.
///
/// `data` is indexed `[slice, row, column]`, i.e. (z, y, x) — the reverse
/// of [`FrameOfReference::size`]. The shape invariant
/// `data.dim() == (size.2, size.1, size.0)` is established at construction
/// and the volume is never mutated during export.
#[derive(Debug)]
pub struct Volume {
    pub data: Array3<f32>,
    pub frame: FrameOfReference,
    /// Written into the Modality attribute, empty when unset.
    pub modality: Option<String>,
    /// Written into DerivationDescription, empty when unset.
    pub feature_label: Option<String>,
}

impl Volume {
    /// Build a volume from an array already ordered `[slice, row, column]`.
    ///
    /// A 2-dimensional array is treated as a single slice. The frame of
    /// reference is synthesized with unit spacing and its origin at zero,
    /// so a (5, 5) input yields a frame of size (5, 5, 1).
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::UnsupportedDimensions`] for arrays that are
    /// neither 2- nor 3-dimensional.
    pub fn from_array(array: ArrayD<f32>) -> Result<Self, VolumeError> {
        let data = into_slices(array)?;
        let frame = FrameOfReference::unit(data.dim());
        Ok(Self {
            data,
            frame,
            modality: None,
            feature_label: None,
        })
    }

    /// Build a volume by reinterpreting the array's flat row-major buffer
    /// under the extents of `frame`.
    ///
    /// The buffer is not transposed: its memory is read back under the
    /// shape `frame.size` reversed to `[slice, row, column]` order.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ShapeMismatch`] when the element count does
    /// not equal `frame.num_voxels()`.
    pub fn from_array_in_frame(
        array: ArrayD<f32>,
        frame: FrameOfReference,
    ) -> Result<Self, VolumeError> {
        let expected = frame.num_voxels();
        if array.len() != expected {
            return Err(VolumeError::ShapeMismatch {
                expected,
                actual: array.len(),
            });
        }
        let (nx, ny, nz) = frame.size;
        let data = array
            .into_shape_with_order((nz, ny, nx))
            .map_err(|_| VolumeError::NotContiguous)?;
        Ok(Self {
            data,
            frame,
            modality: None,
            feature_label: None,
        })
    }

    /// Number of axial slices in the volume.
    pub fn nslices(&self) -> usize {
        self.frame.size.2
    }

    /// Dimensions of the volume as (slices, rows, columns).
    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    /// Smallest intensity across the whole volume.
    pub(crate) fn min_value(&self) -> f32 {
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Write the volume as a DICOM CT image series, one file per axial
    /// slice, with default [`SeriesOptions`].
    pub fn to_dicom(&self, dir: impl AsRef<Path>) -> Result<(), SeriesWriteError> {
        SeriesWriter::write(self, dir.as_ref(), &SeriesOptions::default())
    }

    /// Write the volume as a DICOM CT image series with explicit options.
    pub fn to_dicom_with(
        &self,
        dir: impl AsRef<Path>,
        options: &SeriesOptions,
    ) -> Result<(), SeriesWriteError> {
        SeriesWriter::write(self, dir.as_ref(), options)
    }
}

fn into_slices(array: ArrayD<f32>) -> Result<Array3<f32>, VolumeError> {
    let dim = match array.shape() {
        [rows, cols] => (1, *rows, *cols),
        [slices, rows, cols] => (*slices, *rows, *cols),
        other => return Err(VolumeError::UnsupportedDimensions(other.len())),
    };
    array
        .into_shape_with_order(dim)
        .map_err(|_| VolumeError::NotContiguous)
}
