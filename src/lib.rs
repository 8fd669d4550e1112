//! # volume2dicom
//!
//! This crate exports an in-memory voxel volume as a DICOM CT image
//! series, one file per axial slice.
//!
//! It is built on the dicom-rs ecosystem: the [`dicom`] crate handles the
//! file encoding (implicit VR little endian with a standard file meta
//! group), this crate handles the geometry. A [`FrameOfReference`]
//! describes where a voxel grid sits in patient space (origin, spacing and
//! extents in mm, with axes ordered x/y/z); a [`Volume`] owns the
//! intensity array, indexed `[slice, row, column]`, together with the
//! frame describing it. Exporting writes every slice with shared study,
//! series and frame-of-reference UIDs, per-slice spatial attributes and a
//! rescale intercept chosen so the unsigned 16-bit stored values recover
//! the original intensities.
//!
//! Output is limited to CT-image secondary-capture style series: a single
//! frame of reference, axial slices, MONOCHROME2 unsigned 16-bit pixels.
//! This is not a general DICOM toolkit.
//!
//! # Examples
//!
//! ## Writing a water phantom
//!
//! Wrap an array of all-ones into a 101×101×300 mm unit-spacing frame and
//! write one file per slice into the `water_phantom/` directory.
//!
//! ```no_run
//! # use volume2dicom::{FrameOfReference, Volume};
//! # use ndarray::ArrayD;
//! let frame = FrameOfReference::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (101, 101, 300));
//! let volume = Volume::from_array_in_frame(ArrayD::ones(vec![300, 101, 101]), frame)
//!     .expect("array should match the frame of reference");
//! volume
//!     .to_dicom("water_phantom")
//!     .expect("should have written the series");
//! ```
//!
//! [`dicom`]: https://docs.rs/dicom

pub mod frame;
pub mod series_writer;
pub mod uid;
pub mod volume;

pub use crate::frame::FrameOfReference;
pub use crate::series_writer::{SeriesOptions, SeriesWriteError, SeriesWriter};
pub use crate::volume::{Volume, VolumeError};
