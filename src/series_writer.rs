use crate::uid;
use crate::volume::Volume;

use chrono::Local;
use dicom::core::value::C;
use dicom::core::{DataElement, PrimitiveValue, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom::transfer_syntax::entries::IMPLICIT_VR_LITTLE_ENDIAN;
use dicom_dictionary_std::tags;
use ndarray::{ArrayView2, s};
use rayon::prelude::*;
use smallvec::smallvec;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// CT Image Storage SOP class.
const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
/// Implementation class UID written into every file meta group.
const IMPLEMENTATION_CLASS_UID: &str = "2.25.229451600072090404564844894284998027179";
const IMPLEMENTATION_VERSION_NAME: &str = "VOLUME2DICOM01";

#[derive(Debug, Error)]
pub enum SeriesWriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file meta information: {0}")]
    Meta(String),

    #[error("failed to write DICOM file: {0}")]
    Write(#[from] dicom::object::WriteError),

    #[error("volume extent {columns}x{rows} does not fit the unsigned 16-bit Columns/Rows attributes")]
    ExtentOverflow { columns: usize, rows: usize },

    #[error("intensity {value} in slice {slice} exceeds the unsigned 16-bit range after shifting by the volume minimum {min}")]
    PixelRange { slice: usize, value: f32, min: f32 },
}

/// Demographic and content metadata shared by every slice of an exported
/// series.
///
/// `date` and `time` default to the wall clock at the moment the options
/// value is created; supply explicit values for deterministic output.
#[derive(Debug, Clone)]
pub struct SeriesOptions {
    /// Prepended to the zero-padded slice index in each file name.
    pub prefix: String,
    pub patient_id: String,
    pub patient_name: String,
    pub study_id: String,
    /// Series number, written as a DICOM IS value.
    pub series_number: String,
    /// Content and study date in DA form (YYYYMMDD).
    pub date: String,
    /// Content and study time in TM form (HHMMSS).
    pub time: String,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        let now = Local::now();
        Self {
            prefix: String::new(),
            patient_id: "ANON0001".into(),
            patient_name: "ANON0001".into(),
            study_id: "ANON0001".into(),
            series_number: "0001".into(),
            date: now.format("%Y%m%d").to_string(),
            time: now.format("%H%M%S").to_string(),
        }
    }
}

/// Identifiers shared by every slice of one exported series.
struct SeriesUids {
    study: String,
    series: String,
    frame_of_reference: String,
}

/// Writes a [`Volume`] to disk as one DICOM CT image file per axial slice.
pub struct SeriesWriter;

impl SeriesWriter {
    /// Export every slice of `volume` into `dir`, creating the directory
    /// and its parents if needed.
    ///
    /// Files are named `{prefix}{index:04}.dcm` and silently overwrite
    /// existing files. All slices share the study, series and frame of
    /// reference UIDs of this call; each carries its own SOP instance UID.
    /// When the volume's frame carries a UID it is reused as the
    /// FrameOfReferenceUID, otherwise a fresh one is generated.
    ///
    /// Slices are written in parallel. A failure part-way through leaves
    /// the slices already written on disk; no cleanup is attempted.
    ///
    /// # Errors
    ///
    /// Fails when the in-plane extents do not fit the unsigned 16-bit
    /// Columns/Rows attributes, the directory cannot be created, a file
    /// cannot be written, or a shifted intensity does not fit into
    /// unsigned 16 bits.
    pub fn write(
        volume: &Volume,
        dir: &Path,
        options: &SeriesOptions,
    ) -> Result<(), SeriesWriteError> {
        let (columns, rows) = (volume.frame.size.0, volume.frame.size.1);
        if columns > u16::MAX as usize || rows > u16::MAX as usize {
            return Err(SeriesWriteError::ExtentOverflow { columns, rows });
        }

        fs::create_dir_all(dir)?;

        let uids = SeriesUids {
            study: uid::generate_uid(),
            series: uid::generate_uid(),
            frame_of_reference: volume
                .frame
                .uid
                .clone()
                .unwrap_or_else(uid::generate_uid),
        };
        let min_val = volume.min_value();

        (0..volume.nslices())
            .into_par_iter()
            .try_for_each(|index| Self::write_slice(volume, dir, options, &uids, min_val, index))
    }

    fn write_slice(
        volume: &Volume,
        dir: &Path,
        options: &SeriesOptions,
        uids: &SeriesUids,
        min_val: f32,
        index: usize,
    ) -> Result<(), SeriesWriteError> {
        let sop_instance_uid = uid::generate_uid();
        let mut obj = boilerplate_dataset(uids, &sop_instance_uid, options);

        let frame = &volume.frame;
        let location = frame.slice_location(index);

        obj.put(DataElement::new(
            tags::SLICE_THICKNESS,
            VR::DS,
            ds(&[frame.spacing.2]),
        ));
        obj.put(DataElement::new(
            tags::PIXEL_SPACING,
            VR::DS,
            ds(&[frame.spacing.0, frame.spacing.1]),
        ));
        obj.put(DataElement::new(tags::SLICE_LOCATION, VR::DS, ds(&[location])));
        obj.put(DataElement::new(
            tags::IMAGE_POSITION_PATIENT,
            VR::DS,
            ds(&[frame.start.0, frame.start.1, location]),
        ));
        obj.put(DataElement::new(
            tags::COLUMNS,
            VR::US,
            PrimitiveValue::from(frame.size.0 as u16),
        ));
        obj.put(DataElement::new(
            tags::ROWS,
            VR::US,
            PrimitiveValue::from(frame.size.1 as u16),
        ));
        obj.put(DataElement::new(
            tags::ACQUISITION_NUMBER,
            VR::IS,
            PrimitiveValue::from((index + 1).to_string()),
        ));
        obj.put(DataElement::new(
            tags::MODALITY,
            VR::CS,
            PrimitiveValue::from(volume.modality.as_deref().unwrap_or("")),
        ));
        obj.put(DataElement::new(
            tags::DERIVATION_DESCRIPTION,
            VR::ST,
            PrimitiveValue::from(volume.feature_label.as_deref().unwrap_or("")),
        ));
        obj.put(DataElement::new(
            tags::RESCALE_SLOPE,
            VR::DS,
            PrimitiveValue::from("1"),
        ));
        obj.put(DataElement::new(
            tags::RESCALE_INTERCEPT,
            VR::DS,
            ds(&[min_val.floor()]),
        ));
        obj.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(0_u16),
        ));

        let pixels = slice_pixels(volume.data.slice(s![index, .., ..]), min_val, index)?;
        obj.put(DataElement::new(
            tags::PIXEL_DATA,
            VR::OW,
            PrimitiveValue::U16(C::from_vec(pixels)),
        ));

        let meta = FileMetaTableBuilder::new()
            .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
            .media_storage_sop_instance_uid(sop_instance_uid)
            .transfer_syntax(IMPLICIT_VR_LITTLE_ENDIAN.uid())
            .implementation_class_uid(IMPLEMENTATION_CLASS_UID)
            .implementation_version_name(IMPLEMENTATION_VERSION_NAME)
            .build()
            .map_err(|e| SeriesWriteError::Meta(e.to_string()))?;

        let path = dir.join(format!("{}{:04}.dcm", options.prefix, index));
        obj.with_exact_meta(meta).write_to_file(path)?;
        Ok(())
    }
}

/// Shift a slice's intensities by the volume minimum and narrow them to
/// the stored unsigned 16-bit form, flattened in row-major order.
fn slice_pixels(
    slice: ArrayView2<f32>,
    min_val: f32,
    index: usize,
) -> Result<Vec<u16>, SeriesWriteError> {
    slice
        .iter()
        .map(|&value| {
            let shifted = value - min_val;
            if (0.0..=f32::from(u16::MAX)).contains(&shifted) {
                Ok(shifted as u16)
            } else {
                Err(SeriesWriteError::PixelRange {
                    slice: index,
                    value,
                    min: min_val,
                })
            }
        })
        .collect()
}

/// One slice's worth of required CT image attributes.
///
/// Geometry, rescale and pixel fields carry neutral placeholders here and
/// are overwritten by the per-slice pass in [`SeriesWriter`].
fn boilerplate_dataset(
    uids: &SeriesUids,
    sop_instance_uid: &str,
    options: &SeriesOptions,
) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();

    obj.put(DataElement::new(
        tags::CONTENT_DATE,
        VR::DA,
        PrimitiveValue::from(options.date.as_str()),
    ));
    obj.put(DataElement::new(
        tags::CONTENT_TIME,
        VR::TM,
        PrimitiveValue::from(options.time.as_str()),
    ));
    obj.put(DataElement::new(
        tags::STUDY_DATE,
        VR::DA,
        PrimitiveValue::from(options.date.as_str()),
    ));
    obj.put(DataElement::new(
        tags::STUDY_TIME,
        VR::TM,
        PrimitiveValue::from(options.time.as_str()),
    ));

    obj.put(DataElement::new(
        tags::PATIENT_ID,
        VR::LO,
        PrimitiveValue::from(options.patient_id.as_str()),
    ));
    obj.put(DataElement::new(
        tags::PATIENT_NAME,
        VR::PN,
        PrimitiveValue::from(options.patient_name.as_str()),
    ));
    obj.put(DataElement::new(
        tags::STUDY_ID,
        VR::SH,
        PrimitiveValue::from(options.study_id.as_str()),
    ));
    obj.put(DataElement::new(
        tags::SERIES_NUMBER,
        VR::IS,
        PrimitiveValue::from(options.series_number.as_str()),
    ));
    obj.put(DataElement::new(
        tags::ACCESSION_NUMBER,
        VR::SH,
        PrimitiveValue::Empty,
    ));
    obj.put(DataElement::new(
        tags::REFERRING_PHYSICIAN_NAME,
        VR::PN,
        PrimitiveValue::Empty,
    ));
    obj.put(DataElement::new(tags::PATIENT_SEX, VR::CS, PrimitiveValue::Empty));
    obj.put(DataElement::new(tags::PATIENT_AGE, VR::AS, PrimitiveValue::Empty));
    obj.put(DataElement::new(
        tags::PATIENT_BIRTH_DATE,
        VR::DA,
        PrimitiveValue::Empty,
    ));
    obj.put(DataElement::new(
        tags::PATIENT_ORIENTATION,
        VR::CS,
        PrimitiveValue::from("LA"),
    ));
    obj.put(DataElement::new(
        tags::PATIENT_POSITION,
        VR::CS,
        PrimitiveValue::from("HFS"),
    ));

    obj.put(DataElement::new(
        tags::IMAGE_POSITION_PATIENT,
        VR::DS,
        ds(&[0.0, 0.0, 0.0]),
    ));
    obj.put(DataElement::new(
        tags::IMAGE_ORIENTATION_PATIENT,
        VR::DS,
        ds(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
    ));
    obj.put(DataElement::new(
        tags::INSTANCE_NUMBER,
        VR::IS,
        PrimitiveValue::from("1"),
    ));

    obj.put(DataElement::new(
        tags::STUDY_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(uids.study.as_str()),
    ));
    obj.put(DataElement::new(
        tags::SERIES_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(uids.series.as_str()),
    ));
    obj.put(DataElement::new(
        tags::FRAME_OF_REFERENCE_UID,
        VR::UI,
        PrimitiveValue::from(uids.frame_of_reference.as_str()),
    ));
    obj.put(DataElement::new(
        tags::SOP_INSTANCE_UID,
        VR::UI,
        PrimitiveValue::from(sop_instance_uid),
    ));
    obj.put(DataElement::new(
        tags::SOP_CLASS_UID,
        VR::UI,
        PrimitiveValue::from(CT_IMAGE_STORAGE),
    ));

    obj.put(DataElement::new(
        tags::IMAGE_TYPE,
        VR::CS,
        PrimitiveValue::Strs(smallvec![
            "ORIGINAL".to_string(),
            "PRIMARY".to_string(),
            "AXIAL".to_string(),
        ]),
    ));
    obj.put(DataElement::new(tags::MODALITY, VR::CS, PrimitiveValue::Empty));
    obj.put(DataElement::new(
        tags::SAMPLES_PER_PIXEL,
        VR::US,
        PrimitiveValue::from(1_u16),
    ));
    obj.put(DataElement::new(
        tags::PHOTOMETRIC_INTERPRETATION,
        VR::CS,
        PrimitiveValue::from("MONOCHROME2"),
    ));
    obj.put(DataElement::new(
        tags::BITS_ALLOCATED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    obj.put(DataElement::new(
        tags::BITS_STORED,
        VR::US,
        PrimitiveValue::from(16_u16),
    ));
    obj.put(DataElement::new(
        tags::HIGH_BIT,
        VR::US,
        PrimitiveValue::from(15_u16),
    ));
    obj.put(DataElement::new(
        tags::PIXEL_REPRESENTATION,
        VR::US,
        PrimitiveValue::from(0_u16),
    ));
    obj.put(DataElement::new(tags::KVP, VR::DS, PrimitiveValue::Empty));
    obj.put(DataElement::new(
        tags::ACQUISITION_NUMBER,
        VR::IS,
        PrimitiveValue::from("1"),
    ));

    obj.put(DataElement::new(tags::ROWS, VR::US, PrimitiveValue::from(0_u16)));
    obj.put(DataElement::new(tags::COLUMNS, VR::US, PrimitiveValue::from(0_u16)));
    obj.put(DataElement::new(
        tags::PIXEL_SPACING,
        VR::DS,
        ds(&[1.0, 1.0]),
    ));
    obj.put(DataElement::new(
        tags::SLICE_THICKNESS,
        VR::DS,
        ds(&[1.0]),
    ));
    obj.put(DataElement::new(tags::SLICE_LOCATION, VR::DS, ds(&[0.0])));
    obj.put(DataElement::new(
        tags::RESCALE_INTERCEPT,
        VR::DS,
        PrimitiveValue::from("0"),
    ));
    obj.put(DataElement::new(
        tags::RESCALE_SLOPE,
        VR::DS,
        PrimitiveValue::from("1"),
    ));
    obj.put(DataElement::new(tags::UNITS, VR::CS, PrimitiveValue::from("HU")));
    obj.put(DataElement::new(
        tags::RESCALE_TYPE,
        VR::LO,
        PrimitiveValue::from("HU"),
    ));

    obj
}

/// Format values as a DICOM decimal string (DS) list.
fn ds(values: &[f32]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|v| ds_repr(*v)).collect())
}

/// DS values are limited to 16 bytes. Plain decimal notation is used
/// where it fits and exponent notation otherwise, which for `f32` always
/// stays within the limit.
fn ds_repr(value: f32) -> String {
    let plain = value.to_string();
    if plain.len() <= 16 {
        plain
    } else {
        format!("{:e}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameOfReference;
    use crate::volume::Volume;
    use dicom::core::Tag;
    use dicom::object::{open_file, FileDicomObject, InMemDicomObject};
    use ndarray::ArrayD;
    use std::path::PathBuf;

    fn ones_volume(size: (usize, usize, usize)) -> Volume {
        let frame = FrameOfReference::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0), size);
        let array = ArrayD::ones(vec![size.2, size.1, size.0]);
        Volume::from_array_in_frame(array, frame).unwrap()
    }

    fn slice_paths(dir: &Path, prefix: &str, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| dir.join(format!("{}{:04}.dcm", prefix, i)))
            .collect()
    }

    fn read_str(obj: &FileDicomObject<InMemDicomObject>, tag: Tag) -> String {
        obj.element(tag)
            .unwrap()
            .to_str()
            .unwrap()
            .trim_end_matches(['\0', ' '])
            .to_string()
    }

    #[test]
    fn one_file_per_slice() {
        let dir = tempfile::tempdir().unwrap();
        ones_volume((2, 3, 4)).to_dicom(dir.path()).unwrap();

        let paths = slice_paths(dir.path(), "", 4);
        for path in &paths {
            assert!(path.is_file(), "missing {}", path.display());
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 4);
    }

    #[test]
    fn prefix_appears_in_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let options = SeriesOptions {
            prefix: "ct_".into(),
            ..SeriesOptions::default()
        };
        ones_volume((2, 2, 2))
            .to_dicom_with(dir.path(), &options)
            .unwrap();
        assert!(dir.path().join("ct_0000.dcm").is_file());
        assert!(dir.path().join("ct_0001.dcm").is_file());
    }

    #[test]
    fn slice_locations_step_along_z() {
        let dir = tempfile::tempdir().unwrap();
        let frame = FrameOfReference::new((1.5, -2.0, 0.0), (1.0, 1.0, 1.0), (2, 3, 4));
        let volume = Volume::from_array_in_frame(ArrayD::ones(vec![4, 3, 2]), frame).unwrap();
        volume.to_dicom(dir.path()).unwrap();

        for (i, path) in slice_paths(dir.path(), "", 4).iter().enumerate() {
            let obj = open_file(path).unwrap();
            let location = obj.element(tags::SLICE_LOCATION).unwrap().to_float32().unwrap();
            assert_eq!(location, i as f32);

            let position = obj
                .element(tags::IMAGE_POSITION_PATIENT)
                .unwrap()
                .to_multi_float32()
                .unwrap();
            assert_eq!(position, vec![1.5, -2.0, i as f32]);

            let acquisition = obj
                .element(tags::ACQUISITION_NUMBER)
                .unwrap()
                .to_int::<i32>()
                .unwrap();
            assert_eq!(acquisition, i as i32 + 1);
        }
    }

    #[test]
    fn geometry_fields_follow_the_frame() {
        let dir = tempfile::tempdir().unwrap();
        let frame = FrameOfReference::new((0.0, 0.0, 0.0), (0.5, 0.75, 2.0), (6, 5, 2));
        let volume = Volume::from_array_in_frame(ArrayD::ones(vec![2, 5, 6]), frame).unwrap();
        volume.to_dicom(dir.path()).unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        assert_eq!(obj.element(tags::COLUMNS).unwrap().to_int::<u16>().unwrap(), 6);
        assert_eq!(obj.element(tags::ROWS).unwrap().to_int::<u16>().unwrap(), 5);
        assert_eq!(
            obj.element(tags::PIXEL_SPACING).unwrap().to_multi_float32().unwrap(),
            vec![0.5, 0.75]
        );
        assert_eq!(
            obj.element(tags::SLICE_THICKNESS).unwrap().to_float32().unwrap(),
            2.0
        );
    }

    #[test]
    fn series_uids_are_shared_and_sop_uids_distinct() {
        let dir = tempfile::tempdir().unwrap();
        ones_volume((2, 3, 4)).to_dicom(dir.path()).unwrap();

        let objects: Vec<_> = slice_paths(dir.path(), "", 4)
            .iter()
            .map(|p| open_file(p).unwrap())
            .collect();

        let study = read_str(&objects[0], tags::STUDY_INSTANCE_UID);
        let series = read_str(&objects[0], tags::SERIES_INSTANCE_UID);
        let frame_uid = read_str(&objects[0], tags::FRAME_OF_REFERENCE_UID);

        let mut sop_uids = Vec::new();
        for obj in &objects {
            assert_eq!(read_str(obj, tags::STUDY_INSTANCE_UID), study);
            assert_eq!(read_str(obj, tags::SERIES_INSTANCE_UID), series);
            assert_eq!(read_str(obj, tags::FRAME_OF_REFERENCE_UID), frame_uid);

            let sop = read_str(obj, tags::SOP_INSTANCE_UID);
            let media = obj
                .meta()
                .media_storage_sop_instance_uid
                .trim_end_matches('\0')
                .to_string();
            assert_eq!(media, sop);
            sop_uids.push(sop);
        }
        sop_uids.sort();
        sop_uids.dedup();
        assert_eq!(sop_uids.len(), 4);
    }

    #[test]
    fn existing_frame_uid_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let frame = FrameOfReference::new((0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (2, 2, 1))
            .with_uid("1.2.840.999.1");
        let volume = Volume::from_array_in_frame(ArrayD::ones(vec![1, 2, 2]), frame).unwrap();
        volume.to_dicom(dir.path()).unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        assert_eq!(read_str(&obj, tags::FRAME_OF_REFERENCE_UID), "1.2.840.999.1");
    }

    #[test]
    fn rescale_round_trip_for_constant_volume() {
        let dir = tempfile::tempdir().unwrap();
        ones_volume((2, 2, 1)).to_dicom(dir.path()).unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        let intercept = obj
            .element(tags::RESCALE_INTERCEPT)
            .unwrap()
            .to_float32()
            .unwrap();
        let slope = obj.element(tags::RESCALE_SLOPE).unwrap().to_float32().unwrap();
        assert_eq!(intercept, 1.0);
        assert_eq!(slope, 1.0);

        // minVal = 1, so every stored value is 0 and value + intercept == 1
        let bytes = obj.element(tags::PIXEL_DATA).unwrap().to_bytes().unwrap();
        assert_eq!(bytes.len(), 2 * 2 * 2);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn stored_pixels_are_shifted_by_the_minimum() {
        let dir = tempfile::tempdir().unwrap();
        let mut array = ArrayD::from_elem(vec![1, 1, 2], -10.0);
        array[[0, 0, 1]] = 20.0;
        let volume = Volume::from_array(array).unwrap();
        volume.to_dicom(dir.path()).unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        let bytes = obj.element(tags::PIXEL_DATA).unwrap().to_bytes().unwrap();
        let stored: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(stored, vec![0, 30]);
        let intercept = obj
            .element(tags::RESCALE_INTERCEPT)
            .unwrap()
            .to_float32()
            .unwrap();
        assert_eq!(intercept, -10.0);
    }

    #[test]
    fn out_of_range_intensity_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut array = ArrayD::from_elem(vec![1, 1, 2], 0.0);
        array[[0, 0, 1]] = 70000.0;
        let volume = Volume::from_array(array).unwrap();

        let err = volume.to_dicom(dir.path()).unwrap_err();
        assert!(matches!(err, SeriesWriteError::PixelRange { slice: 0, .. }));
    }

    #[test]
    fn oversized_extent_is_reported_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let frame = FrameOfReference::new(
            (0.0, 0.0, 0.0),
            (1.0, 1.0, 1.0),
            (u16::MAX as usize + 2, 1, 1),
        );
        let volume =
            Volume::from_array_in_frame(ArrayD::zeros(vec![1, 1, u16::MAX as usize + 2]), frame)
                .unwrap();

        let out_dir = dir.path().join("series");
        let err = volume.to_dicom(&out_dir).unwrap_err();
        assert!(matches!(
            err,
            SeriesWriteError::ExtentOverflow {
                columns: 65537,
                rows: 1
            }
        ));
        // rejected before any filesystem side effect
        assert!(!out_dir.exists());
    }

    #[test]
    fn decimal_strings_fit_the_ds_value_limit() {
        for value in [0.0_f32, 1.5, -2.0, 0.000_976_562_5, 1e-30, -1.234_567_8e-38, 3.4e38] {
            let repr = ds_repr(value);
            assert!(repr.len() <= 16, "{repr:?} exceeds 16 bytes");
            assert_eq!(repr.parse::<f32>().unwrap(), value);
        }
    }

    #[test]
    fn two_dimensional_volume_exports_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let volume = Volume::from_array(ArrayD::ones(vec![5, 5])).unwrap();
        volume.to_dicom(dir.path()).unwrap();

        assert!(dir.path().join("0000.dcm").is_file());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn exporting_twice_overwrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let volume = ones_volume((2, 2, 2));
        volume.to_dicom(dir.path()).unwrap();
        let first = read_str(
            &open_file(dir.path().join("0000.dcm")).unwrap(),
            tags::SERIES_INSTANCE_UID,
        );

        volume.to_dicom(dir.path()).unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
        let second = read_str(
            &open_file(dir.path().join("0000.dcm")).unwrap(),
            tags::SERIES_INSTANCE_UID,
        );
        // same file names, fresh series identity
        assert_ne!(first, second);
    }

    #[test]
    fn explicit_options_make_output_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let options = SeriesOptions {
            date: "20200101".into(),
            time: "101500".into(),
            patient_id: "PHANTOM01".into(),
            ..SeriesOptions::default()
        };
        ones_volume((2, 2, 1))
            .to_dicom_with(dir.path(), &options)
            .unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        assert_eq!(read_str(&obj, tags::CONTENT_DATE), "20200101");
        assert_eq!(read_str(&obj, tags::STUDY_TIME), "101500");
        assert_eq!(read_str(&obj, tags::PATIENT_ID), "PHANTOM01");
    }

    #[test]
    fn modality_and_feature_label_are_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut volume = ones_volume((2, 2, 1));
        volume.modality = Some("CT".into());
        volume.feature_label = Some("water phantom".into());
        volume.to_dicom(dir.path()).unwrap();

        let obj = open_file(dir.path().join("0000.dcm")).unwrap();
        assert_eq!(read_str(&obj, tags::MODALITY), "CT");
        assert_eq!(read_str(&obj, tags::DERIVATION_DESCRIPTION), "water phantom");
        assert_eq!(read_str(&obj, tags::PHOTOMETRIC_INTERPRETATION), "MONOCHROME2");
        assert_eq!(read_str(&obj, tags::SOP_CLASS_UID), CT_IMAGE_STORAGE);
    }
}
