use dicom_core::Tag;
use dicom_object::InMemDicomObject;
use std::path::Path;
use tracing::debug;

use crate::errors::{
    FmrsError,
    Result,
};

const IMAGE_TYPE: Tag = Tag(0x0008, 0x0008);
const MODALITY: Tag = Tag(0x0008, 0x0060);
const MANUFACTURER: Tag = Tag(0x0008, 0x0070);
const ACQUISITION_DATA_COLUMNS: Tag = Tag(0x0028, 0x9002);
/// Philips private `NumberOfDynamicScans`.
const PHILIPS_DYNAMIC_SCANS: Tag = Tag(0x2001, 0x1081);
const SPECTROSCOPY_DATA: Tag = Tag(0x5600, 0x0020);

/// Values of a Philips MR spectroscopy DICOM header needed for the
/// sliding window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DicomHeader {
    pub samples: usize,
    pub dynamics: usize,
    /// 2 when the water reference is stored after the actual spectra.
    pub spectra_per_dynamic: usize,
}

impl DicomHeader {
    pub fn from_file(path: &Path) -> Result<Self> {
        let obj = dicom_object::open_file(path).map_err(|e| FmrsError::InputFormat {
            msg: format!("unable to read DICOM file: {}", e),
            path: Some(path.to_path_buf()),
        })?;
        Self::from_object(&obj).map_err(|e| match e {
            FmrsError::InputFormat { msg, .. } => FmrsError::InputFormat {
                msg,
                path: Some(path.to_path_buf()),
            },
            other => other,
        })
    }

    pub fn from_object(obj: &InMemDicomObject) -> Result<Self> {
        let modality = text(obj, MODALITY, "Modality")?;
        if modality.trim() != "MR" {
            return Err(invalid(format!(
                "not a MR DICOM file (modality \"{}\")",
                modality.trim()
            )));
        }
        let manufacturer = text(obj, MANUFACTURER, "Manufacturer")?;
        if !manufacturer.contains("Philips") {
            return Err(invalid(format!(
                "only Philips DICOM is supported (manufacturer \"{}\")",
                manufacturer.trim()
            )));
        }
        let image_type = text(obj, IMAGE_TYPE, "ImageType")?;
        if !image_type.contains("SPECTROSCOPY") {
            return Err(invalid("not a spectroscopy DICOM file".to_string()));
        }

        let samples = integer(obj, ACQUISITION_DATA_COLUMNS, "SpectroscopyAcquisitionDataColumns")?;
        let dynamics = integer(obj, PHILIPS_DYNAMIC_SCANS, "NumberOfDynamicScans")?;
        if dynamics <= 1 {
            return Err(invalid(format!(
                "not a dynamic acquisition ({} spectra)",
                dynamics
            )));
        }

        let data_points = obj
            .element(SPECTROSCOPY_DATA)
            .map_err(|_| invalid("missing SpectroscopyData".to_string()))?
            .to_multi_float32()
            .map_err(|e| invalid(format!("unreadable SpectroscopyData: {}", e)))?
            .len();
        // Complex samples, optionally followed by the water reference.
        let per_spectrum = dynamics * samples * 2;
        let spectra_per_dynamic = if data_points == 2 * per_spectrum {
            2
        } else if data_points == per_spectrum {
            1
        } else {
            return Err(invalid(format!(
                "unexpected number of total datapoints: {} for {} dynamics of {} samples",
                data_points, dynamics, samples
            )));
        };
        debug!(
            "DICOM: samples={} dynamics={} spectra_per_dynamic={}",
            samples, dynamics, spectra_per_dynamic
        );

        Ok(Self {
            samples,
            dynamics,
            spectra_per_dynamic,
        })
    }
}

fn invalid(msg: String) -> FmrsError {
    FmrsError::InputFormat { msg, path: None }
}

fn text(obj: &InMemDicomObject, tag: Tag, name: &str) -> Result<String> {
    let elem = obj
        .element(tag)
        .map_err(|_| invalid(format!("missing DICOM attribute {}", name)))?;
    elem.to_str()
        .map(|s| s.into_owned())
        .map_err(|e| invalid(format!("DICOM attribute {}: {}", name, e)))
}

fn integer(obj: &InMemDicomObject, tag: Tag, name: &str) -> Result<usize> {
    let elem = obj
        .element(tag)
        .map_err(|_| invalid(format!("missing DICOM attribute {}", name)))?;
    if let Ok(value) = elem.to_int::<i64>() {
        return usize::try_from(value)
            .map_err(|_| invalid(format!("DICOM attribute {} = {}", name, value)));
    }
    // Private tags read without a dictionary entry come back as raw text.
    let raw = elem
        .to_str()
        .map_err(|e| invalid(format!("DICOM attribute {}: {}", name, e)))?;
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .parse::<usize>()
        .map_err(|e| FmrsError::ParseError {
            msg: format!("DICOM attribute {} = \"{}\": {}", name, raw, e),
        })
}
