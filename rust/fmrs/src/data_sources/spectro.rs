use std::fs::File;
use std::io::Read;
use std::path::{
    Path,
    PathBuf,
};
use tracing::{
    debug,
    info,
};

use super::dicom::DicomHeader;
use crate::errors::{
    FmrsError,
    Result,
};

const DICOM_PREAMBLE_LEN: usize = 128;
const DICOM_MAGIC: &[u8; 4] = b"DICM";

/// Checks for the `DICM` marker after the 128 byte preamble.
pub fn is_dicom(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| FmrsError::io(e, path))?;
    let mut buf = [0u8; DICOM_PREAMBLE_LEN + 4];
    let mut read = 0;
    while read < buf.len() {
        match file.read(&mut buf[read..]) {
            Ok(0) => return Ok(false),
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FmrsError::io(e, path)),
        }
    }
    Ok(&buf[DICOM_PREAMBLE_LEN..] == DICOM_MAGIC)
}

/// `key : value` header of a Philips SPAR file.
#[derive(Debug, Clone, Default)]
pub struct SparHeader {
    entries: Vec<(String, String)>,
}

impl SparHeader {
    /// Lines starting with `!` are comments, lines without a colon are skipped.
    ///
    /// ```
    /// use fmrs::data_sources::SparHeader;
    ///
    /// let header = SparHeader::parse("!comment\nsamples : 2048\nrows : 360\n");
    /// assert_eq!(header.get("rows"), Some("360"));
    /// assert_eq!(header.get_usize("samples").unwrap(), 2048);
    /// ```
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter(|line| !line.trim_start().starts_with('!'))
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect();
        Self { entries }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| FmrsError::io(e, path))?;
        // Scanner exports are latin-1 at times, do not fail on it.
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_usize(&self, key: &str) -> Result<usize> {
        let value = self.get(key).ok_or_else(|| FmrsError::InputFormat {
            msg: format!("unable to read parameter \"{}\" in SPAR", key),
            path: None,
        })?;
        value.parse::<usize>().map_err(|e| FmrsError::ParseError {
            msg: format!("SPAR parameter \"{}\" = \"{}\": {}", key, value, e),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpectroFormat {
    Dicom,
    SparSdat { spar: PathBuf, sdat: PathBuf },
}

/// A raw fMRS acquisition series on disk.
#[derive(Debug, Clone)]
pub struct SpectroInput {
    pub path: PathBuf,
    pub format: SpectroFormat,
    /// Number of dynamics, when the header could tell.
    pub acquisitions: Option<usize>,
    pub samples: Option<usize>,
}

impl SpectroInput {
    /// Identifies the input format and reads the number of dynamics and
    /// samples from the SPAR or DICOM header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(FmrsError::io(
                std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                path,
            ));
        }

        if is_dicom(path)? {
            info!("Reading DICOM spectroscopy file {}", path.display());
            let header = DicomHeader::from_file(path)?;
            return Ok(Self {
                path: path.to_path_buf(),
                format: SpectroFormat::Dicom,
                acquisitions: Some(header.dynamics),
                samples: Some(header.samples),
            });
        }

        let (spar, sdat) = find_spar_sdat_pair(path)?;
        info!("Reading SPAR header {}", spar.display());
        let header = SparHeader::from_file(&spar)?;
        let samples = header
            .get_usize("samples")
            .map_err(|e| with_path(e, &spar))?;
        let rows = header.get_usize("rows").map_err(|e| with_path(e, &spar))?;
        let mix_number = header
            .get_usize("mix_number")
            .map_err(|e| with_path(e, &spar))?;
        if mix_number != 1 {
            return Err(FmrsError::InputFormat {
                msg: "SPAR/SDAT file seems to be a reference spectrum, choose an actual spectrum"
                    .to_string(),
                path: Some(spar),
            });
        }
        debug!("SPAR: samples={} rows={} mix_number={}", samples, rows, mix_number);

        Ok(Self {
            path: sdat.clone(),
            format: SpectroFormat::SparSdat { spar, sdat },
            acquisitions: Some(rows),
            samples: Some(samples),
        })
    }

    /// Number of acquisitions `N`; an explicit value takes precedence over
    /// the header.
    pub fn acquisition_count(&self, explicit: Option<usize>) -> Result<usize> {
        let count = match (explicit, self.acquisitions) {
            (Some(n), _) => n,
            (None, Some(n)) => n,
            (None, None) => {
                return Err(FmrsError::InputFormat {
                    msg: "the number of dynamics cannot be read from this input, \
                          provide it explicitly"
                        .to_string(),
                    path: Some(self.path.clone()),
                })
            }
        };
        if count <= 1 {
            return Err(FmrsError::InputFormat {
                msg: format!("not a dynamic acquisition ({} spectra)", count),
                path: Some(self.path.clone()),
            });
        }
        Ok(count)
    }

    /// Value of TARQUIN's `--format` option for this input.
    pub fn tarquin_format(&self) -> &'static str {
        match self.format {
            SpectroFormat::Dicom => "philips_dcm",
            SpectroFormat::SparSdat { .. } => "philips",
        }
    }
}

fn with_path(e: FmrsError, path: &Path) -> FmrsError {
    match e {
        FmrsError::InputFormat { msg, .. } => FmrsError::InputFormat {
            msg,
            path: Some(path.to_path_buf()),
        },
        other => other,
    }
}

/// Given either half of a SPAR/SDAT pair, finds both files.
///
/// The partner has the same stem and the other extension, in any case.
pub fn find_spar_sdat_pair(path: &Path) -> Result<(PathBuf, PathBuf)> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let partner_ext = match ext.as_str() {
        "spar" => "sdat",
        "sdat" => "spar",
        _ => {
            return Err(FmrsError::InputFormat {
                msg: "file extension should be SDAT/SPAR (or a DICOM file)".to_string(),
                path: Some(path.to_path_buf()),
            })
        }
    };
    let stem = path.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(&dir)
        .map_err(|e| FmrsError::io(e, &dir))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_stem() == Some(stem.as_os_str())
                && p.extension()
                    .map(|e| e.to_string_lossy().eq_ignore_ascii_case(partner_ext))
                    .unwrap_or(false)
        })
        .collect();
    candidates.sort();
    let Some(partner) = candidates.into_iter().next() else {
        return Err(FmrsError::InputFormat {
            msg: format!("matching .{} file not found", partner_ext.to_uppercase()),
            path: Some(path.to_path_buf()),
        });
    };

    if ext == "spar" {
        Ok((path.to_path_buf(), partner))
    } else {
        Ok((partner, path.to_path_buf()))
    }
}
