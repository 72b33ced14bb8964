mod dicom;
mod spectro;
mod tarquin;

pub use dicom::DicomHeader;
pub use spectro::{
    find_spar_sdat_pair,
    is_dicom,
    SparHeader,
    SpectroFormat,
    SpectroInput,
};
pub use tarquin::{
    TarquinConfig,
    TarquinQuantifier,
};
