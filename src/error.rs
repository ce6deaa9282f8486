use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::FieldKind;

/// Failures of the project context. These abort a run.
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("layer '{0}' not found in project")]
    LayerNotFound(String),

    #[error("layer '{name}' is a {found} layer, expected a {expected} layer")]
    WrongLayerKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("layer '{name}' is defined twice in the project: {} and {}", .first.display(), .second.display())]
    DuplicateLayer {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("vector layer '{0}' contains no polygon geometry")]
    NoPolygon(String),

    #[error("table '{table}': expected {expected} values per feature, got {got}")]
    Arity {
        table: String,
        expected: usize,
        got: usize,
    },

    #[error("table '{table}': field '{field}' holds {expected:?} values, got '{value}'")]
    FieldType {
        table: String,
        field: String,
        expected: FieldKind,
        value: String,
    },
}

/// Failures while decoding a GeoTIFF into a raster frame.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TIFF decoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("raster has no ModelTransformation or ModelTiepoint/ModelPixelScale tags")]
    NotGeoreferenced,

    #[error("unsupported sample type {0}")]
    UnsupportedSampleType(&'static str),

    #[error("raster is {width}x{height} but holds {len} samples")]
    SizeMismatch { width: u32, height: u32, len: usize },
}

/// Why a single raster file produced no observation record.
///
/// Recoverable: the extractor logs the reason and moves on to the next file.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("filename '{0}' does not follow <PREFIX>_<PREFIX>_YYYY_MM_DD")]
    MalformedFilename(String),

    #[error("{year}-{month}-{day} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error(transparent)]
    Raster(#[from] RasterError),
}
