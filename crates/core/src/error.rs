//! Error types for GeoTrain core

use thiserror::Error;

/// Main error type for core raster operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("Cell out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    CellOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Unsupported sample format: {0}")]
    UnsupportedSampleFormat(String),

    #[error("Missing georeferencing tags in {0}")]
    MissingGeoTags(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
