//! Error types for dataset construction and querying

use geotrain_core::BoundingBox;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced when constructing or querying datasets.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("core error: {0}")]
    Core(#[from] geotrain_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching files on disk and downloading is disabled.
    #[error("Dataset not found in `{root}`: no files matched and downloading is disabled")]
    DatasetNotFound { root: PathBuf },

    /// A query fell outside the indexed coverage. The message carries both
    /// the offending query and the valid bounds.
    #[error("query: {query} not found in index with bounds: {bounds}")]
    QueryOutOfBounds {
        query: BoundingBox,
        bounds: BoundingBox,
    },

    /// Two datasets with no shared extent; carries both extents so the
    /// message shows where each one actually is.
    #[error("no spatiotemporal overlap between {left} and {right}")]
    NoIntersection { left: String, right: String },

    #[error("cannot union zero datasets")]
    EmptyUnion,

    #[error("CRS mismatch: {left} vs {right}")]
    CrsMismatch { left: String, right: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("download of {url} failed with HTTP status {status}")]
    DownloadFailed { url: String, status: u16 },

    #[error("no download source configured for dataset `{name}`")]
    NoDownloadSource { name: String },

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid filename pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;
