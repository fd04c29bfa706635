//! # GeoTrain Core
//!
//! Core types and I/O for the GeoTrain geospatial data-loading library.
//!
//! This crate provides:
//! - `BoundingBox`: spatiotemporal extents used as dataset coverage and query keys
//! - `Crs`: Coordinate Reference System handling
//! - `GeoTransform`: affine transformation for georeferencing
//! - `Raster<T>`: generic in-memory raster grid
//! - GeoTIFF reading/writing via the `tiff` crate

pub mod bbox;
pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use bbox::BoundingBox;
pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{CellValue, GeoTransform, Raster};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::bbox::BoundingBox;
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{CellValue, GeoTransform, Raster};
}
