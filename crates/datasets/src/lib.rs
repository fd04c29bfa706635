//! # GeoTrain Datasets
//!
//! Downloadable georeferenced raster datasets with spatiotemporal indexing.
//!
//! A dataset is a [`RasterLayer`]: a set of GeoTIFF tiles on disk, indexed
//! by bounding box and acquisition year, queryable for merged samples.
//! Layers combine with `&` (intersection) and `|` (union) into
//! [`IntersectionDataset`] / [`UnionDataset`], which is how imagery gets
//! paired with label coverage for training.
//!
//! ```ignore
//! use geotrain_datasets::{catalog, LayerConfig, RasterLayer, GeoDataset};
//!
//! let config = LayerConfig::new("data/soybean")
//!     .years(vec![2002, 2021])
//!     .download(true);
//! let soybean = RasterLayer::new(catalog::soybean_cover(), config)?;
//! let sample = soybean.get(&soybean.bounds())?;
//! ```

pub mod catalog;
pub mod combine;
pub mod download;
pub mod error;
pub mod geo;
pub mod index;
pub mod plot;
pub mod raster;

pub use combine::{IntersectionDataset, UnionDataset};
pub use error::{DatasetError, Result};
pub use geo::{GeoDataset, Sample};
pub use plot::{Figure, Panel, PlotOptions};
pub use raster::{CellKind, LayerConfig, LayerDescriptor, RasterLayer};
