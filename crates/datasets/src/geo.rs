//! The dataset trait and sample contract

use crate::error::Result;
use geotrain_core::{BoundingBox, Crs};
use ndarray::Array2;

/// One sample returned by a spatiotemporal query.
///
/// Imagery datasets fill `image`, label datasets fill `mask`; an
/// intersection of the two fills both. `prediction` is never produced by a
/// dataset; callers attach model output there before plotting.
#[derive(Debug, Clone)]
pub struct Sample {
    /// CRS of the arrays below
    pub crs: Crs,
    /// The extent this sample covers
    pub bounds: BoundingBox,
    /// Imagery values, row-major north-up
    pub image: Option<Array2<f32>>,
    /// Class-label values, row-major north-up
    pub mask: Option<Array2<u8>>,
    /// Optional model output with the same shape as `mask`
    pub prediction: Option<Array2<u8>>,
}

impl Sample {
    /// An empty sample over `bounds`
    pub fn new(crs: Crs, bounds: BoundingBox) -> Self {
        Self {
            crs,
            bounds,
            image: None,
            mask: None,
            prediction: None,
        }
    }

    /// Merge another sample into this one; existing layers win.
    pub fn merge(&mut self, other: Sample) {
        if self.image.is_none() {
            self.image = other.image;
        }
        if self.mask.is_none() {
            self.mask = other.mask;
        }
        if self.prediction.is_none() {
            self.prediction = other.prediction;
        }
    }
}

/// A queryable georeferenced dataset.
///
/// Implemented by file-backed raster layers and by the intersection/union
/// combinators over them.
pub trait GeoDataset {
    /// The coordinate reference system all queries and samples use
    fn crs(&self) -> &Crs;

    /// Resolution in CRS units per pixel
    fn res(&self) -> f64;

    /// Full spatiotemporal coverage
    fn bounds(&self) -> BoundingBox;

    /// Number of distinct time slices indexed
    fn len(&self) -> usize;

    /// Whether the dataset indexes nothing
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Retrieve the sample covering `query`.
    ///
    /// Fails with [`DatasetError::QueryOutOfBounds`](crate::DatasetError::QueryOutOfBounds)
    /// when the query does not overlap the coverage.
    fn get(&self, query: &BoundingBox) -> Result<Sample>;
}
