//! Spatiotemporal bounding boxes

use serde::{Deserialize, Serialize};
use std::fmt;

/// A spatiotemporal extent: a spatial rectangle in CRS units plus a time
/// range in unix seconds.
///
/// Serves both as the declared coverage of a dataset and as the query key
/// handed to it. Spatial intersection uses strict inequalities, so a
/// zero-area box never intersects anything; temporal overlap is inclusive
/// so instantaneous acquisitions still match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge
    pub minx: f64,
    /// Eastern edge
    pub maxx: f64,
    /// Southern edge
    pub miny: f64,
    /// Northern edge
    pub maxy: f64,
    /// Start of the time range (unix seconds)
    pub mint: i64,
    /// End of the time range (unix seconds)
    pub maxt: i64,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(minx: f64, maxx: f64, miny: f64, maxy: f64, mint: i64, maxt: i64) -> Self {
        Self {
            minx,
            maxx,
            miny,
            maxy,
            mint,
            maxt,
        }
    }

    /// Width of the spatial extent in CRS units
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    /// Height of the spatial extent in CRS units
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Length of the time range in seconds
    pub fn timespan(&self) -> i64 {
        self.maxt - self.mint
    }

    /// Whether the spatial extent has positive area
    pub fn has_area(&self) -> bool {
        self.minx < self.maxx && self.miny < self.maxy
    }

    /// Whether this box overlaps `other` in both space and time.
    ///
    /// Degenerate boxes have nothing to overlap, so either side being
    /// zero-area means no intersection.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.has_area()
            && other.has_area()
            && self.minx < other.maxx
            && self.maxx > other.minx
            && self.miny < other.maxy
            && self.maxy > other.miny
            && self.mint <= other.maxt
            && self.maxt >= other.mint
    }

    /// The shared extent of two boxes, or `None` when they do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BoundingBox {
            minx: self.minx.max(other.minx),
            maxx: self.maxx.min(other.maxx),
            miny: self.miny.max(other.miny),
            maxy: self.maxy.min(other.maxy),
            mint: self.mint.max(other.mint),
            maxt: self.maxt.min(other.maxt),
        })
    }

    /// The smallest box covering both extents.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            minx: self.minx.min(other.minx),
            maxx: self.maxx.max(other.maxx),
            miny: self.miny.min(other.miny),
            maxy: self.maxy.max(other.maxy),
            mint: self.mint.min(other.mint),
            maxt: self.maxt.max(other.maxt),
        }
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.minx <= other.minx
            && self.maxx >= other.maxx
            && self.miny <= other.miny
            && self.maxy >= other.maxy
            && self.mint <= other.mint
            && self.maxt >= other.maxt
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BoundingBox(minx={}, maxx={}, miny={}, maxy={}, mint={}, maxt={})",
            self.minx, self.maxx, self.miny, self.maxy, self.mint, self.maxt
        )
    }
}
