//! Spatiotemporal tile index
//!
//! Maps query bounding boxes to the raster tiles that intersect them. The
//! catalog datasets index at most a few dozen tiles, so a linear scan over a
//! flat entry list is the whole data structure.

use crate::error::{DatasetError, Result};
use geotrain_core::BoundingBox;
use std::path::PathBuf;

/// One indexed raster tile.
#[derive(Debug, Clone)]
pub struct TileEntry {
    /// Spatiotemporal coverage of the tile
    pub bounds: BoundingBox,
    /// File the tile lives in
    pub path: PathBuf,
}

/// Index of raster tiles queryable by bounding box.
#[derive(Debug, Clone, Default)]
pub struct TileIndex {
    entries: Vec<TileEntry>,
}

impl TileIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tile to the index
    pub fn insert(&mut self, bounds: BoundingBox, path: PathBuf) {
        self.entries.push(TileEntry { bounds, path });
    }

    /// Number of indexed tiles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no tiles
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of all entry bounds, or `None` for an empty index
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut it = self.entries.iter();
        let first = it.next()?.bounds;
        Some(it.fold(first, |acc, e| acc.union(&e.bounds)))
    }

    /// Number of distinct time ranges among the entries.
    ///
    /// This is the dataset length: one slice per acquisition period.
    pub fn time_slices(&self) -> usize {
        let mut ranges: Vec<(i64, i64)> = self
            .entries
            .iter()
            .map(|e| (e.bounds.mint, e.bounds.maxt))
            .collect();
        ranges.sort_unstable();
        ranges.dedup();
        ranges.len()
    }

    /// All entries intersecting `query`.
    ///
    /// Fails with [`DatasetError::QueryOutOfBounds`] when nothing matches,
    /// reporting both the query and the index bounds.
    pub fn query(&self, query: &BoundingBox) -> Result<Vec<&TileEntry>> {
        let hits: Vec<&TileEntry> = self
            .entries
            .iter()
            .filter(|e| e.bounds.intersects(query))
            .collect();

        if hits.is_empty() {
            return Err(DatasetError::QueryOutOfBounds {
                query: *query,
                bounds: self.bounds().unwrap_or(*query),
            });
        }
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_box(x0: f64, t: i64) -> BoundingBox {
        BoundingBox::new(x0, x0 + 1.0, 0.0, 1.0, t, t + 10)
    }

    #[test]
    fn test_bounds_union() {
        let mut index = TileIndex::new();
        index.insert(entry_box(0.0, 0), "a.tif".into());
        index.insert(entry_box(2.0, 20), "b.tif".into());

        let b = index.bounds().unwrap();
        assert_eq!(b, BoundingBox::new(0.0, 3.0, 0.0, 1.0, 0, 30));
    }

    #[test]
    fn test_time_slices() {
        let mut index = TileIndex::new();
        index.insert(entry_box(0.0, 0), "a.tif".into());
        index.insert(entry_box(2.0, 0), "b.tif".into());
        index.insert(entry_box(0.0, 50), "c.tif".into());

        assert_eq!(index.len(), 3);
        assert_eq!(index.time_slices(), 2);
    }

    #[test]
    fn test_query_hit() {
        let mut index = TileIndex::new();
        index.insert(entry_box(0.0, 0), "a.tif".into());
        index.insert(entry_box(2.0, 0), "b.tif".into());

        let q = BoundingBox::new(0.5, 0.7, 0.2, 0.8, 0, 5);
        let hits = index.query(&q).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].path, PathBuf::from("a.tif"));
    }

    #[test]
    fn test_query_miss_message() {
        let mut index = TileIndex::new();
        index.insert(entry_box(0.0, 0), "a.tif".into());

        let q = BoundingBox::new(100.0, 101.0, 100.0, 101.0, 0, 5);
        let err = index.query(&q).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("query: "));
        assert!(msg.contains("not found in index with bounds:"));
    }
}
