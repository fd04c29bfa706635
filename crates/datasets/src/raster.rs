//! File-backed raster layers
//!
//! A [`RasterLayer`] is built from a static [`LayerDescriptor`] (what the
//! dataset is: filename pattern, download source, cell kind) plus a per-run
//! [`LayerConfig`] (where it lives and how to materialize it). Construction
//! downloads missing years when asked, then indexes every matching GeoTIFF
//! under the root by its georeferenced bounds and acquisition year.

use crate::download;
use crate::error::{DatasetError, Result};
use crate::geo::{GeoDataset, Sample};
use crate::index::TileIndex;
use chrono::NaiveDate;
use geotrain_core::{io, BoundingBox, Crs, Raster};
use lru::LruCache;
use ndarray::Array2;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// What the cells of a layer mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// Continuous imagery values; samples carry `image`
    Image,
    /// Class labels; samples carry `mask`
    Mask,
}

/// Static description of a raster dataset: how its files are named, where
/// they come from, and how to interpret them. See the `catalog` module for
/// the built-in descriptors.
#[derive(Debug, Clone)]
pub struct LayerDescriptor {
    /// Short dataset name used in logs
    pub name: String,
    /// Filename with a `{year}` placeholder, used for download targets
    pub filename_template: String,
    /// Regex matching tile filenames, with an optional `year` capture group
    pub filename_regex: String,
    /// Download URL template with a `{year}` placeholder
    pub url_template: Option<String>,
    /// Whether cells are imagery or class labels
    pub kind: CellKind,
    /// Years the upstream dataset publishes
    pub all_years: Vec<u16>,
    /// EPSG code of the published tiles
    pub epsg: u32,
    /// Class palette for plotting: (class value, rgb)
    pub palette: Vec<(u8, [u8; 3])>,
}

/// Per-run configuration for a raster layer.
#[derive(Debug, Clone)]
pub struct LayerConfig {
    /// Directory holding (or receiving) the tiles
    pub root: PathBuf,
    /// Years to index; `None` means every published year
    pub years: Option<Vec<u16>>,
    /// Fetch missing tiles during construction
    pub download: bool,
    /// Verify downloaded tiles against `checksums`
    pub checksum: bool,
    /// Expected SHA-256 digest per year
    pub checksums: HashMap<u16, String>,
    /// Source template overriding the descriptor's URL
    pub url: Option<String>,
    /// Decoded-tile cache capacity
    pub cache_size: usize,
}

impl LayerConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            years: None,
            download: false,
            checksum: false,
            checksums: HashMap::new(),
            url: None,
            cache_size: 16,
        }
    }

    pub fn years(mut self, years: Vec<u16>) -> Self {
        self.years = Some(years);
        self
    }

    pub fn download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    pub fn checksum(mut self, checksum: bool) -> Self {
        self.checksum = checksum;
        self
    }

    pub fn checksums(mut self, checksums: HashMap<u16, String>) -> Self {
        self.checksums = checksums;
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// A dataset backed by georeferenced tiles on disk.
#[derive(Clone)]
pub struct RasterLayer {
    descriptor: LayerDescriptor,
    crs: Crs,
    res: f64,
    index: TileIndex,
    cache: Arc<Mutex<LruCache<PathBuf, Arc<Raster<f32>>>>>,
}

impl fmt::Debug for RasterLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterLayer")
            .field("name", &self.descriptor.name)
            .field("crs", &self.crs)
            .field("res", &self.res)
            .field("tiles", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl RasterLayer {
    /// Build a layer: download missing years if allowed, then index the
    /// tiles found under the root.
    ///
    /// Fails with [`DatasetError::DatasetNotFound`] when nothing matches and
    /// downloading is off (or downloads produced nothing for the requested
    /// years).
    pub fn new(descriptor: LayerDescriptor, config: LayerConfig) -> Result<Self> {
        let years = config
            .years
            .clone()
            .unwrap_or_else(|| descriptor.all_years.clone());

        if config.download {
            Self::materialize(&descriptor, &config, &years)?;
        }

        let (index, res) = Self::build_index(&descriptor, &config.root, &years)?;
        info!(
            name = descriptor.name.as_str(),
            tiles = index.len(),
            "indexed raster layer"
        );

        let cache_size = NonZeroUsize::new(config.cache_size.max(1))
            .expect("cache size clamped to at least 1");
        Ok(Self {
            crs: Crs::from_epsg(descriptor.epsg),
            descriptor,
            res,
            index,
            cache: Arc::new(Mutex::new(LruCache::new(cache_size))),
        })
    }

    /// Fetch any requested year whose tile is not on disk yet.
    fn materialize(
        descriptor: &LayerDescriptor,
        config: &LayerConfig,
        years: &[u16],
    ) -> Result<()> {
        for &year in years {
            let filename = fill_year(&descriptor.filename_template, year);
            let dest = config.root.join(&filename);
            if dest.exists() {
                debug!(file = filename.as_str(), "tile already present");
                continue;
            }

            let template = config
                .url
                .as_deref()
                .or(descriptor.url_template.as_deref())
                .ok_or_else(|| DatasetError::NoDownloadSource {
                    name: descriptor.name.clone(),
                })?;
            let source = fill_year(template, year);
            download::fetch(&source, &dest)?;

            if config.checksum {
                if let Some(expected) = config.checksums.get(&year) {
                    if let Err(e) = download::verify_checksum(&dest, expected) {
                        // Drop the bad file so a retry starts clean.
                        let _ = fs::remove_file(&dest);
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    /// Scan the root for matching tiles and index their bounds.
    fn build_index(
        descriptor: &LayerDescriptor,
        root: &Path,
        years: &[u16],
    ) -> Result<(TileIndex, f64)> {
        if !root.is_dir() {
            return Err(DatasetError::DatasetNotFound {
                root: root.to_path_buf(),
            });
        }

        let pattern = Regex::new(&descriptor.filename_regex)?;
        let mut index = TileIndex::new();
        let mut res = None;

        for entry in fs::read_dir(root)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(caps) = pattern.captures(name) else {
                continue;
            };

            let year = caps
                .name("year")
                .and_then(|m| m.as_str().parse::<u16>().ok());
            if let Some(y) = year {
                if !years.contains(&y) {
                    continue;
                }
            }

            let path = entry.path();
            let (rows, cols, transform) = io::read_geotiff_meta(&path)?;
            let (minx, miny, maxx, maxy) = transform.bounds(cols, rows);
            let (mint, maxt) = match year {
                Some(y) => year_range(y),
                None => (i64::MIN, i64::MAX),
            };

            res.get_or_insert(transform.cell_size());
            index.insert(BoundingBox::new(minx, maxx, miny, maxy, mint, maxt), path);
        }

        match res {
            Some(res) if !index.is_empty() => Ok((index, res)),
            _ => Err(DatasetError::DatasetNotFound {
                root: root.to_path_buf(),
            }),
        }
    }

    /// The layer's descriptor
    pub fn descriptor(&self) -> &LayerDescriptor {
        &self.descriptor
    }

    fn load_tile(&self, path: &Path) -> Result<Arc<Raster<f32>>> {
        let mut cache = self
            .cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(tile) = cache.get(&path.to_path_buf()) {
            return Ok(Arc::clone(tile));
        }

        let tile: Arc<Raster<f32>> = Arc::new(io::read_geotiff(path)?);
        cache.put(path.to_path_buf(), Arc::clone(&tile));
        Ok(tile)
    }

    /// Merge all tiles intersecting `query` into one array over the query
    /// window. The first tile to cover a cell wins; uncovered cells stay at
    /// the fill value.
    fn read_window(&self, query: &BoundingBox) -> Result<Array2<f32>> {
        let entries = self.index.query(query)?;

        let out_cols = ((query.width() / self.res).round() as usize).max(1);
        let out_rows = ((query.height() / self.res).round() as usize).max(1);
        let mut grid = Array2::<f32>::from_elem((out_rows, out_cols), f32::NAN);

        for entry in entries {
            let Some(overlap) = query.intersection(&entry.bounds) else {
                continue;
            };
            let tile = self.load_tile(&entry.path)?;

            let c0 = (((overlap.minx - query.minx) / self.res).floor().max(0.0)) as usize;
            let c1 = ((((overlap.maxx - query.minx) / self.res).ceil()) as usize).min(out_cols);
            let r0 = (((query.maxy - overlap.maxy) / self.res).floor().max(0.0)) as usize;
            let r1 = ((((query.maxy - overlap.miny) / self.res).ceil()) as usize).min(out_rows);

            for r in r0..r1 {
                for c in c0..c1 {
                    if !grid[(r, c)].is_nan() {
                        continue;
                    }
                    // Nearest-neighbor lookup at the cell center.
                    let x = query.minx + (c as f64 + 0.5) * self.res;
                    let y = query.maxy - (r as f64 + 0.5) * self.res;
                    let (tc, tr) = tile.transform().geo_to_pixel(x, y);
                    if tc < 0.0 || tr < 0.0 {
                        continue;
                    }
                    let (tc, tr) = (tc.floor() as usize, tr.floor() as usize);
                    if tr < tile.rows() && tc < tile.cols() {
                        if let Ok(v) = tile.get(tr, tc) {
                            grid[(r, c)] = v;
                        }
                    }
                }
            }
        }

        Ok(grid)
    }
}

impl GeoDataset for RasterLayer {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn res(&self) -> f64 {
        self.res
    }

    fn bounds(&self) -> BoundingBox {
        // The index is non-empty by construction.
        self.index
            .bounds()
            .unwrap_or(BoundingBox::new(0.0, 0.0, 0.0, 0.0, 0, 0))
    }

    fn len(&self) -> usize {
        self.index.time_slices()
    }

    fn get(&self, query: &BoundingBox) -> Result<Sample> {
        let grid = self.read_window(query)?;
        let mut sample = Sample::new(self.crs.clone(), *query);

        match self.descriptor.kind {
            CellKind::Mask => {
                sample.mask = Some(grid.mapv(|v| if v.is_nan() { 0 } else { v.round() as u8 }));
            }
            CellKind::Image => {
                sample.image = Some(grid.mapv(|v| if v.is_nan() { 0.0 } else { v }));
            }
        }
        Ok(sample)
    }
}

/// Substitute the `{year}` placeholder in a template.
fn fill_year(template: &str, year: u16) -> String {
    template.replace("{year}", &year.to_string())
}

/// Unix-second range covering a calendar year.
fn year_range(year: u16) -> (i64, i64) {
    let start = NaiveDate::from_ymd_opt(year as i32, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0);
    let end = NaiveDate::from_ymd_opt(year as i32, 12, 31)
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or(0);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_year() {
        assert_eq!(fill_year("tile_{year}.tif", 2002), "tile_2002.tif");
        assert_eq!(fill_year("no_placeholder.tif", 2002), "no_placeholder.tif");
    }

    #[test]
    fn test_year_range_ordering() {
        let (start_2002, end_2002) = year_range(2002);
        let (start_2003, _) = year_range(2003);
        assert!(start_2002 < end_2002);
        assert!(end_2002 < start_2003);
    }

    #[test]
    fn test_year_range_epoch() {
        let (start, _) = year_range(1970);
        assert_eq!(start, 0);
    }
}
