//! Integration tests for the soybean cultivation layer: construction with
//! download + checksum verification over a local mirror, indexing,
//! combination operators, plotting, and the error paths.

use geotrain_core::{io, BoundingBox, Crs, GeoTransform, Raster};
use geotrain_datasets::{
    catalog, download, DatasetError, GeoDataset, IntersectionDataset, LayerConfig, PlotOptions,
    RasterLayer, UnionDataset,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write one 8x8 soybean tile with a diagonal of positive cells.
fn write_tile(dir: &Path, year: u16) -> PathBuf {
    let mut raster: Raster<u8> = Raster::filled(8, 8, 0);
    for i in 0..4 {
        raster.set(i, i, 1).unwrap();
    }
    raster.set_transform(GeoTransform::new(-60.0, -10.0, 0.01, -0.01));

    let path = dir.join(format!("SouthAmerica_Soybean_{}.tif", year));
    io::write_geotiff_u8(&raster, &path).unwrap();
    path
}

/// A local mirror with tiles for 2002 and 2021, plus an empty dataset root.
struct Fixture {
    _tmp: TempDir,
    source: PathBuf,
    root: PathBuf,
    checksums: HashMap<u16, String>,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("source");
        let root = tmp.path().join("root");
        fs::create_dir_all(&source).unwrap();

        let mut checksums = HashMap::new();
        for year in [2002u16, 2021] {
            let path = write_tile(&source, year);
            checksums.insert(year, download::sha256_file(&path).unwrap());
        }

        Self {
            _tmp: tmp,
            source,
            root,
            checksums,
        }
    }

    fn url_template(&self) -> String {
        self.source
            .join("SouthAmerica_Soybean_{year}.tif")
            .to_string_lossy()
            .into_owned()
    }

    fn config(&self) -> LayerConfig {
        LayerConfig::new(&self.root)
            .years(vec![2002, 2021])
            .download(true)
            .checksum(true)
            .checksums(self.checksums.clone())
            .url(self.url_template())
    }

    fn dataset(&self) -> RasterLayer {
        RasterLayer::new(catalog::soybean_cover(), self.config()).unwrap()
    }
}

#[test]
fn test_get() {
    let fx = Fixture::new();
    let dataset = fx.dataset();

    let sample = dataset.get(&dataset.bounds()).unwrap();
    assert!(sample.crs.is_equivalent(&Crs::wgs84()));

    let mask = sample.mask.expect("label layer yields a mask");
    assert_eq!(mask.dim(), (8, 8));
    assert_eq!(mask[(0, 0)], 1);
    assert_eq!(mask[(0, 1)], 0);
    assert!(sample.image.is_none());
}

#[test]
fn test_len() {
    let fx = Fixture::new();
    assert_eq!(fx.dataset().len(), 2);
}

#[test]
fn test_debug_names_layer() {
    let fx = Fixture::new();
    let dbg = format!("{:?}", fx.dataset());
    assert!(dbg.contains("south_america_soybean"));
}

#[test]
fn test_and() {
    let fx = Fixture::new();
    let combined: IntersectionDataset = (fx.dataset() & fx.dataset()).unwrap();

    let sample = combined.get(&combined.bounds()).unwrap();
    assert!(sample.mask.is_some());
}

#[test]
fn test_or() {
    let fx = Fixture::new();
    let combined: UnionDataset = (fx.dataset() | fx.dataset()).unwrap();

    assert_eq!(combined.len(), 4);
    let sample = combined.get(&combined.bounds()).unwrap();
    assert!(sample.mask.is_some());
}

#[test]
fn test_already_extracted() {
    let fx = Fixture::new();
    let _first = fx.dataset();
    // Second construction over the populated root must be a no-op.
    let _second = fx.dataset();
}

#[test]
fn test_already_downloaded() {
    let fx = Fixture::new();
    fs::create_dir_all(&fx.root).unwrap();
    fs::copy(
        fx.source.join("SouthAmerica_Soybean_2002.tif"),
        fx.root.join("SouthAmerica_Soybean_2002.tif"),
    )
    .unwrap();

    let dataset = RasterLayer::new(catalog::soybean_cover(), LayerConfig::new(&fx.root)).unwrap();
    assert_eq!(dataset.len(), 1);
}

#[test]
fn test_not_downloaded() {
    let tmp = TempDir::new().unwrap();
    let err = RasterLayer::new(catalog::soybean_cover(), LayerConfig::new(tmp.path())).unwrap_err();

    assert!(matches!(err, DatasetError::DatasetNotFound { .. }));
    assert!(err.to_string().contains("Dataset not found"));
}

#[test]
fn test_invalid_query() {
    let fx = Fixture::new();
    let dataset = fx.dataset();

    let query = BoundingBox::new(0.0, 0.0, 0.0, 0.0, i64::MIN, i64::MIN);
    let err = dataset.get(&query).unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("query: "));
    assert!(msg.contains("not found in index with bounds:"));
}

#[test]
fn test_plot() {
    let fx = Fixture::new();
    let dataset = fx.dataset();

    let sample = dataset.get(&dataset.bounds()).unwrap();
    let figure = dataset.plot(&sample, &PlotOptions::default().suptitle("Test"));

    assert_eq!(figure.suptitle.as_deref(), Some("Test"));
    assert_eq!(figure.panels.len(), 1);
    assert_eq!(figure.panels[0].title, "mask");
    assert_eq!(figure.panels[0].rgba.len(), 8 * 8 * 4);
}

#[test]
fn test_plot_prediction() {
    let fx = Fixture::new();
    let dataset = fx.dataset();

    let mut sample = dataset.get(&dataset.bounds()).unwrap();
    sample.prediction = sample.mask.clone();
    let figure = dataset.plot(&sample, &PlotOptions::default().suptitle("Prediction"));

    assert_eq!(figure.panels.len(), 2);
    assert_eq!(figure.panels[1].title, "prediction");
}

#[test]
fn test_checksum_mismatch() {
    let fx = Fixture::new();
    let mut bad = HashMap::new();
    bad.insert(2002u16, "0".repeat(64));
    bad.insert(2021u16, "0".repeat(64));

    let config = fx.config().checksums(bad);
    let err = RasterLayer::new(catalog::soybean_cover(), config).unwrap_err();
    assert!(matches!(err, DatasetError::ChecksumMismatch { .. }));

    // The rejected file must not linger in the root.
    assert!(!fx.root.join("SouthAmerica_Soybean_2002.tif").exists());
}
