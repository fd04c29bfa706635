//! Built-in dataset descriptors
//!
//! Each function returns the static description of one published dataset.
//! Datasets without a public download endpoint (or mirrored locally) take
//! their source through [`LayerConfig::url`](crate::LayerConfig::url).

use crate::raster::{CellKind, LayerDescriptor};

/// The seven regions the land-cover program publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Dc,
    De,
    Md,
    Ny,
    Pa,
    Va,
    Wv,
}

impl Region {
    /// All regions, in publication order
    pub const ALL: [Region; 7] = [
        Region::Dc,
        Region::De,
        Region::Md,
        Region::Ny,
        Region::Pa,
        Region::Va,
        Region::Wv,
    ];

    /// Lowercase region code used in filenames
    pub fn code(&self) -> &'static str {
        match self {
            Region::Dc => "dc",
            Region::De => "de",
            Region::Md => "md",
            Region::Ny => "ny",
            Region::Pa => "pa",
            Region::Va => "va",
            Region::Wv => "wv",
        }
    }
}

/// Annual South America soybean cultivation masks.
///
/// One continent-wide tile per year; cells are 1 where soybean was grown
/// and 0 elsewhere.
pub fn soybean_cover() -> LayerDescriptor {
    LayerDescriptor {
        name: "south_america_soybean".into(),
        filename_template: "SouthAmerica_Soybean_{year}.tif".into(),
        filename_regex: r"^SouthAmerica_Soybean_(?P<year>\d{4})\.tif$".into(),
        url_template: Some(
            "https://glad.umd.edu/projects/AnnualClassMapsV1/SouthAmerica_Soybean_{year}.tif"
                .into(),
        ),
        kind: CellKind::Mask,
        all_years: (2001..=2023).collect(),
        epsg: 4326,
        palette: vec![(0, [240, 240, 240]), (1, [76, 166, 25])],
    }
}

/// Aerial imagery tiles named `m_<tile>_<yyyymmdd>.tif`.
///
/// Distributed on physical media rather than a public endpoint, so there is
/// no download template; point `LayerConfig::url` at a mirror if you have
/// one.
pub fn aerial_imagery() -> LayerDescriptor {
    LayerDescriptor {
        name: "aerial_imagery".into(),
        filename_template: "m_aerial_{year}0601.tif".into(),
        filename_regex: r"^m_.*_(?P<year>\d{4})\d{4}\.tif$".into(),
        url_template: None,
        kind: CellKind::Image,
        all_years: vec![2018, 2022],
        epsg: 4326,
        palette: vec![],
    }
}

/// High-resolution land-cover labels for one region.
pub fn regional_land_cover(region: Region) -> LayerDescriptor {
    let code = region.code();
    LayerDescriptor {
        name: format!("land_cover_{}", code),
        filename_template: format!("{}_landcover_{{year}}.tif", code),
        filename_regex: format!(r"^{}_landcover_(?P<year>\d{{4}})\.tif$", code),
        url_template: None,
        kind: CellKind::Mask,
        all_years: vec![2013, 2018],
        epsg: 4326,
        palette: vec![
            (0, [0, 0, 0]),
            (1, [0, 197, 255]),   // water
            (2, [0, 168, 132]),   // emergent wetlands
            (3, [38, 115, 0]),    // tree canopy
            (4, [76, 230, 0]),    // shrubland
            (5, [163, 255, 115]), // low vegetation
            (6, [255, 170, 0]),   // barren
            (7, [156, 156, 156]), // impervious surface
            (8, [104, 104, 104]), // impervious roads
        ],
    }
}
