//! Coordinate Reference System handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation.
///
/// Datasets in this library carry either an EPSG code, a WKT string, or both.
/// Reprojection is out of scope; combining datasets requires equivalent CRS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    epsg: Option<u32>,
    wkt: Option<String>,
}

impl Crs {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// Get the EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the WKT representation if known
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check whether two CRS describe the same system.
    ///
    /// EPSG codes are compared when both are known, falling back to exact
    /// WKT comparison (which is imperfect but conservative).
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// A short string identifier for diagnostics
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            // Truncate on a char boundary, not a byte offset.
            let cut = wkt.char_indices().nth(40).map_or(wkt.len(), |(i, _)| i);
            return format!("WKT:{}", &wkt[..cut]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for Crs {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epsg() {
        let crs = Crs::from_epsg(4326);
        assert_eq!(crs.epsg(), Some(4326));
        assert_eq!(crs.identifier(), "EPSG:4326");
    }

    #[test]
    fn test_identifier_truncates_wkt_on_char_boundary() {
        let crs = Crs::from_wkt("∂".repeat(50));
        let id = crs.identifier();
        assert!(id.starts_with("WKT:"));
        assert_eq!(id.chars().count(), "WKT:".len() + 40);
    }

    #[test]
    fn test_equivalence() {
        assert!(Crs::from_epsg(4326).is_equivalent(&Crs::wgs84()));
        assert!(!Crs::from_epsg(4326).is_equivalent(&Crs::from_epsg(3857)));
    }
}
