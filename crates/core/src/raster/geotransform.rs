//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation mapping pixel coordinates (col, row) to geographic
/// coordinates (x, y) for north-up rasters:
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// `pixel_height` is negative for north-up images: the origin is the
/// upper-left corner and rows grow southward. Rotated rasters are not
/// supported; none of the catalog sources produce them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in the X direction
    pub pixel_width: f64,
    /// Cell size in the Y direction (negative for north-up)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new transform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Geographic coordinates of a pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.pixel_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.pixel_height;
        (x, y)
    }

    /// Geographic coordinates of a pixel's top-left corner
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + col as f64 * self.pixel_width;
        let y = self.origin_y + row as f64 * self.pixel_height;
        (x, y)
    }

    /// Fractional pixel coordinates of a geographic point; `.floor()` the
    /// result to get integer indices.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.pixel_width;
        let row = (y - self.origin_y) / self.pixel_height;
        (col, row)
    }

    /// Cell size, assuming square pixels
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Spatial bounds (min_x, min_y, max_x, max_y) of a `cols` x `rows` grid
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.pixel_to_geo_corner(0, 0);
        let (x1, y1) = self.pixel_to_geo_corner(cols, rows);

        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_bounds() {
        let gt = GeoTransform::new(0.0, 100.0, 1.0, -1.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(100, 100);

        assert_relative_eq!(min_x, 0.0, epsilon = 1e-10);
        assert_relative_eq!(min_y, 0.0, epsilon = 1e-10);
        assert_relative_eq!(max_x, 100.0, epsilon = 1e-10);
        assert_relative_eq!(max_y, 100.0, epsilon = 1e-10);
    }
}
