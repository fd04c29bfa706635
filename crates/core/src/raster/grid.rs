//! In-memory raster grid

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::raster::{CellValue, GeoTransform};
use ndarray::Array2;

/// A georeferenced 2D raster grid.
///
/// Stores values of type `T` in row-major order together with the affine
/// transform and CRS describing where the grid sits on the globe.
#[derive(Debug, Clone)]
pub struct Raster<T: CellValue> {
    data: Array2<T>,
    transform: GeoTransform,
    crs: Crs,
}

impl<T: CellValue> Raster<T> {
    /// Create a raster filled with a single value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            crs: Crs::default(),
        }
    }

    /// Create a raster from a flat vector of cells
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions { rows, cols });
        }
        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|_| Error::InvalidDimensions { rows, cols })?;
        Ok(Self::from_array(array))
    }

    /// Create a raster from an existing ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: Crs::default(),
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::CellOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::CellOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Consume the raster and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    /// The affine transform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the affine transform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// The coordinate reference system
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Set the coordinate reference system
    pub fn set_crs(&mut self, crs: Crs) {
        self.crs = crs;
    }

    /// Cell size in CRS units (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Spatial bounds (min_x, min_y, max_x, max_y)
    pub fn spatial_bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation() {
        let raster: Raster<u8> = Raster::filled(10, 20, 3);
        assert_eq!(raster.rows(), 10);
        assert_eq!(raster.cols(), 20);
        assert_eq!(raster.get(0, 0).unwrap(), 3);
    }

    #[test]
    fn test_access() {
        let mut raster: Raster<f32> = Raster::filled(10, 10, 0.0);
        raster.set(5, 5, 42.0).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42.0);
        assert!(raster.get(10, 0).is_err());
        assert!(raster.set(0, 10, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_dimension_check() {
        assert!(Raster::from_vec(vec![0u8; 6], 2, 3).is_ok());
        assert!(Raster::from_vec(vec![0u8; 5], 2, 3).is_err());
    }

    #[test]
    fn test_spatial_bounds() {
        let mut raster: Raster<u8> = Raster::filled(10, 10, 0);
        raster.set_transform(GeoTransform::new(100.0, 50.0, 1.0, -1.0));
        assert_eq!(raster.spatial_bounds(), (100.0, 40.0, 110.0, 50.0));
    }
}
