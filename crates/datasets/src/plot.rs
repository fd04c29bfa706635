//! RGBA rendering of samples
//!
//! Turns a [`Sample`] into one RGBA panel per available layer (image, mask,
//! prediction), suitable for writing to an image file or uploading as a
//! texture. Mask classes map through the layer's palette; imagery renders
//! grayscale with min/max normalization.

use crate::geo::Sample;
use crate::raster::RasterLayer;
use ndarray::Array2;

/// One rendered panel.
#[derive(Debug, Clone)]
pub struct Panel {
    /// What the panel shows ("image", "mask", "prediction")
    pub title: String,
    /// Panel width in pixels
    pub width: usize,
    /// Panel height in pixels
    pub height: usize,
    /// Row-major RGBA bytes, `width * height * 4` long
    pub rgba: Vec<u8>,
}

/// A rendered sample: one panel per layer present.
#[derive(Debug, Clone)]
pub struct Figure {
    pub suptitle: Option<String>,
    pub panels: Vec<Panel>,
}

/// Options controlling rendering.
#[derive(Debug, Clone, Default)]
pub struct PlotOptions {
    /// Title attached to the figure
    pub suptitle: Option<String>,
}

impl PlotOptions {
    pub fn suptitle(mut self, title: impl Into<String>) -> Self {
        self.suptitle = Some(title.into());
        self
    }
}

impl RasterLayer {
    /// Render a sample from this layer.
    ///
    /// Produces a panel for the image and/or mask, plus one for the
    /// prediction when the caller attached one.
    pub fn plot(&self, sample: &Sample, options: &PlotOptions) -> Figure {
        let palette = &self.descriptor().palette;
        let mut panels = Vec::new();

        if let Some(image) = &sample.image {
            panels.push(Panel {
                title: "image".into(),
                width: image.ncols(),
                height: image.nrows(),
                rgba: image_to_rgba(image),
            });
        }
        if let Some(mask) = &sample.mask {
            panels.push(Panel {
                title: "mask".into(),
                width: mask.ncols(),
                height: mask.nrows(),
                rgba: mask_to_rgba(mask, palette),
            });
        }
        if let Some(prediction) = &sample.prediction {
            panels.push(Panel {
                title: "prediction".into(),
                width: prediction.ncols(),
                height: prediction.nrows(),
                rgba: mask_to_rgba(prediction, palette),
            });
        }

        Figure {
            suptitle: options.suptitle.clone(),
            panels,
        }
    }
}

/// Map class labels through a palette. Classes without an entry render as
/// their value on the gray ramp.
fn mask_to_rgba(mask: &Array2<u8>, palette: &[(u8, [u8; 3])]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(mask.len() * 4);
    for &v in mask.iter() {
        let [r, g, b] = palette
            .iter()
            .find(|(class, _)| *class == v)
            .map(|(_, rgb)| *rgb)
            .unwrap_or([v, v, v]);
        rgba.extend_from_slice(&[r, g, b, 255]);
    }
    rgba
}

/// Grayscale rendering with min/max normalization over finite values.
fn image_to_rgba(image: &Array2<f32>) -> Vec<u8> {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in image.iter() {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() || !max.is_finite() {
        min = 0.0;
        max = 1.0;
    } else if (max - min).abs() < f32::EPSILON {
        max = min + 1.0;
    }
    let inv_range = 1.0 / (max - min);

    let mut rgba = Vec::with_capacity(image.len() * 4);
    for &v in image.iter() {
        if v.is_finite() {
            let g = ((v - min) * inv_range * 255.0).round() as u8;
            rgba.extend_from_slice(&[g, g, g, 255]);
        } else {
            rgba.extend_from_slice(&[0, 0, 0, 0]);
        }
    }
    rgba
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_palette_lookup() {
        let mask = Array2::from_shape_vec((1, 2), vec![0u8, 1]).unwrap();
        let palette = vec![(0u8, [10, 20, 30]), (1u8, [40, 50, 60])];

        let rgba = mask_to_rgba(&mask, &palette);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn test_mask_unknown_class_gray() {
        let mask = Array2::from_shape_vec((1, 1), vec![7u8]).unwrap();
        let rgba = mask_to_rgba(&mask, &[]);
        assert_eq!(rgba, vec![7, 7, 7, 255]);
    }

    #[test]
    fn test_image_normalization() {
        let image = Array2::from_shape_vec((1, 3), vec![0.0f32, 5.0, 10.0]).unwrap();
        let rgba = image_to_rgba(&image);
        assert_eq!(rgba[0], 0);
        assert_eq!(rgba[4], 128);
        assert_eq!(rgba[8], 255);
        assert!(rgba.iter().skip(3).step_by(4).all(|&a| a == 255));
    }

    #[test]
    fn test_image_constant_does_not_divide_by_zero() {
        let image = Array2::from_elem((2, 2), 3.0f32);
        let rgba = image_to_rgba(&image);
        assert_eq!(rgba.len(), 16);
        assert_eq!(rgba[0], 0);
    }
}
