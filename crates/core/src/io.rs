//! GeoTIFF reading and writing
//!
//! Uses the `tiff` crate directly: enough GeoTIFF support for single-band
//! tiles with ModelPixelScale/ModelTiepoint georeferencing, which is what
//! every catalog source ships.

use crate::error::{Error, Result};
use crate::raster::{CellValue, GeoTransform, Raster};
use std::fs::File;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{Gray32Float, Gray8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// Read a single-band GeoTIFF into a raster, casting cells to `T`.
///
/// Values that cannot be represented in `T` become `T::FILL`.
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: CellValue,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Tiff(format!("{}: {}", path.display(), e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Tiff(format!("{}: {}", path.display(), e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let result = decoder
        .read_image()
        .map_err(|e| Error::Tiff(format!("{}: {}", path.display(), e)))?;

    let data: Vec<T> = match result {
        DecodingResult::U8(buf) => cast_buffer(&buf),
        DecodingResult::U16(buf) => cast_buffer(&buf),
        DecodingResult::U32(buf) => cast_buffer(&buf),
        DecodingResult::I8(buf) => cast_buffer(&buf),
        DecodingResult::I16(buf) => cast_buffer(&buf),
        DecodingResult::I32(buf) => cast_buffer(&buf),
        DecodingResult::F32(buf) => cast_buffer(&buf),
        DecodingResult::F64(buf) => cast_buffer(&buf),
        _ => {
            return Err(Error::UnsupportedSampleFormat(format!(
                "{}: unsupported TIFF pixel format",
                path.display()
            )))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    raster.set_transform(read_transform_tags(&mut decoder, path)?);
    Ok(raster)
}

/// Read only the dimensions and geotransform of a GeoTIFF.
///
/// Used for building tile indexes without decoding pixel data.
pub fn read_geotiff_meta<P: AsRef<Path>>(path: P) -> Result<(usize, usize, GeoTransform)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Tiff(format!("{}: {}", path.display(), e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Tiff(format!("{}: {}", path.display(), e)))?;

    let transform = read_transform_tags(&mut decoder, path)?;
    Ok((height as usize, width as usize, transform))
}

fn cast_buffer<S, T>(buf: &[S]) -> Vec<T>
where
    S: Copy,
    S: num_traits::NumCast,
    T: CellValue,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::FILL))
        .collect()
}

fn read_transform_tags<R>(decoder: &mut Decoder<R>, path: &Path) -> Result<GeoTransform>
where
    R: std::io::Read + std::io::Seek,
{
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::MissingGeoTags(path.display().to_string()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::MissingGeoTags(path.display().to_string()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::MissingGeoTags(path.display().to_string()));
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Write an f32 raster as a single-band GeoTIFF
pub fn write_geotiff_f32<P: AsRef<Path>>(raster: &Raster<f32>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file).map_err(|e| Error::Tiff(e.to_string()))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Tiff(e.to_string()))?;
    write_geo_tags(image.encoder(), raster.transform())?;
    image
        .write_data(&data)
        .map_err(|e| Error::Tiff(e.to_string()))?;
    Ok(())
}

/// Write a u8 raster as a single-band GeoTIFF
pub fn write_geotiff_u8<P: AsRef<Path>>(raster: &Raster<u8>, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(file).map_err(|e| Error::Tiff(e.to_string()))?;

    let (rows, cols) = raster.shape();
    let data: Vec<u8> = raster.data().iter().copied().collect();

    let mut image = encoder
        .new_image::<Gray8>(cols as u32, rows as u32)
        .map_err(|e| Error::Tiff(e.to_string()))?;
    write_geo_tags(image.encoder(), raster.transform())?;
    image
        .write_data(&data)
        .map_err(|e| Error::Tiff(e.to_string()))?;
    Ok(())
}

fn write_geo_tags<W, K>(
    dir: &mut tiff::encoder::DirectoryEncoder<W, K>,
    gt: &GeoTransform,
) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
    K: tiff::encoder::TiffKind,
{
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    dir.write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Tiff(e.to_string()))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    dir.write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Tiff(e.to_string()))?;

    // Minimal GeoKey directory: geographic model, pixel-is-area
    let geokeys: [u16; 12] = [
        1, 1, 0, 2, // version 1.1.0, 2 keys
        1024, 0, 1, 2, // GTModelTypeGeoKey = geographic
        1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
    ];
    dir.write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])
        .map_err(|e| Error::Tiff(e.to_string()))?;

    Ok(())
}
