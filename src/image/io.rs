//! Decoding, encoding and JSON helpers.
//!
//! - `Image::load`: decode a PNG/JPEG/etc. through `image::open` in one of the
//!   three load modes.
//! - `Image::save`: encode the active region in the format implied by the
//!   file extension.
//! - `write_json_file`: pretty-print a serializable value to disk.
//!
//! Colour rasters are stored in BGR(A) order; the channel order is swapped
//! when crossing into and out of `image`'s RGB(A) buffers.
use super::planes::{Plane, Planes, Sample};
use super::raster::Raster;
use super::traits::ImageView;
use super::wrapper::Image;
use crate::error::{ImageError, Result};
use crate::types::{Depth, LoadMode};
use image::{DynamicImage, ImageBuffer, ImageFormat, Luma, Pixel};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Interleaved channel `i` of the decoded buffer becomes plane `BGR[i]`.
const BGR: [usize; 3] = [2, 1, 0];
const BGRA: [usize; 4] = [2, 1, 0, 3];
const GRAY: [usize; 1] = [0];
const GRAY_ALPHA: [usize; 2] = [0, 1];

impl Image {
    /// Decode an image file.
    pub fn load(path: impl AsRef<Path>, mode: LoadMode) -> Result<Image> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| ImageError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let (planes, alpha) = decoded_planes(decoded, mode);
        let raster = Raster::from_planes(planes, alpha).map_err(|e| {
            ImageError::DecodeUnsupported {
                path: path.to_path_buf(),
                detail: e.to_string(),
            }
        })?;
        debug!(
            "Image::load {} mode={} -> {}x{}x{} {}",
            path.display(),
            mode,
            raster.width(),
            raster.height(),
            raster.channels(),
            raster.depth()
        );
        Ok(Image::from_raster(raster))
    }

    /// Encode the active region to `path`. `mode` picks the stored layout:
    /// `Color` writes three channels, `Grayscale` one, `Unchanged` the raster
    /// as it is.
    pub fn save(&self, path: impl AsRef<Path>, mode: LoadMode) -> Result<()> {
        let path = path.as_ref();
        let raster = self.raster()?;
        let unsupported = |detail: String| ImageError::EncodeUnsupported {
            path: path.to_path_buf(),
            detail,
        };
        let format = ImageFormat::from_path(path).map_err(|e| unsupported(e.to_string()))?;
        let region = raster.region();
        let encoded = to_dynamic(&region).ok_or_else(|| {
            unsupported(format!(
                "no encodable layout for {} channels of {}",
                region.len(),
                region.depth()
            ))
        })?;
        let encoded = convert_for_mode(encoded, mode);
        ensure_parent_dir(path)?;
        encoded
            .save_with_format(path, format)
            .map_err(|source| ImageError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        let rect = raster.active_rect();
        debug!(
            "Image::save {} format={:?} mode={} {}x{}",
            path.display(),
            format,
            mode,
            rect.width,
            rect.height
        );
        Ok(())
    }
}

fn decoded_planes(decoded: DynamicImage, mode: LoadMode) -> (Planes, bool) {
    match mode {
        LoadMode::Grayscale => (Planes::U8(split(&decoded.to_luma8(), &GRAY)), false),
        LoadMode::Color => (Planes::U8(split(&decoded.to_rgb8(), &BGR)), false),
        LoadMode::Unchanged => match decoded {
            DynamicImage::ImageLuma8(b) => (Planes::U8(split(&b, &GRAY)), false),
            DynamicImage::ImageLumaA8(b) => (Planes::U8(split(&b, &GRAY_ALPHA)), true),
            DynamicImage::ImageRgb8(b) => (Planes::U8(split(&b, &BGR)), false),
            DynamicImage::ImageRgba8(b) => (Planes::U8(split(&b, &BGRA)), true),
            DynamicImage::ImageLuma16(b) => (Planes::U16(split(&b, &GRAY)), false),
            DynamicImage::ImageLumaA16(b) => (Planes::U16(split(&b, &GRAY_ALPHA)), true),
            DynamicImage::ImageRgb16(b) => (Planes::U16(split(&b, &BGR)), false),
            DynamicImage::ImageRgba16(b) => (Planes::U16(split(&b, &BGRA)), true),
            DynamicImage::ImageRgb32F(b) => (Planes::F32(split(&b, &BGR)), false),
            DynamicImage::ImageRgba32F(b) => (Planes::F32(split(&b, &BGRA)), true),
            other => (Planes::U8(split(&other.to_rgba8(), &BGRA)), true),
        },
    }
}

/// Split an interleaved buffer into planes; plane `order[i]` receives
/// interleaved channel `i`.
fn split<P, T>(buffer: &ImageBuffer<P, Vec<T>>, order: &[usize]) -> Vec<Plane<T>>
where
    P: Pixel<Subpixel = T>,
    T: Sample,
{
    let (w, h) = buffer.dimensions();
    let mut planes: Vec<Plane<T>> = order.iter().map(|_| ImageBuffer::new(w, h)).collect();
    for (x, y, px) in buffer.enumerate_pixels() {
        for (c, &v) in px.channels().iter().enumerate() {
            planes[order[c]].put_pixel(x, y, Luma([v]));
        }
    }
    planes
}

/// Interleave planes into a buffer; interleaved channel `i` is read from
/// plane `order[i]`.
fn merge<P, T>(planes: &[Plane<T>], order: &[usize]) -> Option<ImageBuffer<P, Vec<T>>>
where
    P: Pixel<Subpixel = T>,
    T: Sample,
{
    let (w, h) = planes.first()?.dimensions();
    let mut data = Vec::with_capacity(w as usize * h as usize * order.len());
    for i in 0..(w as usize * h as usize) {
        for &c in order {
            data.push(planes[c].as_raw()[i]);
        }
    }
    ImageBuffer::from_raw(w, h, data)
}

fn to_dynamic(planes: &Planes) -> Option<DynamicImage> {
    Some(match (planes, planes.len()) {
        (Planes::U8(p), 1) => DynamicImage::ImageLuma8(merge(p, &GRAY)?),
        (Planes::U8(p), 2) => DynamicImage::ImageLumaA8(merge(p, &GRAY_ALPHA)?),
        (Planes::U8(p), 3) => DynamicImage::ImageRgb8(merge(p, &BGR)?),
        (Planes::U8(p), 4) => DynamicImage::ImageRgba8(merge(p, &BGRA)?),
        (Planes::U16(p), 1) => DynamicImage::ImageLuma16(merge(p, &GRAY)?),
        (Planes::U16(p), 2) => DynamicImage::ImageLumaA16(merge(p, &GRAY_ALPHA)?),
        (Planes::U16(p), 3) => DynamicImage::ImageRgb16(merge(p, &BGR)?),
        (Planes::U16(p), 4) => DynamicImage::ImageRgba16(merge(p, &BGRA)?),
        (Planes::F32(p), 3) => DynamicImage::ImageRgb32F(merge(p, &BGR)?),
        (Planes::F32(p), 4) => DynamicImage::ImageRgba32F(merge(p, &BGRA)?),
        _ => return None,
    })
}

fn convert_for_mode(image: DynamicImage, mode: LoadMode) -> DynamicImage {
    let depth = match &image {
        DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_)
        | DynamicImage::ImageRgb16(_)
        | DynamicImage::ImageRgba16(_) => Depth::U16,
        DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => Depth::F32,
        _ => Depth::U8,
    };
    match (mode, depth) {
        (LoadMode::Unchanged, _) => image,
        (LoadMode::Color, Depth::U16) => DynamicImage::ImageRgb16(image.to_rgb16()),
        (LoadMode::Color, Depth::F32) => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        (LoadMode::Color, _) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (LoadMode::Grayscale, Depth::U16) => DynamicImage::ImageLuma16(image.to_luma16()),
        (LoadMode::Grayscale, _) => DynamicImage::ImageLuma8(image.to_luma8()),
    }
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> std::result::Result<(), String> {
    ensure_parent_dir(path).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ImageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    Ok(())
}
