use crate::error::{NativeError, Result};
use crate::image::{Image, ImageView, Planes, Raster};
use image::imageops;
use image::{DynamicImage, GrayImage, Rgb, RgbImage};
use log::{debug, warn};
use std::borrow::Cow;

/// Grayscale 8-bit view of a raster's active region.
///
/// Single-channel sources without ROI are borrowed; a ROI crops into an owned
/// copy, and 3/4-channel sources are converted from BGR(A) with the standard
/// luma weights (alpha is ignored). Other depths and two-channel rasters are
/// rejected.
pub fn grayscale_input(src: &Raster) -> std::result::Result<Cow<'_, GrayImage>, NativeError> {
    let Planes::U8(planes) = src.planes() else {
        return Err(NativeError::UnsupportedDepth {
            op: "canny",
            depth: src.depth(),
        });
    };
    let rect = src.active_rect();
    match planes.len() {
        1 if !src.has_roi() => Ok(Cow::Borrowed(&planes[0])),
        1 => Ok(Cow::Owned(
            imageops::crop_imm(&planes[0], rect.x, rect.y, rect.width, rect.height).to_image(),
        )),
        3 | 4 => {
            let (b, g, r) = (&planes[0], &planes[1], &planes[2]);
            let rgb = RgbImage::from_fn(rect.width, rect.height, |x, y| {
                let (sx, sy) = (rect.x + x, rect.y + y);
                Rgb([
                    r.get_pixel(sx, sy)[0],
                    g.get_pixel(sx, sy)[0],
                    b.get_pixel(sx, sy)[0],
                ])
            });
            Ok(Cow::Owned(DynamicImage::ImageRgb8(rgb).to_luma8()))
        }
        channels => Err(NativeError::UnsupportedChannels {
            op: "canny",
            channels,
        }),
    }
}

impl Image {
    /// Canny edge map (0 / 255) of the active region as a new single-channel
    /// 8-bit image. Thresholds given in the wrong order are swapped; NaN or
    /// infinite thresholds are rejected.
    pub fn canny(&self, low: f64, high: f64, aperture: u32) -> Result<Image> {
        let src = self.raster()?;
        if !matches!(aperture, 3 | 5 | 7) {
            return Err(NativeError::BadAperture {
                op: "canny",
                aperture,
            }
            .into());
        }
        if !low.is_finite() || !high.is_finite() {
            return Err(NativeError::bad_argument(
                "canny",
                format!("thresholds must be finite, got low={low} high={high}"),
            )
            .into());
        }
        let (low, high) = if low > high {
            warn!("Image::canny thresholds swapped: low={low} > high={high}");
            (high, low)
        } else {
            (low, high)
        };
        let gray = grayscale_input(src)?;
        let edges = imageproc::edges::canny(&gray, low as f32, high as f32);
        debug!(
            "Image::canny low={low} high={high} aperture={aperture} borrowed={} {}x{}",
            matches!(gray, Cow::Borrowed(_)),
            edges.width(),
            edges.height()
        );
        let raster = Raster::from_planes(Planes::U8(vec![edges]), false)?;
        Ok(Image::from_raster(raster))
    }
}
