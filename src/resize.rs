//! Resampling from one image's active region into another's.
//!
//! Integer planes go through `imageops` in their own sample type. Float
//! planes are rescaled into `[0, 1]` around the call; `imageops` clamps float
//! samples to that range.
use crate::error::{NativeError, Result};
use crate::image::planes::map_planes;
use crate::image::{Image, ImageView, Plane, Planes, Sample};
use crate::types::Interpolation;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use log::debug;
use rayon::prelude::*;

impl Image {
    /// Resample the active region of `self` to fill the active region of
    /// `dst`. Both images must share depth and channel count; pixels of `dst`
    /// outside its ROI are left untouched.
    pub fn resize(&self, dst: &mut Image, interpolation: Interpolation) -> Result<()> {
        let src = self.raster()?;
        let target = dst.raster_mut()?;
        if src.depth() != target.depth() || src.channels() != target.channels() {
            return Err(NativeError::SizeMismatch {
                op: "resize",
                detail: format!(
                    "{} channels of {} into {} channels of {}",
                    src.channels(),
                    src.depth(),
                    target.channels(),
                    target.depth()
                ),
            }
            .into());
        }
        let (from, to) = (src.active_rect(), target.active_rect());
        let size = (to.width, to.height);
        let region = src.region();
        let out = match region.as_ref() {
            Planes::F32(p) => Planes::F32(
                p.par_iter()
                    .map(|q| {
                        resample_unit(q, size, interpolation, |u| {
                            imageops::thumbnail(u, size.0, size.1)
                        })
                    })
                    .collect(),
            ),
            Planes::F64(p) => Planes::F64(
                p.par_iter()
                    .map(|q| {
                        resample_unit(q, size, interpolation, |u| {
                            imageops::thumbnail(u, size.0, size.1)
                        })
                    })
                    .collect(),
            ),
            other => map_planes!(other, p => p
                .par_iter()
                .map(|q| {
                    resample(q, size, interpolation, |u| {
                        imageops::thumbnail(u, size.0, size.1)
                    })
                })
                .collect()),
        };
        target.write_region(out)?;
        debug!(
            "Image::resize {interpolation} {}x{} -> {}x{}",
            from.width, from.height, to.width, to.height
        );
        Ok(())
    }
}

/// Resample one plane to `width × height`. `area` is the box-averaging
/// shrink used by `Interpolation::Area` when both axes get smaller.
fn resample<T: Sample>(
    plane: &Plane<T>,
    (width, height): (u32, u32),
    interpolation: Interpolation,
    area: impl Fn(&Plane<T>) -> Plane<T>,
) -> Plane<T> {
    let filter = match interpolation {
        Interpolation::Nearest => FilterType::Nearest,
        Interpolation::Linear => FilterType::Triangle,
        Interpolation::Cubic => FilterType::CatmullRom,
        Interpolation::Area => {
            let (w, h) = plane.dimensions();
            if width < w && height < h {
                return area(plane);
            }
            FilterType::Triangle
        }
    };
    imageops::resize(plane, width, height, filter)
}

/// `resample` for float planes: map the finite sample range onto `[0, 1]`,
/// resample, and map back. A constant plane maps onto zero.
fn resample_unit<T: Sample>(
    plane: &Plane<T>,
    size: (u32, u32),
    interpolation: Interpolation,
    area: impl Fn(&Plane<T>) -> Plane<T>,
) -> Plane<T> {
    let (lo, hi) = plane
        .as_raw()
        .iter()
        .map(|&v| v.to_f64())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        // no finite samples
        return resample(plane, size, interpolation, area);
    }
    let span = if hi > lo { hi - lo } else { 1.0 };
    let unit = map_samples(plane, |v| (v - lo) / span);
    let out = resample(&unit, size, interpolation, area);
    map_samples(&out, |v| v * span + lo)
}

fn map_samples<T: Sample>(plane: &Plane<T>, f: impl Fn(f64) -> f64) -> Plane<T> {
    ImageBuffer::from_fn(plane.width(), plane.height(), |x, y| {
        Luma([T::from_f64(f(plane.get_pixel(x, y)[0].to_f64()))])
    })
}
