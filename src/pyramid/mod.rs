//! Gaussian pyramid steps: one level down (blur + 2× decimation) or one level
//! up (2× zero-insertion + blur).
//!
//! Both operations read the source's active region and allocate a fresh
//! image with the same depth and channel count. Samples are widened for
//! filtering (`f64` for `DEPTH_32S` / `DEPTH_64F`, `f32` otherwise) and
//! narrowed back (rounded, saturated) to the source depth.
//! The decimation keeps every other pixel of the blurred plane, starting at
//! the top-left sample.

pub mod filters;

use crate::error::{NativeError, Result};
use crate::image::planes::map_widened;
use crate::image::{Image, ImageView, Plane, Planes, Raster, Working};
use crate::types::PyramidFilter;
use filters::{apply as apply_filter, SeparableFilter};
use image::{ImageBuffer, Luma};
use log::debug;
use rayon::prelude::*;

impl Image {
    /// Half-size image, `(w / 2, h / 2)` of the active region.
    pub fn pyr_down(&self, filter: PyramidFilter) -> Result<Image> {
        let src = self.raster()?;
        let rect = src.active_rect();
        if rect.width < 2 || rect.height < 2 {
            return Err(NativeError::bad_argument(
                "pyr_down",
                format!("{}x{} region is too small to decimate", rect.width, rect.height),
            )
            .into());
        }
        let kernel = filter.kernel();
        let out = map_widened!(&src.region_widened(), p => p
            .par_iter()
            .map(|plane| downsample(kernel, plane))
            .collect());
        let raster = Raster::from_planes(Planes::narrow(src.depth(), &out), src.has_alpha())?;
        debug!(
            "Image::pyr_down {filter} {}x{} -> {}x{}",
            rect.width,
            rect.height,
            raster.width(),
            raster.height()
        );
        Ok(Image::from_raster(raster))
    }

    /// Double-size image, `(2w, 2h)` of the active region.
    pub fn pyr_up(&self, filter: PyramidFilter) -> Result<Image> {
        let src = self.raster()?;
        let rect = src.active_rect();
        if rect.width.checked_mul(2).is_none() || rect.height.checked_mul(2).is_none() {
            return Err(NativeError::bad_argument("pyr_up", "upsampled size overflows").into());
        }
        let kernel = filter.kernel();
        let out = map_widened!(&src.region_widened(), p => p
            .par_iter()
            .map(|plane| upsample(kernel, plane))
            .collect());
        let raster = Raster::from_planes(Planes::narrow(src.depth(), &out), src.has_alpha())?;
        debug!(
            "Image::pyr_up {filter} {}x{} -> {}x{}",
            rect.width,
            rect.height,
            raster.width(),
            raster.height()
        );
        Ok(Image::from_raster(raster))
    }
}

fn downsample<F: Working>(filter: &dyn SeparableFilter, plane: &Plane<F>) -> Plane<F> {
    let blurred = apply_filter(filter, plane);
    let (w, h) = plane.dimensions();
    ImageBuffer::from_fn(w / 2, h / 2, |x, y| *blurred.get_pixel(2 * x, 2 * y))
}

fn upsample<F: Working>(filter: &dyn SeparableFilter, plane: &Plane<F>) -> Plane<F> {
    let (w, h) = plane.dimensions();
    // each source sample lands on one of four output pixels; the ×4 restores
    // the mean after the normalised blur
    let four = F::from_f64(4.0);
    let mut expanded: Plane<F> = ImageBuffer::new(w * 2, h * 2);
    for (x, y, px) in plane.enumerate_pixels() {
        expanded.put_pixel(2 * x, 2 * y, Luma([px[0] * four]));
    }
    apply_filter(filter, &expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use crate::types::Depth;

    #[test]
    fn down_then_up_restores_even_size() {
        let img = Image::new(40, 30, Depth::U8, 3).unwrap();
        let down = img.pyr_down(PyramidFilter::default()).unwrap();
        assert_eq!(down.info().unwrap().width, 20);
        assert_eq!(down.info().unwrap().height, 15);
        let up = down.pyr_up(PyramidFilter::default()).unwrap();
        let info = up.info().unwrap();
        assert_eq!((info.width, info.height, info.channels), (40, 30, 3));
        assert_eq!(info.depth, Depth::U8);
    }

    #[test]
    fn odd_sizes_round_down() {
        let img = Image::new(7, 5, Depth::F32, 1).unwrap();
        let down = img.pyr_down(PyramidFilter::Gaussian5x5).unwrap();
        assert_eq!(down.raster().unwrap().dimensions(), (3, 2));
    }

    #[test]
    fn pyr_down_uses_the_roi() {
        let mut img = Image::new(64, 64, Depth::U16, 1).unwrap();
        img.set_roi(0, 0, 16, 8).unwrap();
        let down = img.pyr_down(PyramidFilter::Gaussian5x5).unwrap();
        assert_eq!(down.raster().unwrap().dimensions(), (8, 4));
        assert!(!down.raster().unwrap().has_roi());
    }

    #[test]
    fn constant_planes_stay_constant() {
        let plane = Plane::<f32>::from_pixel(8, 8, Luma([10.0]));
        let up = upsample(PyramidFilter::Gaussian5x5.kernel(), &plane);
        // away from the border the zero-inserted samples average back out
        assert!((up.get_pixel(8, 8)[0] - 10.0).abs() < 1e-4);
        let down = downsample(PyramidFilter::Gaussian5x5.kernel(), &plane);
        assert!(down.pixels().all(|p| (p[0] - 10.0).abs() < 1e-4));
    }

    #[test]
    fn wide_depths_keep_full_precision() {
        // 2^24 + 1 has no exact f32 representation
        let v = 16_777_217;
        let ints = Planes::I32(vec![Plane::<i32>::from_pixel(8, 6, Luma([v]))]);
        let img = Image::from_raster(Raster::from_planes(ints, false).unwrap());
        let down = img.pyr_down(PyramidFilter::Gaussian5x5).unwrap();
        let Planes::I32(p) = down.raster().unwrap().planes() else {
            panic!("expected 32-bit signed planes");
        };
        assert!(p[0].pixels().all(|px| px[0] == v));

        let up = img.pyr_up(PyramidFilter::Gaussian5x5).unwrap();
        let Planes::I32(p) = up.raster().unwrap().planes() else {
            panic!("expected 32-bit signed planes");
        };
        // pixels whose 5x5 window stays inside the 16x12 output
        for y in 2..10 {
            for x in 2..14 {
                assert_eq!(p[0].get_pixel(x, y)[0], v, "({x}, {y})");
            }
        }

        let floats = Planes::F64(vec![Plane::<f64>::from_pixel(8, 6, Luma([0.1]))]);
        let img = Image::from_raster(Raster::from_planes(floats, false).unwrap());
        let down = img.pyr_down(PyramidFilter::Gaussian5x5).unwrap();
        let Planes::F64(p) = down.raster().unwrap().planes() else {
            panic!("expected 64-bit float planes");
        };
        // 0.1 through f32 would be off by about 1.5e-9
        assert!(p[0].pixels().all(|px| (px[0] - 0.1).abs() < 1e-15));
    }

    #[test]
    fn tiny_region_cannot_be_decimated() {
        let img = Image::new(1, 9, Depth::U8, 1).unwrap();
        assert!(matches!(
            img.pyr_down(PyramidFilter::Gaussian5x5),
            Err(ImageError::Native(NativeError::BadArgument { op: "pyr_down", .. }))
        ));
    }
}
