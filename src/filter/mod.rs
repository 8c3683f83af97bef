//! Smoothing and derivative filters.
//!
//! Every filter reads the source's active region, runs one `imageproc`
//! routine per channel plane and wraps the result into a new `Image`; the
//! source is never modified.
//!
//! - `smooth` keeps the source geometry, depth and ROI (the region is
//!   replaced in a clone of the source).
//! - `laplace` / `sobel` allocate a fresh `DEPTH_16S` image sized like the
//!   active region, wide enough for signed derivative responses.
//!
//! Linear filters accumulate in `f64` for `DEPTH_32S` / `DEPTH_64F` sources
//! and in `f32` otherwise.

pub mod kernels;

use crate::error::{NativeError, Result};
use crate::image::planes::map_widened;
use crate::image::{Image, ImageView, Plane, Planes, Raster, Rect, Widened, Working};
use crate::types::{Depth, SmoothType};
use image::Luma;
use imageproc::filter::{bilateral_filter, median_filter, separable_filter};
use imageproc::map::map_colors2;
use kernels::{gaussian_taps, kernel_for_sigma, sigma_for_kernel, sobel_taps};
use log::debug;
use rayon::prelude::*;
use serde::Deserialize;

/// The four scalar parameters of `smooth`; their meaning depends on the
/// smoothing type.
///
/// | type            | `param1`      | `param2`            | `param3`    | `param4`      |
/// |-----------------|---------------|---------------------|-------------|---------------|
/// | `BLUR_NO_SCALE` | window width  | window height (0: = width) | –    | –             |
/// | `BLUR`          | window width  | window height (0: = width) | –    | –             |
/// | `GAUSSIAN`      | kernel width (0: from sigma) | kernel height (0: = width) | horizontal sigma (0: from width) | vertical sigma (0: = horizontal) |
/// | `MEDIAN`        | aperture      | –                   | –           | –             |
/// | `BILATERAL`     | window        | –                   | colour sigma | spatial sigma |
///
/// Windows may extend at most one region side past either border of the
/// active region.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SmoothParams {
    pub param1: u32,
    pub param2: u32,
    pub param3: f64,
    pub param4: f64,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            param1: 3,
            param2: 0,
            param3: 0.0,
            param4: 0.0,
        }
    }
}

impl SmoothParams {
    pub fn new(param1: u32, param2: u32, param3: f64, param4: f64) -> Self {
        Self {
            param1,
            param2,
            param3,
            param4,
        }
    }

    /// Window `(width, height)`; a zero height repeats the width.
    fn window(&self, op: &'static str) -> std::result::Result<(u32, u32), NativeError> {
        if self.param1 == 0 {
            return Err(NativeError::BadAperture {
                op,
                aperture: self.param1,
            });
        }
        let height = if self.param2 == 0 {
            self.param1
        } else {
            self.param2
        };
        Ok((self.param1, height))
    }

    /// `(param3, param4)`, both finite and non-negative.
    fn sigmas(&self, op: &'static str) -> std::result::Result<(f64, f64), NativeError> {
        for sigma in [self.param3, self.param4] {
            if !sigma.is_finite() || sigma < 0.0 {
                return Err(NativeError::bad_argument(
                    op,
                    format!("sigma {sigma} must be finite and non-negative"),
                ));
            }
        }
        Ok((self.param3, self.param4))
    }
}

impl Image {
    /// Smooth the active region with the selected filter.
    pub fn smooth(&self, kind: SmoothType, params: SmoothParams) -> Result<Image> {
        let src = self.raster()?;
        let rect = src.active_rect();
        let region = src.region();
        let out = match kind {
            SmoothType::BlurNoScale | SmoothType::Blur => {
                let (kw, kh) = params.window("smooth")?;
                check_window("smooth", kw, kh, rect)?;
                let taps = |n: u32| {
                    let weight = if kind == SmoothType::Blur {
                        1.0 / f64::from(n)
                    } else {
                        1.0
                    };
                    vec![weight; n as usize]
                };
                let filtered = convolve_all(&region.widen(), &taps(kw), &taps(kh));
                Planes::narrow(src.depth(), &filtered)
            }
            SmoothType::Gaussian => {
                let (h_taps, v_taps) = gaussian_kernels(&params, src.depth(), rect)?;
                let filtered = convolve_all(&region.widen(), &h_taps, &v_taps);
                Planes::narrow(src.depth(), &filtered)
            }
            SmoothType::Median => {
                let aperture = params.param1;
                if aperture % 2 == 0 {
                    return Err(NativeError::BadAperture {
                        op: "smooth",
                        aperture,
                    }
                    .into());
                }
                check_window("smooth", aperture, aperture, rect)?;
                let Planes::U8(planes) = region.as_ref() else {
                    return Err(unsupported_depth("smooth", src).into());
                };
                let r = aperture / 2;
                Planes::U8(planes.par_iter().map(|p| median_filter(p, r, r)).collect())
            }
            SmoothType::Bilateral => {
                let Planes::U8(planes) = region.as_ref() else {
                    return Err(unsupported_depth("smooth", src).into());
                };
                let window = params.param1;
                if window == 0 {
                    return Err(NativeError::BadAperture {
                        op: "smooth",
                        aperture: window,
                    }
                    .into());
                }
                check_window("smooth", window, window, rect)?;
                let (sigma_color, sigma_space) = params.sigmas("smooth")?;
                if sigma_color == 0.0 || sigma_space == 0.0 {
                    return Err(NativeError::bad_argument(
                        "smooth",
                        "bilateral sigmas must be positive",
                    )
                    .into());
                }
                Planes::U8(
                    planes
                        .par_iter()
                        .map(|p| {
                            bilateral_filter(p, window, sigma_color as f32, sigma_space as f32)
                        })
                        .collect(),
                )
            }
        };
        let raster = src.with_region(out)?;
        debug!("Image::smooth {kind} {params:?} on {rect:?}");
        Ok(Image::from_raster(raster))
    }

    /// Sum of second derivatives (`d²/dx² + d²/dy²`) into a `DEPTH_16S` image.
    pub fn laplace(&self, aperture: u32) -> Result<Image> {
        let src = self.raster()?;
        let bad = NativeError::BadAperture {
            op: "laplace",
            aperture,
        };
        let d2 = sobel_taps(2, aperture).ok_or_else(|| bad.clone())?;
        let smooth = sobel_taps(0, aperture).ok_or(bad)?;
        let out = map_widened!(&src.region_widened(), p => p
            .par_iter()
            .map(|q| sum_planes(&convolve(q, d2, smooth), &convolve(q, smooth, d2)))
            .collect());
        debug!("Image::laplace aperture={aperture} on {:?}", src.active_rect());
        derivative_image(&out)
    }

    /// Mixed `xorder`/`yorder` Sobel derivative into a `DEPTH_16S` image.
    pub fn sobel(&self, xorder: u32, yorder: u32, aperture: u32) -> Result<Image> {
        let src = self.raster()?;
        if xorder + yorder == 0 {
            return Err(NativeError::bad_argument("sobel", "xorder and yorder are both zero").into());
        }
        let taps = |order: u32| {
            sobel_taps(order, aperture).ok_or_else(|| {
                NativeError::bad_argument(
                    "sobel",
                    format!("order {order} is not available with aperture {aperture}"),
                )
            })
        };
        let (h_taps, v_taps) = (taps(xorder)?, taps(yorder)?);
        let out = convolve_all(&src.region_widened(), h_taps, v_taps);
        debug!(
            "Image::sobel dx={xorder} dy={yorder} aperture={aperture} on {:?}",
            src.active_rect()
        );
        derivative_image(&out)
    }
}

/// Correlate `plane` with the outer product of `h_taps` and `v_taps`;
/// borders replicate the edge samples.
pub(crate) fn convolve<F: Working>(plane: &Plane<F>, h_taps: &[f64], v_taps: &[f64]) -> Plane<F> {
    let cast = |taps: &[f64]| -> Vec<F> { taps.iter().map(|&t| F::from_f64(t)).collect() };
    separable_filter(plane, &cast(h_taps), &cast(v_taps))
}

fn convolve_all(planes: &Widened, h_taps: &[f64], v_taps: &[f64]) -> Widened {
    map_widened!(planes, p => p.par_iter().map(|q| convolve(q, h_taps, v_taps)).collect())
}

fn sum_planes<F: Working>(a: &Plane<F>, b: &Plane<F>) -> Plane<F> {
    map_colors2(a, b, |p: Luma<F>, q: Luma<F>| Luma([p[0] + q[0]]))
}

/// Reject windows reaching more than one region side past a border.
fn check_window(
    op: &'static str,
    width: u32,
    height: u32,
    rect: Rect,
) -> std::result::Result<(), NativeError> {
    let fits = |k: u32, side: u32| u64::from(k) <= 2 * u64::from(side) + 1;
    if fits(width, rect.width) && fits(height, rect.height) {
        return Ok(());
    }
    Err(NativeError::bad_argument(
        op,
        format!(
            "{width}x{height} window is too large for the {}x{} region",
            rect.width, rect.height
        ),
    ))
}

/// Horizontal and vertical Gaussian taps for `params` on a `depth` region.
fn gaussian_kernels(
    params: &SmoothParams,
    depth: Depth,
    rect: Rect,
) -> std::result::Result<(Vec<f64>, Vec<f64>), NativeError> {
    let odd_or_zero = |k: u32| k == 0 || k % 2 == 1;
    if !odd_or_zero(params.param1) || !odd_or_zero(params.param2) {
        return Err(NativeError::BadAperture {
            op: "smooth",
            aperture: if odd_or_zero(params.param1) {
                params.param2
            } else {
                params.param1
            },
        });
    }
    let (sigma_x, sigma_y) = params.sigmas("smooth")?;
    let sigma_y = if sigma_y > 0.0 { sigma_y } else { sigma_x };
    let eight_bit = depth == Depth::U8;
    let width = match (params.param1, sigma_x) {
        (0, s) if s > 0.0 => kernel_for_sigma(s, eight_bit),
        (0, _) => {
            return Err(NativeError::bad_argument(
                "smooth",
                "gaussian needs a kernel size or a sigma",
            ))
        }
        (k, _) => k,
    };
    let height = match (params.param2, params.param1) {
        (0, 0) => kernel_for_sigma(sigma_y, eight_bit),
        (0, k) | (k, _) => k,
    };
    check_window("smooth", width, height, rect)?;
    let sigma = |s: f64, k: u32| if s > 0.0 { s } else { sigma_for_kernel(k) };
    Ok((
        gaussian_taps(width, sigma(sigma_x, width)),
        gaussian_taps(height, sigma(sigma_y, height)),
    ))
}

fn unsupported_depth(op: &'static str, src: &Raster) -> NativeError {
    NativeError::UnsupportedDepth {
        op,
        depth: src.depth(),
    }
}

fn derivative_image(planes: &Widened) -> Result<Image> {
    let raster = Raster::from_planes(Planes::narrow(Depth::I16, planes), false)?;
    Ok(Image::from_raster(raster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;

    fn step_image() -> Image {
        // left half 0, right half 200 on a single 8-bit channel
        let planes = Planes::U8(vec![image::ImageBuffer::from_fn(16, 8, |x, _| {
            Luma([if x < 8 { 0u8 } else { 200 }])
        })]);
        Image::from_raster(Raster::from_planes(planes, false).unwrap())
    }

    #[test]
    fn smoothing_keeps_geometry_and_depth() {
        let img = Image::new(12, 10, Depth::U16, 3).unwrap();
        for kind in SmoothType::ALL {
            let params = match kind {
                SmoothType::Bilateral => SmoothParams::new(5, 0, 10.0, 3.0),
                _ => SmoothParams::default(),
            };
            let res = img.smooth(*kind, params);
            match kind {
                SmoothType::Median | SmoothType::Bilateral => assert!(matches!(
                    res,
                    Err(ImageError::Native(NativeError::UnsupportedDepth { .. }))
                )),
                _ => assert_eq!(res.unwrap().info().unwrap(), img.info().unwrap()),
            }
        }
    }

    #[test]
    fn box_blur_averages_a_flat_region() {
        let img = step_image();
        let out = img.smooth(SmoothType::Blur, SmoothParams::default()).unwrap();
        let Planes::U8(p) = out.raster().unwrap().planes() else {
            panic!("expected 8-bit planes");
        };
        assert_eq!(p[0].get_pixel(2, 4)[0], 0);
        assert_eq!(p[0].get_pixel(13, 4)[0], 200);
        let edge = p[0].get_pixel(8, 4)[0];
        assert!(edge > 0 && edge < 200, "edge pixel should be blended, got {edge}");
    }

    #[test]
    fn smoothing_respects_roi() {
        let mut img = step_image();
        img.set_roi(0, 0, 4, 8).unwrap();
        let out = img.smooth(SmoothType::Gaussian, SmoothParams::default()).unwrap();
        assert_eq!(out.roi().unwrap(), img.roi().unwrap());
        let Planes::U8(p) = out.raster().unwrap().planes() else {
            panic!("expected 8-bit planes");
        };
        // outside the ROI the step is untouched
        assert_eq!(p[0].get_pixel(7, 4)[0], 0);
        assert_eq!(p[0].get_pixel(8, 4)[0], 200);
    }

    #[test]
    fn sobel_responds_to_vertical_edge() {
        let out = step_image().sobel(1, 0, 3).unwrap();
        let info = out.info().unwrap();
        assert_eq!(info.depth, Depth::I16);
        assert_eq!((info.width, info.height, info.channels), (16, 8, 1));
        let Planes::I16(p) = out.raster().unwrap().planes() else {
            panic!("expected 16-bit signed planes");
        };
        assert!(p[0].get_pixel(8, 4)[0] > 0);
        assert_eq!(p[0].get_pixel(2, 4)[0], 0);
    }

    #[test]
    fn derivative_argument_checks() {
        let img = step_image();
        assert!(img.sobel(0, 0, 3).is_err());
        assert!(img.sobel(3, 0, 7).is_err());
        assert!(matches!(
            img.laplace(4),
            Err(ImageError::Native(NativeError::BadAperture { aperture: 4, .. }))
        ));
    }

    #[test]
    fn bilateral_keeps_the_step_and_flattens_noise() {
        let planes = Planes::U8(vec![image::ImageBuffer::from_fn(16, 8, |x, y| {
            let base = if x < 8 { 40u8 } else { 200 };
            Luma([if (x + y) % 2 == 0 { base + 6 } else { base - 6 }])
        })]);
        let img = Image::from_raster(Raster::from_planes(planes, false).unwrap());
        let out = img
            .smooth(SmoothType::Bilateral, SmoothParams::new(5, 0, 20.0, 3.0))
            .unwrap();
        let Planes::U8(p) = out.raster().unwrap().planes() else {
            panic!("expected 8-bit planes");
        };
        let (left, right) = (p[0].get_pixel(3, 4)[0], p[0].get_pixel(12, 4)[0]);
        assert!(left.abs_diff(40) < 6, "left side {left}");
        assert!(right.abs_diff(200) < 6, "right side {right}");
        // the colour sigma keeps the two sides apart across the edge
        assert!(p[0].get_pixel(7, 4)[0] < 100);
        assert!(p[0].get_pixel(8, 4)[0] > 140);
    }

    #[test]
    fn wide_depths_filter_without_losing_precision() {
        // 2^24 + 1 has no exact f32 representation
        let ints = Planes::I32(vec![Plane::<i32>::from_pixel(9, 7, Luma([16_777_217]))]);
        let img = Image::from_raster(Raster::from_planes(ints.clone(), false).unwrap());
        for kind in [SmoothType::Blur, SmoothType::Gaussian] {
            let out = img.smooth(kind, SmoothParams::default()).unwrap();
            assert_eq!(out.raster().unwrap().planes(), &ints, "{kind}");
        }

        let floats = Planes::F64(vec![Plane::<f64>::from_pixel(9, 7, Luma([0.1]))]);
        let img = Image::from_raster(Raster::from_planes(floats, false).unwrap());
        for kind in [SmoothType::Blur, SmoothType::Gaussian] {
            let out = img.smooth(kind, SmoothParams::default()).unwrap();
            let Planes::F64(p) = out.raster().unwrap().planes() else {
                panic!("expected 64-bit float planes");
            };
            // 0.1 through f32 would be off by about 1.5e-9
            assert!(p[0].pixels().all(|px| (px[0] - 0.1).abs() < 1e-12), "{kind}");
        }
    }

    #[test]
    fn gaussian_accepts_separate_axes() {
        let img = step_image();
        // a 1-wide horizontal kernel leaves the vertical step untouched
        let out = img
            .smooth(SmoothType::Gaussian, SmoothParams::new(1, 5, 0.0, 2.0))
            .unwrap();
        assert_eq!(out.raster().unwrap().planes(), img.raster().unwrap().planes());
        // sigma alone picks the kernel size
        let out = img
            .smooth(SmoothType::Gaussian, SmoothParams::new(0, 0, 1.0, 0.0))
            .unwrap();
        let Planes::U8(p) = out.raster().unwrap().planes() else {
            panic!("expected 8-bit planes");
        };
        let edge = p[0].get_pixel(8, 4)[0];
        assert!(edge > 100 && edge < 200, "edge pixel {edge}");
    }

    #[test]
    fn oversized_windows_and_bad_sigmas_are_rejected() {
        let img = step_image();
        let bad_argument = |params: SmoothParams, kind: SmoothType| {
            matches!(
                img.smooth(kind, params),
                Err(ImageError::Native(NativeError::BadArgument { op: "smooth", .. }))
            )
        };
        // 16x8 region: windows up to 33 wide and 17 tall fit
        assert!(img.smooth(SmoothType::Blur, SmoothParams::new(33, 17, 0.0, 0.0)).is_ok());
        assert!(bad_argument(SmoothParams::new(35, 3, 0.0, 0.0), SmoothType::Blur));
        assert!(bad_argument(SmoothParams::new(3, 19, 0.0, 0.0), SmoothType::BlurNoScale));
        assert!(bad_argument(SmoothParams::new(u32::MAX, 0, 0.0, 0.0), SmoothType::Blur));
        assert!(bad_argument(SmoothParams::new(0, 0, 1e12, 0.0), SmoothType::Gaussian));
        assert!(bad_argument(SmoothParams::new(3, 0, f64::NAN, 0.0), SmoothType::Gaussian));
        assert!(bad_argument(SmoothParams::new(3, 0, 1.0, f64::INFINITY), SmoothType::Gaussian));
        assert!(bad_argument(SmoothParams::new(3, 0, -1.0, 0.0), SmoothType::Gaussian));
        assert!(bad_argument(SmoothParams::new(41, 0, 0.0, 0.0), SmoothType::Median));
        assert!(bad_argument(SmoothParams::new(41, 0, 10.0, 3.0), SmoothType::Bilateral));
        assert!(bad_argument(SmoothParams::new(5, 0, f64::NAN, 3.0), SmoothType::Bilateral));
        assert!(bad_argument(SmoothParams::new(5, 0, 10.0, 0.0), SmoothType::Bilateral));
    }

    #[test]
    fn laplace_is_zero_on_flat_image() {
        let img = Image::new(9, 9, Depth::U8, 2).unwrap();
        let out = img.laplace(1).unwrap();
        let Planes::I16(p) = out.raster().unwrap().planes() else {
            panic!("expected 16-bit signed planes");
        };
        assert_eq!(p.len(), 2);
        assert!(p.iter().all(|q| q.as_raw().iter().all(|&v| v == 0)));
    }
}
