//! Grey-level morphology on 8-bit rasters.
//!
//! `n` iterations with the default 3×3 rectangle are equivalent to a single
//! pass with a `(2n+1)²` square, which is what `imageproc` is given.

use crate::error::{NativeError, Result};
use crate::image::{Image, ImageView, Plane, Planes};
use image::{GrayImage, Luma};
use imageproc::map::map_colors2;
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};
use log::debug;
use rayon::prelude::*;

pub const DEFAULT_ITERATIONS: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Morph {
    Erode,
    Dilate,
    Open,
    Close,
    Gradient,
    TopHat,
    BlackHat,
}

impl Morph {
    fn name(self) -> &'static str {
        match self {
            Morph::Erode => "erode",
            Morph::Dilate => "dilate",
            Morph::Open => "open",
            Morph::Close => "close",
            Morph::Gradient => "gradient",
            Morph::TopHat => "top_hat",
            Morph::BlackHat => "black_hat",
        }
    }

    fn apply(self, plane: &GrayImage, mask: &Mask) -> GrayImage {
        let open = |p: &GrayImage| grayscale_dilate(&grayscale_erode(p, mask), mask);
        let close = |p: &GrayImage| grayscale_erode(&grayscale_dilate(p, mask), mask);
        match self {
            Morph::Erode => grayscale_erode(plane, mask),
            Morph::Dilate => grayscale_dilate(plane, mask),
            Morph::Open => open(plane),
            Morph::Close => close(plane),
            Morph::Gradient => saturating_sub(
                &grayscale_dilate(plane, mask),
                &grayscale_erode(plane, mask),
            ),
            Morph::TopHat => saturating_sub(plane, &open(plane)),
            Morph::BlackHat => saturating_sub(&close(plane), plane),
        }
    }
}

fn saturating_sub(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p[0].saturating_sub(q[0])]))
}

impl Image {
    pub fn erode(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::Erode, iterations)
    }

    pub fn dilate(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::Dilate, iterations)
    }

    /// Erosion followed by dilation.
    pub fn open(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::Open, iterations)
    }

    /// Dilation followed by erosion.
    pub fn close(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::Close, iterations)
    }

    /// Dilation minus erosion.
    pub fn gradient(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::Gradient, iterations)
    }

    /// Source minus its opening.
    pub fn top_hat(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::TopHat, iterations)
    }

    /// Closing minus the source.
    pub fn black_hat(&self, iterations: u32) -> Result<Image> {
        self.morph(Morph::BlackHat, iterations)
    }

    fn morph(&self, kind: Morph, iterations: u32) -> Result<Image> {
        let src = self.raster()?;
        let region = src.region();
        let Planes::U8(planes) = region.as_ref() else {
            return Err(NativeError::UnsupportedDepth {
                op: kind.name(),
                depth: src.depth(),
            }
            .into());
        };
        let radius = u8::try_from(iterations).map_err(|_| {
            NativeError::bad_argument(kind.name(), format!("too many iterations ({iterations})"))
        })?;
        let out: Vec<Plane<u8>> = if radius == 0 {
            match kind {
                Morph::Erode | Morph::Dilate | Morph::Open | Morph::Close => planes.clone(),
                // the difference of two identical images
                _ => planes
                    .iter()
                    .map(|p| GrayImage::new(p.width(), p.height()))
                    .collect(),
            }
        } else {
            let mask = Mask::square(radius);
            planes.par_iter().map(|p| kind.apply(p, &mask)).collect()
        };
        let raster = src.with_region(Planes::U8(out))?;
        debug!(
            "Image::{} iterations={iterations} on {:?}",
            kind.name(),
            src.active_rect()
        );
        Ok(Image::from_raster(raster))
    }
}
