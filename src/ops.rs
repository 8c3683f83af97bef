//! Serializable operation list driving the `cv-image` binary.
//!
//! Each `Operation` maps onto one `Image` method. Operations that produce a
//! new image replace the current one; `set_roi` / `reset_roi` mutate it in
//! place.

use crate::diagnostics::TimingBreakdown;
use crate::error::Result;
use crate::filter::SmoothParams;
use crate::image::{Image, ImageView};
use crate::morphology::DEFAULT_ITERATIONS;
use crate::types::{Interpolation, PyramidFilter, SmoothType};
use log::debug;
use serde::Deserialize;
use std::time::Instant;

fn default_aperture() -> u32 {
    3
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    SetRoi {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ResetRoi,
    Smooth {
        kind: SmoothType,
        #[serde(flatten)]
        params: SmoothParams,
    },
    Laplace {
        #[serde(default = "default_aperture")]
        aperture: u32,
    },
    Sobel {
        xorder: u32,
        yorder: u32,
        #[serde(default = "default_aperture")]
        aperture: u32,
    },
    Erode {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    Dilate {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    Open {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    Close {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    Gradient {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    TopHat {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    BlackHat {
        #[serde(default = "default_iterations")]
        iterations: u32,
    },
    /// Resample into a freshly allocated `width × height` image with the
    /// current depth and channel count.
    Resize {
        width: u32,
        height: u32,
        #[serde(default)]
        interpolation: Interpolation,
    },
    PyrDown {
        #[serde(default)]
        filter: PyramidFilter,
    },
    PyrUp {
        #[serde(default)]
        filter: PyramidFilter,
    },
    Canny {
        low: f64,
        high: f64,
        #[serde(default = "default_aperture")]
        aperture: u32,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetRoi { .. } => "set_roi",
            Operation::ResetRoi => "reset_roi",
            Operation::Smooth { .. } => "smooth",
            Operation::Laplace { .. } => "laplace",
            Operation::Sobel { .. } => "sobel",
            Operation::Erode { .. } => "erode",
            Operation::Dilate { .. } => "dilate",
            Operation::Open { .. } => "open",
            Operation::Close { .. } => "close",
            Operation::Gradient { .. } => "gradient",
            Operation::TopHat { .. } => "top_hat",
            Operation::BlackHat { .. } => "black_hat",
            Operation::Resize { .. } => "resize",
            Operation::PyrDown { .. } => "pyr_down",
            Operation::PyrUp { .. } => "pyr_up",
            Operation::Canny { .. } => "canny",
        }
    }

    /// Run the operation on `image`, returning the image that replaces it.
    pub fn apply(&self, mut image: Image) -> Result<Image> {
        match *self {
            Operation::SetRoi {
                x,
                y,
                width,
                height,
            } => {
                image.set_roi(x, y, width, height)?;
                Ok(image)
            }
            Operation::ResetRoi => {
                image.reset_roi()?;
                Ok(image)
            }
            Operation::Smooth { kind, params } => image.smooth(kind, params),
            Operation::Laplace { aperture } => image.laplace(aperture),
            Operation::Sobel {
                xorder,
                yorder,
                aperture,
            } => image.sobel(xorder, yorder, aperture),
            Operation::Erode { iterations } => image.erode(iterations),
            Operation::Dilate { iterations } => image.dilate(iterations),
            Operation::Open { iterations } => image.open(iterations),
            Operation::Close { iterations } => image.close(iterations),
            Operation::Gradient { iterations } => image.gradient(iterations),
            Operation::TopHat { iterations } => image.top_hat(iterations),
            Operation::BlackHat { iterations } => image.black_hat(iterations),
            Operation::Resize {
                width,
                height,
                interpolation,
            } => {
                let src = image.raster()?;
                let mut dst = Image::new(width, height, src.depth(), src.channels())?;
                image.resize(&mut dst, interpolation)?;
                Ok(dst)
            }
            Operation::PyrDown { filter } => image.pyr_down(filter),
            Operation::PyrUp { filter } => image.pyr_up(filter),
            Operation::Canny {
                low,
                high,
                aperture,
            } => image.canny(low, high, aperture),
        }
    }
}

/// Apply `operations` in order, timing each one. Stops at the first failure.
pub fn run_operations(
    mut image: Image,
    operations: &[Operation],
) -> Result<(Image, TimingBreakdown)> {
    let total = Instant::now();
    let mut timing = TimingBreakdown::default();
    for op in operations {
        let start = Instant::now();
        image = op.apply(image)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!("{} finished in {elapsed_ms:.3} ms", op.name());
        timing.push(op.name(), elapsed_ms);
    }
    timing.total_ms = total.elapsed().as_secs_f64() * 1000.0;
    Ok((image, timing))
}
