#![doc = include_str!("../README.md")]

// Core image model and host-facing constants
pub mod error;
pub mod image;
pub mod types;

// Operations, each adding methods to `Image`
pub mod edges;
pub mod filter;
pub mod morphology;
pub mod pyramid;
pub mod resize;

// Pipeline tooling used by the `cv-image` binary
pub mod config;
pub mod diagnostics;
pub mod ops;

// --- High-level re-exports -------------------------------------------------

pub use crate::error::{ImageError, NativeError, Result};
pub use crate::filter::SmoothParams;
pub use crate::image::{Image, ImageView, Roi};
pub use crate::types::{Depth, ImageInfo, Interpolation, LoadMode, PyramidFilter, SmoothType};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use cv_image::prelude::*;
///
/// # fn main() -> cv_image::Result<()> {
/// let img = Image::load("photo.jpg", LoadMode::Color)?;
/// let blurred = img.smooth(SmoothType::Gaussian, SmoothParams::default())?;
/// let edges = blurred.canny(50.0, 150.0, 3)?;
/// edges.save("edges.png", LoadMode::Unchanged)?;
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::morphology::DEFAULT_ITERATIONS;
    pub use crate::{
        Depth, Image, ImageView, Interpolation, LoadMode, PyramidFilter, Roi, SmoothParams,
        SmoothType,
    };
}
