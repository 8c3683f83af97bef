//! `Image`: the host-facing wrapper around one owned [`Raster`].
//!
//! The wrapper is either initialised (holds a raster) or empty. An empty
//! wrapper is what a host gets when it builds an `Image` without going
//! through `new`, `load` or an operation (`Image::default()`); every
//! operation on it fails with [`ImageError::InternalConsistency`].
use super::raster::Raster;
use super::roi::Roi;
use super::traits::ImageView;
use crate::error::{ImageError, Result};
use crate::types::{Depth, ImageInfo};
use log::debug;

const MISSING_RASTER: &str =
    "image was not initialised; create it with Image::new, Image::load or an image operation";

#[derive(Debug, Default)]
pub struct Image {
    raster: Option<Raster>,
}

impl Image {
    /// Allocate a zero-filled image.
    pub fn new(width: u32, height: u32, depth: Depth, channels: usize) -> Result<Self> {
        let raster = Raster::zeroed(width, height, depth, channels)?;
        debug!("Image::new {width}x{height}x{channels} {depth}");
        Ok(Self::from_raster(raster))
    }

    /// Allocate from the raw integers a host passes: signed sizes and the
    /// numeric depth code.
    pub fn from_codes(width: i64, height: i64, depth_code: i32, channels: i64) -> Result<Self> {
        let depth = Depth::try_from(depth_code)
            .map_err(|e| ImageError::Allocation(e.to_string()))?;
        let to_u32 = |what: &str, v: i64| {
            u32::try_from(v)
                .ok()
                .filter(|&v| v > 0)
                .ok_or_else(|| ImageError::Allocation(format!("non-positive {what} {v}")))
        };
        let width = to_u32("width", width)?;
        let height = to_u32("height", height)?;
        let channels = to_u32("channel count", channels)? as usize;
        Self::new(width, height, depth, channels)
    }

    pub(crate) fn from_raster(raster: Raster) -> Self {
        Self {
            raster: Some(raster),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.raster.is_some()
    }

    /// The owned raster, or `InternalConsistency` for an empty wrapper.
    pub fn raster(&self) -> Result<&Raster> {
        self.raster
            .as_ref()
            .ok_or(ImageError::InternalConsistency(MISSING_RASTER))
    }

    pub(crate) fn raster_mut(&mut self) -> Result<&mut Raster> {
        self.raster
            .as_mut()
            .ok_or(ImageError::InternalConsistency(MISSING_RASTER))
    }

    /// Geometry snapshot (width, height, channels, alpha flag, depth).
    pub fn info(&self) -> Result<ImageInfo> {
        Ok(self.raster()?.info())
    }

    /// Deep copy, ROI included.
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self::from_raster(self.raster()?.clone()))
    }

    /// Attach a region of interest. The rectangle is handed to the raster
    /// unvalidated; the raster clips it to the image or rejects it.
    pub fn set_roi(&mut self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.raster_mut()?
            .set_roi(Roi::new(x, y, width, height))
            .map_err(ImageError::from)
    }

    /// The active region, or the full image when no ROI is set.
    pub fn roi(&self) -> Result<Roi> {
        Ok(self.raster()?.roi())
    }

    pub fn reset_roi(&mut self) -> Result<()> {
        self.raster_mut()?.reset_roi();
        Ok(())
    }
}
