//! The owned raster behind every `Image`: channel planes, geometry and ROI.
//!
//! A `Raster` is the only owner of its pixel storage. It is released when
//! dropped, exactly once, on every exit path.
use super::planes::{map_planes, with_planes, Plane, Planes, Sample, Widened};
use super::roi::{clip_roi, Rect, Roi};
use super::traits::ImageView;
use crate::error::{ImageError, NativeError, Result};
use crate::types::Depth;
use image::imageops;
use log::trace;
use std::borrow::Cow;
use std::fmt;

/// Largest channel count a raster can hold.
pub const MAX_CHANNELS: usize = 4;

/// Largest width or height; ROI coordinates are `i32`.
pub const MAX_SIDE: u32 = i32::MAX as u32;

#[derive(Clone)]
pub struct Raster {
    planes: Planes,
    width: u32,
    height: u32,
    alpha: bool,
    roi: Option<Rect>,
}

impl Raster {
    /// Allocate a zero-filled raster.
    pub fn zeroed(width: u32, height: u32, depth: Depth, channels: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ImageError::Allocation(format!(
                "non-positive size {width}x{height}"
            )));
        }
        check_side(width, height)?;
        if !(1..=MAX_CHANNELS).contains(&channels) {
            return Err(ImageError::Allocation(format!(
                "channel count {channels} outside 1..={MAX_CHANNELS}"
            )));
        }
        let bytes = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|n| n.checked_mul(channels as u64))
            .and_then(|n| n.checked_mul(u64::from(depth.bits() / 8)))
            .filter(|&n| n <= isize::MAX as u64)
            .ok_or_else(|| {
                ImageError::Allocation(format!(
                    "{width}x{height}x{channels} {depth} buffer overflows"
                ))
            })?;
        trace!("allocating {width}x{height}x{channels} {depth} raster ({bytes} bytes)");
        Ok(Self {
            planes: Planes::zeroed(depth, width, height, channels),
            width,
            height,
            alpha: false,
            roi: None,
        })
    }

    /// Wrap planes produced by the imaging library.
    pub fn from_planes(planes: Planes, alpha: bool) -> Result<Self> {
        let (width, height) = planes
            .dimensions()
            .ok_or_else(|| ImageError::Allocation("raster without channel planes".into()))?;
        let channels = planes.len();
        if width == 0 || height == 0 || channels > MAX_CHANNELS {
            return Err(ImageError::Allocation(format!(
                "unsupported raster geometry {width}x{height}x{channels}"
            )));
        }
        check_side(width, height)?;
        let uniform = with_planes!(&planes, p => p.iter().all(|q| q.dimensions() == (width, height)));
        if !uniform {
            return Err(ImageError::Allocation(
                "channel planes differ in size".into(),
            ));
        }
        Ok(Self {
            planes,
            width,
            height,
            alpha,
            roi: None,
        })
    }

    /// Read-only access to the channel planes.
    pub fn planes(&self) -> &Planes {
        &self.planes
    }

    pub fn has_roi(&self) -> bool {
        self.roi.is_some()
    }

    /// The active region: the ROI when set, otherwise the whole raster.
    pub fn active_rect(&self) -> Rect {
        self.roi.unwrap_or(Rect::full(self.width, self.height))
    }

    pub fn roi(&self) -> Roi {
        self.active_rect().into()
    }

    pub fn set_roi(&mut self, roi: Roi) -> std::result::Result<(), NativeError> {
        let rect = clip_roi(roi, self.width, self.height)?;
        self.roi = (!rect.is_full(self.width, self.height)).then_some(rect);
        Ok(())
    }

    pub fn reset_roi(&mut self) {
        self.roi = None;
    }

    /// Planes restricted to the active region; borrowed when there is no ROI.
    pub fn region(&self) -> Cow<'_, Planes> {
        match self.roi {
            None => Cow::Borrowed(&self.planes),
            Some(rect) => {
                Cow::Owned(map_planes!(&self.planes, p => crop_planes(p, rect)))
            }
        }
    }

    /// The active region widened to its floating working type.
    pub fn region_widened(&self) -> Widened {
        self.region().widen()
    }

    /// Clone of this raster with the active region replaced by `region`.
    ///
    /// The ROI is carried over to the clone.
    pub fn with_region(&self, region: Planes) -> std::result::Result<Raster, NativeError> {
        let mut out = self.clone();
        out.write_region(region)?;
        Ok(out)
    }

    /// Overwrite the active region with `region`, which must match it in
    /// size, depth and channel count.
    pub fn write_region(&mut self, region: Planes) -> std::result::Result<(), NativeError> {
        let rect = self.active_rect();
        let mismatch = |detail: String| NativeError::SizeMismatch { op: "copy", detail };
        if region.len() != self.planes.len() || region.dimensions() != Some((rect.width, rect.height)) {
            return Err(mismatch(format!(
                "{} planes of {:?} into {} planes of {}x{}",
                region.len(),
                region.dimensions(),
                self.planes.len(),
                rect.width,
                rect.height
            )));
        }
        let (src_depth, dst_depth) = (region.depth(), self.planes.depth());
        match (&mut self.planes, &region) {
            (Planes::U8(d), Planes::U8(s)) => paste_planes(d, s, rect),
            (Planes::I8(d), Planes::I8(s)) => paste_planes(d, s, rect),
            (Planes::U16(d), Planes::U16(s)) => paste_planes(d, s, rect),
            (Planes::I16(d), Planes::I16(s)) => paste_planes(d, s, rect),
            (Planes::I32(d), Planes::I32(s)) => paste_planes(d, s, rect),
            (Planes::F32(d), Planes::F32(s)) => paste_planes(d, s, rect),
            (Planes::F64(d), Planes::F64(s)) => paste_planes(d, s, rect),
            _ => return Err(mismatch(format!("{src_depth} into {dst_depth}"))),
        }
        Ok(())
    }
}

impl ImageView for Raster {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }
    #[inline]
    fn height(&self) -> u32 {
        self.height
    }
    #[inline]
    fn channels(&self) -> usize {
        self.planes.len()
    }
    #[inline]
    fn depth(&self) -> Depth {
        self.planes.depth()
    }
    #[inline]
    fn has_alpha(&self) -> bool {
        self.alpha
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.planes.len())
            .field("depth", &self.planes.depth())
            .field("alpha", &self.alpha)
            .field("roi", &self.roi)
            .finish()
    }
}

impl Drop for Raster {
    fn drop(&mut self) {
        trace!(
            "releasing {}x{}x{} {} raster",
            self.width,
            self.height,
            self.planes.len(),
            self.planes.depth()
        );
    }
}

fn check_side(width: u32, height: u32) -> Result<()> {
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(ImageError::Allocation(format!(
            "size {width}x{height} exceeds {MAX_SIDE} per side"
        )));
    }
    Ok(())
}

pub(crate) fn crop_planes<T: Sample>(planes: &[Plane<T>], rect: Rect) -> Vec<Plane<T>> {
    planes
        .iter()
        .map(|p| imageops::crop_imm(p, rect.x, rect.y, rect.width, rect.height).to_image())
        .collect()
}

fn paste_planes<T: Sample>(dst: &mut [Plane<T>], src: &[Plane<T>], rect: Rect) {
    for (d, s) in dst.iter_mut().zip(src) {
        imageops::replace(d, s, i64::from(rect.x), i64::from(rect.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn zeroed_rejects_bad_geometry() {
        assert!(matches!(
            Raster::zeroed(0, 4, Depth::U8, 1),
            Err(ImageError::Allocation(_))
        ));
        assert!(matches!(
            Raster::zeroed(4, 4, Depth::U8, 5),
            Err(ImageError::Allocation(_))
        ));
        assert!(matches!(
            Raster::zeroed(u32::MAX, u32::MAX, Depth::F64, 4),
            Err(ImageError::Allocation(_))
        ));
    }

    #[test]
    fn sides_beyond_i32_are_rejected_before_allocating() {
        for (w, h) in [(MAX_SIDE + 1, 1), (1, MAX_SIDE + 1), (u32::MAX, 1)] {
            let err = Raster::zeroed(w, h, Depth::U8, 1).unwrap_err();
            assert!(matches!(err, ImageError::Allocation(ref m) if m.contains("per side")), "{w}x{h}");
        }
        // a wide but shallow raster at the limit stays addressable by the ROI
        assert!(check_side(MAX_SIDE, 1).is_ok());
    }

    #[test]
    fn full_size_roi_is_the_same_as_none() {
        let mut r = Raster::zeroed(6, 4, Depth::U8, 1).unwrap();
        r.set_roi(Roi::new(-3, -3, 20, 20)).unwrap();
        assert!(!r.has_roi());
        assert_eq!(r.roi(), Roi::new(0, 0, 6, 4));
    }

    #[test]
    fn with_region_writes_only_inside_roi() {
        let mut r = Raster::zeroed(4, 4, Depth::U8, 1).unwrap();
        r.set_roi(Roi::new(1, 1, 2, 2)).unwrap();
        let region = Planes::U8(vec![Plane::<u8>::from_pixel(2, 2, Luma([9u8]))]);
        let out = r.with_region(region).unwrap();
        let Planes::U8(p) = out.planes() else {
            panic!("expected 8-bit planes");
        };
        assert_eq!(p[0].get_pixel(0, 0)[0], 0);
        assert_eq!(p[0].get_pixel(1, 1)[0], 9);
        assert_eq!(p[0].get_pixel(2, 2)[0], 9);
        assert_eq!(p[0].get_pixel(3, 3)[0], 0);
        assert_eq!(out.roi(), Roi::new(1, 1, 2, 2));
    }

    #[test]
    fn write_region_rejects_mismatched_planes() {
        let mut r = Raster::zeroed(4, 4, Depth::U8, 1).unwrap();
        let wrong_depth = Planes::zeroed(Depth::U16, 4, 4, 1);
        assert!(matches!(
            r.write_region(wrong_depth),
            Err(NativeError::SizeMismatch { .. })
        ));
        let wrong_size = Planes::zeroed(Depth::U8, 3, 4, 1);
        assert!(r.write_region(wrong_size).is_err());
    }
}
