use crate::error::NativeError;
use serde::{Deserialize, Serialize};

/// Axis-aligned region of interest in pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roi {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Roi {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }
}

/// Unsigned bounds of a clipped region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Rect::full(width, height)
    }
}

impl From<Rect> for Roi {
    fn from(r: Rect) -> Self {
        Roi::new(r.x as i32, r.y as i32, r.width as i32, r.height as i32)
    }
}

/// Intersect a requested ROI with the image extents.
///
/// Rectangles with a negative size, starting past the right/bottom edge or
/// ending before the origin are rejected; anything else is clipped. A
/// rectangle that clips to nothing is rejected as well.
pub fn clip_roi(roi: Roi, width: u32, height: u32) -> Result<Rect, NativeError> {
    let bad = || NativeError::BadRoi {
        x: roi.x,
        y: roi.y,
        width: roi.width,
        height: roi.height,
        image_width: width,
        image_height: height,
    };
    if roi.width < 0 || roi.height < 0 {
        return Err(bad());
    }
    let (w, h) = (i64::from(width), i64::from(height));
    let x0 = i64::from(roi.x);
    let y0 = i64::from(roi.y);
    let x1 = x0 + i64::from(roi.width);
    let y1 = y0 + i64::from(roi.height);
    if x0 >= w || y0 >= h {
        return Err(bad());
    }
    let (x0, y0) = (x0.max(0), y0.max(0));
    let (x1, y1) = (x1.min(w), y1.min(h));
    if x1 <= x0 || y1 <= y0 {
        return Err(bad());
    }
    Ok(Rect {
        x: x0 as u32,
        y: y0 as u32,
        width: (x1 - x0) as u32,
        height: (y1 - y0) as u32,
    })
}
