//! Edge detection on 8-bit rasters.
//!
//! `Image::canny` runs `imageproc`'s Canny detector on a grayscale view of
//! the active region. The view is borrowed straight from the source when the
//! source already is a full single-channel 8-bit plane; any other layout gets
//! an owned, converted copy.

pub mod canny;

pub use canny::grayscale_input;
