use cv_image::{Image, LoadMode};
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

/// Generates a simple high-contrast checkerboard image.
pub fn checkerboard_u8(width: u32, height: u32, cell: u32) -> GrayImage {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    GrayImage::from_fn(width, height, |x, y| {
        let sum = x / cell + y / cell;
        Luma([if sum & 1 == 0 { 32u8 } else { 220u8 }])
    })
}

/// Colour checkerboard whose dark cells are pure red and light cells pure blue.
pub fn checkerboard_rgb(width: u32, height: u32, cell: u32) -> RgbImage {
    let gray = checkerboard_u8(width, height, cell);
    RgbImage::from_fn(width, height, |x, y| {
        if gray.get_pixel(x, y)[0] < 128 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    })
}

/// Write `buffer` as a PNG inside `dir` and decode it back as an `Image`.
pub fn load_via_png(dir: &Path, name: &str, buffer: &GrayImage, mode: LoadMode) -> Image {
    let path = dir.join(name);
    buffer.save(&path).expect("write synthetic png");
    Image::load(&path, mode).expect("decode synthetic png")
}

pub fn load_rgb_via_png(dir: &Path, name: &str, buffer: &RgbImage, mode: LoadMode) -> Image {
    let path = dir.join(name);
    buffer.save(&path).expect("write synthetic png");
    Image::load(&path, mode).expect("decode synthetic png")
}
