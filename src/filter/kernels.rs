//! 1-D taps for separable derivative filters.
//!
//! A 2-D Sobel kernel of aperture `k` and orders `(dx, dy)` is the outer
//! product of `taps(dx, k)` (horizontal) and `taps(dy, k)` (vertical). Order 0
//! is the binomial smoothing row; aperture 1 means no smoothing and a 3-tap
//! derivative along the differentiated axis.

const UNIT: [f64; 1] = [1.0];

const SMOOTH_3: [f64; 3] = [1.0, 2.0, 1.0];
const SMOOTH_5: [f64; 5] = [1.0, 4.0, 6.0, 4.0, 1.0];
const SMOOTH_7: [f64; 7] = [1.0, 6.0, 15.0, 20.0, 15.0, 6.0, 1.0];

const D1_3: [f64; 3] = [-1.0, 0.0, 1.0];
const D1_5: [f64; 5] = [-1.0, -2.0, 0.0, 2.0, 1.0];
const D1_7: [f64; 7] = [-1.0, -4.0, -5.0, 0.0, 5.0, 4.0, 1.0];

const D2_3: [f64; 3] = [1.0, -2.0, 1.0];
const D2_5: [f64; 5] = [1.0, 0.0, -2.0, 0.0, 1.0];
const D2_7: [f64; 7] = [1.0, 2.0, -1.0, -4.0, -1.0, 2.0, 1.0];

/// Taps for derivative `order` at `aperture`, `None` for unsupported pairs.
pub fn sobel_taps(order: u32, aperture: u32) -> Option<&'static [f64]> {
    let taps: &'static [f64] = match (aperture, order) {
        (1, 0) => &UNIT,
        (1, 1) | (3, 1) => &D1_3,
        (1, 2) | (3, 2) => &D2_3,
        (3, 0) => &SMOOTH_3,
        (5, 0) => &SMOOTH_5,
        (5, 1) => &D1_5,
        (5, 2) => &D2_5,
        (7, 0) => &SMOOTH_7,
        (7, 1) => &D1_7,
        (7, 2) => &D2_7,
        _ => return None,
    };
    Some(taps)
}

/// Sigma used when a Gaussian is requested by kernel width alone.
pub fn sigma_for_kernel(size: u32) -> f64 {
    0.3 * ((f64::from(size) - 1.0) * 0.5 - 1.0) + 0.8
}

/// Odd kernel width covering `±3σ` for 8-bit samples and `±4σ` otherwise.
/// Saturates at `u32::MAX` for huge sigmas.
pub fn kernel_for_sigma(sigma: f64, eight_bit: bool) -> u32 {
    let reach = if eight_bit { 3.0 } else { 4.0 };
    ((sigma * reach * 2.0 + 1.0).round() as u32) | 1
}

/// `size` normalised Gaussian taps centred on the middle one.
pub fn gaussian_taps(size: u32, sigma: f64) -> Vec<f64> {
    let centre = (f64::from(size) - 1.0) / 2.0;
    let denom = 2.0 * sigma * sigma;
    let taps: Vec<f64> = (0..size)
        .map(|i| (-(f64::from(i) - centre).powi(2) / denom).exp())
        .collect();
    let sum: f64 = taps.iter().sum();
    taps.into_iter().map(|t| t / sum).collect()
}
