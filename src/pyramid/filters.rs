//! Separable 1-D kernels used by the pyramid operations.
use crate::filter::convolve;
use crate::image::{Plane, Working};
use crate::types::PyramidFilter;

/// A symmetric separable filter, applied along both axes.
pub trait SeparableFilter: Sync {
    /// Taps in left-to-right order, normalised to sum to one.
    fn taps(&self) -> &[f64];
}

#[derive(Clone, Copy, Debug)]
pub struct StaticSeparableFilter {
    taps: &'static [f64],
}

impl StaticSeparableFilter {
    pub const fn new(taps: &'static [f64]) -> Self {
        Self { taps }
    }
}

impl SeparableFilter for StaticSeparableFilter {
    #[inline]
    fn taps(&self) -> &[f64] {
        self.taps
    }
}

/// Normalised 5-tap Gaussian `[1, 4, 6, 4, 1] / 16`; its outer product is the
/// 5×5 pyramid kernel.
pub const GAUSSIAN_5TAP: StaticSeparableFilter =
    StaticSeparableFilter::new(&[0.0625, 0.25, 0.375, 0.25, 0.0625]);

impl PyramidFilter {
    pub fn kernel(self) -> &'static dyn SeparableFilter {
        match self {
            PyramidFilter::Gaussian5x5 => &GAUSSIAN_5TAP,
        }
    }
}

/// Blur one plane with `filter` on both axes; borders clamp.
pub fn apply<F: Working>(filter: &dyn SeparableFilter, plane: &Plane<F>) -> Plane<F> {
    convolve(plane, filter.taps(), filter.taps())
}
