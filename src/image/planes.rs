//! Planar pixel storage: one single-channel `imageproc` image per channel.
//!
//! Keeping channels as separate `Image<Luma<T>>` planes lets every operation
//! hand a plane straight to the `imageproc` routines, which are single-channel,
//! and lets an 8-bit single-channel raster lend its plane without copying.
use crate::types::Depth;
use image::{ImageBuffer, Luma, Primitive};
use imageproc::definitions::{Clamp, Image};
use rayon::prelude::*;

/// Sample types a raster can store.
pub trait Sample: Primitive + Send + Sync + 'static {
    fn to_f64(self) -> f64;

    /// Round and saturate into the sample range.
    fn from_f64(v: f64) -> Self;
}

macro_rules! int_sample {
    ($($t:ty),+) => {$(
        impl Sample for $t {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                // float-to-int `as` saturates and maps NaN to 0
                v.round() as $t
            }
        }
    )+};
}

int_sample!(u8, i8, u16, i16, i32);

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

/// Floating sample types the generic filters accumulate in.
pub trait Working: Sample + Clamp<Self> {}

impl Working for f32 {}
impl Working for f64 {}

pub type Plane<T> = Image<Luma<T>>;
pub type PlaneF32 = Image<Luma<f32>>;
pub type PlaneF64 = Image<Luma<f64>>;

/// Channel planes of one raster, tagged by depth.
#[derive(Clone, Debug, PartialEq)]
pub enum Planes {
    U8(Vec<Plane<u8>>),
    I8(Vec<Plane<i8>>),
    U16(Vec<Plane<u16>>),
    I16(Vec<Plane<i16>>),
    I32(Vec<Plane<i32>>),
    F32(Vec<Plane<f32>>),
    F64(Vec<Plane<f64>>),
}

/// Evaluate `$body` with `$p` bound to the typed plane vector.
macro_rules! with_planes {
    ($planes:expr, $p:ident => $body:expr) => {
        match $planes {
            $crate::image::planes::Planes::U8($p) => $body,
            $crate::image::planes::Planes::I8($p) => $body,
            $crate::image::planes::Planes::U16($p) => $body,
            $crate::image::planes::Planes::I16($p) => $body,
            $crate::image::planes::Planes::I32($p) => $body,
            $crate::image::planes::Planes::F32($p) => $body,
            $crate::image::planes::Planes::F64($p) => $body,
        }
    };
}

/// Evaluate `$body` with `$p` bound to the typed plane vector and re-tag the
/// result with the same depth.
macro_rules! map_planes {
    ($planes:expr, $p:ident => $body:expr) => {
        match $planes {
            $crate::image::planes::Planes::U8($p) => $crate::image::planes::Planes::U8($body),
            $crate::image::planes::Planes::I8($p) => $crate::image::planes::Planes::I8($body),
            $crate::image::planes::Planes::U16($p) => $crate::image::planes::Planes::U16($body),
            $crate::image::planes::Planes::I16($p) => $crate::image::planes::Planes::I16($body),
            $crate::image::planes::Planes::I32($p) => $crate::image::planes::Planes::I32($body),
            $crate::image::planes::Planes::F32($p) => $crate::image::planes::Planes::F32($body),
            $crate::image::planes::Planes::F64($p) => $crate::image::planes::Planes::F64($body),
        }
    };
}

pub(crate) use {map_planes, with_planes};

impl Planes {
    /// `channels` zero-filled planes of `width × height`.
    pub fn zeroed(depth: Depth, width: u32, height: u32, channels: usize) -> Self {
        fn zeros<T: Sample>(width: u32, height: u32, channels: usize) -> Vec<Plane<T>> {
            (0..channels).map(|_| ImageBuffer::new(width, height)).collect()
        }
        match depth {
            Depth::U8 => Planes::U8(zeros(width, height, channels)),
            Depth::I8 => Planes::I8(zeros(width, height, channels)),
            Depth::U16 => Planes::U16(zeros(width, height, channels)),
            Depth::I16 => Planes::I16(zeros(width, height, channels)),
            Depth::I32 => Planes::I32(zeros(width, height, channels)),
            Depth::F32 => Planes::F32(zeros(width, height, channels)),
            Depth::F64 => Planes::F64(zeros(width, height, channels)),
        }
    }

    pub fn depth(&self) -> Depth {
        match self {
            Planes::U8(_) => Depth::U8,
            Planes::I8(_) => Depth::I8,
            Planes::U16(_) => Depth::U16,
            Planes::I16(_) => Depth::I16,
            Planes::I32(_) => Depth::I32,
            Planes::F32(_) => Depth::F32,
            Planes::F64(_) => Depth::F64,
        }
    }

    pub fn len(&self) -> usize {
        with_planes!(self, p => p.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimensions of the first plane, `None` when there are no planes.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        with_planes!(self, p => p.first().map(|plane| plane.dimensions()))
    }

    /// Widen every plane for the generic filtering routines: `f64` for
    /// `DEPTH_32S` and `DEPTH_64F`, whose samples `f32` cannot hold exactly,
    /// `f32` for everything else.
    pub fn widen(&self) -> Widened {
        match self {
            Planes::I32(p) => Widened::F64(p.par_iter().map(cast_plane).collect()),
            Planes::F64(p) => Widened::F64(p.clone()),
            Planes::F32(p) => Widened::F32(p.clone()),
            other => with_planes!(other, p => Widened::F32(p.par_iter().map(cast_plane).collect())),
        }
    }

    /// Narrow widened planes into `depth`, rounding and saturating.
    pub fn narrow(depth: Depth, widened: &Widened) -> Self {
        fn cast_all<W: Sample, T: Sample>(planes: &[Plane<W>]) -> Vec<Plane<T>> {
            planes.par_iter().map(cast_plane).collect()
        }
        match widened {
            Widened::F32(p) => match depth {
                Depth::U8 => Planes::U8(cast_all(p)),
                Depth::I8 => Planes::I8(cast_all(p)),
                Depth::U16 => Planes::U16(cast_all(p)),
                Depth::I16 => Planes::I16(cast_all(p)),
                Depth::I32 => Planes::I32(cast_all(p)),
                Depth::F32 => Planes::F32(p.clone()),
                Depth::F64 => Planes::F64(cast_all(p)),
            },
            Widened::F64(p) => match depth {
                Depth::U8 => Planes::U8(cast_all(p)),
                Depth::I8 => Planes::I8(cast_all(p)),
                Depth::U16 => Planes::U16(cast_all(p)),
                Depth::I16 => Planes::I16(cast_all(p)),
                Depth::I32 => Planes::I32(cast_all(p)),
                Depth::F32 => Planes::F32(cast_all(p)),
                Depth::F64 => Planes::F64(p.clone()),
            },
        }
    }
}

/// Channel planes widened to a floating working type.
#[derive(Clone, Debug, PartialEq)]
pub enum Widened {
    F32(Vec<PlaneF32>),
    F64(Vec<PlaneF64>),
}

/// Evaluate `$body` with `$p` bound to the widened plane vector and re-tag the
/// result with the same working type.
macro_rules! map_widened {
    ($widened:expr, $p:ident => $body:expr) => {
        match $widened {
            $crate::image::planes::Widened::F32($p) => $crate::image::planes::Widened::F32($body),
            $crate::image::planes::Widened::F64($p) => $crate::image::planes::Widened::F64($body),
        }
    };
}

pub(crate) use map_widened;

/// Convert every sample of `plane` through `f64`, rounding and saturating.
pub fn cast_plane<T: Sample, U: Sample>(plane: &Plane<T>) -> Plane<U> {
    let (w, h) = plane.dimensions();
    let data = plane.as_raw().iter().map(|&v| U::from_f64(v.to_f64())).collect();
    // dimensions and length agree by construction
    ImageBuffer::from_raw(w, h, data).unwrap_or_else(|| ImageBuffer::new(w, h))
}
