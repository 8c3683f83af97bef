//! Named constants exposed to hosts, with the numeric codes of the imaging
//! library they mirror, plus the geometry snapshot returned by `Image::info`.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sign bit carried by the signed depth codes.
const DEPTH_SIGN: i32 = i32::MIN;

/// A numeric code that does not name any variant of the requested constant set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} code {code}")]
pub struct UnknownCode {
    pub kind: &'static str,
    pub code: i32,
}

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:expr => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant, )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Numeric code understood by the imaging library.
            pub fn code(self) -> i32 {
                match self {
                    $( $name::$variant => $code, )+
                }
            }

            /// Host-facing constant name.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = UnknownCode;

            fn try_from(code: i32) -> Result<Self, Self::Error> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.code() == code)
                    .ok_or(UnknownCode {
                        kind: stringify!($name),
                        code,
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

coded_enum! {
    /// Per-sample storage type of a raster.
    Depth {
        U8 = 8 => "DEPTH_8U",
        I8 = DEPTH_SIGN | 8 => "DEPTH_8S",
        U16 = 16 => "DEPTH_16U",
        I16 = DEPTH_SIGN | 16 => "DEPTH_16S",
        I32 = DEPTH_SIGN | 32 => "DEPTH_32S",
        F32 = 32 => "DEPTH_32F",
        F64 = 64 => "DEPTH_64F",
    }
}

impl Depth {
    /// Bits per sample.
    pub fn bits(self) -> u32 {
        (self.code() & !DEPTH_SIGN) as u32
    }

    pub fn is_float(self) -> bool {
        matches!(self, Depth::F32 | Depth::F64)
    }

    pub fn is_signed(self) -> bool {
        self.is_float() || self.code() & DEPTH_SIGN != 0
    }
}

coded_enum! {
    /// Decode mode for `Image::load`, also used to pick the encoded layout on save.
    LoadMode {
        /// Keep the channel count and depth stored in the file.
        Unchanged = -1 => "LOAD_IMAGE_UNCHANGED",
        /// Single 8-bit channel.
        Grayscale = 0 => "LOAD_IMAGE_GRAYSCALE",
        /// Three 8-bit channels in BGR order.
        Color = 1 => "LOAD_IMAGE_COLOR",
    }
}

impl Default for LoadMode {
    fn default() -> Self {
        LoadMode::Grayscale
    }
}

coded_enum! {
    SmoothType {
        /// Unnormalised box sum.
        BlurNoScale = 0 => "BLUR_NO_SCALE",
        /// Normalised box mean.
        Blur = 1 => "BLUR",
        Gaussian = 2 => "GAUSSIAN",
        Median = 3 => "MEDIAN",
        Bilateral = 4 => "BILATERAL",
    }
}

coded_enum! {
    Interpolation {
        Nearest = 0 => "INTER_NN",
        Linear = 1 => "INTER_LINEAR",
        Cubic = 2 => "INTER_CUBIC",
        Area = 3 => "INTER_AREA",
    }
}

impl Default for Interpolation {
    fn default() -> Self {
        Interpolation::Linear
    }
}

coded_enum! {
    /// Kernel used by `pyr_down` / `pyr_up`.
    PyramidFilter {
        Gaussian5x5 = 7 => "GAUSSIAN_5x5",
    }
}

impl Default for PyramidFilter {
    fn default() -> Self {
        PyramidFilter::Gaussian5x5
    }
}

/// Geometry snapshot of an initialised image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub channels: usize,
    pub alpha_channel: bool,
    pub depth: Depth,
}
