//! Error taxonomy shared by every image operation.
//!
//! `ImageError` separates failures the wrapper detects itself (allocation
//! geometry, missing handle, decode/encode) from rejections raised by the
//! imaging library during a transform (`NativeError`), which are surfaced
//! without reinterpretation.

use crate::types::Depth;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, ImageError>;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("allocation rejected: {0}")]
    Allocation(String),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to decode {}: {detail}", path.display())]
    DecodeUnsupported { path: PathBuf, detail: String },

    #[error("failed to save {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save {}: {detail}", path.display())]
    EncodeUnsupported { path: PathBuf, detail: String },

    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("internal image handle missing: {0}")]
    InternalConsistency(&'static str),

    #[error(transparent)]
    Native(#[from] NativeError),
}

/// Rejections raised by the imaging layer while running a transform.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    #[error("{op}: unsupported depth {depth}")]
    UnsupportedDepth { op: &'static str, depth: Depth },

    #[error("{op}: unsupported number of channels {channels}")]
    UnsupportedChannels { op: &'static str, channels: usize },

    #[error("{op}: invalid aperture size {aperture}")]
    BadAperture { op: &'static str, aperture: u32 },

    #[error("{op}: {detail}")]
    BadArgument { op: &'static str, detail: String },

    #[error("{op}: source and destination differ ({detail})")]
    SizeMismatch { op: &'static str, detail: String },

    #[error("invalid region of interest ({x}, {y}, {width}, {height}) for {image_width}x{image_height} image")]
    BadRoi {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        image_width: u32,
        image_height: u32,
    },
}

impl NativeError {
    pub(crate) fn bad_argument(op: &'static str, detail: impl Into<String>) -> Self {
        NativeError::BadArgument {
            op,
            detail: detail.into(),
        }
    }
}
