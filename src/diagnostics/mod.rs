//! Run report written by the `cv-image` binary next to its output image.

pub mod timing;

use crate::types::ImageInfo;
use serde::Serialize;
use std::path::PathBuf;

pub use timing::{StageTiming, TimingBreakdown};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub input: ImageInfo,
    pub output: ImageInfo,
    pub operations: Vec<&'static str>,
    pub timing: TimingBreakdown,
}
