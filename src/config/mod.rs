//! JSON configuration for the `cv-image` binary.

pub mod pipeline;

pub use pipeline::{load_config, OutputConfig, PipelineConfig};
