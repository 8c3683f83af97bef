use crate::image::Roi;
use crate::ops::Operation;
use crate::types::LoadMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    pub input: PathBuf,
    #[serde(default)]
    pub load_mode: LoadMode,
    /// Applied right after loading, before the first operation.
    #[serde(default)]
    pub roi: Option<Roi>,
    #[serde(default)]
    pub operations: Vec<Operation>,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub image: PathBuf,
    #[serde(default)]
    pub summary_json: Option<PathBuf>,
    /// Layout written to `image`; `LOAD_IMAGE_UNCHANGED` keeps the final
    /// raster's channels.
    #[serde(default = "default_save_mode")]
    pub save_mode: LoadMode,
}

fn default_save_mode() -> LoadMode {
    LoadMode::Unchanged
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let cfg: PipelineConfig =
            serde_json::from_str(r#"{ "input": "a.png", "output": { "image": "b.png" } }"#)
                .unwrap();
        assert_eq!(cfg.load_mode, LoadMode::Grayscale);
        assert!(cfg.roi.is_none());
        assert!(cfg.operations.is_empty());
        assert_eq!(cfg.output.save_mode, LoadMode::Unchanged);
        assert!(cfg.output.summary_json.is_none());
    }

    #[test]
    fn full_config_parses() {
        let cfg: PipelineConfig = serde_json::from_str(
            r#"{
                "input": "in.png",
                "load_mode": "LOAD_IMAGE_COLOR",
                "roi": { "x": 0, "y": 0, "width": 32, "height": 32 },
                "operations": [
                    { "op": "smooth", "kind": "GAUSSIAN", "param1": 5 },
                    { "op": "erode", "iterations": 2 },
                    { "op": "canny", "low": 50, "high": 150, "aperture": 3 },
                    { "op": "resize", "width": 320, "height": 240, "interpolation": "INTER_AREA" },
                    { "op": "reset_roi" }
                ],
                "output": { "image": "out.png", "summary_json": "out.json", "save_mode": "LOAD_IMAGE_UNCHANGED" }
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.load_mode, LoadMode::Color);
        assert_eq!(cfg.roi, Some(Roi::new(0, 0, 32, 32)));
        let names: Vec<_> = cfg.operations.iter().map(Operation::name).collect();
        assert_eq!(names, ["smooth", "erode", "canny", "resize", "reset_roi"]);
        assert_eq!(cfg.output.summary_json, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_config(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(err.starts_with("Failed to read config"));
    }
}
