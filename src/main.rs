use cv_image::config::load_config;
use cv_image::diagnostics::RunSummary;
use cv_image::image::io::write_json_file;
use cv_image::ops::run_operations;
use cv_image::Image;
use log::info;
use std::env;
use std::path::Path;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let mut image = Image::load(&config.input, config.load_mode).map_err(|e| e.to_string())?;
    if let Some(roi) = config.roi {
        image
            .set_roi(roi.x, roi.y, roi.width, roi.height)
            .map_err(|e| e.to_string())?;
    }
    let input_info = image.info().map_err(|e| e.to_string())?;
    info!(
        "Loaded {} ({}x{}, {} channels, {})",
        config.input.display(),
        input_info.width,
        input_info.height,
        input_info.channels,
        input_info.depth
    );

    let (image, timing) = run_operations(image, &config.operations).map_err(|e| e.to_string())?;
    let output_info = image.info().map_err(|e| e.to_string())?;
    image
        .save(&config.output.image, config.output.save_mode)
        .map_err(|e| e.to_string())?;
    println!(
        "Saved {}x{} result of {} operations to {} ({:.3} ms)",
        output_info.width,
        output_info.height,
        config.operations.len(),
        config.output.image.display(),
        timing.total_ms
    );

    if let Some(summary_path) = &config.output.summary_json {
        let summary = RunSummary {
            input_path: config.input.clone(),
            output_path: config.output.image.clone(),
            input: input_info,
            output: output_info,
            operations: config.operations.iter().map(|op| op.name()).collect(),
            timing,
        };
        write_json_file(summary_path, &summary)?;
        println!("Saved run summary to {}", summary_path.display());
    }

    Ok(())
}

fn usage() -> String {
    "Usage: cv-image <pipeline.json>".to_string()
}
