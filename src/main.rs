mod app;
mod canvas;
mod color;
mod config;
mod detection;
mod error;
mod export;
mod geometry;

use eframe::egui;

use crate::app::DetectEditApp;
use crate::config::{Launch, USAGE};
use crate::error::AppError;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let launch = match Launch::parse(&args) {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(launch) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(launch: Launch) -> Result<(), AppError> {
    let image = image::open(&launch.image_path).map_err(|source| AppError::Image {
        path: launch.image_path.clone(),
        source,
    })?;
    let detections_path = launch
        .detections_path
        .clone()
        .unwrap_or_else(|| detection::sidecar_path(&launch.image_path));
    let detections = detection::load_detections(&detections_path)?;
    log::info!(
        "loaded {}x{} image with {} detections",
        image.width(),
        image.height(),
        detections.len()
    );

    let title = format!(
        "detect-edit: {}",
        launch
            .image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    let app = DetectEditApp::new(
        launch.image_path,
        detections_path,
        image,
        detections,
        launch.options,
    );
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )?;
    Ok(())
}
