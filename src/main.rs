mod app;
mod color;
mod state;
mod ui;

use app::PipelineRiskApp;
use eframe::egui;
use pipeline_risk::AppConfig;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AppConfig::from_env().unwrap_or_else(|e| {
        log::error!("Ignoring config: {e:#}");
        AppConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    log::info!("App ready. Use Example CSV to test quickly.");
    eframe::run_native(
        "Pipeline Risk – Failure Classifier",
        options,
        Box::new(|_cc| Ok(Box::new(PipelineRiskApp::new(AppState::new(config))))),
    )
}
