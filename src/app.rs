use eframe::egui;

use crate::color::PlotColors;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PipelineRiskApp {
    pub state: AppState,
    colors: PlotColors,
}

impl PipelineRiskApp {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            colors: PlotColors::default(),
        }
    }
}

impl eframe::App for PipelineRiskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep repainting while the training thread is producing epochs.
        if self.state.poll_training() {
            ctx.request_repaint();
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: data, training, prediction ----
        egui::SidePanel::left("control_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: charts and sample rows ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::training_plot(ui, &self.state, &self.colors);
            ui.separator();
            plot::feature_preview(ui, &self.state, &self.colors);
            if self.state.show_sample {
                ui.separator();
                table::sample_table(ui, &self.state);
            }
        });
    }
}
