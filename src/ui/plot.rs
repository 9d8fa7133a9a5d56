use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::PlotColors;
use crate::state::AppState;

/// Raw values shown in the feature preview.
const PREVIEW_ROWS: usize = 30;

// ---------------------------------------------------------------------------
// Training curves (central panel)
// ---------------------------------------------------------------------------

/// Loss and accuracy per epoch, x axis 1-based.
pub fn training_plot(ui: &mut Ui, state: &AppState, colors: &PlotColors) {
    let loss: PlotPoints = state
        .history
        .iter()
        .map(|r| [(r.epoch + 1) as f64, r.loss])
        .collect();
    let accuracy: PlotPoints = state
        .history
        .iter()
        .map(|r| [(r.epoch + 1) as f64, r.accuracy])
        .collect();

    Plot::new("training_plot")
        .legend(Legend::default())
        .x_axis_label("Epoch")
        .height(260.0)
        .include_y(0.0)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(loss).name("Loss").color(colors.loss).width(2.0));
            plot_ui.line(
                Line::new(accuracy)
                    .name("Accuracy")
                    .color(colors.accuracy)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Feature preview
// ---------------------------------------------------------------------------

/// Bar chart of the first raw values of the first feature.
pub fn feature_preview(ui: &mut Ui, state: &AppState, colors: &PlotColors) {
    let Some(prepared) = state.session.prepared() else {
        ui.label("Prepare a dataset to preview features.");
        return;
    };
    let Some(name) = prepared.feature_names.first() else {
        ui.label("Dataset has no feature columns.");
        return;
    };

    let bars: Vec<Bar> = prepared
        .raw
        .x
        .column(0)
        .iter()
        .take(PREVIEW_ROWS)
        .enumerate()
        .map(|(i, &v)| Bar::new((i + 1) as f64, v).width(0.8))
        .collect();

    Plot::new("feature_preview")
        .legend(Legend::default())
        .x_axis_label("Row")
        .height(180.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(name).color(colors.feature));
        });
}
