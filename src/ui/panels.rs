use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::{AppState, Status};

// ---------------------------------------------------------------------------
// Left side panel – data summary, training, prediction
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            data_section(ui, state);
            ui.separator();
            training_section(ui, state);
            ui.separator();
            predict_section(ui, state);
            ui.separator();
            log_section(ui, state);
        });
}

fn data_section(ui: &mut Ui, state: &AppState) {
    ui.heading("Data");

    let Some(table) = state.session.table() else {
        ui.label("No CSV loaded. Use File → Open CSV… or Example CSV.");
        return;
    };

    ui.label(format!("Columns: {}", table.headers.join(", ")));
    ui.label(format!("Rows: {}", table.len()));

    egui::CollapsingHeader::new(RichText::new("Feature stats").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for (name, summary) in &state.table_stats {
                ui.label(format!("{name}: {summary}"));
            }
        });

    if let Some(prepared) = state.session.prepared() {
        ui.label(format!(
            "Prepared: {} rows × {} features",
            prepared.len(),
            prepared.feature_names.len()
        ));
    }
}

fn training_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Training");

    egui::Grid::new("hyperparameters")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Epochs");
            ui.add(egui::DragValue::new(&mut state.training.epochs).range(1..=10_000));
            ui.end_row();

            ui.label("Batch size");
            ui.add(egui::DragValue::new(&mut state.training.batch_size).range(1..=4096));
            ui.end_row();

            ui.label("Learning rate");
            ui.add(
                egui::DragValue::new(&mut state.training.learning_rate)
                    .range(0.00001..=1.0)
                    .speed(0.0005)
                    .max_decimals(5),
            );
            ui.end_row();
        });

    let can_train = state.session.prepared().is_some() && !state.is_training();
    let label = if state.is_training() { "Training…" } else { "Train" };
    if ui.add_enabled(can_train, egui::Button::new(label)).clicked() {
        state.start_training();
    }

    if let Some(last) = state.history.last() {
        ui.label(format!(
            "Epoch {} - loss: {:.4} acc: {:.3}",
            last.epoch + 1,
            last.loss,
            last.accuracy
        ));
    }
}

fn predict_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Predict");

    let Some(prepared) = state.session.prepared().cloned() else {
        ui.label("Prepare a dataset to enter feature values.");
        return;
    };

    egui::Grid::new("predict_inputs")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            for (i, name) in prepared.feature_names.iter().enumerate() {
                let Some(value) = state.predict_inputs.get_mut(i) else {
                    continue;
                };
                let hint = prepared
                    .stats
                    .get(i)
                    .and_then(|s| s.range_hint())
                    .unwrap_or_default();
                ui.label(name.as_str());
                ui.add(egui::TextEdit::singleline(value).hint_text(hint).desired_width(120.0));
                ui.end_row();
            }
        });

    let can_predict = state.session.has_model() && !state.is_training();
    if ui.add_enabled(can_predict, egui::Button::new("Predict")).clicked() {
        state.predict();
    }

    if let Some(p) = state.predict_result {
        ui.label(RichText::new(format!("Failure probability: {:.2}%", p * 100.0)).strong());
    }
}

fn log_section(ui: &mut Ui, state: &AppState) {
    egui::CollapsingHeader::new(RichText::new("Log").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .id_salt("log_scroll")
                .max_height(160.0)
                .stick_to_bottom(true)
                .show(ui, |ui: &mut Ui| {
                    for line in &state.log {
                        ui.monospace(line.as_str());
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Example CSV").clicked() {
                state.load_example();
                ui.close_menu();
            }
        });

        ui.separator();

        let can_prepare = state.has_table() && !state.is_training();
        if ui.add_enabled(can_prepare, egui::Button::new("Prepare")).clicked() {
            state.prepare();
        }

        ui.separator();

        let idle = !state.is_training();
        if ui
            .add_enabled(idle && state.session.has_model(), egui::Button::new("Save model"))
            .clicked()
        {
            state.save_model();
        }
        if ui.add_enabled(idle, egui::Button::new("Load model")).clicked() {
            state.load_model();
        }
        if ui
            .add_enabled(idle && state.session.has_model(), egui::Button::new("Reset model"))
            .clicked()
        {
            state.reset_model();
        }

        ui.separator();
        ui.checkbox(&mut state.show_sample, "Show sample");
        ui.separator();

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg.as_str());
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sensor data")
        .add_filter("CSV", &["csv", "txt"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(&path);
    }
}
