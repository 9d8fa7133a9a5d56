use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

/// Rows shown in the sample table.
const SAMPLE_ROWS: usize = 8;

/// First rows of the loaded table, all columns.
pub fn sample_table(ui: &mut Ui, state: &AppState) {
    let Some(table) = state.session.table() else {
        ui.label("No CSV parsed yet. Use Example CSV or open a CSV file.");
        return;
    };
    if table.is_empty() {
        ui.label("No rows parsed yet.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().at_least(70.0).resizable(true), table.headers.len())
        .header(20.0, |mut header| {
            for name in &table.headers {
                header.col(|ui| {
                    ui.strong(name.as_str());
                });
            }
        })
        .body(|mut body| {
            for row in table.rows.iter().take(SAMPLE_ROWS) {
                body.row(18.0, |mut cells| {
                    for name in &table.headers {
                        cells.col(|ui| {
                            ui.label(row.get(name).map(String::as_str).unwrap_or(""));
                        });
                    }
                });
            }
        });
}
