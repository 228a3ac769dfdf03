use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered view as a plain table, one row per reading.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view readings  (File → Open…)");
        });
        return;
    };

    let columns = view.column_names.clone();
    if columns.is_empty() {
        ui.label("Dataset has no columns.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .columns(Column::auto().resizable(true).at_least(80.0), columns.len())
        .header(20.0, |mut header| {
            for col in &columns {
                header.col(|ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let record = &view.rows[row.index()];
                for col in &columns {
                    row.col(|ui| {
                        let cell = record.get(col.as_str()).unwrap_or(&CellValue::Null);
                        ui.label(cell.to_string());
                    });
                }
            });
        });
}
