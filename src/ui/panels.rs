use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::data::model::CellValue;
use crate::data::source::FileSource;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter controls
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the widgets.
    let columns = dataset.column_names.clone();
    let timestamp_columns = dataset.timestamp_columns();
    let zone_column = state.params.zone_column.clone();
    let zone_values: Vec<CellValue> = zone_column
        .as_ref()
        .and_then(|col| dataset.distinct_values(col))
        .map(|vals| vals.iter().cloned().collect())
        .unwrap_or_default();
    let plot_columns = state.plot_columns();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Zone selection ----
            ui.strong("Zone");
            egui::ComboBox::from_id_salt("zone_column")
                .selected_text(zone_column.clone().unwrap_or_else(|| "(none)".into()))
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if timestamp_columns.contains(col) {
                            continue;
                        }
                        if ui
                            .selectable_label(zone_column.as_deref() == Some(col), col)
                            .clicked()
                        {
                            state.set_zone_column(Some(col.clone()));
                        }
                    }
                });

            let selected_zone = state.params.zone.clone();
            let zone_text = selected_zone
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_else(|| "All zones".into());
            egui::ComboBox::from_id_salt("zone_value")
                .selected_text(zone_text)
                .show_ui(ui, |ui: &mut Ui| {
                    if ui
                        .selectable_label(selected_zone.is_none(), "All zones")
                        .clicked()
                    {
                        state.set_zone(None);
                    }
                    for val in &zone_values {
                        if ui
                            .selectable_label(selected_zone.as_ref() == Some(val), val.to_string())
                            .clicked()
                        {
                            state.set_zone(Some(val.clone()));
                        }
                    }
                });
            ui.separator();

            // ---- Outlier removal ----
            let mut remove = state.params.remove_outliers;
            if ui.checkbox(&mut remove, "Remove outliers").changed() {
                state.set_remove_outliers(remove);
            }
            for col in &plot_columns {
                let mut checked = state.params.outlier_columns.iter().any(|c| c == col);
                if ui
                    .add_enabled(remove, egui::Checkbox::new(&mut checked, col))
                    .changed()
                {
                    state.toggle_outlier_column(col);
                }
            }
            ui.separator();

            // ---- Time window ----
            time_range_section(ui, state);
        });
}

/// Start/end sliders over the loaded time domain, shown as local datetimes.
fn time_range_section(ui: &mut Ui, state: &mut AppState) {
    let Some((domain_start, domain_end)) = state.time_domain else {
        return;
    };
    ui.strong("Time range");

    let lo = to_secs(domain_start);
    let hi = to_secs(domain_end);
    let (cur_start, cur_end) = state
        .params
        .time_range
        .unwrap_or((domain_start, domain_end));
    let mut start_s = to_secs(cur_start);
    let mut end_s = to_secs(cur_end);

    let mut changed = false;
    changed |= ui
        .add(
            Slider::new(&mut start_s, lo..=hi)
                .custom_formatter(|v, _| format_secs(v as i64))
                .text("from"),
        )
        .changed();
    changed |= ui
        .add(
            Slider::new(&mut end_s, lo..=hi)
                .custom_formatter(|v, _| format_secs(v as i64))
                .text("to"),
        )
        .changed();

    if changed {
        if let (Some(start), Some(end)) = (from_secs(start_s), from_secs(end_s)) {
            state.set_time_range(start, end);
        }
    }
}

fn to_secs(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp()
}

fn from_secs(s: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(s, 0).map(|dt| dt.naive_utc())
}

fn format_secs(s: i64) -> String {
    from_secs(s)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let shown = state.view.as_ref().map(|v| v.len()).unwrap_or(0);
            let label = match &state.source_label {
                Some(src) => format!("{src}: {} rows loaded, {shown} shown", ds.len()),
                None => format!("{} rows loaded, {shown} shown", ds.len()),
            };
            ui.label(label);
        }

        ui.separator();

        if ui.selectable_label(!state.show_table, "Chart").clicked() {
            state.show_table = false;
        }
        if ui.selectable_label(state.show_table, "Table").clicked() {
            state.show_table = true;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open temperature readings")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        let source = FileSource::new(path);
        state.load_from(&source);
    }
}
