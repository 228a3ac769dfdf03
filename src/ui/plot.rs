use chrono::DateTime;
use eframe::egui::Ui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::data::model::CellValue;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Temperature-over-time plot (central panel)
// ---------------------------------------------------------------------------

/// Render the time-series chart: one line per temperature column of the
/// filtered view, x axis in sample time.
pub fn temperature_plot(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view readings  (File → Open…)");
        });
        return;
    };
    let Some(time_column) = state.params.time_column.clone() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("No timestamp column in this dataset.");
        });
        return;
    };

    let series = state.plot_columns();

    Plot::new("temperature_plot")
        .legend(Legend::default())
        .x_axis_label("Time")
        .y_axis_label("Temperature")
        .x_axis_formatter(|mark, _range| format_time(mark.value))
        .label_formatter(|name, point| {
            if name.is_empty() {
                format_time(point.x)
            } else {
                format!("{name}\n{}\n{:.2}", format_time(point.x), point.y)
            }
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for col in &series {
                let points: PlotPoints = view
                    .rows
                    .iter()
                    .filter_map(|row| {
                        let t = row.get(&time_column).and_then(CellValue::as_timestamp)?;
                        let v = row.get(col.as_str()).and_then(CellValue::as_f64)?;
                        Some([t.and_utc().timestamp() as f64, v])
                    })
                    .collect();

                let line = Line::new(points)
                    .name(col)
                    .color(state.series_colors.color_for(col))
                    .width(1.5);

                plot_ui.line(line);
            }
        });
}

fn format_time(secs: f64) -> String {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|dt| dt.naive_utc().format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
