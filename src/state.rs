use chrono::NaiveDateTime;

use crate::color::SeriesColors;
use crate::data::model::{CellValue, Dataset};
use crate::data::pipeline::{self, FilterParams};
use crate::data::source::DataSource;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Widgets mutate [`FilterParams`] through the setters below; each setter is
/// one "parameters changed" event and re-runs the pipeline exactly once. The
/// pipeline itself never knows it is driven by a UI.
pub struct AppState {
    /// Loaded dataset, sorted by the time column (None until a source is
    /// fetched).
    pub dataset: Option<Dataset>,

    /// Current filter selections.
    pub params: FilterParams,

    /// Pipeline output for the current parameters (cached).
    pub view: Option<Dataset>,

    /// `[min, max]` of the time column; selection widgets clamp to this.
    pub time_domain: Option<(NaiveDateTime, NaiveDateTime)>,

    /// Colour per plotted series.
    pub series_colors: SeriesColors,

    /// Central panel mode: chart or table.
    pub show_table: bool,

    /// Where the dataset came from (for the status line).
    pub source_label: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a fetch is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            params: FilterParams::default(),
            view: None,
            time_domain: None,
            series_colors: SeriesColors::default(),
            show_table: false,
            source_label: None,
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Fetch a dataset from the given source and ingest it.
    pub fn load_from(&mut self, source: &dyn DataSource) {
        self.loading = true;
        match source.fetch() {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {}",
                    dataset.len(),
                    dataset.column_names,
                    source.describe()
                );
                self.source_label = Some(source.describe());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded dataset: pick default columns, sort by time,
    /// and initialise the filter parameters.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        let time_column = pick_column(&dataset.timestamp_columns(), "sample_time");
        let zone_column = pick_zone_column(&dataset);

        let dataset = match &time_column {
            Some(col) => dataset.sorted_by(col),
            None => dataset,
        };

        let outlier_columns: Vec<String> = dataset
            .numeric_columns()
            .into_iter()
            .filter(|c| Some(c) != zone_column.as_ref())
            .collect();
        self.series_colors = SeriesColors::new(&outlier_columns);

        self.time_domain = time_column
            .as_ref()
            .and_then(|col| dataset.time_domain(col));

        self.params = FilterParams {
            zone_column,
            zone: None,
            remove_outliers: true,
            outlier_columns,
            time_column,
            time_range: self.time_domain,
        };

        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refilter();
    }

    /// Numeric columns drawn in the chart (everything numeric except the
    /// zone id).
    pub fn plot_columns(&self) -> Vec<String> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        ds.numeric_columns()
            .into_iter()
            .filter(|c| Some(c) != self.params.zone_column.as_ref())
            .collect()
    }

    /// Re-run the pipeline for the current parameters.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.view = None;
            return;
        };
        match pipeline::apply(ds, &self.params) {
            Ok(view) => {
                self.view = Some(view);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Filter pipeline failed: {e}");
                self.view = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Select a zone value (`None` = all zones).
    pub fn set_zone(&mut self, zone: Option<CellValue>) {
        self.params.zone = zone;
        self.refilter();
    }

    /// Switch the categorical grouping column.
    pub fn set_zone_column(&mut self, column: Option<String>) {
        self.params.zone = None;
        self.params
            .outlier_columns
            .retain(|c| Some(c) != column.as_ref());
        self.params.zone_column = column;
        self.refilter();
    }

    /// Toggle outlier removal as a whole.
    pub fn set_remove_outliers(&mut self, on: bool) {
        self.params.remove_outliers = on;
        self.refilter();
    }

    /// Toggle one column in or out of the outlier pass, keeping the
    /// application order stable.
    pub fn toggle_outlier_column(&mut self, column: &str) {
        if let Some(pos) = self.params.outlier_columns.iter().position(|c| c == column) {
            self.params.outlier_columns.remove(pos);
        } else {
            self.params.outlier_columns.push(column.to_string());
        }
        self.refilter();
    }

    /// Set the inclusive time window, clamped to the loaded domain.
    pub fn set_time_range(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        let Some((lo, hi)) = self.time_domain else {
            return;
        };
        self.params.time_range = Some((start.clamp(lo, hi), end.clamp(lo, hi)));
        self.refilter();
    }
}

/// Prefer the conventional column name, else take the first candidate.
fn pick_column(candidates: &[String], preferred: &str) -> Option<String> {
    if candidates.iter().any(|c| c == preferred) {
        return Some(preferred.to_string());
    }
    candidates.first().cloned()
}

/// Default grouping column: `zoneid` when present, else the first
/// non-timestamp column with a handful of distinct values.
fn pick_zone_column(dataset: &Dataset) -> Option<String> {
    if dataset.has_column("zoneid") {
        return Some("zoneid".to_string());
    }
    let timestamps = dataset.timestamp_columns();
    dataset
        .column_names
        .iter()
        .find(|c| {
            !timestamps.contains(c)
                && dataset
                    .distinct_values(c)
                    .is_some_and(|vals| !vals.is_empty() && vals.len() <= 16)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;
    use chrono::NaiveDate;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn reading(zone: i64, day: u32, hour: u32, ext: f64) -> Row {
        [
            ("zoneid".to_string(), CellValue::Integer(zone)),
            ("sample_time".to_string(), CellValue::Timestamp(ts(day, hour))),
            ("ext_temp".to_string(), CellValue::Float(ext)),
        ]
        .into_iter()
        .collect()
    }

    fn ingest() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Dataset::from_rows(vec![
            reading(2, 3, 0, 21.0),
            reading(1, 1, 0, 20.0),
            reading(1, 2, 0, 19.5),
        ]));
        state
    }

    #[test]
    fn ingest_picks_defaults_and_sorts_by_time() {
        let state = ingest();
        assert_eq!(state.params.zone_column.as_deref(), Some("zoneid"));
        assert_eq!(state.params.time_column.as_deref(), Some("sample_time"));
        assert_eq!(state.params.outlier_columns, vec!["ext_temp".to_string()]);
        assert!(state.params.remove_outliers);
        assert_eq!(state.time_domain, Some((ts(1, 0), ts(3, 0))));
        assert_eq!(state.params.time_range, state.time_domain);

        let times: Vec<NaiveDateTime> = state
            .dataset
            .as_ref()
            .unwrap()
            .rows
            .iter()
            .filter_map(|r| r.get("sample_time").and_then(CellValue::as_timestamp))
            .collect();
        assert_eq!(times, vec![ts(1, 0), ts(2, 0), ts(3, 0)]);
    }

    #[test]
    fn zone_selection_refilters_the_view() {
        let mut state = ingest();
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
        state.set_zone(Some(CellValue::Integer(1)));
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
        state.set_zone(None);
        assert_eq!(state.view.as_ref().unwrap().len(), 3);
    }

    #[test]
    fn time_range_selection_is_clamped_to_the_domain() {
        let mut state = ingest();
        state.set_time_range(ts(1, 0) - chrono::Duration::days(30), ts(2, 0));
        assert_eq!(state.params.time_range, Some((ts(1, 0), ts(2, 0))));
        assert_eq!(state.view.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn bad_parameters_surface_as_a_status_message() {
        let mut state = ingest();
        state.params.outlier_columns = vec!["humidity".to_string()];
        state.refilter();
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap_or("").contains("humidity"));
    }

    #[test]
    fn outlier_column_toggle_preserves_order() {
        let mut state = ingest();
        state.toggle_outlier_column("ext_temp");
        assert!(state.params.outlier_columns.is_empty());
        state.toggle_outlier_column("ext_temp");
        assert_eq!(state.params.outlier_columns, vec!["ext_temp".to_string()]);
    }
}
