use chrono::NaiveDateTime;

use super::filter::{filter_by_category, filter_by_time_range, remove_outliers_iqr, FilterError};
use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Filter parameters
// ---------------------------------------------------------------------------

/// Everything the user has selected in the dashboard controls. Widgets only
/// mutate this struct; [`apply`] is invoked once per "parameters changed"
/// event and never as a side effect of rendering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    /// Categorical grouping column (e.g. `zoneid`).
    pub zone_column: Option<String>,
    /// Selected value in `zone_column`; `None` shows every zone.
    pub zone: Option<CellValue>,

    /// Whether outlier removal runs at all.
    pub remove_outliers: bool,
    /// Columns fed to the IQR rule, in application order.
    pub outlier_columns: Vec<String>,

    /// Timestamp column the time window applies to.
    pub time_column: Option<String>,
    /// Inclusive `[start, end]` window; `None` shows the full span. The
    /// selection widgets keep this inside the column's actual domain.
    pub time_range: Option<(NaiveDateTime, NaiveDateTime)>,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full filter pipeline: zone selection, then outlier removal, then
/// the time window. Pure: the input dataset is untouched and the same
/// parameters always produce the same result.
///
/// Outlier quartiles are computed after zone selection, so bounds reflect
/// the selected zone only.
pub fn apply(dataset: &Dataset, params: &FilterParams) -> Result<Dataset, FilterError> {
    let mut view = match (&params.zone_column, &params.zone) {
        (Some(col), Some(value)) => filter_by_category(dataset, col, value)?,
        _ => dataset.clone(),
    };

    if params.remove_outliers && !params.outlier_columns.is_empty() {
        view = remove_outliers_iqr(&view, &params.outlier_columns)?;
    }

    if let (Some(col), Some((start, end))) = (&params.time_column, params.time_range) {
        view = filter_by_time_range(&view, col, start, end)?;
    }

    Ok(view)
}
