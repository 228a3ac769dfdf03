use chrono::NaiveDateTime;
use thiserror::Error;

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by the filtering operations. Degenerate inputs (empty
/// dataset, selection outside the data's domain) are not errors and yield
/// empty datasets instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("column '{0}' does not exist in the dataset")]
    UnknownColumn(String),
    #[error("column '{0}' contains no numeric values")]
    NonNumericColumn(String),
}

// ---------------------------------------------------------------------------
// Quantiles
// ---------------------------------------------------------------------------

/// Quantile with linear interpolation at `q * (n - 1)` over the sorted
/// values, matching the warehouse tooling this data comes from. Non-finite
/// values are ignored. `None` when no finite value remains.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }
    let pos = q * (sorted.len() as f64 - 1.0);
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;
    let a = sorted[idx];
    let b = sorted[(idx + 1).min(sorted.len() - 1)];
    Some(a + (b - a) * frac)
}

// ---------------------------------------------------------------------------
// Outlier removal (IQR rule)
// ---------------------------------------------------------------------------

/// Remove rows carrying a statistical outlier in any of the given columns.
///
/// Columns are processed in the order given, and each column's quartiles are
/// computed on the rows that survived the previous columns. The outcome
/// therefore depends on the order of `columns`; callers that need a fixed
/// result must fix the order.
///
/// Per column: Q1/Q3 over the column's non-missing values, and only rows
/// whose value lies within `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]` (inclusive)
/// survive. A row with a missing or non-numeric value in the column is
/// dropped by that column's step. A column with no numeric values at all is
/// rejected as [`FilterError::NonNumericColumn`].
///
/// Surviving rows keep their relative order, and the output's column set is
/// the input's.
pub fn remove_outliers_iqr(dataset: &Dataset, columns: &[String]) -> Result<Dataset, FilterError> {
    if dataset.is_empty() {
        return Ok(dataset.with_rows(Vec::new()));
    }
    for col in columns {
        if !dataset.has_column(col) {
            return Err(FilterError::UnknownColumn(col.clone()));
        }
    }

    let mut rows = dataset.rows.clone();
    for col in columns {
        if rows.is_empty() {
            break;
        }
        let values: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.get(col.as_str()).and_then(CellValue::as_f64))
            .collect();
        let (Some(q1), Some(q3)) = (quantile(&values, 0.25), quantile(&values, 0.75)) else {
            return Err(FilterError::NonNumericColumn(col.clone()));
        };
        let iqr = q3 - q1;
        let lower = q1 - 1.5 * iqr;
        let upper = q3 + 1.5 * iqr;
        rows.retain(|r| {
            r.get(col.as_str())
                .and_then(CellValue::as_f64)
                .is_some_and(|v| v >= lower && v <= upper)
        });
    }
    Ok(dataset.with_rows(rows))
}

// ---------------------------------------------------------------------------
// Range filters
// ---------------------------------------------------------------------------

/// Retain rows whose value in `column` equals `value` exactly.
///
/// A value outside the column's distinct set is not an error; the result is
/// simply empty. Stable: surviving rows keep their relative order.
pub fn filter_by_category(
    dataset: &Dataset,
    column: &str,
    value: &CellValue,
) -> Result<Dataset, FilterError> {
    if dataset.is_empty() {
        return Ok(dataset.with_rows(Vec::new()));
    }
    if !dataset.has_column(column) {
        return Err(FilterError::UnknownColumn(column.to_string()));
    }
    let rows = dataset
        .rows
        .iter()
        .filter(|r| r.get(column) == Some(value))
        .cloned()
        .collect();
    Ok(dataset.with_rows(rows))
}

/// Retain rows whose timestamp in `column` lies within `[start, end]`
/// (inclusive on both ends).
///
/// Rows missing a timestamp in the column are dropped. `start > end` is not
/// an error; the result is empty. Stable: surviving rows keep their relative
/// order, so a caller that wants a time-ordered result sorts beforehand.
pub fn filter_by_time_range(
    dataset: &Dataset,
    column: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<Dataset, FilterError> {
    if dataset.is_empty() {
        return Ok(dataset.with_rows(Vec::new()));
    }
    if !dataset.has_column(column) {
        return Err(FilterError::UnknownColumn(column.to_string()));
    }
    let rows = dataset
        .rows
        .iter()
        .filter(|r| {
            r.get(column)
                .and_then(CellValue::as_timestamp)
                .is_some_and(|t| start <= t && t <= end)
        })
        .cloned()
        .collect();
    Ok(dataset.with_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Row;
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn row(pairs: &[(&str, CellValue)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Dataset with a single numeric column plus a row id.
    fn numeric_dataset(column: &str, values: &[f64]) -> Dataset {
        Dataset::from_rows(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    row(&[
                        ("id", CellValue::Integer(i as i64)),
                        (column, CellValue::Float(v)),
                    ])
                })
                .collect(),
        )
    }

    fn ids(ds: &Dataset) -> Vec<i64> {
        ds.rows
            .iter()
            .map(|r| match r.get("id") {
                Some(CellValue::Integer(i)) => *i,
                other => panic!("bad id cell: {other:?}"),
            })
            .collect()
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(quantile(&v, 0.0), Some(1.0));
        assert_eq!(quantile(&v, 0.25), Some(1.75));
        assert_eq!(quantile(&v, 0.5), Some(2.5));
        assert_eq!(quantile(&v, 1.0), Some(4.0));
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[7.0], 0.25), Some(7.0));
        assert_eq!(quantile(&[1.0, f64::NAN, 3.0], 0.5), Some(2.0));
    }

    #[test]
    fn removes_single_extreme_reading() {
        // Eleven plausible outdoor temperatures and one sensor spike.
        let mut values: Vec<f64> = (15..=25).map(|v| v as f64).collect();
        values.push(500.0);
        let ds = numeric_dataset("ext_temp", &values);

        let out = remove_outliers_iqr(&ds, &["ext_temp".to_string()]).unwrap();
        assert_eq!(out.len(), 11);
        assert_eq!(ids(&out), (0..11).collect::<Vec<i64>>());
    }

    #[test]
    fn output_is_an_ordered_subset_of_input() {
        let ds = numeric_dataset("ext_temp", &[20.0, -40.0, 21.0, 19.0, 90.0, 22.0, 18.0, 21.5]);
        let out = remove_outliers_iqr(&ds, &["ext_temp".to_string()]).unwrap();
        let surviving = ids(&out);
        let mut sorted = surviving.clone();
        sorted.sort();
        assert_eq!(surviving, sorted);
        assert!(surviving.iter().all(|i| (0..8).contains(i)));
    }

    #[test]
    fn single_column_pass_is_idempotent() {
        let mut values: Vec<f64> = (15..=25).map(|v| v as f64).collect();
        values.push(500.0);
        let ds = numeric_dataset("ext_temp", &values);
        let cols = ["ext_temp".to_string()];

        let once = remove_outliers_iqr(&ds, &cols).unwrap();
        let twice = remove_outliers_iqr(&once, &cols).unwrap();
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn repeated_multi_column_pass_can_differ_from_one_pass() {
        // Repetition is not an identity for multi-column runs: the second
        // pass computes tighter quartiles on the already-filtered rows and
        // may remove more. Row 6 survives the a-step and holds its
        // quartiles wide, but the b-step drops it; on the second pass row
        // 5's `a` value falls outside the recomputed bounds.
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 8.6, 9.0, 100.0];
        let b = [11.0, 12.0, 13.0, 14.0, 15.0, 10.0, 28.0, 40.0];
        let ds = Dataset::from_rows(
            (0..8)
                .map(|i| {
                    row(&[
                        ("id", CellValue::Integer(i as i64)),
                        ("a", CellValue::Float(a[i])),
                        ("b", CellValue::Float(b[i])),
                    ])
                })
                .collect(),
        );
        let cols = ["a".to_string(), "b".to_string()];

        let once = remove_outliers_iqr(&ds, &cols).unwrap();
        let twice = remove_outliers_iqr(&once, &cols).unwrap();
        assert_eq!(ids(&once), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(ids(&twice), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn column_order_changes_the_result() {
        // Row 7 is extreme in `a`; row 6 has a `b` value that only reads as
        // an outlier once row 7 is gone. Filtering a-then-b drops both,
        // b-then-a drops only row 7.
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 100.0];
        let b = [10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 28.0, 40.0];
        let ds = Dataset::from_rows(
            (0..8)
                .map(|i| {
                    row(&[
                        ("id", CellValue::Integer(i as i64)),
                        ("a", CellValue::Float(a[i])),
                        ("b", CellValue::Float(b[i])),
                    ])
                })
                .collect(),
        );

        let ab = remove_outliers_iqr(&ds, &["a".to_string(), "b".to_string()]).unwrap();
        let ba = remove_outliers_iqr(&ds, &["b".to_string(), "a".to_string()]).unwrap();
        assert_eq!(ids(&ab), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(ids(&ba), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn constant_column_keeps_only_that_value() {
        let ds = numeric_dataset("target_temp", &[21.0, 21.0, 21.0, 21.0, 22.5]);
        let out = remove_outliers_iqr(&ds, &["target_temp".to_string()]).unwrap();
        // Q1 == Q3 == 21, bounds collapse to [21, 21].
        assert_eq!(ids(&out), vec![0, 1, 2, 3]);
    }

    #[test]
    fn empty_inputs_pass_through() {
        let ds = numeric_dataset("ext_temp", &[20.0, 21.0]);
        let unchanged = remove_outliers_iqr(&ds, &[]).unwrap();
        assert_eq!(unchanged.len(), 2);

        let empty = Dataset::from_rows(Vec::new());
        let out = remove_outliers_iqr(&empty, &["ext_temp".to_string()]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn missing_values_are_excluded_from_quartiles_and_dropped() {
        let mut rows: Vec<Row> = (15..=25)
            .map(|v| {
                row(&[
                    ("id", CellValue::Integer(v - 15)),
                    ("ext_temp", CellValue::Float(v as f64)),
                ])
            })
            .collect();
        rows.push(row(&[
            ("id", CellValue::Integer(11)),
            ("ext_temp", CellValue::Float(500.0)),
        ]));
        rows.push(row(&[
            ("id", CellValue::Integer(12)),
            ("ext_temp", CellValue::Null),
        ]));
        let ds = Dataset::from_rows(rows);

        let out = remove_outliers_iqr(&ds, &["ext_temp".to_string()]).unwrap();
        // Quartiles match the null-free case, and the null row is gone too.
        assert_eq!(ids(&out), (0..11).collect::<Vec<i64>>());
    }

    #[test]
    fn stray_non_numeric_cells_count_as_missing() {
        let mut rows: Vec<Row> = (0..6)
            .map(|i| {
                row(&[
                    ("id", CellValue::Integer(i)),
                    ("indoor_temp", CellValue::Float(20.0 + i as f64)),
                ])
            })
            .collect();
        rows.push(row(&[
            ("id", CellValue::Integer(6)),
            ("indoor_temp", CellValue::String("sensor fault".into())),
        ]));
        let ds = Dataset::from_rows(rows);

        let out = remove_outliers_iqr(&ds, &["indoor_temp".to_string()]).unwrap();
        assert_eq!(ids(&out), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn fully_non_numeric_column_is_rejected() {
        let ds = Dataset::from_rows(vec![
            row(&[("note", CellValue::String("ok".into()))]),
            row(&[("note", CellValue::String("hot".into()))]),
        ]);
        assert_eq!(
            remove_outliers_iqr(&ds, &["note".to_string()]),
            Err(FilterError::NonNumericColumn("note".to_string()))
        );
    }

    #[test]
    fn unknown_column_is_rejected() {
        let ds = numeric_dataset("ext_temp", &[20.0, 21.0]);
        assert_eq!(
            remove_outliers_iqr(&ds, &["humidity".to_string()]),
            Err(FilterError::UnknownColumn("humidity".to_string()))
        );
        assert_eq!(
            filter_by_category(&ds, "building", &CellValue::Integer(1)),
            Err(FilterError::UnknownColumn("building".to_string()))
        );
        assert_eq!(
            filter_by_time_range(&ds, "sample_time", ts(1), ts(2)),
            Err(FilterError::UnknownColumn("sample_time".to_string()))
        );
    }

    #[test]
    fn category_filter_keeps_exactly_the_selected_zone() {
        let ds = Dataset::from_rows(
            [1, 2, 3, 2, 1, 2]
                .iter()
                .enumerate()
                .map(|(i, &z)| {
                    row(&[
                        ("id", CellValue::Integer(i as i64)),
                        ("zoneid", CellValue::Integer(z)),
                    ])
                })
                .collect(),
        );
        let out = filter_by_category(&ds, "zoneid", &CellValue::Integer(2)).unwrap();
        assert_eq!(ids(&out), vec![1, 3, 5]);
        let distinct: Vec<&CellValue> = out.distinct_values("zoneid").unwrap().iter().collect();
        assert_eq!(distinct, vec![&CellValue::Integer(2)]);
    }

    #[test]
    fn category_outside_domain_yields_empty() {
        let ds = Dataset::from_rows(vec![row(&[("zoneid", CellValue::Integer(1))])]);
        let out = filter_by_category(&ds, "zoneid", &CellValue::Integer(9)).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.column_names, ds.column_names);
    }

    #[test]
    fn time_range_is_inclusive_on_both_ends() {
        let ds = Dataset::from_rows(
            (1..=10)
                .map(|d| {
                    row(&[
                        ("id", CellValue::Integer(d as i64)),
                        ("sample_time", CellValue::Timestamp(ts(d))),
                    ])
                })
                .collect(),
        );
        let out = filter_by_time_range(&ds, "sample_time", ts(3), ts(5)).unwrap();
        assert_eq!(ids(&out), vec![3, 4, 5]);
    }

    #[test]
    fn inverted_time_range_yields_empty() {
        let ds = Dataset::from_rows(vec![row(&[(
            "sample_time",
            CellValue::Timestamp(ts(4)),
        )])]);
        let out = filter_by_time_range(&ds, "sample_time", ts(6), ts(2)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn rows_without_a_timestamp_are_dropped_by_time_filter() {
        let ds = Dataset::from_rows(vec![
            row(&[
                ("id", CellValue::Integer(0)),
                ("sample_time", CellValue::Timestamp(ts(4))),
            ]),
            row(&[
                ("id", CellValue::Integer(1)),
                ("sample_time", CellValue::Null),
            ]),
        ]);
        let out = filter_by_time_range(&ds, "sample_time", ts(1), ts(10)).unwrap();
        assert_eq!(ids(&out), vec![0]);
    }
}
