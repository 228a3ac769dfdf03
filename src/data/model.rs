use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a dataset column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the warehouse column dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Timestamp(NaiveDateTime),
    /// Explicit missing marker.
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Timestamp(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Timestamp(t) => t.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.2}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for quantile computation and
    /// plotting. Anything non-numeric counts as missing.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to interpret the value as a timestamp.
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the dataset
// ---------------------------------------------------------------------------

/// A single record: column name → value.
pub type Row = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed column indices.
///
/// Immutable from the filters' point of view: every filtering operation
/// produces a new `Dataset` via [`Dataset::with_rows`], the original is
/// never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// All records, in source order.
    pub rows: Vec<Row>,
    /// Ordered list of column names.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build column indices from loaded rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut column_names_set: BTreeSet<String> = BTreeSet::new();
        for row in &rows {
            for col in row.keys() {
                column_names_set.insert(col.clone());
            }
        }
        let column_names: Vec<String> = column_names_set.into_iter().collect();
        Self::from_rows_with_columns(rows, column_names)
    }

    /// Build a dataset with an explicitly declared column set. Columns stay
    /// declared even when no surviving row carries them.
    pub fn from_rows_with_columns(rows: Vec<Row>, column_names: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = column_names
            .iter()
            .map(|c| (c.clone(), BTreeSet::new()))
            .collect();
        for row in &rows {
            for (col, val) in row {
                unique_values.entry(col.clone()).or_default().insert(val.clone());
            }
        }
        Dataset {
            rows,
            column_names,
            unique_values,
        }
    }

    /// Derive a new dataset from a subset of this one's rows, keeping the
    /// column set of the parent.
    pub fn with_rows(&self, rows: Vec<Row>) -> Dataset {
        Self::from_rows_with_columns(rows, self.column_names.clone())
    }

    /// Whether a column exists in this dataset.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }

    /// Sorted distinct values of a column (for selector widgets).
    pub fn distinct_values(&self, column: &str) -> Option<&BTreeSet<CellValue>> {
        self.unique_values.get(column)
    }

    /// Columns that carry at least one numeric value.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names
            .iter()
            .filter(|c| {
                self.unique_values
                    .get(*c)
                    .is_some_and(|vals| vals.iter().any(|v| v.as_f64().is_some()))
            })
            .cloned()
            .collect()
    }

    /// Columns that carry at least one timestamp value.
    pub fn timestamp_columns(&self) -> Vec<String> {
        self.column_names
            .iter()
            .filter(|c| {
                self.unique_values
                    .get(*c)
                    .is_some_and(|vals| vals.iter().any(|v| v.as_timestamp().is_some()))
            })
            .cloned()
            .collect()
    }

    /// Earliest and latest timestamp found in a column, if any.
    pub fn time_domain(&self, column: &str) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut times = self
            .rows
            .iter()
            .filter_map(|r| r.get(column).and_then(CellValue::as_timestamp));
        let first = times.next()?;
        let (min, max) = times.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        Some((min, max))
    }

    /// New dataset with rows stably sorted by the given column. Rows missing
    /// the column sort first (as `Null`).
    pub fn sorted_by(&self, column: &str) -> Dataset {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| {
            let va = a.get(column).unwrap_or(&CellValue::Null);
            let vb = b.get(column).unwrap_or(&CellValue::Null);
            va.cmp(vb)
        });
        Dataset {
            rows,
            column_names: self.column_names.clone(),
            unique_values: self.unique_values.clone(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
