/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  DataSource::fetch → loader → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Dataset  │  Vec<Row>, column index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ pipeline  │  zone → IQR outliers → time window → filtered Dataset
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod source;
