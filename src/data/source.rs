use std::path::PathBuf;

use anyhow::Result;

use super::loader;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// DataSource – where datasets come from
// ---------------------------------------------------------------------------

/// A provider of readings. The composition root constructs one, owns its
/// lifecycle, and hands it to whoever needs data; nothing in the crate holds
/// a process-wide client.
pub trait DataSource {
    /// Fetch the full dataset from the source.
    fn fetch(&self) -> Result<Dataset>;

    /// Human-readable description for the status line.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// FileSource – sensor exports on disk
// ---------------------------------------------------------------------------

/// A sensor export on disk (`.parquet`, `.json`, or `.csv`).
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: PathBuf) -> Self {
        FileSource { path }
    }
}

impl DataSource for FileSource {
    fn fetch(&self) -> Result<Dataset> {
        loader::load_file(&self.path)
    }

    fn describe(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
