use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};

/// What a stage wrote to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct TableReport {
    pub name: String,
    pub path: PathBuf,
    pub rows: usize,
    pub columns: usize,
}

/// Creates `dir` and its parents when missing. Calling it on an existing directory is a no-op.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| PipelineError::io(dir, source))?;
    info!(path = %dir.display(), "Created directory");
    Ok(())
}

/// Writes `df` as comma-separated text with a header row, creating the parent directory
/// first. Dates are written as ISO 8601 and nulls as empty fields.
pub fn write_table(name: &str, df: &mut DataFrame, path: &Path) -> Result<TableReport> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let mut file = File::create(path).map_err(|source| PipelineError::io(path, source))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)?;

    info!(
        table = name,
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Table written"
    );

    Ok(TableReport {
        name: name.to_string(),
        path: path.to_path_buf(),
        rows: df.height(),
        columns: df.width(),
    })
}

/// Reads a comma-separated table written by [`write_table`], inferring column types from the
/// whole file.
pub fn read_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| PipelineError::io(path, source))?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(file)
        .finish()?;

    info!(path = %path.display(), rows = df.height(), "Table read");
    Ok(df)
}
