use std::path::PathBuf;

use polars::prelude::DataFrame;

/// Date layout used by the sales exports, e.g. `02.03.2023`.
pub const EXPORT_DATE_FORMAT: &str = "%d.%m.%Y";

#[derive(Debug, Clone)]
pub struct ExportMetadata {
    pub path: PathBuf,
    pub reader: &'static str,
    /// Worksheet the rows were taken from; `None` for delimited exports.
    pub sheet_name: Option<String>,
    pub row_count: usize,
}

/// A raw export exactly as the source spreadsheet laid it out: verbatim header names,
/// one column per header, types inferred per column.
#[derive(Debug, Clone)]
pub struct RawExport {
    pub metadata: ExportMetadata,
    pub df: DataFrame,
}
