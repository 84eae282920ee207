use std::path::Path;

use crate::errors::ParserError;
use crate::formats::{DelimitedExportReader, WorkbookExportReader};
use crate::model::RawExport;

pub trait RawExportReader {
    fn name(&self) -> &'static str;
    /// Lowercase file extensions this reader claims, without the leading dot.
    fn extensions(&self) -> &'static [&'static str];
    fn read(&self, path: &Path) -> Result<RawExport, ParserError>;
}

/// Reads a raw sales export, choosing the reader from the file extension.
pub fn read_raw_export(path: &Path) -> Result<RawExport, ParserError> {
    let workbook = WorkbookExportReader;
    let delimited = DelimitedExportReader;
    let readers: [&dyn RawExportReader; 2] = [&workbook, &delimited];
    read_with_readers(path, &readers)
}

pub fn read_with_readers(
    path: &Path,
    readers: &[&dyn RawExportReader],
) -> Result<RawExport, ParserError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    readers
        .iter()
        .find(|reader| reader.extensions().contains(&extension.as_str()))
        .ok_or_else(|| ParserError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: extension.clone(),
            known: describe_readers(readers),
        })?
        .read(path)
}

/// `name (ext, ext); name (ext)` for every reader, in order.
fn describe_readers(readers: &[&dyn RawExportReader]) -> String {
    readers
        .iter()
        .map(|reader| format!("{} ({})", reader.name(), reader.extensions().join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}
