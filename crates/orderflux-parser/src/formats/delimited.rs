use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use crate::errors::ParserError;
use crate::formats::common::{header_names, non_empty, CellColumns};
use crate::model::{ExportMetadata, RawExport};
use crate::registry::RawExportReader;

const READER_NAME: &str = "delimited_export";

/// Comma-separated exports with a single header row.
pub struct DelimitedExportReader;

impl RawExportReader for DelimitedExportReader {
    fn name(&self) -> &'static str {
        READER_NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["csv", "txt"]
    }

    fn read(&self, path: &Path) -> Result<RawExport, ParserError> {
        let file = File::open(path).map_err(|source| ParserError::Io {
            reader: READER_NAME,
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|source| ParserError::Csv {
                reader: READER_NAME,
                source,
            })?
            .clone();

        if headers.is_empty() {
            return Err(ParserError::EmptyData {
                reader: READER_NAME,
            });
        }

        let names = header_names(READER_NAME, headers.iter().map(str::to_string))?;
        let mut columns = CellColumns::new(names);

        for record in reader.records() {
            let record = record.map_err(|source| ParserError::Csv {
                reader: READER_NAME,
                source,
            })?;
            columns.push_row(record.iter().map(non_empty));
        }

        let row_count = columns.row_count();
        let df = columns.into_dataframe(READER_NAME)?;

        Ok(RawExport {
            metadata: ExportMetadata {
                path: path.to_path_buf(),
                reader: READER_NAME,
                sheet_name: None,
                row_count,
            },
            df,
        })
    }
}
