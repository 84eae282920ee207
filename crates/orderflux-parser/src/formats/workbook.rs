use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use polars::prelude::*;

use crate::errors::ParserError;
use crate::formats::common::header_names;
use crate::model::{ExportMetadata, RawExport, EXPORT_DATE_FORMAT};
use crate::registry::RawExportReader;

const READER_NAME: &str = "workbook_export";

/// Spreadsheet workbooks. Only the first worksheet is read and its first row is the header.
pub struct WorkbookExportReader;

impl RawExportReader for WorkbookExportReader {
    fn name(&self) -> &'static str {
        READER_NAME
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xlsx", "xlsm", "xlsb", "xls", "ods"]
    }

    fn read(&self, path: &Path) -> Result<RawExport, ParserError> {
        if !path.exists() {
            return Err(ParserError::Io {
                reader: READER_NAME,
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
        let sheet_name = workbook.sheet_names().first().cloned();
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ParserError::NoWorksheet {
                reader: READER_NAME,
                path: path.to_path_buf(),
            })?
            .map_err(workbook_error)?;

        let mut rows = range.rows();
        let header_row = rows.next().ok_or(ParserError::EmptyData {
            reader: READER_NAME,
        })?;

        let names = header_names(
            READER_NAME,
            header_row
                .iter()
                .map(|cell| cell_text(cell).unwrap_or_default()),
        )?;
        let mut cells: Vec<Vec<Data>> = names.iter().map(|_| Vec::new()).collect();

        for row in rows {
            if row.iter().all(is_blank) {
                continue;
            }
            let mut row = row.iter();
            for column in cells.iter_mut() {
                column.push(row.next().cloned().unwrap_or(Data::Empty));
            }
        }

        let row_count = cells.first().map_or(0, Vec::len);
        let columns = names
            .iter()
            .zip(cells.iter())
            .map(|(name, cells)| workbook_column(name, cells))
            .collect::<Vec<Column>>();
        let df = DataFrame::new(columns).map_err(|source| ParserError::Polars {
            reader: READER_NAME,
            source,
        })?;

        Ok(RawExport {
            metadata: ExportMetadata {
                path: path.to_path_buf(),
                reader: READER_NAME,
                sheet_name,
                row_count,
            },
            df,
        })
    }
}

fn workbook_error(source: calamine::Error) -> ParserError {
    ParserError::Workbook {
        reader: READER_NAME,
        source,
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty | Data::Error(_) => true,
        Data::String(text) => text.is_empty(),
        _ => false,
    }
}

/// Whole numbers stored as floats read as integers, as they do when typed into a sheet.
fn integral(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(value) => Some(*value),
        Data::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => Some(*value as i64),
        _ => None,
    }
}

fn numeric(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(value) => Some(*value as f64),
        Data::Float(value) if value.is_finite() => Some(*value),
        _ => None,
    }
}

/// Types a worksheet column from the cells themselves: booleans, dates, integers and floats
/// keep their native type when every non-blank cell agrees. A blank column is floating
/// point; anything mixed becomes text.
pub(crate) fn workbook_column(name: &str, cells: &[Data]) -> Column {
    let name: PlSmallStr = name.into();
    let present: Vec<&Data> = cells.iter().filter(|cell| !is_blank(cell)).collect();

    if present.is_empty() {
        return Series::new(name, vec![None::<f64>; cells.len()]).into();
    }
    if present.iter().all(|cell| matches!(cell, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|cell| match cell {
                Data::Bool(value) => Some(*value),
                _ => None,
            })
            .collect();
        return Series::new(name, values).into();
    }
    if present.iter().all(|cell| matches!(cell, Data::DateTime(_))) {
        let values: Vec<Option<NaiveDate>> = cells
            .iter()
            .map(|cell| match cell {
                Data::DateTime(value) => value.as_datetime().map(|dt| dt.date()),
                _ => None,
            })
            .collect();
        return Series::new(name, values).into();
    }
    if present.iter().all(|cell| integral(cell).is_some()) {
        let values: Vec<Option<i64>> = cells.iter().map(integral).collect();
        return Series::new(name, values).into();
    }
    if present.iter().all(|cell| numeric(cell).is_some()) {
        let values: Vec<Option<f64>> = cells.iter().map(numeric).collect();
        return Series::new(name, values).into();
    }

    let values: Vec<Option<String>> = cells.iter().map(cell_text).collect();
    Series::new(name, values).into()
}

/// Renders one worksheet cell of a mixed column the way a delimited export would spell it.
/// Native spreadsheet dates come out in the export's `DD.MM.YYYY` layout so downstream date
/// parsing sees a single format regardless of source.
pub(crate) fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(text) if text.is_empty() => None,
        Data::String(text) => Some(text.clone()),
        Data::Int(value) => Some(value.to_string()),
        Data::Float(value) => Some(format_float(*value)),
        Data::Bool(value) => Some(value.to_string()),
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.format(EXPORT_DATE_FORMAT).to_string()),
        other => Some(other.to_string()),
    }
}

fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
