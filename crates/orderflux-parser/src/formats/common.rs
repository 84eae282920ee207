use std::collections::HashMap;

use polars::prelude::*;

use crate::errors::ParserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Integer,
    Float,
    Text,
}

/// Picks the narrowest type every non-empty cell of a column parses as. A column with no
/// values at all is treated as floating point, matching how spreadsheets report blanks.
///
/// Only finite numbers count as floats, so tokens such as `NaN` or `inf` keep a column as
/// text. Digits with a leading zero (`007`) are codes rather than numbers and keep it as text
/// too.
pub fn infer_cell_kind(cells: &[Option<String>]) -> CellKind {
    let mut kind = CellKind::Integer;

    for cell in cells.iter().flatten() {
        let trimmed = cell.trim();
        if has_leading_zero(trimmed) {
            return CellKind::Text;
        }
        match kind {
            CellKind::Integer => {
                if trimmed.parse::<i64>().is_err() {
                    kind = if parses_as_finite_float(trimmed) {
                        CellKind::Float
                    } else {
                        return CellKind::Text;
                    };
                }
            }
            CellKind::Float => {
                if !parses_as_finite_float(trimmed) {
                    return CellKind::Text;
                }
            }
            CellKind::Text => return CellKind::Text,
        }
    }

    if cells.iter().all(Option::is_none) {
        CellKind::Float
    } else {
        kind
    }
}

fn parses_as_finite_float(token: &str) -> bool {
    token.parse::<f64>().is_ok_and(f64::is_finite)
}

/// `0` followed by another digit, after an optional sign: `007`, `-01`, `00.5`.
fn has_leading_zero(token: &str) -> bool {
    let digits = token.strip_prefix(['-', '+']).unwrap_or(token);
    digits.starts_with('0') && digits.as_bytes().get(1).is_some_and(u8::is_ascii_digit)
}

/// Fills blank header cells and disambiguates repeated ones (`name`, `name.1`, ...).
pub fn header_names<I>(reader: &'static str, raw: I) -> Result<Vec<String>, ParserError>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            format!("unnamed_{idx}")
        } else {
            header
        };

        let count = seen.entry(base.clone()).or_insert(0);
        let name = if *count == 0 {
            base.clone()
        } else {
            format!("{base}.{count}")
        };
        *count += 1;
        names.push(name);
    }

    if names.is_empty() {
        return Err(ParserError::InvalidHeader {
            reader,
            message: "header row has no cells".to_string(),
        });
    }

    Ok(names)
}

/// Column-major cell storage filled row by row while a reader walks its source.
#[derive(Debug)]
pub struct CellColumns {
    names: Vec<String>,
    cells: Vec<Vec<Option<String>>>,
}

impl CellColumns {
    pub fn new(names: Vec<String>) -> Self {
        let cells = names.iter().map(|_| Vec::new()).collect();
        Self { names, cells }
    }

    /// Appends one data row. Short rows are padded with empty cells and surplus cells beyond
    /// the header are ignored.
    pub fn push_row<I>(&mut self, row: I)
    where
        I: IntoIterator<Item = Option<String>>,
    {
        let mut row = row.into_iter();
        for column in self.cells.iter_mut() {
            column.push(row.next().flatten());
        }
    }

    pub fn row_count(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn into_dataframe(self, reader: &'static str) -> Result<DataFrame, ParserError> {
        let columns = self
            .names
            .iter()
            .zip(self.cells.iter())
            .map(|(name, cells)| typed_column(name, cells))
            .collect::<Vec<Column>>();

        DataFrame::new(columns).map_err(|source| ParserError::Polars { reader, source })
    }
}

fn typed_column(name: &str, cells: &[Option<String>]) -> Column {
    match infer_cell_kind(cells) {
        CellKind::Integer => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|cell| cell.as_deref().and_then(|v| v.trim().parse().ok()))
                .collect();
            Series::new(name.into(), values).into()
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|cell| cell.as_deref().and_then(|v| v.trim().parse().ok()))
                .collect();
            Series::new(name.into(), values).into()
        }
        CellKind::Text => {
            let values: Vec<Option<&str>> = cells.iter().map(|cell| cell.as_deref()).collect();
            Series::new(name.into(), values).into()
        }
    }
}

/// Empty strings are missing values in every export format we read.
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
