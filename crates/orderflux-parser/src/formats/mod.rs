mod common;
mod delimited;
mod workbook;

pub use delimited::DelimitedExportReader;
pub use workbook::WorkbookExportReader;

pub use common::{header_names, infer_cell_kind, CellColumns, CellKind};
#[cfg(test)]
pub(crate) use workbook::{cell_text, workbook_column};
