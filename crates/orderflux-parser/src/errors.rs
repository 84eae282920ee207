use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{reader} could not open {path}: {source}")]
    Io {
        reader: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{reader} CSV error: {source}")]
    Csv {
        reader: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{reader} workbook error: {source}")]
    Workbook {
        reader: &'static str,
        #[source]
        source: calamine::Error,
    },

    #[error("{reader} workbook {path} has no worksheets")]
    NoWorksheet { reader: &'static str, path: PathBuf },

    #[error("{reader} header row invalid: {message}")]
    InvalidHeader {
        reader: &'static str,
        message: String,
    },

    #[error("{reader} file did not contain a header row")]
    EmptyData { reader: &'static str },

    #[error("{reader} could not assemble table: {source}")]
    Polars {
        reader: &'static str,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("no reader accepts extension {extension:?} of {path} (readers: {known})")]
    UnsupportedFormat {
        path: PathBuf,
        extension: String,
        known: String,
    },
}
