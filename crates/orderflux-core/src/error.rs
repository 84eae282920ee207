// crates/orderflux-core/src/error.rs

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Raw export could not be read: {0}")]
    Parser(#[from] orderflux_parser::ParserError),

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Date value {value:?} in data row {row} (from 0, below the header) does not match format {format}")]
    DateParse {
        row: usize,
        value: String,
        format: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
