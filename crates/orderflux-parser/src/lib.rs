pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::ParserError;
pub use model::{ExportMetadata, RawExport, EXPORT_DATE_FORMAT};
pub use registry::{read_raw_export, read_with_readers, RawExportReader};
