pub mod cleaning;
pub mod clients;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod features;
pub mod frame;
pub mod monthly;
pub mod pipeline;
pub mod scaling;
pub mod table_io;

pub use config::{CostModel, PathConfig, PipelineConfig, ProjectPaths};
pub use error::{PipelineError, Result};
pub use pipeline::{all_stages, find_stage, run_pipeline, run_stage, PipelineSummary, StageContext};
