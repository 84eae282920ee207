use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Name of the optional configuration file looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "orderflux.toml";

/// Per-unit cost constants used to estimate the operating cost of an order row.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Currency units charged once per row that carried at least one order.
    pub logistics_cost: f64,
    /// Currency units charged per promoter visit.
    pub visit_cost: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            logistics_cost: 10.0,
            visit_cost: 15.0,
        }
    }
}

/// Locations of the pipeline's files, relative to the project root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub raw_input: PathBuf,
    pub interim_output: PathBuf,
    pub processed_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            raw_input: Path::new("data")
                .join("raw")
                .join("Orders_Master_Data(in).xlsx"),
            interim_output: Path::new("data").join("interim").join("orders_cleaned.csv"),
            processed_dir: Path::new("data").join("processed"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub paths: PathConfig,
    pub costs: CostModel,
}

/// Absolute file locations for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub raw_input: PathBuf,
    pub interim_output: PathBuf,
    pub processed_dir: PathBuf,
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| PipelineError::io(path, source))?;
        Self::from_toml_str(&content)
    }

    /// Reads `orderflux.toml` from the project root when present, otherwise the fixed defaults.
    pub fn load_for_root(root: &Path) -> Result<Self> {
        let candidate = root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            info!(path = %candidate.display(), "Loading pipeline configuration");
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn resolve(&self, root: &Path) -> ProjectPaths {
        ProjectPaths {
            root: root.to_path_buf(),
            raw_input: root.join(&self.paths.raw_input),
            interim_output: root.join(&self.paths.interim_output),
            processed_dir: root.join(&self.paths.processed_dir),
        }
    }

    fn validate(&self) -> Result<()> {
        let costs = [
            ("costs.logistics_cost", self.costs.logistics_cost),
            ("costs.visit_cost", self.costs.visit_cost),
        ];
        for (name, value) in costs {
            if !value.is_finite() {
                return Err(PipelineError::Config(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        if self.paths.interim_output.file_name().is_none() {
            return Err(PipelineError::Config(
                "paths.interim_output must name a file".to_string(),
            ));
        }
        Ok(())
    }
}
