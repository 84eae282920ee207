use once_cell::sync::Lazy;
use tracing::info;

use crate::cleaning::load_and_clean_data;
use crate::config::{PipelineConfig, ProjectPaths};
use crate::error::Result;
use crate::features::create_features;
use crate::table_io::TableReport;

/// Everything a stage needs to locate its inputs and outputs.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub config: &'a PipelineConfig,
    pub paths: &'a ProjectPaths,
}

#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: &'static str,
    pub tables: Vec<TableReport>,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineSummary {
    pub stages: Vec<StageReport>,
}

impl PipelineSummary {
    pub fn tables(&self) -> impl Iterator<Item = (&'static str, &TableReport)> {
        self.stages
            .iter()
            .flat_map(|stage| stage.tables.iter().map(move |table| (stage.stage, table)))
    }
}

pub trait PipelineStage: Send + Sync {
    fn code_identifier(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn run(&self, context: &StageContext<'_>) -> Result<StageReport>;
}

struct LoadAndCleanStage;

impl PipelineStage for LoadAndCleanStage {
    fn code_identifier(&self) -> &'static str {
        "clean"
    }

    fn description(&self) -> &'static str {
        "Raw export -> normalized, de-duplicated, date-parsed interim table"
    }

    fn run(&self, context: &StageContext<'_>) -> Result<StageReport> {
        let table = load_and_clean_data(&context.paths.raw_input, &context.paths.interim_output)?;
        Ok(StageReport {
            stage: self.code_identifier(),
            tables: vec![table],
        })
    }
}

struct CreateFeaturesStage;

impl PipelineStage for CreateFeaturesStage {
    fn code_identifier(&self) -> &'static str {
        "features"
    }

    fn description(&self) -> &'static str {
        "Interim table -> orders, clients_monthly and clients tables"
    }

    fn run(&self, context: &StageContext<'_>) -> Result<StageReport> {
        let tables = create_features(
            &context.paths.interim_output,
            &context.paths.processed_dir,
            &context.config.costs,
        )?;
        Ok(StageReport {
            stage: self.code_identifier(),
            tables,
        })
    }
}

static STAGES: Lazy<Vec<&'static dyn PipelineStage>> = Lazy::new(|| {
    vec![
        &LoadAndCleanStage as &dyn PipelineStage,
        &CreateFeaturesStage as &dyn PipelineStage,
    ]
});

/// Stages in execution order.
pub fn all_stages() -> &'static [&'static dyn PipelineStage] {
    STAGES.as_slice()
}

pub fn find_stage(code: &str) -> Option<&'static dyn PipelineStage> {
    all_stages()
        .iter()
        .copied()
        .find(|stage| stage.code_identifier() == code)
}

pub fn run_stage(stage: &dyn PipelineStage, context: &StageContext<'_>) -> Result<StageReport> {
    info!(stage = stage.code_identifier(), "Starting stage");
    let report = stage.run(context)?;
    info!(
        stage = stage.code_identifier(),
        tables = report.tables.len(),
        "Stage complete"
    );
    Ok(report)
}

/// Runs every stage in order. The first failure ends the run and is returned as is.
pub fn run_pipeline(config: &PipelineConfig, paths: &ProjectPaths) -> Result<PipelineSummary> {
    let context = StageContext { config, paths };
    let mut summary = PipelineSummary::default();

    for stage in all_stages() {
        summary.stages.push(run_stage(*stage, &context)?);
    }

    Ok(summary)
}
