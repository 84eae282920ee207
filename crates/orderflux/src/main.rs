use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use orderflux_core::{
    all_stages, find_stage, run_pipeline, run_stage, PipelineConfig, PipelineSummary,
    ProjectPaths, StageContext,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const PROJECT_ROOT_ENV: &str = "ORDERFLUX_PROJECT_ROOT";

#[derive(Parser, Debug)]
#[command(author, version, about = "Sales orders cleaning and feature pipeline", long_about = None)]
struct Cli {
    /// Project root holding the data/ directory (defaults to the workspace root)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,
    /// Pipeline configuration file (defaults to orderflux.toml in the project root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the whole pipeline (the default)
    Run,
    /// Only clean the raw export into the interim table
    Clean,
    /// Only build the processed tables from the interim table
    Features,
    /// List the pipeline stages in execution order
    Stages,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let root = project_root(cli.project_root.as_deref());
    let config = match cli.config.as_deref() {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => PipelineConfig::load_for_root(&root)?,
    };
    let paths = config.resolve(&root);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!(root = %paths.root.display(), "Starting pipeline");
            let summary = run_pipeline(&config, &paths)?;
            info!("Pipeline complete");
            print_summary(&summary);
        }
        Command::Clean => run_single("clean", &config, &paths)?,
        Command::Features => run_single("features", &config, &paths)?,
        Command::Stages => {
            let mut table = Table::new();
            table.load_preset(UTF8_FULL).set_header(vec!["stage", "description"]);
            for stage in all_stages() {
                table.add_row(vec![stage.code_identifier(), stage.description()]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn run_single(code: &str, config: &PipelineConfig, paths: &ProjectPaths) -> Result<()> {
    let stage = find_stage(code).with_context(|| format!("stage '{code}' is not registered"))?;
    let report = run_stage(stage, &StageContext { config, paths })?;
    print_summary(&PipelineSummary {
        stages: vec![report],
    });
    Ok(())
}

/// `--project-root`, then `ORDERFLUX_PROJECT_ROOT`, then the workspace this binary was built in.
fn project_root(cli_root: Option<&Path>) -> PathBuf {
    if let Some(root) = cli_root {
        return root.to_path_buf();
    }
    if let Ok(root) = env::var(PROJECT_ROOT_ENV) {
        return PathBuf::from(root);
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn print_summary(summary: &PipelineSummary) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["stage", "table", "rows", "columns", "path"]);
    for (stage, report) in summary.tables() {
        table.add_row(vec![
            stage.to_string(),
            report.name.clone(),
            report.rows.to_string(),
            report.columns.to_string(),
            report.path.display().to_string(),
        ]);
    }
    println!("{table}");
}
