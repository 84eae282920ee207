use std::fs;
use std::path::Path;

use orderflux_core::config::CONFIG_FILE_NAME;
use orderflux_core::{CostModel, PathConfig, PipelineConfig, PipelineError};

#[test]
fn empty_config_uses_fixed_defaults() {
    let config = PipelineConfig::from_toml_str("").unwrap();
    assert_eq!(config, PipelineConfig::default());
    assert_eq!(config.costs.logistics_cost, 10.0);
    assert_eq!(config.costs.visit_cost, 15.0);
    assert_eq!(
        config.paths.raw_input,
        Path::new("data/raw/Orders_Master_Data(in).xlsx")
    );
}

#[test]
fn partial_tables_keep_remaining_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
        [costs]
        visit_cost = 12.5
        "#,
    )
    .unwrap();
    assert_eq!(
        config.costs,
        CostModel {
            logistics_cost: 10.0,
            visit_cost: 12.5,
        }
    );
    assert_eq!(config.paths, PathConfig::default());
}

#[test]
fn paths_resolve_against_the_project_root() {
    let config = PipelineConfig::default();
    let paths = config.resolve(Path::new("/srv/orders"));
    assert_eq!(
        paths.interim_output,
        Path::new("/srv/orders/data/interim/orders_cleaned.csv")
    );
    assert_eq!(paths.processed_dir, Path::new("/srv/orders/data/processed"));
}

#[test]
fn non_finite_cost_is_rejected() {
    let err = PipelineConfig::from_toml_str("[costs]\nlogistics_cost = nan\n").unwrap_err();
    match err {
        PipelineError::Config(message) => assert!(message.contains("costs.logistics_cost")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_toml_is_reported() {
    let err = PipelineConfig::from_toml_str("[costs\nvisit_cost = 1").unwrap_err();
    assert!(matches!(err, PipelineError::Toml(_)));
}

#[test]
fn config_file_in_root_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        PipelineConfig::load_for_root(dir.path()).unwrap(),
        PipelineConfig::default()
    );

    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[paths]\nprocessed_dir = \"out\"\n",
    )
    .unwrap();
    let config = PipelineConfig::load_for_root(dir.path()).unwrap();
    assert_eq!(config.paths.processed_dir, Path::new("out"));
}
