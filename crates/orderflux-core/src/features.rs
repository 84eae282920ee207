use std::path::Path;

use polars::prelude::*;
use tracing::info;

use crate::clients::aggregate_clients;
use crate::config::CostModel;
use crate::efficiency::{attach_efficiency, compute_efficiency};
use crate::error::Result;
use crate::frame::{parse_date_column, require_columns};
use crate::monthly::aggregate_monthly;
use crate::table_io::{read_table, write_table, TableReport};

/// Layout of the per-order table, `date` first.
pub const ORDER_COLUMNS: [&str; 17] = [
    "date",
    "client_id",
    "city",
    "channel",
    "promotor_id",
    "number_of_orders",
    "volume",
    "income",
    "median_ticket",
    "promotor_visits",
    "promotor_calls",
    "order_normalized",
    "cost",
    "profit",
    "month",
    "week",
    "day_of_week",
];

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

pub const ORDERS_FILE: &str = "orders.csv";
pub const CLIENTS_FILE: &str = "clients.csv";
pub const CLIENTS_MONTHLY_FILE: &str = "clients_monthly.csv";

/// The three tables the feature builder produces.
#[derive(Debug, Clone)]
pub struct FeatureTables {
    pub orders: DataFrame,
    pub clients_monthly: DataFrame,
    pub clients: DataFrame,
}

/// Reads the intermediate table and turns its ISO `date` column back into dates.
pub fn read_interim_orders(path: &Path) -> Result<DataFrame> {
    let df = read_table(path)?;
    parse_date_column(&df, "date", ISO_DATE_FORMAT)
}

/// Adds calendar, order indicator, cost and profit columns.
///
/// `day_of_week` counts from Monday = 0 and `week` is the ISO 8601 week number. A missing
/// order count counts as no order; a missing visit count leaves cost and profit missing.
pub fn add_order_features(df: &DataFrame, costs: &CostModel) -> Result<DataFrame> {
    require_columns(df, &["date", "number_of_orders", "promotor_visits", "income"])?;

    let date = col("date");
    Ok(df
        .clone()
        .lazy()
        .with_columns([
            (date.clone().dt().weekday().cast(DataType::Int32) - lit(1)).alias("day_of_week"),
            date.clone().dt().month().cast(DataType::Int32).alias("month"),
            date.dt().week().cast(DataType::Int32).alias("week"),
            when(col("number_of_orders").gt(lit(0)))
                .then(lit(1i64))
                .otherwise(lit(0i64))
                .alias("order_normalized"),
        ])
        .with_column(
            (col("order_normalized").cast(DataType::Float64) * lit(costs.logistics_cost)
                + col("promotor_visits").cast(DataType::Float64) * lit(costs.visit_cost))
            .alias("cost"),
        )
        .with_column((col("income").cast(DataType::Float64) - col("cost")).alias("profit"))
        .collect()?)
}

/// Restricts the frame to [`ORDER_COLUMNS`] in that order.
pub fn reorder_order_columns(df: &DataFrame) -> Result<DataFrame> {
    require_columns(df, &ORDER_COLUMNS)?;
    Ok(df.select(ORDER_COLUMNS)?)
}

/// Runs per-order features, monthly aggregation, efficiency and client aggregation in memory.
pub fn build_feature_tables(cleaned: &DataFrame, costs: &CostModel) -> Result<FeatureTables> {
    let with_features = add_order_features(cleaned, costs)?;
    let orders = reorder_order_columns(&with_features)?;

    let monthly = aggregate_monthly(&orders)?;
    let efficiency = compute_efficiency(&monthly)?;
    let clients_monthly = attach_efficiency(&monthly, &efficiency)?;
    let clients = aggregate_clients(&clients_monthly)?;

    info!(
        orders = orders.height(),
        client_months = clients_monthly.height(),
        clients = clients.height(),
        "Feature tables built"
    );

    Ok(FeatureTables {
        orders,
        clients_monthly,
        clients,
    })
}

/// Feature Builder stage: intermediate table in, orders/clients/clients_monthly out.
pub fn create_features(
    input_path: &Path,
    output_dir: &Path,
    costs: &CostModel,
) -> Result<Vec<TableReport>> {
    let cleaned = read_interim_orders(input_path)?;
    let FeatureTables {
        mut orders,
        mut clients_monthly,
        mut clients,
    } = build_feature_tables(&cleaned, costs)?;

    Ok(vec![
        write_table("orders", &mut orders, &output_dir.join(ORDERS_FILE))?,
        write_table("clients", &mut clients, &output_dir.join(CLIENTS_FILE))?,
        write_table(
            "clients_monthly",
            &mut clients_monthly,
            &output_dir.join(CLIENTS_MONTHLY_FILE),
        )?,
    ])
}
