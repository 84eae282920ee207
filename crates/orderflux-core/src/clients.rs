use polars::prelude::*;

use crate::efficiency::EFFICIENCY_COLUMNS;
use crate::error::Result;
use crate::frame::{column_exprs, require_columns};
use crate::monthly::{CATEGORICAL_COLUMNS, MONTHLY_KEYS};

const CLIENT_INPUTS: [&str; 15] = [
    "client_id",
    "month",
    "city",
    "channel",
    "promotor_id",
    "total_orders",
    "total_volume",
    "total_income",
    "total_cost",
    "total_profit",
    "median_ticket",
    "median_promotor_visits",
    "median_promotor_calls",
    "efficiency",
    "efficiency_scaled",
];

const TOTAL_COLUMNS: [&str; 4] = ["total_volume", "total_income", "total_cost", "total_profit"];

/// Monthly promoter medians summed into client-level totals.
const PROMOTER_TOTALS: [(&str, &str); 2] = [
    ("median_promotor_visits", "total_promotor_visits"),
    ("median_promotor_calls", "total_promotor_calls"),
];

/// Collapses client-month rows into one row per client, sorted by client_id.
///
/// Categorical columns keep the first non-null value in month order.
pub fn aggregate_clients(monthly: &DataFrame) -> Result<DataFrame> {
    require_columns(monthly, &CLIENT_INPUTS)?;

    let mut aggregations: Vec<Expr> = CATEGORICAL_COLUMNS
        .iter()
        .map(|name| col(*name).drop_nulls().first())
        .collect();
    aggregations.push(col("total_orders").sum().cast(DataType::Int64));
    for name in TOTAL_COLUMNS {
        aggregations.push(col(name).cast(DataType::Float64).sum());
    }
    aggregations.push(col("median_ticket").cast(DataType::Float64).median());
    for (source, target) in PROMOTER_TOTALS {
        aggregations.push(col(source).cast(DataType::Float64).sum().alias(target));
    }
    for name in EFFICIENCY_COLUMNS {
        aggregations.push(col(name).cast(DataType::Float64).median());
    }

    Ok(monthly
        .clone()
        .lazy()
        .filter(col("client_id").is_not_null())
        .sort_by_exprs(column_exprs(&MONTHLY_KEYS), SortMultipleOptions::default())
        .group_by_stable([col("client_id")])
        .agg(aggregations)
        .collect()?)
}
