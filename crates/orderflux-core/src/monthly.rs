use polars::prelude::*;

use crate::error::Result;
use crate::frame::{column_exprs, require_columns};

pub const MONTHLY_KEYS: [&str; 2] = ["client_id", "month"];

/// Per-order inputs the monthly aggregation reads.
const MONTHLY_INPUTS: [&str; 13] = [
    "client_id",
    "month",
    "city",
    "channel",
    "promotor_id",
    "order_normalized",
    "volume",
    "income",
    "cost",
    "profit",
    "median_ticket",
    "promotor_visits",
    "promotor_calls",
];

pub(crate) const CATEGORICAL_COLUMNS: [&str; 3] = ["city", "channel", "promotor_id"];

/// Summed per-order column and the name of its monthly total.
const SUMMED_COLUMNS: [(&str, &str); 4] = [
    ("volume", "total_volume"),
    ("income", "total_income"),
    ("cost", "total_cost"),
    ("profit", "total_profit"),
];

pub const MONTHLY_COLUMNS: [&str; 16] = [
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
    "median_ticket_min",
    "median_ticket_max",
    "median_ticket_std",
    "median_promotor_visits",
    "median_promotor_calls",
];

const ROW_INDEX: &str = "__order_row";

/// Collapses per-order rows into one row per (client_id, month), sorted by key.
///
/// Rows with a null key belong to no group. Categorical columns take the modal value of the
/// month (first-seen value on ties, null when the month has no value at all). Order counts,
/// volume, income, cost and profit are summed; visits and calls take the median; the ticket
/// gets median, min, max and sample standard deviation.
pub fn aggregate_monthly(orders: &DataFrame) -> Result<DataFrame> {
    require_columns(orders, &MONTHLY_INPUTS)?;
    let keys = column_exprs(&MONTHLY_KEYS);

    let keyed = orders
        .clone()
        .lazy()
        .filter(col("client_id").is_not_null().and(col("month").is_not_null()))
        .with_row_index(ROW_INDEX, None);

    let mut aggregations = vec![col("order_normalized")
        .sum()
        .cast(DataType::Int64)
        .alias("total_orders")];
    for (source, target) in SUMMED_COLUMNS {
        aggregations.push(col(source).cast(DataType::Float64).sum().alias(target));
    }
    let ticket = col("median_ticket").cast(DataType::Float64);
    aggregations.extend([
        ticket.clone().median().alias("median_ticket"),
        ticket.clone().min().alias("median_ticket_min"),
        ticket.clone().max().alias("median_ticket_max"),
        ticket.std(1).alias("median_ticket_std"),
        col("promotor_visits")
            .cast(DataType::Float64)
            .median()
            .alias("median_promotor_visits"),
        col("promotor_calls")
            .cast(DataType::Float64)
            .median()
            .alias("median_promotor_calls"),
    ]);

    let mut monthly = keyed.clone().group_by_stable(keys.clone()).agg(aggregations);
    for name in CATEGORICAL_COLUMNS {
        monthly = monthly.join(
            modal_values(keyed.clone(), name),
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Left),
        );
    }

    Ok(monthly
        .sort_by_exprs(keys, SortMultipleOptions::default())
        .select(column_exprs(&MONTHLY_COLUMNS))
        .collect()?)
}

/// Most frequent non-null `name` per (client_id, month). Ties go to the value whose first
/// occurrence comes earliest; keys without any value are absent.
fn modal_values(keyed: LazyFrame, name: &str) -> LazyFrame {
    let mut by = column_exprs(&MONTHLY_KEYS);
    by.push(col(name));

    keyed
        .filter(col(name).is_not_null())
        .group_by(by)
        .agg([
            len().alias("occurrences"),
            col(ROW_INDEX).min().alias("first_seen"),
        ])
        .sort_by_exprs(
            [col("occurrences"), col("first_seen")],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .group_by_stable(column_exprs(&MONTHLY_KEYS))
        .agg([col(name).first()])
}
