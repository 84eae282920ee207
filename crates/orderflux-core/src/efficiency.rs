use polars::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::frame::{column_exprs, f64_values, require_columns};
use crate::monthly::MONTHLY_KEYS;
use crate::scaling::MinMaxScaler;

/// Offset above the top of the scaled range given to client-months whose efficiency is
/// undefined (orders recorded against zero or unknown visits).
pub const UNDEFINED_EFFICIENCY_OFFSET: f64 = 0.5;

pub const EFFICIENCY_COLUMNS: [&str; 2] = ["efficiency", "efficiency_scaled"];

const MONTHLY_ROW: &str = "__monthly_row";

/// Orders per median promoter visit for each client-month, plus a `[0, 1]` rescaling.
///
/// Returns `client_id`, `month`, `efficiency` and `efficiency_scaled`. Non-finite ratios
/// become null efficiency; the scaler is fitted on the finite ones only and the others are
/// placed at `max(scaled) + 0.5`. With no finite ratio at all, every scaled value is null.
pub fn compute_efficiency(monthly: &DataFrame) -> Result<DataFrame> {
    require_columns(
        monthly,
        &["client_id", "month", "total_orders", "median_promotor_visits"],
    )?;

    let ratio = col("total_orders").cast(DataType::Float64)
        / col("median_promotor_visits").cast(DataType::Float64);
    let mut selection = column_exprs(&MONTHLY_KEYS);
    selection.push(
        when(ratio.clone().is_finite())
            .then(ratio)
            .otherwise(lit(NULL).cast(DataType::Float64))
            .alias("efficiency"),
    );
    let mut output = monthly.clone().lazy().select(selection).collect()?;

    let efficiency = f64_values(&output, "efficiency")?;
    let scaler = MinMaxScaler::fit(efficiency.iter().flatten().copied());
    let scaled: Vec<Option<f64>> = match scaler {
        Some(scaler) => {
            let undefined = scaler.upper() + UNDEFINED_EFFICIENCY_OFFSET;
            efficiency
                .iter()
                .map(|value| Some(value.map_or(undefined, |v| scaler.transform(v))))
                .collect()
        }
        None => vec![None; efficiency.len()],
    };

    let undefined_rows = efficiency.iter().filter(|value| value.is_none()).count();
    match scaler {
        Some(scaler) => info!(
            min = scaler.min,
            max = scaler.max,
            undefined_rows,
            "Efficiency scaler fitted"
        ),
        None => debug!(undefined_rows, "No finite efficiency to fit the scaler on"),
    }

    output.with_column(Series::new("efficiency_scaled".into(), scaled))?;
    Ok(output)
}

/// Left-joins the efficiency columns onto the monthly table by (client_id, month), keeping
/// the monthly row order. Months without a match get null efficiency.
pub fn attach_efficiency(monthly: &DataFrame, efficiency: &DataFrame) -> Result<DataFrame> {
    require_columns(monthly, &MONTHLY_KEYS)?;
    require_columns(efficiency, &MONTHLY_KEYS)?;
    require_columns(efficiency, &EFFICIENCY_COLUMNS)?;

    let keys = column_exprs(&MONTHLY_KEYS);
    let mut selection = keys.clone();
    selection.extend(column_exprs(&EFFICIENCY_COLUMNS));

    Ok(monthly
        .clone()
        .lazy()
        .with_row_index(MONTHLY_ROW, None)
        .join(
            efficiency.clone().lazy().select(selection),
            keys.clone(),
            keys,
            JoinArgs::new(JoinType::Left),
        )
        .sort([MONTHLY_ROW], SortMultipleOptions::default())
        .drop([MONTHLY_ROW])
        .collect()?)
}
