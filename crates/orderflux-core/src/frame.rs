//! Column access helpers shared by the cleaning and feature stages.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::error::{PipelineError, Result};

pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))
}

pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    for name in names {
        require_column(df, name)?;
    }
    Ok(())
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Values of a column as `f64`; anything that does not cast becomes `None`.
pub fn f64_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = require_column(df, name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.into_iter().collect())
}

/// Replaces a text column with parsed dates. Nulls stay null; any other value that does not
/// match `format` is an error carrying its position in `df`. Columns that already hold dates
/// pass through.
pub fn parse_date_column(df: &DataFrame, name: &str, format: &'static str) -> Result<DataFrame> {
    let column = require_column(df, name)?;
    match column.dtype() {
        DataType::Date => return Ok(df.clone()),
        DataType::Datetime(_, _) => {
            let mut output = df.clone();
            output.with_column(column.as_materialized_series().cast(&DataType::Date)?)?;
            return Ok(output);
        }
        _ => {}
    }

    let text = column.as_materialized_series().cast(&DataType::String)?;
    let mut dates: Vec<Option<NaiveDate>> = Vec::with_capacity(text.len());
    for (row, value) in text.str()?.into_iter().enumerate() {
        let date = match value {
            Some(value) => Some(NaiveDate::parse_from_str(value, format).map_err(|_| {
                PipelineError::DateParse {
                    row,
                    value: value.to_string(),
                    format,
                }
            })?),
            None => None,
        };
        dates.push(date);
    }

    let mut output = df.clone();
    output.with_column(Series::new(name.into(), dates))?;
    Ok(output)
}

/// Moves `name` to the first position, keeping the order of every other column.
pub fn move_to_front(df: &DataFrame, name: &str) -> Result<DataFrame> {
    require_column(df, name)?;
    let mut order: Vec<PlSmallStr> = vec![name.into()];
    order.extend(
        df.get_column_names()
            .into_iter()
            .filter(|column| column.as_str() != name)
            .cloned(),
    );
    Ok(df.select(order)?)
}

/// Column expressions selecting `names` in order.
pub(crate) fn column_exprs(names: &[&str]) -> Vec<Expr> {
    names.iter().map(|name| col(*name)).collect()
}
