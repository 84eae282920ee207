use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use orderflux_parser::{read_raw_export, EXPORT_DATE_FORMAT};
use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::frame::{
    f64_values, has_column, move_to_front, parse_date_column, require_column, require_columns,
};
use crate::table_io::{write_table, TableReport};

/// Columns the cleaner itself reads after names are normalized.
pub const REQUIRED_RAW_COLUMNS: [&str; 4] = ["date", "city", "volume", "income"];

/// Mis-encoded city spellings found in the exports and their intended form.
pub static CITY_CORRECTIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("C√°diz", "Cadiz"),
        ("Castell√≥n", "Castellon"),
        ("C√≥rdoba", "Cordoba"),
    ])
});

/// Export row index carried through cleaning so errors can point back at the raw data.
const SOURCE_ROW: &str = "__source_row";

/// Verbose export headers (after normalization) and their short names.
pub const VERBOSE_COLUMN_RENAMES: [(&str, &str); 4] = [
    ("median_ticket_(‚ç¨)", "median_ticket"),
    ("median_ticket_(€)", "median_ticket"),
    ("prom_contacts_month", "promotor_visits"),
    ("tel_contacts_month", "promotor_calls"),
];

pub fn normalized_column_name(name: &str) -> String {
    name.replace(' ', "_").to_lowercase()
}

pub fn normalize_column_names(df: &DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|column| {
            let name = normalized_column_name(column.name().as_str());
            column
                .as_materialized_series()
                .clone()
                .with_name(name.into())
                .into()
        })
        .collect::<Vec<Column>>();

    Ok(DataFrame::new(columns)?)
}

/// Keeps the first of every group of rows that agree in all columns. The source row index
/// added by [`clean_orders`] does not take part in the comparison.
pub fn drop_duplicate_rows(df: &DataFrame) -> Result<DataFrame> {
    let subset: Vec<String> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != SOURCE_ROW)
        .map(|name| name.to_string())
        .collect();

    let deduplicated =
        df.unique_stable(Some(subset.as_slice()), UniqueKeepStrategy::First, None)?;
    let dropped = df.height() - deduplicated.height();
    if dropped > 0 {
        info!(dropped, "Dropped duplicate rows");
    }
    Ok(deduplicated)
}

pub fn correct_city_names(df: &DataFrame) -> Result<DataFrame> {
    let city = require_column(df, "city")?;
    if city.dtype() != &DataType::String {
        return Ok(df.clone());
    }

    let corrected: Vec<Option<&str>> = city
        .str()?
        .into_iter()
        .map(|value| value.map(|name| CITY_CORRECTIONS.get(name).copied().unwrap_or(name)))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new("city".into(), corrected))?;
    Ok(output)
}

/// Parses `date` from the export's `DD.MM.YYYY` text into a date column.
pub fn parse_order_dates(df: &DataFrame) -> Result<DataFrame> {
    parse_date_column(df, "date", EXPORT_DATE_FORMAT)
}

pub fn rename_verbose_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut output = df.clone();
    for (verbose, short) in VERBOSE_COLUMN_RENAMES {
        if has_column(&output, verbose) && !has_column(&output, short) {
            output.rename(verbose, short.into())?;
        }
    }
    Ok(output)
}

/// Drops rows with neither volume nor income. A row where only one of them is zero, or
/// where either is missing, is kept.
pub fn drop_empty_orders(df: &DataFrame) -> Result<DataFrame> {
    let volume = f64_values(df, "volume")?;
    let income = f64_values(df, "income")?;

    let keep: BooleanChunked = volume
        .iter()
        .zip(income.iter())
        .map(|(volume, income)| !(*volume == Some(0.0) && *income == Some(0.0)))
        .collect();

    let filtered = df.filter(&keep)?;
    info!(
        dropped = df.height() - filtered.height(),
        "Dropped rows with zero volume and zero income"
    );
    Ok(filtered)
}

/// Full cleaning pass over a raw export. The result has `date` as its first column.
///
/// Date errors report the row's position in the raw export, counted from 0 below the header.
pub fn clean_orders(raw: &DataFrame) -> Result<DataFrame> {
    let normalized = normalize_column_names(raw)?;
    require_columns(&normalized, &REQUIRED_RAW_COLUMNS)?;

    let indexed = normalized.with_row_index(SOURCE_ROW.into(), None)?;
    let deduplicated = drop_duplicate_rows(&indexed)?;
    let cities = correct_city_names(&deduplicated)?;
    let dated = parse_order_dates(&cities).map_err(|err| at_source_row(err, &cities))?;
    let renamed = rename_verbose_columns(&dated)?;
    let filtered = drop_empty_orders(&renamed)?;
    move_to_front(&filtered.drop(SOURCE_ROW)?, "date")
}

/// Rewrites the row of a date error from its position in `df` to its export row.
fn at_source_row(err: PipelineError, df: &DataFrame) -> PipelineError {
    match err {
        PipelineError::DateParse { row, value, format } => {
            let source = df
                .column(SOURCE_ROW)
                .ok()
                .and_then(|column| column.as_materialized_series().idx().ok()?.get(row))
                .map_or(row, |idx| idx as usize);
            PipelineError::DateParse {
                row: source,
                value,
                format,
            }
        }
        other => other,
    }
}

/// Loader/Cleaner stage: raw export in, intermediate table out.
pub fn load_and_clean_data(input_path: &Path, output_path: &Path) -> Result<TableReport> {
    let export = read_raw_export(input_path)?;
    info!(
        path = %input_path.display(),
        reader = export.metadata.reader,
        sheet = export.metadata.sheet_name.as_deref().unwrap_or("-"),
        rows = export.metadata.row_count,
        "Raw export loaded"
    );

    let mut cleaned = clean_orders(&export.df)?;
    write_table("orders_cleaned", &mut cleaned, output_path)
}
