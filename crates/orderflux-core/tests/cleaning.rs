use polars::prelude::*;

use orderflux_core::cleaning::{
    clean_orders, correct_city_names, drop_duplicate_rows, drop_empty_orders,
    normalize_column_names, rename_verbose_columns,
};
use orderflux_core::PipelineError;

fn raw_export() -> DataFrame {
    df!(
        "Date" => &["01.03.2023", "02.03.2023", "02.03.2023", "06.03.2023", "07.03.2023"],
        "Client ID" => &[1001i64, 1001, 1001, 1002, 1002],
        "City" => &["C√°diz", "C√°diz", "C√°diz", "Castell√≥n", "Madrid"],
        "Channel" => &["Horeca", "Horeca", "Horeca", "Retail", "Retail"],
        "Promotor ID" => &[7i64, 7, 7, 8, 8],
        "Number of orders" => &[0i64, 1, 1, 2, 0],
        "Volume" => &[0.0f64, 5.0, 5.0, 0.0, 3.0],
        "Income" => &[0.0f64, 0.0, 0.0, 20.0, 0.0],
        "Median Ticket (‚ç¨)" => &[12.5f64, 12.5, 12.5, 14.0, 9.0],
        "Prom contacts month" => &[1i64, 2, 2, 0, 1],
        "Tel contacts month" => &[2i64, 1, 1, 3, 0],
    )
    .expect("raw frame")
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn normalized_names_have_no_spaces_or_uppercase() {
    let normalized = normalize_column_names(&raw_export()).unwrap();
    for name in column_names(&normalized) {
        assert!(!name.contains(' '), "{name} contains a space");
        assert_eq!(name, name.to_lowercase(), "{name} contains uppercase");
    }
    assert!(normalized.column("number_of_orders").is_ok());
    assert!(normalized.column("median_ticket_(‚ç¨)").is_ok());
}

#[test]
fn duplicate_rows_keep_first_occurrence() {
    let deduplicated = drop_duplicate_rows(&raw_export()).unwrap();
    assert_eq!(deduplicated.height(), 4);

    let dates = deduplicated.column("Date").unwrap().str().unwrap();
    let collected: Vec<_> = dates.into_iter().flatten().collect();
    assert_eq!(collected, ["01.03.2023", "02.03.2023", "06.03.2023", "07.03.2023"]);
}

#[test]
fn rows_differing_in_one_column_are_not_duplicates() {
    let df = df!(
        "a" => &[1i64, 1],
        "b" => &[Some("x"), None],
    )
    .unwrap();
    assert_eq!(drop_duplicate_rows(&df).unwrap().height(), 2);
}

#[test]
fn corrupted_city_names_are_replaced() {
    let df = df!(
        "city" => &[Some("C√°diz"), Some("Castell√≥n"), Some("C√≥rdoba"), Some("Madrid"), None],
    )
    .unwrap();
    let corrected = correct_city_names(&df).unwrap();
    let cities: Vec<Option<&str>> = corrected.column("city").unwrap().str().unwrap().into_iter().collect();
    assert_eq!(
        cities,
        [Some("Cadiz"), Some("Castellon"), Some("Cordoba"), Some("Madrid"), None]
    );
}

#[test]
fn verbose_columns_are_renamed_when_present() {
    let df = df!(
        "median_ticket_(‚ç¨)" => &[1.0f64],
        "prom_contacts_month" => &[2i64],
        "volume" => &[3.0f64],
    )
    .unwrap();
    let renamed = rename_verbose_columns(&df).unwrap();
    assert_eq!(
        column_names(&renamed),
        ["median_ticket", "promotor_visits", "volume"]
    );
    assert!(renamed.column("promotor_calls").is_err());
}

#[test]
fn only_rows_with_zero_volume_and_zero_income_are_dropped() {
    let df = df!(
        "volume" => &[Some(0.0f64), Some(0.0), Some(4.0), None, Some(0.0)],
        "income" => &[Some(0.0f64), Some(2.0), Some(0.0), Some(0.0), None],
    )
    .unwrap();
    let filtered = drop_empty_orders(&df).unwrap();
    assert_eq!(filtered.height(), 4);

    let volume: Vec<Option<f64>> = filtered.column("volume").unwrap().f64().unwrap().into_iter().collect();
    assert_eq!(volume, [Some(0.0), Some(4.0), None, Some(0.0)]);
}

#[test]
fn clean_orders_produces_dated_canonical_table() {
    let cleaned = clean_orders(&raw_export()).unwrap();

    // one duplicate and one all-zero row removed
    assert_eq!(cleaned.height(), 3);
    assert_eq!(column_names(&cleaned)[0], "date");
    assert_eq!(cleaned.column("date").unwrap().dtype(), &DataType::Date);

    for name in ["median_ticket", "promotor_visits", "promotor_calls"] {
        assert!(cleaned.column(name).is_ok(), "missing {name}");
    }

    let cities: Vec<&str> = cleaned
        .column("city")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(cities, ["Cadiz", "Castellon", "Madrid"]);
    assert!(!cities.contains(&"C√°diz"));

    let first_date = cleaned
        .column("date")
        .unwrap()
        .as_materialized_series()
        .date()
        .unwrap()
        .as_date_iter()
        .next()
        .flatten();
    assert_eq!(first_date, chrono::NaiveDate::from_ymd_opt(2023, 3, 2));
    assert!(cleaned.column("__source_row").is_err());
}

#[test]
fn zero_row_for_corrupted_city_is_dropped_entirely() {
    let cleaned = clean_orders(&raw_export()).unwrap();
    let volume = cleaned.column("volume").unwrap().f64().unwrap();
    let income = cleaned.column("income").unwrap().f64().unwrap();
    for idx in 0..cleaned.height() {
        assert!(!(volume.get(idx) == Some(0.0) && income.get(idx) == Some(0.0)));
    }
}

#[test]
fn malformed_date_is_a_parse_error() {
    let mut raw = raw_export();
    raw.with_column(Series::new(
        "Date".into(),
        &["01.03.2023", "2023-03-02", "02.03.2023", "06.03.2023", "07.03.2023"],
    ))
    .unwrap();

    match clean_orders(&raw).unwrap_err() {
        PipelineError::DateParse { row, value, .. } => {
            assert_eq!(row, 1);
            assert_eq!(value, "2023-03-02");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn date_error_after_duplicates_reports_the_export_row() {
    let mut raw = raw_export();
    // rows 1 and 2 are duplicates, so the bad date sits at position 2 after de-duplication
    raw.with_column(Series::new(
        "Date".into(),
        &["01.03.2023", "02.03.2023", "02.03.2023", "6/3/2023", "07.03.2023"],
    ))
    .unwrap();

    match clean_orders(&raw).unwrap_err() {
        PipelineError::DateParse { row, value, .. } => {
            assert_eq!(row, 3);
            assert_eq!(value, "6/3/2023");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_date_stays_missing() {
    let mut raw = raw_export();
    raw.with_column(Series::new(
        "Date".into(),
        &[Some("01.03.2023"), None, Some("02.03.2023"), Some("06.03.2023"), Some("07.03.2023")],
    ))
    .unwrap();

    let cleaned = clean_orders(&raw).unwrap();
    assert_eq!(cleaned.column("date").unwrap().null_count(), 1);
}

#[test]
fn missing_required_column_is_a_schema_error() {
    let raw = raw_export().drop("Income").unwrap();
    match clean_orders(&raw).unwrap_err() {
        PipelineError::MissingColumn(name) => assert_eq!(name, "income"),
        other => panic!("unexpected error: {other}"),
    }
}
