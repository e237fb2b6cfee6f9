mod common;

use airprep_core::consolidation::stack_tables;
use airprep_parser::parse_csv_table;
use polars::prelude::DataType;

use common::fixture_table;

#[test]
fn same_schema_tables_stack_in_order() {
    let tables = vec![
        fixture_table("delhi_2024_01.csv"),
        fixture_table("header_only.csv"),
        fixture_table("delhi_2024_03.csv"),
    ];
    let columns = tables[0].column_names();

    let outcome = stack_tables(tables);

    assert!(outcome.is_clean());
    let stacked = outcome.value.expect("stacked table");
    assert_eq!(stacked.height(), 9);
    assert_eq!(stacked.column_names(), columns);

    let parameters = stacked.column("parameter").unwrap().str().unwrap();
    assert_eq!(parameters.get(0), Some("pm25"));
    assert_eq!(parameters.get(8), Some("temperature"));

    let ids = stacked.column("location_id").unwrap();
    assert_eq!(ids.dtype(), &DataType::Int64);
}

#[test]
fn integer_and_float_columns_widen_to_float() {
    let ints = parse_csv_table(b"date,value\n2024-01-01,1\n2024-01-02,2\n").expect("parse");
    let floats = parse_csv_table(b"date,value\n2024-01-03,2.5\n").expect("parse");

    let stacked = stack_tables(vec![ints, floats])
        .value
        .expect("stacked table");

    let values = stacked.column("value").unwrap().f64().unwrap();
    assert_eq!(values.get(0), Some(1.0));
    assert_eq!(values.get(2), Some(2.5));
}

#[test]
fn text_mixed_with_numbers_widens_to_string() {
    let numbers = parse_csv_table(b"site,value\n101,1.0\n").expect("parse");
    let names = parse_csv_table(b"site,value\nanand-vihar,2.0\n").expect("parse");

    let stacked = stack_tables(vec![numbers, names])
        .value
        .expect("stacked table");

    let sites = stacked.column("site").unwrap().str().unwrap();
    assert_eq!(sites.get(0), Some("101"));
    assert_eq!(sites.get(1), Some("anand-vihar"));
}

#[test]
fn columns_are_aligned_by_name() {
    let tables = vec![
        fixture_table("delhi_2024_01.csv"),
        fixture_table("reordered.csv"),
    ];

    let stacked = stack_tables(tables).value.expect("stacked table");

    assert_eq!(stacked.height(), 6);
    let dates = stacked.column("date").unwrap().str().unwrap();
    assert_eq!(dates.get(5), Some("2024-04-01T00:00:00+00:00"));
}

#[test]
fn empty_input_is_an_anomaly() {
    let outcome = stack_tables(Vec::new());

    assert!(outcome.value.is_none());
    assert_eq!(outcome.anomalies.messages(), ["No tables to stack."]);
}

#[test]
fn tables_without_shared_columns_cannot_stack() {
    let tables = vec![
        fixture_table("delhi_2024_01.csv"),
        fixture_table("pivoted.csv"),
    ];

    let outcome = stack_tables(tables);

    assert!(outcome.value.is_none());
    assert!(outcome.anomalies.has_errors());
}
