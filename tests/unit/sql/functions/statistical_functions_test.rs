/*!
# Tests for Statistical Functions

Population and sample variance/standard deviation, the STDDEV and VARIANCE
aliases, and NULL for degenerate sample statistics at the query level.
*/

use crate::unit::common::*;
use veloquery::sql::execution::functions::{BuiltinFunction, StatisticalFunction};

fn as_f64(value: FieldValue) -> f64 {
    match value {
        FieldValue::Float(f) => f,
        other => panic!("expected a float, got {:?}", other),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_population_statistics() {
    let data = ints(&[2, 4, 4, 4, 5, 5, 7, 9]);
    assert_close(as_f64(StatisticalFunction::VarPop.apply(&data)), 4.0);
    assert_close(as_f64(StatisticalFunction::StddevPop.apply(&data)), 2.0);
}

#[test]
fn test_sample_statistics() {
    let data = ints(&[2, 4, 4, 4, 5, 5, 7, 9]);
    assert_close(as_f64(StatisticalFunction::VarSamp.apply(&data)), 32.0 / 7.0);
    assert_close(
        as_f64(StatisticalFunction::StddevSamp.apply(&data)),
        (32.0f64 / 7.0).sqrt(),
    );
}

#[test]
fn test_aliases_resolve_to_sample_variants() {
    assert_eq!(
        BuiltinFunction::lookup("STDDEV"),
        Some(BuiltinFunction::Statistical(StatisticalFunction::StddevSamp))
    );
    assert_eq!(
        BuiltinFunction::lookup("VARIANCE"),
        Some(BuiltinFunction::Statistical(StatisticalFunction::VarSamp))
    );
}

#[test]
fn test_degenerate_inputs_are_nan() {
    assert!(as_f64(StatisticalFunction::VarSamp.apply(&ints(&[3]))).is_nan());
    assert!(as_f64(StatisticalFunction::VarPop.apply(&[])).is_nan());
    assert_close(as_f64(StatisticalFunction::VarPop.apply(&ints(&[3]))), 0.0);
}

#[test]
fn test_statistics_in_query() {
    let mut query = Query::new(int_rows("x", &[2, 4, 4, 4, 5, 5, 7, 9]));
    query.select(
        Selection::new()
            .expr("sd", "STDDEV_POP(x)")
            .unwrap()
            .expr("var", "VAR_SAMP(x)")
            .unwrap(),
    );
    let rows = run(&query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].resolve("sd"), FieldValue::Float(2.0));

    let mut single = Query::new(int_rows("x", &[3]));
    single.select(Selection::new().expr("sd", "STDDEV(x)").unwrap());
    assert_eq!(run(&single)[0].resolve("sd"), FieldValue::Null);
}
