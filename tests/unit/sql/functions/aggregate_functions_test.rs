/*!
# Tests for Aggregate Functions

Direct evaluation over extracted value lists, plus the query-level behavior
of aggregates without GROUP BY (one implicit group, empty-input sentinels).
*/

use crate::unit::common::*;
use veloquery::sql::execution::functions::AggregateFunction;

fn values(items: &[FieldValue]) -> Vec<FieldValue> {
    items.to_vec()
}

#[test]
fn test_sum_keeps_integers_integral() {
    let config = test_config();
    assert_eq!(
        AggregateFunction::Sum.apply(&ints(&[1, 2, 3]), &config),
        FieldValue::Integer(6)
    );
    assert_eq!(
        AggregateFunction::Sum.apply(
            &values(&[FieldValue::Integer(1), FieldValue::Float(2.5)]),
            &config
        ),
        FieldValue::Float(3.5)
    );
    assert_eq!(AggregateFunction::Sum.apply(&[], &config), FieldValue::Integer(0));
}

#[test]
fn test_avg() {
    let config = test_config();
    assert_eq!(
        AggregateFunction::Avg.apply(&ints(&[1, 2, 3, 4]), &config),
        FieldValue::Float(2.5)
    );
    match AggregateFunction::Avg.apply(&[], &config) {
        FieldValue::Float(f) => assert!(f.is_nan()),
        other => panic!("expected NaN, got {:?}", other),
    }
}

#[test]
fn test_max_min_with_sentinels() {
    let config = test_config();
    assert_eq!(
        AggregateFunction::Max.apply(&ints(&[1, 5, 3]), &config),
        FieldValue::Integer(5)
    );
    assert_eq!(
        AggregateFunction::Max.apply(
            &values(&[FieldValue::Integer(3), FieldValue::Float(7.5)]),
            &config
        ),
        FieldValue::Float(7.5)
    );
    assert_eq!(
        AggregateFunction::Min.apply(&ints(&[4, -2, 9]), &config),
        FieldValue::Integer(-2)
    );
    assert_eq!(
        AggregateFunction::Max.apply(&[], &config),
        FieldValue::Float(f64::NEG_INFINITY)
    );
    assert_eq!(
        AggregateFunction::Min.apply(&[], &config),
        FieldValue::Float(f64::INFINITY)
    );
}

#[test]
fn test_count_and_count_distinct() {
    let config = test_config();
    let items = values(&[
        FieldValue::Integer(1),
        FieldValue::Float(1.0),
        FieldValue::Integer(2),
        FieldValue::String("2".into()),
        FieldValue::Null,
    ]);
    assert_eq!(
        AggregateFunction::Count.apply(&items, &config),
        FieldValue::Integer(5)
    );
    assert_eq!(
        AggregateFunction::CountDistinct.apply(&items, &config),
        FieldValue::Integer(4)
    );
    assert_eq!(AggregateFunction::Count.apply(&[], &config), FieldValue::Integer(0));
}

#[test]
fn test_listagg_uses_configured_separator() {
    let items = values(&[
        FieldValue::String("a".into()),
        FieldValue::Integer(1),
        FieldValue::Null,
    ]);
    assert_eq!(
        AggregateFunction::Listagg.apply(&items, &test_config()),
        FieldValue::String("a,1,".into())
    );

    let config = QueryConfig {
        listagg_separator: " | ".to_string(),
        ..QueryConfig::default()
    };
    assert_eq!(
        AggregateFunction::Listagg.apply(&items[..2], &config),
        FieldValue::String("a | 1".into())
    );
}

#[test]
fn test_array_json_any() {
    let config = test_config();
    let items = values(&[FieldValue::Integer(1), FieldValue::String("x".into())]);
    assert_eq!(
        AggregateFunction::Array.apply(&items, &config),
        FieldValue::Array(items.clone())
    );
    assert_eq!(
        AggregateFunction::Json.apply(&items, &config),
        FieldValue::String(r#"[1,"x"]"#.into())
    );
    assert_eq!(
        AggregateFunction::Json.apply(&[], &config),
        FieldValue::String("[]".into())
    );
    assert_eq!(
        AggregateFunction::Any.apply(&items, &config),
        FieldValue::Integer(1)
    );
    assert_eq!(AggregateFunction::Any.apply(&[], &config), FieldValue::Null);
}

#[test]
fn test_random_is_reproducible_with_seed() {
    let config = QueryConfig {
        random_seed: Some(42),
        ..QueryConfig::default()
    };
    let items = ints(&[10, 20, 30, 40]);
    let first = AggregateFunction::Random.apply(&items, &config);
    let second = AggregateFunction::Random.apply(&items, &config);
    assert_eq!(first, second);
    assert!(items.contains(&first));
    assert_eq!(AggregateFunction::Random.apply(&[], &config), FieldValue::Null);
}

#[test]
fn test_median() {
    let config = test_config();
    assert_eq!(
        AggregateFunction::Median.apply(&ints(&[3, 1, 2]), &config),
        FieldValue::Integer(2)
    );
    assert_eq!(
        AggregateFunction::Median.apply(&ints(&[4, 1, 3, 2]), &config),
        FieldValue::Float(2.5)
    );
    assert_eq!(AggregateFunction::Median.apply(&[], &config), FieldValue::Null);

    // Non-numeric values sort after every number
    let mixed = vec![FieldValue::Integer(3), FieldValue::from("n/a"), FieldValue::Integer(1)];
    assert_eq!(
        AggregateFunction::Median.apply(&mixed, &config),
        FieldValue::Float(3.0)
    );
}

#[test]
fn test_sum_without_group_by_yields_one_row() {
    init_logging();
    let mut query = Query::new(int_rows("a", &[1, 2, 3]));
    query.select(Selection::new().expr("total", "SUM(a)").unwrap());

    let rows = run(&query);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].resolve("total"), FieldValue::Integer(6));
    assert_eq!(rows[0].field_count(), 1);
}

#[test]
fn test_aggregates_over_empty_input() {
    let mut query = Query::new(Vec::new());
    query.select(
        Selection::new()
            .expr("sum", "SUM(a)")
            .unwrap()
            .expr("avg", "AVG(a)")
            .unwrap()
            .expr("max", "MAX(a)")
            .unwrap()
            .expr("min", "MIN(a)")
            .unwrap()
            .expr("count", "COUNT(*)")
            .unwrap()
            .field("a"),
    );

    let rows = run(&query);
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.resolve("sum"), FieldValue::Null);
    assert_eq!(row.resolve("avg"), FieldValue::Null);
    assert_eq!(row.resolve("max"), FieldValue::Float(f64::NEG_INFINITY));
    assert_eq!(row.resolve("min"), FieldValue::Float(f64::INFINITY));
    assert_eq!(row.resolve("count"), FieldValue::Integer(0));
    assert_eq!(row.resolve("a"), FieldValue::Null);
}

#[test]
fn test_aggregate_reads_first_row_for_plain_fields() {
    let rows = vec![
        row! {"region" => "east", "amount" => 4},
        row! {"region" => "west", "amount" => 6},
    ];
    let mut query = Query::new(rows);
    query.select(
        Selection::new()
            .field("region")
            .expr("avg", "AVG(amount)")
            .unwrap(),
    );

    let out = run(&query);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].resolve("region"), FieldValue::String("east".into()));
    assert_eq!(out[0].resolve("avg"), FieldValue::Float(5.0));
}
