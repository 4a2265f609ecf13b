/*!
# Tests for the Query Pipeline

Stage ordering, filtering, sorting, distinct and offset/limit behavior of
`Query`, and re-execution of the same query.
*/

use crate::unit::common::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_select_copies_only_named_fields() {
    let mut query = Query::new(vec![row! {"a" => 1, "b" => 2, "c" => 3}]);
    query.select(["a", "b"]);
    let rows = run(&query);
    assert_eq!(rows, vec![row! {"a" => 1, "b" => 2}]);
    assert_eq!(rows[0].field_count(), 2);
}

#[test]
fn test_without_selection_rows_pass_through() {
    let input = int_rows("a", &[3, 1, 2]);
    let query = Query::new(input.clone());
    assert_eq!(run(&query), input);
}

#[test]
fn test_offset_then_fetch_first() {
    let mut query = Query::new(int_rows("i", &[0, 1, 2]));
    query.offset(1).fetch_first(2);
    assert_eq!(column(&run(&query), "i"), ints(&[1, 2]));

    let mut query = Query::new(int_rows("i", &[0, 1, 2, 3, 4]));
    query.offset(1).fetch_first(2);
    assert_eq!(column(&run(&query), "i"), ints(&[1, 2]));
}

#[test]
fn test_fetch_first_zero_never_reads_the_source() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let mut query = Query::from_stream((0..3).map(move |i| {
        counter.fetch_add(1, Ordering::SeqCst);
        Row::new().with_field("i", i as i64)
    }));
    query.fetch_first(0);
    assert!(run(&query).is_empty());
    assert_eq!(pulled.load(Ordering::SeqCst), 0);
}

#[test]
fn test_limit_stops_pulling_from_a_lazy_source() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let mut query = Query::from_stream((0..100).map(move |i| {
        counter.fetch_add(1, Ordering::SeqCst);
        Row::new().with_field("i", i as i64)
    }));
    query.fetch_first(3);
    assert_eq!(column(&run(&query), "i"), ints(&[0, 1, 2]));
    assert_eq!(pulled.load(Ordering::SeqCst), 3);
}

#[test]
fn test_filters_are_and_combined_with_their_own_index() {
    let mut query = Query::new(int_rows("v", &[5, 6, 7, 8, 9, 10]));
    query
        .filter(|row, _| row.resolve("v").to_number() as i64 % 2 == 0)
        .filter(|_, index| index < 2);
    // The second predicate only counts rows that passed the first
    assert_eq!(column(&run(&query), "v"), ints(&[6, 8]));
}

#[test]
fn test_order_by_sort_strings() {
    let rows = vec![
        row! {"name" => "b", "n" => 10},
        row! {"name" => "a", "n" => 9},
        row! {"name" => "c", "n" => 10},
    ];

    let mut query = Query::new(rows.clone());
    query.try_order_by("-n, name").unwrap();
    assert_eq!(
        column(&run(&query), "name"),
        strs(&["b", "c", "a"])
    );

    // Unprefixed keys compare lexicographically: "10" < "9"
    let mut query = Query::new(rows);
    query.try_order_by("n").unwrap();
    assert_eq!(column(&run(&query), "n"), ints(&[10, 10, 9]));
}

/// Every third row holds a value that does not coerce to a number
fn mixed_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            let v = if i % 3 == 0 {
                FieldValue::from("x")
            } else {
                FieldValue::Integer(((i * 7919) % 1000) as i64)
            };
            Row::new().with_field("id", i as i64).with_field("v", v)
        })
        .collect()
}

#[test]
fn test_numeric_order_puts_non_numeric_values_last() {
    let rows = mixed_rows(5000);
    let numeric = rows.iter().filter(|r| r.resolve("v").is_numeric()).count();

    for spec in ["+v", "-v"] {
        let mut query = Query::new(rows.clone());
        query.try_order_by(spec).unwrap();
        let sorted = run(&query);
        assert_eq!(sorted.len(), rows.len());

        let (numbers, rest) = sorted.split_at(numeric);
        let values: Vec<f64> = numbers.iter().map(|r| r.resolve("v").to_number()).collect();
        if spec == "+v" {
            assert!(values.windows(2).all(|w| w[0] <= w[1]));
        } else {
            assert!(values.windows(2).all(|w| w[0] >= w[1]));
        }
        assert!(rest.iter().all(|r| r.resolve("v") == FieldValue::from("x")));
    }
}

#[test]
fn test_order_by_is_stable() {
    let rows = vec![
        row! {"k" => 1, "tag" => "first"},
        row! {"k" => 0, "tag" => "x"},
        row! {"k" => 1, "tag" => "second"},
    ];
    let mut query = Query::new(rows);
    query.order_by(OrderBy::asc("k"));
    assert_eq!(
        column(&run(&query), "tag"),
        strs(&["x", "first", "second"])
    );
}

#[test]
fn test_order_by_comparator() {
    let mut query = Query::new(int_rows("v", &[1, 3, 2]));
    query.order_by_fn(|a, b| {
        b.resolve("v")
            .to_number()
            .total_cmp(&a.resolve("v").to_number())
    });
    assert_eq!(column(&run(&query), "v"), ints(&[3, 2, 1]));
}

#[test]
fn test_malformed_sort_string() {
    let mut query = Query::new(Vec::new());
    let err = query.try_order_by("a, ,b").err().unwrap();
    assert!(matches!(err, SqlError::ParseError { .. }));
}

#[test]
fn test_distinct_is_idempotent() {
    let rows = vec![
        row! {"a" => 1, "b" => "x"},
        row! {"b" => "x", "a" => 1},
        row! {"a" => 2, "b" => "x"},
        row! {"a" => 1},
        row! {"a" => 1, "b" => "x"},
    ];
    let mut once = Query::new(rows);
    once.distinct(true);
    let first = run(&once);
    assert_eq!(first.len(), 3);

    let mut twice = Query::from_query(once.clone());
    twice.distinct(true);
    assert_eq!(run(&twice), first);
}

#[test]
fn test_distinct_applies_before_offset_and_limit() {
    let mut query = Query::new(int_rows("a", &[1, 1, 2, 2, 3, 3]));
    query.distinct(true).offset(1).fetch_first(1);
    assert_eq!(column(&run(&query), "a"), ints(&[2]));
}

#[test]
fn test_distinct_compares_projected_rows() {
    let rows = vec![
        row! {"id" => 1, "city" => "Oslo"},
        row! {"id" => 2, "city" => "Oslo"},
        row! {"id" => 3, "city" => "Rome"},
    ];
    let mut query = Query::new(rows);
    query.select(["city"]).distinct(true);
    assert_eq!(run(&query).len(), 2);
}

#[test]
fn test_query_is_re_executable() {
    let mut query = Query::new(int_rows("v", &[3, 1, 2]));
    query.order_by(OrderBy::asc("v")).fetch_first(2);
    let first = run(&query);
    let second = run(&query);
    assert_eq!(first, second);

    let collected: Vec<Row> = (&query).into_iter().map(|r| r.unwrap()).collect();
    assert_eq!(collected, first);
}

#[test]
fn test_single_use_source_is_empty_on_second_pass() {
    init_logging();
    let query = Query::from_stream(int_rows("v", &[1, 2]));
    assert_eq!(run(&query).len(), 2);
    assert!(run(&query).is_empty());
}

#[test]
fn test_nested_queries() {
    let mut inner = Query::new(int_rows("v", &[1, 2, 3, 4]));
    inner.filter(|row, _| row.resolve("v").to_number() > 1.0);
    let mut outer = Query::from_query(inner);
    outer.select(Selection::new().expr("total", "SUM(v)").unwrap());
    assert_eq!(run(&outer)[0].resolve("total"), FieldValue::Integer(9));
}

#[test]
fn test_errors_end_the_stream() {
    let mut query = Query::new(int_rows("v", &[1, 2, 3]));
    query.select(Selection::new().expr("x", "LAG(v) OVER missing").unwrap());
    let mut stream = query.execute();
    assert!(matches!(stream.next(), Some(Err(SqlError::ConfigurationError { .. }))));
    assert!(stream.next().is_none());
}
