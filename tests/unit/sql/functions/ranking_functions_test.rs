/*!
# Tests for Ranking Functions

RANK, DENSE_RANK, NTILE, PERCENT_RANK, CUME_DIST and the percentile pair,
evaluated through named windows. Every function here needs an ORDER BY on
its window.
*/

use crate::unit::common::*;

fn ranked_query(values: &[i64], column: &str, call: &str, window: WindowSpec) -> Vec<Row> {
    let mut query = Query::new(int_rows("b", values));
    query.window("win", window).select(
        Selection::new()
            .field("b")
            .expr(column, call)
            .unwrap(),
    );
    run(&query)
}

fn floats(rows: &[Row], field: &str) -> Vec<f64> {
    rows.iter().map(|r| r.resolve(field).to_number()).collect()
}

#[test]
fn test_rank_with_ties() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "rank",
        "RANK() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "rank"), ints(&[1, 2, 2, 4]));
}

#[test]
fn test_rank_with_growing_frame_matches_full_frame() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "rank",
        "RANK() OVER win",
        WindowSpec::new().order_by(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "rank"), ints(&[1, 2, 2, 4]));
}

#[test]
fn test_rank_output_follows_input_order() {
    let rows = ranked_query(
        &[5, 2, 4, 4],
        "rank",
        "RANK() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "b"), ints(&[5, 2, 4, 4]));
    assert_eq!(column(&rows, "rank"), ints(&[4, 1, 2, 2]));
}

#[test]
fn test_dense_rank() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "dense",
        "DENSE_RANK() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "dense"), ints(&[1, 2, 2, 3]));
}

#[test]
fn test_ntile() {
    let rows = ranked_query(
        &[1, 2, 3, 4],
        "tile",
        "NTILE(2) OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "tile"), ints(&[1, 1, 2, 2]));
}

#[test]
fn test_percent_rank_and_cume_dist() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "pr",
        "PERCENT_RANK() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(floats(&rows, "pr"), vec![0.0, 1.0 / 3.0, 1.0 / 3.0, 1.0]);

    let rows = ranked_query(
        &[2, 4, 4, 5],
        "cd",
        "CUME_DIST() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(floats(&rows, "cd"), vec![0.25, 0.75, 0.75, 1.0]);
}

#[test]
fn test_percent_rank_of_single_row_is_zero() {
    let rows = ranked_query(
        &[7],
        "pr",
        "PERCENT_RANK() OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(rows[0].resolve("pr"), FieldValue::Float(0.0));
}

#[test]
fn test_percentile_dist_returns_last_row_of_tie_run() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "median",
        "PERCENTILE_DIST(0.5) OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(column(&rows, "median"), ints(&[4, 4, 4, 4]));

    let rows = ranked_query(
        &[2, 4, 4, 5],
        "top",
        "PERCENTILE_DIST(1, b) OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(rows[0].resolve("top"), FieldValue::Integer(5));
}

#[test]
fn test_percentile_cont_interpolates() {
    let rows = ranked_query(
        &[2, 4, 4, 5],
        "p50",
        "PERCENTILE_CONT(0.5) OVER win",
        full_window(OrderBy::asc("b")),
    );
    assert_eq!(rows[0].resolve("p50"), FieldValue::Float(3.0));

    let rows = ranked_query(
        &[10, 20],
        "p",
        "PERCENTILE_CONT(0.25) OVER win",
        full_window(OrderBy::asc("b")),
    );
    // First run reaches 0.5 >= 0.25 with no lower key
    assert_eq!(rows[0].resolve("p"), FieldValue::Float(10.0));
}

#[test]
fn test_percentile_with_comparator_needs_key_argument() {
    let window = full_window(OrderBy::comparator(|a: &Row, b: &Row| {
        a.resolve("b").to_number().total_cmp(&b.resolve("b").to_number())
    }));
    let mut query = Query::new(int_rows("b", &[1, 2]));
    query
        .window("win", window)
        .select(Selection::new().expr("p", "PERCENTILE_DIST(0.5) OVER win").unwrap());
    let err = query.to_vec().unwrap_err();
    assert!(err.is_configuration_error());
}

#[test]
fn test_ranking_without_order_by_is_a_configuration_error() {
    let mut query = Query::new(int_rows("b", &[1, 2]));
    query.select(Selection::new().expr("r", "RANK() OVER ()").unwrap());
    assert!(query.to_vec().unwrap_err().is_configuration_error());

    let mut query = Query::new(int_rows("b", &[1, 2]));
    query
        .window("unordered", WindowSpec::new().partition_by_field("b"))
        .select(Selection::new().expr("r", "DENSE_RANK() OVER unordered").unwrap());
    assert!(query.to_vec().unwrap_err().is_configuration_error());
}

#[test]
fn test_rank_within_partitions() {
    let rows = vec![
        row! {"team" => "a", "score" => 10},
        row! {"team" => "b", "score" => 7},
        row! {"team" => "a", "score" => 30},
        row! {"team" => "b", "score" => 9},
        row! {"team" => "a", "score" => 20},
    ];
    let mut query = Query::new(rows);
    query
        .window(
            "by_team",
            WindowSpec::new()
                .partition_by_field("team")
                .order_by(OrderBy::desc("score")),
        )
        .select(
            Selection::new()
                .field("team")
                .expr("rank", "RANK() OVER by_team")
                .unwrap()
                .expr("n", "ROW_NUMBER() OVER by_team")
                .unwrap(),
        );

    let out = run(&query);
    assert_eq!(column(&out, "rank"), ints(&[3, 2, 1, 1, 2]));
    assert_eq!(column(&out, "n"), ints(&[3, 2, 1, 1, 2]));
}
