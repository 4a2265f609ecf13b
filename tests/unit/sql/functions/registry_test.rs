use crate::unit::common::*;
use veloquery::sql::execution::functions::{
    AggregateFunction, BuiltinFunction, PositionFunction, RankingFunction, registered_names,
};

#[test]
fn test_every_family_is_registered() {
    let names = registered_names();
    for name in [
        "ROW_NUMBER", "SUM", "AVG", "MAX", "MIN", "COUNT", "LISTAGG", "ARRAY", "JSON", "ANY",
        "RANDOM", "RANK", "DENSE_RANK", "NTILE", "PERCENT_RANK", "CUME_DIST", "PERCENTILE_DIST",
        "PERCENTILE_CONT", "LEAD", "LAG", "FIRST_VALUE", "LAST_VALUE", "NTH_VALUE", "STDDEV_POP",
        "STDDEV_SAMP", "VAR_POP", "VAR_SAMP",
    ] {
        assert!(names.contains(&name), "{} should be registered", name);
    }
}

#[test]
fn test_lookup_resolves_families() {
    assert_eq!(BuiltinFunction::lookup("ROW_NUMBER"), Some(BuiltinFunction::RowNumber));
    assert_eq!(
        BuiltinFunction::lookup("SUM"),
        Some(BuiltinFunction::Aggregate(AggregateFunction::Sum))
    );
    assert_eq!(
        BuiltinFunction::lookup("NTILE"),
        Some(BuiltinFunction::Ranking(RankingFunction::Ntile))
    );
    assert_eq!(
        BuiltinFunction::lookup("LAG"),
        Some(BuiltinFunction::Position(PositionFunction::Lag))
    );
    assert_eq!(BuiltinFunction::lookup("sum"), None);
    assert_eq!(BuiltinFunction::lookup("FROBNICATE"), None);
}

#[test]
fn test_family_traits() {
    let sum = BuiltinFunction::lookup("SUM").unwrap();
    let rank = BuiltinFunction::lookup("RANK").unwrap();
    let stddev = BuiltinFunction::lookup("STDDEV_POP").unwrap();
    assert!(sum.is_group_aggregate() && !sum.requires_order_by());
    assert!(rank.requires_order_by() && !rank.is_group_aggregate());
    assert!(stddev.is_group_aggregate());
    assert!(!BuiltinFunction::RowNumber.requires_order_by());
}

#[test]
fn test_unknown_function_fails_when_selection_is_built() {
    let err = Selection::new().expr("x", "FROBNICATE(a)").unwrap_err();
    assert!(err.is_configuration_error());

    let err = Selection::new().expr("x", "SUM(a").unwrap_err();
    assert!(matches!(err, SqlError::ParseError { .. }));
}
