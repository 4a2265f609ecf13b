// In-memory SQL-style query engine over key-value rows

pub mod config;
pub mod error;
pub mod execution;

// Re-export main API
pub use config::QueryConfig;
pub use error::{SqlError, SqlResult};
pub use execution::{FieldValue, Query, Row};

// Version and feature info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FEATURES: &[&str] = &[
    "lazy_pipeline",
    "joins",              // INNER, LEFT, RIGHT, FULL via the join-stage protocol
    "group_by",
    "aggregate_functions", // SUM, AVG, MAX, MIN, COUNT, LISTAGG, ARRAY, JSON, ANY, RANDOM, MEDIAN, COUNT_DISTINCT
    "window_functions",    // ROW_NUMBER, RANK, DENSE_RANK, NTILE, PERCENT_RANK, CUME_DIST, PERCENTILE_*
    "position_functions",  // LEAD, LAG, FIRST_VALUE, LAST_VALUE, NTH_VALUE
    "statistical_functions", // STDDEV_*, VAR_*
    "set_algebra",         // EXCEPT, INTERSECT, UNION, UNION ALL
];
