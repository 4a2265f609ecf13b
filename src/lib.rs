//! # veloquery
//!
//! An embeddable, in-memory query engine. Rows are schemaless name/value
//! maps; a [`Query`] chains relational stages over them (join, filter,
//! sort, group, window, projection, distinct, offset/limit) and evaluates
//! lazily, materializing only where a stage needs the whole row set.
//!
//! ## Quick Start
//!
//! ```rust
//! use veloquery::row;
//! use veloquery::sql::execution::{FieldValue, OrderBy, Query, Selection, WindowSpec};
//!
//! let rows = vec![
//!     row! {"region" => "east", "amount" => 10},
//!     row! {"region" => "west", "amount" => 7},
//!     row! {"region" => "east", "amount" => 5},
//! ];
//!
//! let mut query = Query::new(rows);
//! query
//!     .window("by_amount", WindowSpec::new().partition_by_field("region").order_by(OrderBy::desc("amount")))
//!     .select(
//!         Selection::new()
//!             .field("region")
//!             .field("amount")
//!             .expr("rank", "RANK() OVER by_amount")
//!             .unwrap(),
//!     );
//!
//! let out = query.to_vec().unwrap();
//! assert_eq!(out[2].get_field("rank"), Some(&FieldValue::Integer(2)));
//! ```

pub mod sql;

// Re-export main API at crate root for easy access
pub use sql::config::QueryConfig;
pub use sql::error::{SqlError, SqlResult};
pub use sql::execution::{
    ColumnRef, ColumnSpec, FieldValue, JoinType, OrderBy, Query, Row, RowSource, Selection,
    WindowSpec, except_of, intersect_of, union, union_all,
};
