//! Query execution: values and rows, the function library, windows,
//! selections, joins, the query pipeline and set algebra.

pub mod functions;
pub mod join;
pub mod order;
pub mod query;
pub mod selection;
pub mod set_ops;
pub mod types;
pub mod utils;
pub mod window;

// Re-export main API
pub use join::{JoinStage, JoinType, NestedLoopJoin};
pub use order::OrderBy;
pub use query::{Query, RowSource, RowStream};
pub use selection::{ColumnSpec, Selection};
pub use set_ops::{except_of, intersect_of, union, union_all};
pub use types::{ColumnRef, FieldValue, Row};
pub use window::{FrameBound, WindowFrame, WindowRef, WindowSpec};
