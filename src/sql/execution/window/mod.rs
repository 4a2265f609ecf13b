//! Window specifications and the window evaluator.
//!
//! A window narrows the row-group a ranking, position or aggregate function
//! sees for one source row: partition, then order, then frame.
//!
//! ```rust
//! use veloquery::sql::execution::order::OrderBy;
//! use veloquery::sql::execution::window::{FrameBound, WindowSpec};
//!
//! let spec = WindowSpec::new()
//!     .partition_by_field("region")
//!     .order_by(OrderBy::desc("amount"))
//!     .rows_between(FrameBound::UnboundedPreceding, FrameBound::UnboundedFollowing);
//! assert!(spec.order_by.is_some());
//! ```

pub mod evaluator;

pub use evaluator::{WindowEvaluator, WindowView};

use crate::sql::error::SqlError;
use crate::sql::execution::order::OrderBy;
use crate::sql::execution::types::{FieldValue, Row};
use std::fmt;
use std::sync::Arc;

/// Caller-supplied partition discriminator
pub type PartitionFn = Arc<dyn Fn(&Row) -> FieldValue + Send + Sync>;

/// PARTITION BY: a field name or a discriminator function
#[derive(Clone)]
pub enum PartitionBy {
    Field(String),
    Function(PartitionFn),
}

impl PartitionBy {
    /// Partition key of a row
    pub fn key(&self, row: &Row) -> FieldValue {
        match self {
            PartitionBy::Field(name) => row.resolve(name),
            PartitionBy::Function(f) => f(row),
        }
    }
}

impl fmt::Debug for PartitionBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionBy::Field(name) => f.debug_tuple("Field").field(name).finish(),
            PartitionBy::Function(_) => write!(f, "Function(<fn>)"),
        }
    }
}

/// Framing unit; only `ROWS` is executable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameUnit {
    Rows,
    Range,
    Groups,
}

impl FrameUnit {
    pub fn parse(unit: &str) -> Result<FrameUnit, SqlError> {
        match unit.trim().to_ascii_uppercase().as_str() {
            "ROWS" => Ok(FrameUnit::Rows),
            "RANGE" => Ok(FrameUnit::Range),
            "GROUPS" => Ok(FrameUnit::Groups),
            other => Err(SqlError::configuration_error(format!(
                "Unknown framing unit '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for FrameUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameUnit::Rows => write!(f, "ROWS"),
            FrameUnit::Range => write!(f, "RANGE"),
            FrameUnit::Groups => write!(f, "GROUPS"),
        }
    }
}

/// One end of a frame, relative to the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameBound {
    UnboundedPreceding,
    UnboundedFollowing,
    CurrentRow,
    /// Signed row offset: negative is preceding, positive is following
    Offset(i64),
}

impl FrameBound {
    /// Parse `UNBOUNDED PRECEDING`, `CURRENT ROW`, `3 PRECEDING`, `2 FOLLOWING` or a signed integer
    pub fn parse(bound: &str) -> Result<FrameBound, SqlError> {
        let normalized = bound.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_uppercase().as_str() {
            "UNBOUNDED PRECEDING" => Ok(FrameBound::UnboundedPreceding),
            "UNBOUNDED FOLLOWING" => Ok(FrameBound::UnboundedFollowing),
            "CURRENT ROW" => Ok(FrameBound::CurrentRow),
            other => {
                let parsed = if let Some(n) = other.strip_suffix(" PRECEDING") {
                    n.trim().parse::<i64>().ok().and_then(i64::checked_neg)
                } else if let Some(n) = other.strip_suffix(" FOLLOWING") {
                    n.trim().parse::<i64>().ok()
                } else {
                    other.parse::<i64>().ok()
                };
                parsed.map(FrameBound::Offset).ok_or_else(|| {
                    SqlError::configuration_error(format!("Invalid frame bound '{}'", bound))
                })
            }
        }
    }

    /// Resolve to an inclusive row index given the current position
    ///
    /// Unbounded ends resolve far outside any view; callers clamp.
    pub(crate) fn resolve(&self, position: usize) -> i64 {
        const UNBOUNDED: i64 = i64::MAX / 4;
        match self {
            FrameBound::UnboundedPreceding => -UNBOUNDED,
            FrameBound::UnboundedFollowing => UNBOUNDED,
            FrameBound::CurrentRow => position as i64,
            FrameBound::Offset(n) => (position as i64).saturating_add(*n),
        }
    }
}

/// `[unit, start, end]` framing of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowFrame {
    pub unit: FrameUnit,
    pub start: FrameBound,
    pub end: FrameBound,
}

impl WindowFrame {
    /// `ROWS BETWEEN start AND end`
    pub fn rows(start: FrameBound, end: FrameBound) -> Self {
        Self {
            unit: FrameUnit::Rows,
            start,
            end,
        }
    }

    /// Parse the `[unit, start, end]` triple
    pub fn parse(unit: &str, start: &str, end: &str) -> Result<Self, SqlError> {
        Ok(Self {
            unit: FrameUnit::parse(unit)?,
            start: FrameBound::parse(start)?,
            end: FrameBound::parse(end)?,
        })
    }
}

impl Default for WindowFrame {
    /// Growing frame from the partition start to the current row
    fn default() -> Self {
        WindowFrame::rows(FrameBound::UnboundedPreceding, FrameBound::CurrentRow)
    }
}

/// Partitioning, ordering and framing of a window
#[derive(Debug, Clone, Default)]
pub struct WindowSpec {
    pub partition_by: Option<PartitionBy>,
    pub order_by: Option<OrderBy>,
    pub frame: Option<WindowFrame>,
}

impl WindowSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partition_by_field(mut self, field: impl Into<String>) -> Self {
        self.partition_by = Some(PartitionBy::Field(field.into()));
        self
    }

    pub fn partition_by_fn<F>(mut self, discriminator: F) -> Self
    where
        F: Fn(&Row) -> FieldValue + Send + Sync + 'static,
    {
        self.partition_by = Some(PartitionBy::Function(Arc::new(discriminator)));
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// Order by a sort string (`"+b"`, `"-price, name"`)
    pub fn order_by_str(self, spec: &str) -> Result<Self, SqlError> {
        Ok(self.order_by(OrderBy::parse(spec)?))
    }

    pub fn frame(mut self, frame: WindowFrame) -> Self {
        self.frame = Some(frame);
        self
    }

    /// `ROWS BETWEEN start AND end`
    pub fn rows_between(self, start: FrameBound, end: FrameBound) -> Self {
        self.frame(WindowFrame::rows(start, end))
    }
}

/// Reference to the window a selection column is evaluated over
#[derive(Debug, Clone)]
pub enum WindowRef {
    /// A window registered on the query with `window(name, spec)`
    Named(String),
    /// A window given in place
    Inline(WindowSpec),
    /// `OVER ()`: the whole row-group, unpartitioned and unordered
    Whole,
}

impl From<&str> for WindowRef {
    fn from(value: &str) -> Self {
        match value.trim() {
            "()" => WindowRef::Whole,
            name => WindowRef::Named(name.to_string()),
        }
    }
}

impl From<String> for WindowRef {
    fn from(value: String) -> Self {
        WindowRef::from(value.as_str())
    }
}

impl From<WindowSpec> for WindowRef {
    fn from(value: WindowSpec) -> Self {
        WindowRef::Inline(value)
    }
}
