//! ORDER BY specifications
//!
//! Sorting is used in two places: the pipeline's own `orderBy` stage and the
//! `orderBy` of a window specification. Both accept either a sort string or
//! an arbitrary row comparator. Sort strings are one or more comma-separated
//! keys; each key is a field name, optionally prefixed with `+` (numeric
//! ascending) or `-` (numeric descending). Unprefixed keys compare
//! lexicographically.

use crate::sql::error::SqlError;
use crate::sql::execution::types::{FieldValue, Row};
use crate::sql::execution::utils::FieldValueComparator;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied comparator between two rows
pub type RowComparator = Arc<dyn Fn(&Row, &Row) -> Ordering + Send + Sync>;

/// How a single sort key compares values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Compare display strings (no prefix)
    Lexicographic,
    /// Numeric ascending (`+` prefix)
    NumericAsc,
    /// Numeric descending (`-` prefix)
    NumericDesc,
}

/// One key of a sort string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub mode: SortMode,
}

impl SortKey {
    fn compare(&self, a: &Row, b: &Row) -> Ordering {
        let left = a.get_field(&self.field).unwrap_or(&FieldValue::Null);
        let right = b.get_field(&self.field).unwrap_or(&FieldValue::Null);
        match self.mode {
            SortMode::Lexicographic => FieldValueComparator::compare_lexicographic(left, right),
            SortMode::NumericAsc => FieldValueComparator::compare_numeric(left, right),
            SortMode::NumericDesc => FieldValueComparator::compare_numeric_desc(left, right),
        }
    }
}

/// A resolved ordering
#[derive(Clone)]
pub enum OrderBy {
    /// Parsed sort keys, compared in priority order
    Keys(Vec<SortKey>),
    /// Arbitrary comparator
    Comparator(RowComparator),
}

impl fmt::Debug for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBy::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            OrderBy::Comparator(_) => write!(f, "Comparator(<fn>)"),
        }
    }
}

impl OrderBy {
    /// Parse a sort string such as `"-price, name"`
    pub fn parse(spec: &str) -> Result<OrderBy, SqlError> {
        let mut keys = Vec::new();
        let mut position = 0;
        for part in spec.split(',') {
            let key = part.trim();
            let (mode, field) = if let Some(rest) = key.strip_prefix('+') {
                (SortMode::NumericAsc, rest.trim())
            } else if let Some(rest) = key.strip_prefix('-') {
                (SortMode::NumericDesc, rest.trim())
            } else {
                (SortMode::Lexicographic, key)
            };
            if field.is_empty() {
                return Err(SqlError::parse_error(
                    format!("Empty sort key in '{}'", spec),
                    Some(position),
                ));
            }
            keys.push(SortKey {
                field: field.to_string(),
                mode,
            });
            position += part.len() + 1;
        }
        Ok(OrderBy::Keys(keys))
    }

    /// Lexicographic order on one field
    pub fn field(name: impl Into<String>) -> OrderBy {
        OrderBy::single(name, SortMode::Lexicographic)
    }

    /// Numeric ascending order on one field (`+field`)
    pub fn asc(name: impl Into<String>) -> OrderBy {
        OrderBy::single(name, SortMode::NumericAsc)
    }

    /// Numeric descending order on one field (`-field`)
    pub fn desc(name: impl Into<String>) -> OrderBy {
        OrderBy::single(name, SortMode::NumericDesc)
    }

    fn single(name: impl Into<String>, mode: SortMode) -> OrderBy {
        OrderBy::Keys(vec![SortKey {
            field: name.into(),
            mode,
        }])
    }

    /// Wrap a comparator closure
    pub fn comparator<F>(compare: F) -> OrderBy
    where
        F: Fn(&Row, &Row) -> Ordering + Send + Sync + 'static,
    {
        OrderBy::Comparator(Arc::new(compare))
    }

    /// Compare two rows
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        match self {
            OrderBy::Keys(keys) => {
                for key in keys {
                    let ordering = key.compare(a, b);
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                Ordering::Equal
            }
            OrderBy::Comparator(compare) => compare(a, b),
        }
    }

    /// Field of the first sort key, when the ordering is key-based
    pub fn primary_field(&self) -> Option<&str> {
        match self {
            OrderBy::Keys(keys) => keys.first().map(|k| k.field.as_str()),
            OrderBy::Comparator(_) => None,
        }
    }

    /// Stable in-place sort
    pub fn sort_rows(&self, rows: &mut [Row]) {
        rows.sort_by(|a, b| self.compare(a, b));
    }
}
