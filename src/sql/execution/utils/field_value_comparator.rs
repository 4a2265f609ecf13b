//! Field Value Comparison Utilities
//!
//! Handles equality and ordering between FieldValue instances.
//! These are pure comparison functions with no pipeline state dependency.
use crate::sql::execution::types::FieldValue;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Utility class for comparing FieldValue instances
pub struct FieldValueComparator;

impl FieldValueComparator {
    /// Strict equality between two values
    ///
    /// `Integer` and `Float` share one number domain, so `1` equals `1.0`.
    /// `NaN` never equals anything (itself included). Values of different
    /// non-numeric types are never equal. Nested arrays and maps compare
    /// element-wise.
    pub fn strict_eq(left: &FieldValue, right: &FieldValue) -> bool {
        match (left, right) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Float(b)) => (*a as f64) == *b,
            (FieldValue::Float(a), FieldValue::Integer(b)) => *a == (*b as f64),
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a == b,
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Array(a), FieldValue::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| Self::strict_eq(x, y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, v)| b.get(k).is_some_and(|bv| Self::strict_eq(v, bv)))
            }
            _ => false,
        }
    }

    /// Ascending numeric ordering after coercing both sides with
    /// [`FieldValue::to_number`]
    ///
    /// Values that do not coerce (`NaN`) sort after every number and tie
    /// with each other, so the ordering stays total.
    pub fn compare_numeric(left: &FieldValue, right: &FieldValue) -> Ordering {
        Self::compare_f64(left.to_number(), right.to_number())
    }

    /// Descending numeric ordering; `NaN` still sorts last
    pub fn compare_numeric_desc(left: &FieldValue, right: &FieldValue) -> Ordering {
        let (a, b) = (left.to_number(), right.to_number());
        match (a.is_nan(), b.is_nan()) {
            (false, false) => Self::compare_f64(b, a),
            _ => Self::compare_f64(a, b),
        }
    }

    /// Total order on floats: numbers ascending (`-0.0 == 0.0`), then `NaN`
    pub fn compare_f64(a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    /// Lexicographic ordering of display strings; `NULL` sorts first
    pub fn compare_lexicographic(left: &FieldValue, right: &FieldValue) -> Ordering {
        match (left, right) {
            (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
            (FieldValue::Null, _) => Ordering::Less,
            (_, FieldValue::Null) => Ordering::Greater,
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (a, b) => a.to_display_string().cmp(&b.to_display_string()),
        }
    }
}

/// A hashable grouping/partition key
///
/// Equality follows [`FieldValueComparator::strict_eq`], except that `NaN`
/// keys are considered equal to each other so they land in one group.
#[derive(Debug, Clone)]
pub struct GroupKey(pub FieldValue);

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (FieldValue::Float(a), FieldValue::Float(b)) if a.is_nan() && b.is_nan() => true,
            (a, b) => FieldValueComparator::strict_eq(a, b),
        }
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_value(&self.0, state);
    }
}

fn hash_value<H: Hasher>(value: &FieldValue, state: &mut H) {
    match value {
        FieldValue::Integer(_) | FieldValue::Float(_) => {
            0u8.hash(state);
            let n = value.to_number();
            // -0.0 == 0.0 and all NaNs group together
            let bits = if n == 0.0 {
                0u64
            } else if n.is_nan() {
                f64::NAN.to_bits()
            } else {
                n.to_bits()
            };
            bits.hash(state);
        }
        FieldValue::String(s) => {
            1u8.hash(state);
            s.hash(state);
        }
        FieldValue::Boolean(b) => {
            2u8.hash(state);
            b.hash(state);
        }
        FieldValue::Null => 3u8.hash(state),
        FieldValue::Array(arr) => {
            4u8.hash(state);
            arr.len().hash(state);
            for elem in arr {
                hash_value(elem, state);
            }
        }
        FieldValue::Map(map) => {
            // Sort keys for deterministic hashing
            5u8.hash(state);
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            keys.len().hash(state);
            for key in keys {
                key.hash(state);
                hash_value(&map[key], state);
            }
        }
    }
}
