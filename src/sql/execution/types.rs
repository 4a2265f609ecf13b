//! Core query data types.
//!
//! This module contains the fundamental data types used throughout the query engine:
//! - [`FieldValue`] - The dynamically-typed value stored in a row field
//! - [`Row`] - An insertion-ordered mapping from field name to value
//! - [`ColumnRef`] - Lookup of a row value by field name or column position

use crate::sql::error::SqlError;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A value in a row field
///
/// Rows carry no schema, so every field holds one of these variants. Numeric
/// values keep their integer-ness where it is known, but arithmetic and
/// comparisons treat `Integer` and `Float` as one number domain.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number (may hold `±∞` and `NaN` sentinels)
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value (true/false)
    Boolean(bool),
    /// Missing or SQL NULL value
    #[default]
    Null,
    /// Ordered list of values (produced by `ARRAY(...)` and friends)
    Array(Vec<FieldValue>),
    /// Nested mapping of values
    Map(HashMap<String, FieldValue>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, "NULL"),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Array(arr) => {
                write!(f, "[")?;
                for (i, v) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            FieldValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(f) => serializer.serialize_f64(*f),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
            FieldValue::Array(arr) => {
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for elem in arr {
                    seq.serialize_element(elem)?;
                }
                seq.end()
            }
            FieldValue::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

impl FieldValue {
    /// Get the type name for error messages and debugging
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "INTEGER",
            FieldValue::Float(_) => "FLOAT",
            FieldValue::String(_) => "STRING",
            FieldValue::Boolean(_) => "BOOLEAN",
            FieldValue::Null => "NULL",
            FieldValue::Array(_) => "ARRAY",
            FieldValue::Map(_) => "MAP",
        }
    }

    /// Check if this value represents a numeric type
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Integer(_) | FieldValue::Float(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Coerce this value to a number the way a dynamically-typed host would.
    ///
    /// - `NULL` and `false` become `0`, `true` becomes `1`
    /// - strings are trimmed and parsed; the empty string is `0`
    /// - anything unparsable (including arrays and maps) becomes `NaN`
    pub fn to_number(&self) -> f64 {
        match self {
            FieldValue::Integer(i) => *i as f64,
            FieldValue::Float(f) => *f,
            FieldValue::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            FieldValue::Null => 0.0,
            FieldValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    match trimmed {
                        "Infinity" | "+Infinity" => f64::INFINITY,
                        "-Infinity" => f64::NEG_INFINITY,
                        other => other.parse::<f64>().unwrap_or(f64::NAN),
                    }
                }
            }
            FieldValue::Array(_) | FieldValue::Map(_) => f64::NAN,
        }
    }

    /// Truthiness of the value: `0`, `NaN`, `""`, `false` and `NULL` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Integer(i) => *i != 0,
            FieldValue::Float(f) => *f != 0.0 && !f.is_nan(),
            FieldValue::String(s) => !s.is_empty(),
            FieldValue::Boolean(b) => *b,
            FieldValue::Null => false,
            FieldValue::Array(_) | FieldValue::Map(_) => true,
        }
    }

    /// Build a numeric value, keeping integral results as `Integer`.
    pub fn from_number(value: f64, prefer_integer: bool) -> FieldValue {
        if prefer_integer
            && value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value <= i64::MAX as f64
        {
            FieldValue::Integer(value as i64)
        } else {
            FieldValue::Float(value)
        }
    }

    /// Convert this value to a string representation for display
    ///
    /// Unlike [`fmt::Display`], `NULL` renders as the empty string, which is
    /// what string joining (LISTAGG) and lexicographic sorting expect.
    pub fn to_display_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    "Infinity".to_string()
                } else {
                    "-Infinity".to_string()
                }
            }
            FieldValue::Float(f) if f.is_nan() => "NaN".to_string(),
            FieldValue::Array(arr) => {
                let elements: Vec<String> = arr.iter().map(|v| v.to_display_string()).collect();
                elements.join(",")
            }
            other => other.to_string(),
        }
    }

    /// Convert this value to a serde_json::Value
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Integer(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
            FieldValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|v| v.to_json()).collect())
            }
            FieldValue::Map(map) => {
                let obj: serde_json::Map<String, serde_json::Value> =
                    map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect();
                serde_json::Value::Object(obj)
            }
        }
    }

    /// Convert a serde_json::Value into a FieldValue
    pub fn from_json(value: &serde_json::Value) -> FieldValue {
        match value {
            serde_json::Value::Null => FieldValue::Null,
            serde_json::Value::Bool(b) => FieldValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => FieldValue::String(s.clone()),
            serde_json::Value::Array(arr) => {
                FieldValue::Array(arr.iter().map(FieldValue::from_json).collect())
            }
            serde_json::Value::Object(obj) => FieldValue::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Lookup of a value inside a row, by field name or by 0-based column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    Name(String),
    Index(usize),
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Index(value)
    }
}

/// A single record flowing through a query pipeline
///
/// Fields are kept in insertion order so positional lookups and serialized
/// output follow the order in which a source or projection produced them.
/// Operators that combine rows (joins, projections) always build new rows;
/// input rows are never mutated.
#[derive(Debug, Clone, Default)]
pub struct Row {
    fields: HashMap<String, FieldValue>,
    columns: Vec<String>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a row from `(name, value)` pairs, keeping their order
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut row = Row::new();
        for (name, value) in pairs {
            row.insert(name, value);
        }
        row
    }

    /// Build an all-NULL row with the given headers (outer join padding)
    pub fn null_row<S: AsRef<str>>(headers: &[S]) -> Self {
        Row::from_pairs(headers.iter().map(|h| (h.as_ref().to_string(), FieldValue::Null)))
    }

    /// Build a row from a JSON object
    pub fn from_json(value: &serde_json::Value) -> Result<Self, SqlError> {
        match value {
            serde_json::Value::Object(obj) => Ok(Row::from_pairs(
                obj.iter().map(|(k, v)| (k.clone(), FieldValue::from_json(v))),
            )),
            other => Err(SqlError::type_error(
                "OBJECT",
                json_type_name(other),
                Some(other.to_string()),
            )),
        }
    }

    /// Convert this row into a JSON object, keeping field order
    pub fn to_json(&self) -> serde_json::Value {
        let obj: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_json()))
            .collect();
        serde_json::Value::Object(obj)
    }

    /// Insert or replace a field; replacing keeps the original position
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        if self.fields.insert(name.clone(), value.into()).is_none() {
            self.columns.push(name);
        }
    }

    /// Builder form of [`Row::insert`]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let removed = self.fields.remove(name);
        if removed.is_some() {
            self.columns.retain(|c| c != name);
        }
        removed
    }

    /// Get a field value by name
    pub fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Resolve a field by name; missing fields read as `NULL`
    pub fn resolve(&self, name: &str) -> FieldValue {
        self.fields.get(name).cloned().unwrap_or(FieldValue::Null)
    }

    /// Resolve a value by name or 0-based column position
    pub fn resolve_column(&self, column: &ColumnRef) -> Option<&FieldValue> {
        match column {
            ColumnRef::Name(name) => self.fields.get(name),
            ColumnRef::Index(idx) => self.columns.get(*idx).and_then(|c| self.fields.get(c)),
        }
    }

    /// Check if a field exists in this row, regardless of its value
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get the number of fields in this row
    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Field names in insertion order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> + '_ {
        self.columns
            .iter()
            .filter_map(|c| self.fields.get(c).map(|v| (c.as_str(), v)))
    }

    /// Merge two rows into a new row; fields of `other` win on collision
    pub fn merged(&self, other: &Row) -> Row {
        let mut row = self.clone();
        for (name, value) in other.iter() {
            row.insert(name, value.clone());
        }
        row
    }

    /// Shallow structural equality
    ///
    /// Two rows are equal when they have the same number of fields, the same
    /// field names, and strictly-equal values per field. Field order is ignored.
    pub fn shallow_eq(&self, other: &Row) -> bool {
        use crate::sql::execution::utils::FieldValueComparator;

        self.fields.len() == other.fields.len()
            && self.fields.iter().all(|(k, v)| {
                other
                    .fields
                    .get(k)
                    .is_some_and(|ov| FieldValueComparator::strict_eq(v, ov))
            })
    }
}

/// Structural equality: same fields with equal values, order-insensitive
impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut m = serializer.serialize_map(Some(self.columns.len()))?;
        for (k, v) in self.iter() {
            m.serialize_entry(k, v)?;
        }
        m.end()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row::from_pairs(iter)
    }
}

impl From<HashMap<String, FieldValue>> for Row {
    fn from(fields: HashMap<String, FieldValue>) -> Self {
        let mut columns: Vec<String> = fields.keys().cloned().collect();
        columns.sort();
        Row { fields, columns }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "NULL",
        serde_json::Value::Bool(_) => "BOOLEAN",
        serde_json::Value::Number(_) => "NUMBER",
        serde_json::Value::String(_) => "STRING",
        serde_json::Value::Array(_) => "ARRAY",
        serde_json::Value::Object(_) => "OBJECT",
    }
}

/// Build a [`Row`] from `name => value` pairs.
///
/// ```rust
/// use veloquery::row;
/// use veloquery::sql::execution::FieldValue;
///
/// let r = row! { "a" => 1, "b" => "x" };
/// assert_eq!(r.get_field("a"), Some(&FieldValue::Integer(1)));
/// ```
#[macro_export]
macro_rules! row {
    () => { $crate::sql::execution::types::Row::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut row = $crate::sql::execution::types::Row::new();
        $( row.insert($name, $value); )+
        row
    }};
}
