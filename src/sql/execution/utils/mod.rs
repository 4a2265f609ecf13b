//! Pure helpers shared by the execution modules.

pub mod field_value_comparator;

pub use field_value_comparator::{FieldValueComparator, GroupKey};
