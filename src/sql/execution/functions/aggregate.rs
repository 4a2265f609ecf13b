//! Aggregate functions over an extracted value list.
//!
//! These are pure functions: the caller extracts one value per row of the
//! (possibly windowed) row-group and hands the list over. Empty inputs are
//! not errors; they produce sentinel values that the query layer maps to
//! SQL conventions where required.

use crate::sql::config::QueryConfig;
use crate::sql::execution::types::FieldValue;
use crate::sql::execution::utils::FieldValueComparator;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Builtin aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Max,
    Min,
    Count,
    Listagg,
    Array,
    Json,
    Any,
    Random,
    Median,
    CountDistinct,
}

impl AggregateFunction {
    /// Registry names, in registration order
    pub const ALL: &'static [(&'static str, AggregateFunction)] = &[
        ("SUM", AggregateFunction::Sum),
        ("AVG", AggregateFunction::Avg),
        ("MAX", AggregateFunction::Max),
        ("MIN", AggregateFunction::Min),
        ("COUNT", AggregateFunction::Count),
        ("LISTAGG", AggregateFunction::Listagg),
        ("ARRAY", AggregateFunction::Array),
        ("JSON", AggregateFunction::Json),
        ("ANY", AggregateFunction::Any),
        ("RANDOM", AggregateFunction::Random),
        ("MEDIAN", AggregateFunction::Median),
        ("COUNT_DISTINCT", AggregateFunction::CountDistinct),
    ];

    /// Apply the aggregate to the extracted values
    pub fn apply(&self, values: &[FieldValue], config: &QueryConfig) -> FieldValue {
        match self {
            AggregateFunction::Sum => Self::sum(values),
            AggregateFunction::Avg => Self::avg(values),
            AggregateFunction::Max => Self::extreme(values, f64::NEG_INFINITY, |a, b| a > b),
            AggregateFunction::Min => Self::extreme(values, f64::INFINITY, |a, b| a < b),
            AggregateFunction::Count => FieldValue::Integer(values.len() as i64),
            AggregateFunction::Listagg => FieldValue::String(
                values
                    .iter()
                    .map(|v| v.to_display_string())
                    .collect::<Vec<_>>()
                    .join(&config.listagg_separator),
            ),
            AggregateFunction::Array => FieldValue::Array(values.to_vec()),
            AggregateFunction::Json => {
                let json = serde_json::Value::Array(values.iter().map(|v| v.to_json()).collect());
                FieldValue::String(json.to_string())
            }
            AggregateFunction::Any => values.first().cloned().unwrap_or(FieldValue::Null),
            AggregateFunction::Random => Self::random(values, config.random_seed),
            AggregateFunction::Median => Self::median(values),
            AggregateFunction::CountDistinct => {
                let mut seen: Vec<&FieldValue> = Vec::new();
                for value in values {
                    if !seen.iter().any(|s| FieldValueComparator::strict_eq(s, value)) {
                        seen.push(value);
                    }
                }
                FieldValue::Integer(seen.len() as i64)
            }
        }
    }

    /// Numeric sum; `0` on empty input. Integral inputs keep an integer result.
    fn sum(values: &[FieldValue]) -> FieldValue {
        let all_integer = values.iter().all(|v| matches!(v, FieldValue::Integer(_)));
        if all_integer {
            let mut total: i64 = 0;
            for value in values {
                if let FieldValue::Integer(i) = value {
                    match total.checked_add(*i) {
                        Some(t) => total = t,
                        None => return FieldValue::Float(Self::float_sum(values)),
                    }
                }
            }
            return FieldValue::Integer(total);
        }
        FieldValue::Float(Self::float_sum(values))
    }

    fn float_sum(values: &[FieldValue]) -> f64 {
        values.iter().map(FieldValue::to_number).sum()
    }

    /// Sum divided by count; `NaN` on empty input
    fn avg(values: &[FieldValue]) -> FieldValue {
        FieldValue::Float(Self::float_sum(values) / values.len() as f64)
    }

    /// MAX/MIN with an explicit infinite seed, so empty input yields `∓∞`
    fn extreme(values: &[FieldValue], seed: f64, better: fn(f64, f64) -> bool) -> FieldValue {
        let mut best = seed;
        let mut best_value: Option<&FieldValue> = None;
        for value in values {
            let n = value.to_number();
            if n.is_nan() {
                return FieldValue::Float(f64::NAN);
            }
            if best_value.is_none() || better(n, best) {
                best = n;
                best_value = Some(value);
            }
        }
        match best_value {
            Some(FieldValue::Integer(i)) => FieldValue::Integer(*i),
            _ => FieldValue::Float(best),
        }
    }

    fn random(values: &[FieldValue], seed: Option<u64>) -> FieldValue {
        if values.is_empty() {
            return FieldValue::Null;
        }
        let index = match seed {
            Some(seed) => StdRng::seed_from_u64(seed).gen_range(0..values.len()),
            None => rand::thread_rng().gen_range(0..values.len()),
        };
        values[index].clone()
    }

    fn median(values: &[FieldValue]) -> FieldValue {
        let mut numbers: Vec<f64> = values.iter().map(FieldValue::to_number).collect();
        if numbers.is_empty() {
            return FieldValue::Null;
        }
        numbers.sort_by(|a, b| FieldValueComparator::compare_f64(*a, *b));
        let mid = numbers.len() / 2;
        let all_integer = values.iter().all(|v| matches!(v, FieldValue::Integer(_)));
        if numbers.len() % 2 == 1 {
            FieldValue::from_number(numbers[mid], all_integer)
        } else {
            FieldValue::Float((numbers[mid - 1] + numbers[mid]) / 2.0)
        }
    }
}
