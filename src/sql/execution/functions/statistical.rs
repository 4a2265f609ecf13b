//! Variance-family functions.
//!
//! All four use the two-pass algorithm: compute the mean, then sum squared
//! deviations. Sample variants divide by `n - 1`; with fewer than two values
//! the result is `NaN`, which the query layer surfaces as NULL.

use crate::sql::execution::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatisticalFunction {
    StddevPop,
    StddevSamp,
    VarPop,
    VarSamp,
}

impl StatisticalFunction {
    /// Registry names, including the `STDDEV`/`VARIANCE` sample aliases
    pub const ALL: &'static [(&'static str, StatisticalFunction)] = &[
        ("STDDEV_POP", StatisticalFunction::StddevPop),
        ("STDDEV_SAMP", StatisticalFunction::StddevSamp),
        ("STDDEV", StatisticalFunction::StddevSamp),
        ("VAR_POP", StatisticalFunction::VarPop),
        ("VAR_SAMP", StatisticalFunction::VarSamp),
        ("VARIANCE", StatisticalFunction::VarSamp),
    ];

    pub fn apply(&self, values: &[FieldValue]) -> FieldValue {
        let numbers: Vec<f64> = values.iter().map(FieldValue::to_number).collect();
        let result = match self {
            StatisticalFunction::VarPop => variance(&numbers, false),
            StatisticalFunction::VarSamp => variance(&numbers, true),
            StatisticalFunction::StddevPop => variance(&numbers, false).sqrt(),
            StatisticalFunction::StddevSamp => variance(&numbers, true).sqrt(),
        };
        FieldValue::Float(result)
    }
}

fn variance(values: &[f64], sample: bool) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    let divisor = if sample { n - 1.0 } else { n };
    squares / divisor
}
