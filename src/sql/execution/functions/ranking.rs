//! Rank-family window functions.
//!
//! Every function here reads the window-ordered row list and the position of
//! the source row within it. Ties are decided by the window's ORDER BY
//! comparator: two rows are peers when it returns `Equal`.

use crate::sql::error::SqlError;
use crate::sql::execution::order::OrderBy;
use crate::sql::execution::types::{FieldValue, Row};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingFunction {
    Rank,
    DenseRank,
    Ntile,
    PercentRank,
    CumeDist,
    PercentileDist,
    PercentileCont,
}

/// Inputs shared by all rank-family functions
pub struct RankingInput<'a> {
    /// Window rows in ORDER BY order
    pub rows: &'a [&'a Row],
    /// Position of the source row within `rows`
    pub position: usize,
    pub order_by: &'a OrderBy,
    pub args: &'a [String],
}

impl RankingInput<'_> {
    fn peers(&self, a: usize, b: usize) -> bool {
        self.order_by.compare(self.rows[a], self.rows[b]) == Ordering::Equal
    }

    /// Index of the last row before the source row's tie group, or -1
    fn tie_boundary(&self) -> i64 {
        let mut j = self.position as i64 - 1;
        while j >= 0 && self.peers(j as usize, self.position) {
            j -= 1;
        }
        j
    }
}

impl RankingFunction {
    pub const ALL: &'static [(&'static str, RankingFunction)] = &[
        ("RANK", RankingFunction::Rank),
        ("DENSE_RANK", RankingFunction::DenseRank),
        ("NTILE", RankingFunction::Ntile),
        ("PERCENT_RANK", RankingFunction::PercentRank),
        ("CUME_DIST", RankingFunction::CumeDist),
        ("PERCENTILE_DIST", RankingFunction::PercentileDist),
        ("PERCENTILE_CONT", RankingFunction::PercentileCont),
    ];

    pub fn apply(&self, input: &RankingInput<'_>) -> Result<FieldValue, SqlError> {
        let size = input.rows.len();
        match self {
            RankingFunction::Rank => Ok(FieldValue::Integer(input.tie_boundary() + 2)),
            RankingFunction::DenseRank => {
                let ties = (1..=input.position)
                    .filter(|&i| input.peers(i - 1, i))
                    .count();
                Ok(FieldValue::Integer((input.position + 1 - ties) as i64))
            }
            RankingFunction::Ntile => {
                let buckets = numeric_arg(input.args, 0, "NTILE")?;
                let tile = (buckets * input.position as f64 / size as f64).floor() + 1.0;
                Ok(FieldValue::from_number(tile, true))
            }
            RankingFunction::PercentRank => {
                if size <= 1 {
                    return Ok(FieldValue::Float(0.0));
                }
                let boundary = input.tie_boundary();
                Ok(FieldValue::Float(
                    (boundary + 1) as f64 / (size - 1) as f64,
                ))
            }
            RankingFunction::CumeDist => {
                let mut last = input.position;
                while last + 1 < size && input.peers(last + 1, input.position) {
                    last += 1;
                }
                Ok(FieldValue::Float((last + 1) as f64 / size as f64))
            }
            RankingFunction::PercentileDist => percentile(input, false),
            RankingFunction::PercentileCont => percentile(input, true),
        }
    }
}

/// PERCENTILE_DIST / PERCENTILE_CONT
///
/// Walks the ordered rows one tie group at a time. When a group ends after
/// `j` rows, its cumulative fraction is `j / n`; the first group whose
/// fraction reaches `p` answers. DIST returns that group's key (read from the
/// last row of the group). CONT interpolates between the previous group's key
/// and this one's by `(p - prev_p) / (p_i - prev_p)`.
fn percentile(input: &RankingInput<'_>, continuous: bool) -> Result<FieldValue, SqlError> {
    let name = if continuous {
        "PERCENTILE_CONT"
    } else {
        "PERCENTILE_DIST"
    };
    let p = numeric_arg(input.args, 0, name)?;
    let field = match input.args.get(1) {
        Some(field) => field.as_str(),
        None => input.order_by.primary_field().ok_or_else(|| {
            SqlError::configuration_error(format!(
                "{} needs a key field: pass it as the second argument or order the window by a field",
                name
            ))
        })?,
    };

    let n = input.rows.len();
    let mut prev_p = 0.0;
    let mut prev_key: Option<FieldValue> = None;
    for i in 0..n {
        let run_ends = i + 1 == n || !input.peers(i, i + 1);
        if !run_ends {
            continue;
        }
        let j = i + 1;
        let p_i = j as f64 / n as f64;
        let key = input.rows[i].resolve(field);
        if p_i >= p {
            if !continuous {
                return Ok(key);
            }
            let upper = key.to_number();
            let lower = prev_key.as_ref().map(FieldValue::to_number).unwrap_or(upper);
            let x = (p - prev_p) / (p_i - prev_p);
            return Ok(FieldValue::Float(lower + x * (upper - lower)));
        }
        prev_p = p_i;
        prev_key = Some(key);
    }
    Ok(FieldValue::Null)
}

/// Parse a numeric literal argument
pub(crate) fn numeric_arg(args: &[String], index: usize, function: &str) -> Result<f64, SqlError> {
    let raw = args.get(index).ok_or_else(|| {
        SqlError::execution_error(
            format!("{} requires argument {}", function, index + 1),
            Some(format!("{}({})", function, args.join(", "))),
        )
    })?;
    raw.trim().parse::<f64>().map_err(|_| {
        SqlError::type_error("NUMBER", "STRING", Some(raw.clone()))
    })
}
