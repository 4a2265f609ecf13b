//! Offset-family window functions: LEAD, LAG, FIRST_VALUE, LAST_VALUE, NTH_VALUE.
//!
//! These read a value list aligned 1:1 with the window-ordered rows. A
//! position outside the list yields NULL, as does a NULL value. With
//! `position_falsy_as_null` enabled, any falsy value (`0`, `""`, `false`)
//! also yields NULL, matching engines that test the looked-up value for
//! truthiness instead of checking the bounds.

use super::ranking::numeric_arg;
use crate::sql::config::QueryConfig;
use crate::sql::error::SqlError;
use crate::sql::execution::types::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionFunction {
    Lead,
    Lag,
    FirstValue,
    LastValue,
    NthValue,
}

impl PositionFunction {
    pub const ALL: &'static [(&'static str, PositionFunction)] = &[
        ("LEAD", PositionFunction::Lead),
        ("LAG", PositionFunction::Lag),
        ("FIRST_VALUE", PositionFunction::FirstValue),
        ("LAST_VALUE", PositionFunction::LastValue),
        ("NTH_VALUE", PositionFunction::NthValue),
    ];

    /// Look up a value relative to `position` in `values`
    ///
    /// `args[0]` is the source field (already extracted into `values`);
    /// LEAD/LAG take an optional offset in `args[1]` (default 1) and
    /// NTH_VALUE a 1-based index in `args[1]`. Offsets that overflow the
    /// index range read as out of range.
    pub fn apply(
        &self,
        values: &[FieldValue],
        position: usize,
        args: &[String],
        config: &QueryConfig,
    ) -> Result<FieldValue, SqlError> {
        let target: Option<i64> = match self {
            PositionFunction::Lead => (position as i64).checked_add(Self::offset(args)?),
            PositionFunction::Lag => (position as i64).checked_sub(Self::offset(args)?),
            PositionFunction::FirstValue => Some(0),
            PositionFunction::LastValue => (!values.is_empty()).then(|| values.len() as i64 - 1),
            PositionFunction::NthValue => {
                let nth = numeric_arg(args, 1, "NTH_VALUE")?;
                (nth as i64).checked_sub(1)
            }
        };

        let value = target
            .filter(|t| *t >= 0)
            .and_then(|t| values.get(t as usize));
        Ok(match value {
            None | Some(FieldValue::Null) => FieldValue::Null,
            Some(v) if config.position_falsy_as_null && !v.is_truthy() => FieldValue::Null,
            Some(v) => v.clone(),
        })
    }

    fn offset(args: &[String]) -> Result<i64, SqlError> {
        if args.len() < 2 {
            return Ok(1);
        }
        Ok(numeric_arg(args, 1, "LEAD/LAG")? as i64)
    }
}
