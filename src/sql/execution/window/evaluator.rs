//! Window evaluation: partition, order and frame a candidate row set.
//!
//! The evaluator never copies rows. It works on indices into the candidate
//! slice, so the source row is identified by its position in that slice
//! rather than by value (two equal rows are still distinct rows).

use super::{FrameUnit, WindowFrame, WindowSpec};
use crate::sql::error::SqlError;
use crate::sql::execution::types::{FieldValue, Row};
use crate::sql::execution::utils::FieldValueComparator;

/// The rows a function sees for one source row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowView {
    /// Indices into the candidate rows, in window order
    pub rows: Vec<usize>,
    /// Position of the source row inside `rows`, if it is visible
    pub position: Option<usize>,
}

impl WindowView {
    /// The unwindowed view of a whole row-group
    pub fn whole(len: usize, source: Option<usize>) -> Self {
        Self {
            rows: (0..len).collect(),
            position: source.filter(|s| *s < len),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Materialize the view's rows in window order
    pub fn collect_rows<'a>(&self, candidates: &'a [Row]) -> Vec<&'a Row> {
        self.rows.iter().map(|&i| &candidates[i]).collect()
    }
}

/// Computes the partitioned, ordered and framed view of a window
pub struct WindowEvaluator;

impl WindowEvaluator {
    /// Evaluate `spec` over `candidates` for the source row at index `source`
    ///
    /// 1. Keep only candidates whose partition key strictly equals the source's.
    /// 2. If the spec has an ORDER BY, stable-sort the remaining rows.
    /// 3. If ordered, slice the frame around the source row (default frame:
    ///    partition start through the current row). Without ORDER BY the
    ///    whole partition is returned unframed.
    pub fn evaluate(
        spec: &WindowSpec,
        candidates: &[Row],
        source: Option<usize>,
    ) -> Result<WindowView, SqlError> {
        if let Some(frame) = &spec.frame {
            Self::check_frame_unit(frame)?;
        }

        let source_row = source.and_then(|s| candidates.get(s));
        let mut rows: Vec<usize> = match &spec.partition_by {
            Some(partition_by) => {
                let key = source_row
                    .map(|r| partition_by.key(r))
                    .unwrap_or(FieldValue::Null);
                (0..candidates.len())
                    .filter(|&i| {
                        FieldValueComparator::strict_eq(&partition_by.key(&candidates[i]), &key)
                    })
                    .collect()
            }
            None => (0..candidates.len()).collect(),
        };

        let Some(order_by) = &spec.order_by else {
            let position = source.and_then(|s| rows.iter().position(|&i| i == s));
            return Ok(WindowView { rows, position });
        };

        rows.sort_by(|&a, &b| order_by.compare(&candidates[a], &candidates[b]));

        let Some(current) = source.and_then(|s| rows.iter().position(|&i| i == s)) else {
            return Ok(WindowView {
                rows: Vec::new(),
                position: None,
            });
        };

        let frame = spec.frame.unwrap_or_default();
        let (start, end) = Self::frame_bounds(&frame, current, rows.len());
        let framed: Vec<usize> = rows[start..end].to_vec();
        let position = (start..end).contains(&current).then(|| current - start);

        Ok(WindowView {
            rows: framed,
            position,
        })
    }

    fn check_frame_unit(frame: &WindowFrame) -> Result<(), SqlError> {
        if frame.unit != FrameUnit::Rows {
            return Err(SqlError::configuration_error(format!(
                "Unsupported framing unit '{}': only ROWS framing is supported",
                frame.unit
            )));
        }
        Ok(())
    }

    /// Half-open `[start, end)` slice of a view of `len` rows around `current`
    fn frame_bounds(frame: &WindowFrame, current: usize, len: usize) -> (usize, usize) {
        let start = frame.start.resolve(current).clamp(0, len as i64) as usize;
        let end = frame
            .end
            .resolve(current)
            .saturating_add(1)
            .clamp(0, len as i64) as usize;
        (start, end.max(start))
    }
}
