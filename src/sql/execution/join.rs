//! JOIN stages
//!
//! A join stage sees every row of the current row set in order and then one
//! terminal `None`, which lets it emit right-side rows that never matched
//! (RIGHT and FULL OUTER semantics). Whatever a stage returns becomes the
//! input of the next stage.
//!
//! Any `FnMut(Option<&Row>) -> Vec<Row>` closure is a stage; [`NestedLoopJoin`]
//! implements INNER, LEFT, RIGHT and FULL OUTER joins against another row
//! source on top of the same protocol.

use crate::sql::error::{SqlError, SqlResult};
use crate::sql::execution::query::{RowSource, RowStream};
use crate::sql::execution::types::{FieldValue, Row};
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One join stage of a query
pub trait JoinStage {
    /// Handle one input row, or the terminal `None` after the last one
    fn process(&mut self, row: Option<&Row>) -> SqlResult<Vec<Row>>;

    /// Called before each execution pass
    fn reset(&mut self) {}
}

impl<F> JoinStage for F
where
    F: FnMut(Option<&Row>) -> Vec<Row>,
{
    fn process(&mut self, row: Option<&Row>) -> SqlResult<Vec<Row>> {
        Ok(self(row))
    }
}

/// Shared handle to a registered stage
pub type SharedJoinStage = Arc<Mutex<dyn JoinStage + Send>>;

/// Predicate deciding whether a left and right row match
pub type JoinPredicate = Arc<dyn Fn(&Row, &Row) -> bool + Send + Sync>;

/// Types of JOIN operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    fn keeps_unmatched_left(self) -> bool {
        matches!(self, JoinType::Left | JoinType::Full)
    }

    fn keeps_unmatched_right(self) -> bool {
        matches!(self, JoinType::Right | JoinType::Full)
    }
}

/// Nested-loop join against a second row source
///
/// The right side is materialized on the first row of each pass. Merged rows
/// carry the left fields first; the right side wins on name collisions.
/// Unmatched rows are padded with NULLs for the other side's fields, using
/// the field names seen so far on that side.
pub struct NestedLoopJoin {
    right_source: RowSource,
    predicate: Option<JoinPredicate>,
    join_type: JoinType,
    right: Option<Vec<Row>>,
    matched: Vec<bool>,
    left_headers: Vec<String>,
    right_headers: Vec<String>,
}

impl NestedLoopJoin {
    pub fn new(right: RowSource, join_type: JoinType, predicate: Option<JoinPredicate>) -> Self {
        Self {
            right_source: right,
            predicate,
            join_type,
            right: None,
            matched: Vec::new(),
            left_headers: Vec::new(),
            right_headers: Vec::new(),
        }
    }

    fn load_right(&mut self) -> SqlResult<()> {
        if self.right.is_some() {
            return Ok(());
        }
        let rows = self
            .right_source
            .stream()
            .collect::<SqlResult<Vec<Row>>>()?;
        for row in &rows {
            learn_headers(&mut self.right_headers, row);
        }
        debug!(
            "{:?} join materialized {} right-side rows",
            self.join_type,
            rows.len()
        );
        self.matched = vec![false; rows.len()];
        self.right = Some(rows);
        Ok(())
    }

    fn join_row(&mut self, left: &Row) -> SqlResult<Vec<Row>> {
        self.load_right()?;
        learn_headers(&mut self.left_headers, left);

        let right = self.right.as_deref().unwrap_or_default();
        let mut out = Vec::new();
        for (i, candidate) in right.iter().enumerate() {
            let is_match = self.predicate.as_ref().is_none_or(|p| p(left, candidate));
            if is_match {
                self.matched[i] = true;
                out.push(left.merged(candidate));
            }
        }

        if out.is_empty() && self.join_type.keeps_unmatched_left() {
            let mut padded = left.clone();
            for header in &self.right_headers {
                if !padded.has_field(header) {
                    padded.insert(header.as_str(), FieldValue::Null);
                }
            }
            out.push(padded);
        }
        Ok(out)
    }

    fn finish(&mut self) -> SqlResult<Vec<Row>> {
        let mut out = Vec::new();
        if self.join_type.keeps_unmatched_right() {
            self.load_right()?;
            let right = self.right.as_deref().unwrap_or_default();
            for (candidate, matched) in right.iter().zip(&self.matched) {
                if !matched {
                    out.push(Row::null_row(&self.left_headers).merged(candidate));
                }
            }
        }
        debug!(
            "{:?} join finished with {} unmatched right-side rows",
            self.join_type,
            out.len()
        );
        self.reset();
        Ok(out)
    }
}

impl JoinStage for NestedLoopJoin {
    fn process(&mut self, row: Option<&Row>) -> SqlResult<Vec<Row>> {
        match row {
            Some(left) => self.join_row(left),
            None => self.finish(),
        }
    }

    fn reset(&mut self) {
        self.right = None;
        self.matched.clear();
        self.left_headers.clear();
        self.right_headers.clear();
    }
}

fn learn_headers(headers: &mut Vec<String>, row: &Row) {
    for column in row.columns() {
        if !headers.contains(column) {
            headers.push(column.clone());
        }
    }
}

/// Drives one join stage over an input stream
///
/// Input rows are pulled one at a time; the terminal `None` call happens
/// exactly once, after the input is exhausted.
pub(crate) struct JoinStream {
    input: RowStream,
    stage: SharedJoinStage,
    buffer: VecDeque<Row>,
    started: bool,
    finished: bool,
}

impl JoinStream {
    pub(crate) fn new(input: RowStream, stage: SharedJoinStage) -> Self {
        Self {
            input,
            stage,
            buffer: VecDeque::new(),
            started: false,
            finished: false,
        }
    }

    fn call_stage(&mut self, row: Option<&Row>) -> SqlResult<Vec<Row>> {
        let mut stage = self.stage.lock().map_err(|_| {
            SqlError::execution_error("Join stage lock was poisoned", None)
        })?;
        if !self.started {
            stage.reset();
            self.started = true;
        }
        stage.process(row)
    }
}

impl Iterator for JoinStream {
    type Item = SqlResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.pop_front() {
                return Some(Ok(row));
            }
            if self.finished {
                return None;
            }
            let produced = match self.input.next() {
                Some(Ok(row)) => self.call_stage(Some(&row)),
                Some(Err(e)) => {
                    self.finished = true;
                    return Some(Err(e));
                }
                None => {
                    self.finished = true;
                    self.call_stage(None)
                }
            };
            match produced {
                Ok(rows) => self.buffer.extend(rows),
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
