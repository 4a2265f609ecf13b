//! Staged execution of one query pass.
//!
//! The pipeline is an explicit state machine. It stays lazy until the first
//! pull, then wires the join and filter adapters around the source stream
//! and decides, once per pass, whether the rows can keep streaming or must be
//! materialized for sorting, grouping or windowing.

use super::{QueryPlan, RowStream};
use crate::sql::error::SqlResult;
use crate::sql::execution::join::JoinStream;
use crate::sql::execution::selection::SelectionEvaluator;
use crate::sql::execution::types::Row;
use crate::sql::execution::utils::GroupKey;
use crate::sql::execution::window::PartitionBy;
use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;

/// Where the next projected row comes from
enum Stage {
    /// Nothing pulled yet
    Pending(Option<RowStream>),
    /// Every row is its own group; rows stream through
    Streaming { rows: RowStream, produced: usize },
    /// Materialized groups, one output row each, anchored on the first row
    Groups { groups: Vec<Vec<Row>>, next: usize },
    /// Materialized rows, each its own anchor against the whole set
    Windowed { rows: Vec<Row>, next: usize },
    Done,
}

/// Rows after sorting: still streaming, or already materialized
enum Input {
    Stream(RowStream),
    Sorted(Vec<Row>),
}

impl Input {
    fn materialize(self) -> SqlResult<Vec<Row>> {
        match self {
            Input::Stream(stream) => stream.collect(),
            Input::Sorted(rows) => Ok(rows),
        }
    }
}

pub(crate) struct Pipeline {
    plan: Arc<QueryPlan>,
    stage: Stage,
    /// Rows counted toward offset/limit, after distinct
    counted: usize,
    seen: Vec<Row>,
}

impl Pipeline {
    pub(crate) fn new(plan: Arc<QueryPlan>, source: RowStream) -> Self {
        Self {
            plan,
            stage: Stage::Pending(Some(source)),
            counted: 0,
            seen: Vec::new(),
        }
    }

    fn log_materialized(&self, what: &str, count: usize) {
        if self.plan.config.log_materialization {
            debug!("Materialized {} {} for query pass", count, what);
        }
    }

    /// Joins, filters and sort; then pick the grouping strategy
    fn prepare(&self, source: RowStream) -> SqlResult<Stage> {
        let plan = &self.plan;
        let mut stream = source;

        for stage in &plan.joins {
            stream = Box::new(JoinStream::new(stream, Arc::clone(stage)));
        }

        for predicate in &plan.predicates {
            let predicate = Arc::clone(predicate);
            let mut index = 0;
            stream = Box::new(stream.filter(move |item| match item {
                Ok(row) => {
                    let keep = predicate(row, index);
                    index += 1;
                    keep
                }
                Err(_) => true,
            }));
        }

        let input = match &plan.order_by {
            Some(order_by) => {
                let mut rows: Vec<Row> = stream.collect::<SqlResult<_>>()?;
                order_by.sort_rows(&mut rows);
                self.log_materialized("rows for ORDER BY", rows.len());
                Input::Sorted(rows)
            }
            None => Input::Stream(stream),
        };

        if let Some(group_by) = &plan.group_by {
            let groups = group_rows(input.materialize()?, group_by);
            self.log_materialized("groups for GROUP BY", groups.len());
            return Ok(Stage::Groups { groups, next: 0 });
        }

        let Some(selection) = &plan.selection else {
            return Ok(Self::streaming(input));
        };

        if selection.has_group_aggregate() {
            let rows = input.materialize()?;
            self.log_materialized("rows for implicit aggregate group", rows.len());
            return Ok(Stage::Groups {
                groups: vec![rows],
                next: 0,
            });
        }

        if selection.uses_window() {
            let rows = input.materialize()?;
            self.log_materialized("rows for window evaluation", rows.len());
            return Ok(Stage::Windowed { rows, next: 0 });
        }

        Ok(Self::streaming(input))
    }

    fn streaming(input: Input) -> Stage {
        let rows: RowStream = match input {
            Input::Stream(stream) => stream,
            Input::Sorted(rows) => Box::new(rows.into_iter().map(Ok)),
        };
        Stage::Streaming { rows, produced: 0 }
    }

    /// Next projected row, before distinct and offset/limit
    fn next_projected(&mut self) -> Option<SqlResult<Row>> {
        loop {
            match &mut self.stage {
                Stage::Pending(source) => {
                    let source = source.take()?;
                    match self.prepare(source) {
                        Ok(stage) => self.stage = stage,
                        Err(e) => {
                            self.stage = Stage::Done;
                            return Some(Err(e));
                        }
                    }
                }
                Stage::Streaming { rows, produced } => {
                    let row = match rows.next()? {
                        Ok(row) => row,
                        Err(e) => return Some(Err(e)),
                    };
                    *produced += 1;
                    let index = *produced;
                    return Some(project(&self.plan, std::slice::from_ref(&row), Some(0), index));
                }
                Stage::Groups { groups, next } => {
                    let group = groups.get(*next)?;
                    *next += 1;
                    let anchor = (!group.is_empty()).then_some(0);
                    return Some(project(&self.plan, group, anchor, *next));
                }
                Stage::Windowed { rows, next } => {
                    if *next >= rows.len() {
                        return None;
                    }
                    *next += 1;
                    return Some(project(&self.plan, rows, Some(*next - 1), *next));
                }
                Stage::Done => return None,
            }
        }
    }
}

impl Iterator for Pipeline {
    type Item = SqlResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(limit) = self.plan.limit {
                if self.counted >= self.plan.offset.saturating_add(limit) {
                    self.stage = Stage::Done;
                    return None;
                }
            }

            let row = match self.next_projected() {
                Some(Ok(row)) => row,
                Some(Err(e)) => {
                    self.stage = Stage::Done;
                    return Some(Err(e));
                }
                None => {
                    self.stage = Stage::Done;
                    return None;
                }
            };

            if self.plan.distinct {
                if self.seen.iter().any(|s| s.shallow_eq(&row)) {
                    continue;
                }
                self.seen.push(row.clone());
            }

            let counter = self.counted;
            self.counted += 1;
            if counter < self.plan.offset {
                continue;
            }
            trace!("Emitting row {}: {}", counter, row);
            return Some(Ok(row));
        }
    }
}

/// Project one anchor row; without a selection the anchor passes through
fn project(plan: &QueryPlan, group: &[Row], anchor: Option<usize>, index: usize) -> SqlResult<Row> {
    match &plan.selection {
        Some(selection) => {
            SelectionEvaluator::new(selection, &plan.windows, &plan.config).evaluate(group, anchor, index)
        }
        None => Ok(anchor
            .and_then(|i| group.get(i))
            .cloned()
            .unwrap_or_default()),
    }
}

/// Insertion-ordered grouping by discriminator output
fn group_rows(rows: Vec<Row>, group_by: &PartitionBy) -> Vec<Vec<Row>> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<Row>> = Vec::new();
    for row in rows {
        let key = GroupKey(group_by.key(&row));
        match index.get(&key) {
            Some(&slot) => groups[slot].push(row),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![row]);
            }
        }
    }
    groups
}
