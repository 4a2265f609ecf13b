/*!
# Query Pipeline

[`Query`] collects operator stages through chained builder calls and runs
them, on every execution pass, in a fixed order:

1. `fetch_first(0)` short-circuits to an empty result
2. join stages, in registration order
3. `filter` predicates as a lazy AND chain
4. `order_by` (materializes and sorts, stable)
5. grouping: explicit `group_by`, else one implicit group when the selection
   has an unwindowed aggregate, else a per-row window pass when the
   selection uses a window, else lazy one-row groups
6. projection through the selection
7. `distinct`
8. `offset` / `fetch_first`

Building a query never touches the rows. Every call to [`Query::execute`]
starts a fresh pass, so a query can be consumed any number of times as long
as its source and join stages are re-executable.

```rust
use veloquery::row;
use veloquery::sql::execution::query::Query;
use veloquery::sql::execution::order::OrderBy;

let mut query = Query::new(vec![row! {"a" => 3}, row! {"a" => 1}, row! {"a" => 2}]);
query.filter(|r, _| r.resolve("a").to_number() > 1.0).order_by(OrderBy::asc("a"));
let rows = query.to_vec().unwrap();
assert_eq!(rows.len(), 2);
```
*/

mod pipeline;
pub mod source;

pub use source::{RowSource, StreamFactory};

use crate::sql::config::{QueryConfig, global_config};
use crate::sql::error::SqlResult;
use crate::sql::execution::join::{JoinPredicate, JoinStage, JoinType, NestedLoopJoin, SharedJoinStage};
use crate::sql::execution::order::OrderBy;
use crate::sql::execution::selection::Selection;
use crate::sql::execution::types::{ColumnRef, FieldValue, Row};
use crate::sql::execution::window::{PartitionBy, WindowSpec};
use pipeline::Pipeline;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Lazily produced query output; items after the first error are never produced
pub type RowStream = Box<dyn Iterator<Item = SqlResult<Row>> + Send>;

/// Filter predicate: `(row, index)` where `index` counts the rows this
/// predicate has seen in the current pass, from 0
pub type RowPredicate = Arc<dyn Fn(&Row, usize) -> bool + Send + Sync>;

/// Accumulated operator stages
#[derive(Clone)]
pub(crate) struct QueryPlan {
    pub(crate) joins: Vec<SharedJoinStage>,
    pub(crate) predicates: Vec<RowPredicate>,
    pub(crate) group_by: Option<PartitionBy>,
    pub(crate) selection: Option<Selection>,
    pub(crate) order_by: Option<OrderBy>,
    pub(crate) windows: HashMap<String, WindowSpec>,
    pub(crate) offset: usize,
    pub(crate) limit: Option<usize>,
    pub(crate) distinct: bool,
    pub(crate) config: QueryConfig,
}

impl QueryPlan {
    fn new(config: QueryConfig) -> Self {
        Self {
            joins: Vec::new(),
            predicates: Vec::new(),
            group_by: None,
            selection: None,
            order_by: None,
            windows: HashMap::new(),
            offset: 0,
            limit: None,
            distinct: false,
            config,
        }
    }
}

/// A lazily evaluated, re-executable query over a row source
pub struct Query {
    source: RowSource,
    plan: Arc<QueryPlan>,
    cursor: Option<RowStream>,
}

impl Query {
    /// Query over materialized rows
    pub fn new(rows: Vec<Row>) -> Self {
        Self::from_source(RowSource::from(rows))
    }

    /// Query reading the output of another query
    pub fn from_query(query: Query) -> Self {
        Self::from_source(RowSource::from(query))
    }

    /// Query over a single-use iterator; only the first pass sees its rows
    pub fn from_stream<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: Send + 'static,
    {
        Self::from_source(RowSource::single_use(iter))
    }

    pub fn from_source(source: RowSource) -> Self {
        Self {
            source,
            plan: Arc::new(QueryPlan::new(global_config().clone())),
            cursor: None,
        }
    }

    fn plan_mut(&mut self) -> &mut QueryPlan {
        self.cursor = None;
        Arc::make_mut(&mut self.plan)
    }

    /// Override the process-wide configuration for this query
    pub fn with_config(&mut self, config: QueryConfig) -> &mut Self {
        self.plan_mut().config = config;
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.plan.config
    }

    /// Add a join stage
    pub fn join<S>(&mut self, stage: S) -> &mut Self
    where
        S: JoinStage + Send + 'static,
    {
        self.plan_mut().joins.push(Arc::new(Mutex::new(stage)));
        self
    }

    /// Nested-loop join against `other`, matching rows with `predicate`
    pub fn join_on<F>(
        &mut self,
        other: impl Into<RowSource>,
        join_type: JoinType,
        predicate: F,
    ) -> &mut Self
    where
        F: Fn(&Row, &Row) -> bool + Send + Sync + 'static,
    {
        let predicate: JoinPredicate = Arc::new(predicate);
        self.join(NestedLoopJoin::new(other.into(), join_type, Some(predicate)))
    }

    /// Cartesian product with `other`
    pub fn cross_join(&mut self, other: impl Into<RowSource>) -> &mut Self {
        self.join(NestedLoopJoin::new(other.into(), JoinType::Inner, None))
    }

    /// Add a WHERE predicate; all predicates must hold
    pub fn filter<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Row, usize) -> bool + Send + Sync + 'static,
    {
        self.plan_mut().predicates.push(Arc::new(predicate));
        self
    }

    /// Group rows by a discriminator
    pub fn group_by<F>(&mut self, discriminator: F) -> &mut Self
    where
        F: Fn(&Row) -> FieldValue + Send + Sync + 'static,
    {
        self.plan_mut().group_by = Some(PartitionBy::Function(Arc::new(discriminator)));
        self
    }

    pub fn group_by_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.plan_mut().group_by = Some(PartitionBy::Field(field.into()));
        self
    }

    pub fn select(&mut self, selection: impl Into<Selection>) -> &mut Self {
        self.plan_mut().selection = Some(selection.into());
        self
    }

    pub fn order_by(&mut self, order_by: OrderBy) -> &mut Self {
        self.plan_mut().order_by = Some(order_by);
        self
    }

    pub fn order_by_fn<F>(&mut self, compare: F) -> &mut Self
    where
        F: Fn(&Row, &Row) -> Ordering + Send + Sync + 'static,
    {
        self.order_by(OrderBy::comparator(compare))
    }

    /// Order by a sort string such as `"-amount, name"`
    pub fn try_order_by(&mut self, spec: &str) -> SqlResult<&mut Self> {
        let order_by = OrderBy::parse(spec)?;
        Ok(self.order_by(order_by))
    }

    pub fn offset(&mut self, offset: usize) -> &mut Self {
        self.plan_mut().offset = offset;
        self
    }

    pub fn fetch_first(&mut self, limit: usize) -> &mut Self {
        self.plan_mut().limit = Some(limit);
        self
    }

    /// Register a named window for `OVER name` references
    pub fn window(&mut self, name: impl Into<String>, spec: WindowSpec) -> &mut Self {
        self.plan_mut().windows.insert(name.into(), spec);
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.plan_mut().distinct = distinct;
        self
    }

    /// Start a new execution pass
    pub fn execute(&self) -> RowStream {
        if self.plan.limit == Some(0) {
            return Box::new(std::iter::empty());
        }
        Box::new(Pipeline::new(Arc::clone(&self.plan), self.source.stream()))
    }

    /// Run the query to completion
    pub fn to_vec(&self) -> SqlResult<Vec<Row>> {
        self.execute().collect()
    }

    /// Pull the next row from the query's cursor, starting a pass on first use
    pub fn get_next_row(&mut self) -> Option<SqlResult<Row>> {
        if self.cursor.is_none() {
            self.cursor = Some(self.execute());
        }
        self.cursor.as_mut()?.next()
    }

    /// Pull the next row and read one column of it; a missing column reads as NULL
    pub fn get_next_value(&mut self, column: impl Into<ColumnRef>) -> Option<SqlResult<FieldValue>> {
        let column = column.into();
        self.get_next_row().map(|row| {
            row.map(|r| r.resolve_column(&column).cloned().unwrap_or(FieldValue::Null))
        })
    }

    /// Drop the cursor; the next pull starts a new pass
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }
}

impl Clone for Query {
    /// Clones share the row source and join stages; the cursor is not cloned
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            plan: Arc::clone(&self.plan),
            cursor: None,
        }
    }
}

impl IntoIterator for &Query {
    type Item = SqlResult<Row>;
    type IntoIter = RowStream;

    fn into_iter(self) -> Self::IntoIter {
        self.execute()
    }
}
