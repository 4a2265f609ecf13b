//! Row sources a query reads from.

use super::{Query, RowStream};
use crate::sql::error::SqlError;
use crate::sql::execution::types::Row;
use log::warn;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Generator of a fresh row stream per pass
pub type StreamFactory = Arc<Mutex<dyn FnMut() -> RowStream + Send>>;

type SingleUse = Arc<Mutex<Option<Box<dyn Iterator<Item = Row> + Send>>>>;

/// Input of a [`Query`]
///
/// Materialized rows, other queries and factories can be streamed any number
/// of times. An iterator source is single-use: once drained, later passes see
/// no rows.
#[derive(Clone)]
pub enum RowSource {
    Rows(Arc<Vec<Row>>),
    Query(Box<Query>),
    Factory(StreamFactory),
    Iter(SingleUse),
}

impl RowSource {
    /// Wrap a one-shot iterator
    pub fn single_use<I>(iter: I) -> RowSource
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: Send + 'static,
    {
        let boxed: Box<dyn Iterator<Item = Row> + Send> = Box::new(iter.into_iter());
        RowSource::Iter(Arc::new(Mutex::new(Some(boxed))))
    }

    pub fn from_factory<F>(factory: F) -> RowSource
    where
        F: FnMut() -> RowStream + Send + 'static,
    {
        RowSource::Factory(Arc::new(Mutex::new(factory)))
    }

    /// Start a new pass over the source
    pub fn stream(&self) -> RowStream {
        match self {
            RowSource::Rows(rows) => {
                let rows = Arc::clone(rows);
                Box::new((0..rows.len()).map(move |i| Ok(rows[i].clone())))
            }
            RowSource::Query(query) => query.execute(),
            RowSource::Factory(factory) => match factory.lock() {
                Ok(mut factory) => (*factory)(),
                Err(_) => Box::new(std::iter::once(Err(SqlError::execution_error(
                    "Row source factory lock was poisoned",
                    None,
                )))),
            },
            RowSource::Iter(slot) => {
                let taken = slot.lock().ok().and_then(|mut guard| guard.take());
                match taken {
                    Some(iter) => Box::new(iter.map(Ok)),
                    None => {
                        warn!("Single-use row source was already consumed; yielding no rows");
                        Box::new(std::iter::empty())
                    }
                }
            }
        }
    }
}

impl fmt::Debug for RowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowSource::Rows(rows) => write!(f, "Rows({})", rows.len()),
            RowSource::Query(_) => write!(f, "Query"),
            RowSource::Factory(_) => write!(f, "Factory"),
            RowSource::Iter(_) => write!(f, "Iter"),
        }
    }
}

impl From<Vec<Row>> for RowSource {
    fn from(rows: Vec<Row>) -> Self {
        RowSource::Rows(Arc::new(rows))
    }
}

impl From<Arc<Vec<Row>>> for RowSource {
    fn from(rows: Arc<Vec<Row>>) -> Self {
        RowSource::Rows(rows)
    }
}

impl From<&[Row]> for RowSource {
    fn from(rows: &[Row]) -> Self {
        RowSource::Rows(Arc::new(rows.to_vec()))
    }
}

impl From<Query> for RowSource {
    fn from(query: Query) -> Self {
        RowSource::Query(Box::new(query))
    }
}

impl From<&Query> for RowSource {
    fn from(query: &Query) -> Self {
        RowSource::Query(Box::new(query.clone()))
    }
}
