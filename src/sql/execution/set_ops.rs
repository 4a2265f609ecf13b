//! Set algebra over two row sources.
//!
//! Each function returns a new [`Query`] whose source re-reads both inputs on
//! every pass. Row identity is shallow structural equality
//! ([`Row::shallow_eq`]).
//!
//! `intersect_of` is multiset-unaware: every row of `a` that matches any row
//! of `b` is kept, so `intersect_of([x, x], [x])` yields `[x, x]`.

use crate::sql::error::SqlResult;
use crate::sql::execution::query::{Query, RowSource, RowStream};
use crate::sql::execution::types::Row;
use log::debug;

/// Rows of `a` not in `b`; duplicates within `a` are also suppressed
pub fn except_of(a: impl Into<RowSource>, b: impl Into<RowSource>) -> Query {
    let (a, b) = (a.into(), b.into());
    Query::from_source(RowSource::from_factory(move || -> RowStream {
        let mut cache = match materialize(&b, "EXCEPT") {
            Ok(cache) => cache,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        Box::new(a.stream().filter_map(move |item| match item {
            Ok(row) => {
                if cache.iter().any(|c| c.shallow_eq(&row)) {
                    None
                } else {
                    cache.push(row.clone());
                    Some(Ok(row))
                }
            }
            Err(e) => Some(Err(e)),
        }))
    }))
}

/// Rows of `a` that also appear in `b`
pub fn intersect_of(a: impl Into<RowSource>, b: impl Into<RowSource>) -> Query {
    let (a, b) = (a.into(), b.into());
    Query::from_source(RowSource::from_factory(move || -> RowStream {
        let cache = match materialize(&b, "INTERSECT") {
            Ok(cache) => cache,
            Err(e) => return Box::new(std::iter::once(Err(e))),
        };
        Box::new(a.stream().filter(move |item| match item {
            Ok(row) => cache.iter().any(|c| c.shallow_eq(row)),
            Err(_) => true,
        }))
    }))
}

/// Rows of `a` followed by rows of `b`
pub fn union_all(a: impl Into<RowSource>, b: impl Into<RowSource>) -> Query {
    let (a, b) = (a.into(), b.into());
    Query::from_source(RowSource::from_factory(move || -> RowStream {
        Box::new(a.stream().chain(b.stream()))
    }))
}

/// [`union_all`] without duplicates
pub fn union(a: impl Into<RowSource>, b: impl Into<RowSource>) -> Query {
    let mut query = union_all(a, b);
    query.distinct(true);
    query
}

fn materialize(source: &RowSource, operation: &str) -> SqlResult<Vec<Row>> {
    let rows: Vec<Row> = source.stream().collect::<SqlResult<_>>()?;
    debug!("{} cached {} rows from the right-hand source", operation, rows.len());
    Ok(rows)
}
