//! Builds one output row from a source row and its row-group.

use super::{BuiltinCall, ColumnSpec, Selection};
use crate::sql::config::QueryConfig;
use crate::sql::error::{SqlError, SqlResult};
use crate::sql::execution::functions::{AggregateFunction, BuiltinFunction, RankingInput};
use crate::sql::execution::order::OrderBy;
use crate::sql::execution::types::{FieldValue, Row};
use crate::sql::execution::window::{WindowEvaluator, WindowRef, WindowSpec, WindowView};
use std::collections::HashMap;

/// Evaluates a [`Selection`] against row-groups
///
/// The evaluator borrows the query's named-window table and configuration
/// for the duration of one execution pass.
pub struct SelectionEvaluator<'a> {
    selection: &'a Selection,
    windows: &'a HashMap<String, WindowSpec>,
    config: &'a QueryConfig,
}

impl<'a> SelectionEvaluator<'a> {
    pub fn new(
        selection: &'a Selection,
        windows: &'a HashMap<String, WindowSpec>,
        config: &'a QueryConfig,
    ) -> Self {
        Self {
            selection,
            windows,
            config,
        }
    }

    /// Project the row at `anchor` within `group`
    ///
    /// `anchor` is `None` only for the implicit group of an empty input, in
    /// which case field references read as NULL. `output_index` is 1-based.
    pub fn evaluate(
        &self,
        group: &[Row],
        anchor: Option<usize>,
        output_index: usize,
    ) -> SqlResult<Row> {
        let empty = Row::new();
        let source = anchor.and_then(|i| group.get(i)).unwrap_or(&empty);
        let ctx = EvalContext {
            group,
            anchor,
            source,
            output_index,
        };

        let mut out = Row::new();
        for (alias, spec) in self.selection.columns() {
            match spec {
                ColumnSpec::Field(name) if name == "*" => copy_all(alias, source, &mut out),
                ColumnSpec::Field(name) => out.insert(alias.as_str(), source.resolve(name)),
                other => {
                    let value = self.evaluate_value(other, None, &ctx)?;
                    out.insert(alias.as_str(), value);
                }
            }
        }
        Ok(out)
    }

    /// `window` is the window imposed by an enclosing spec; it takes
    /// precedence over the call's own OVER clause.
    fn evaluate_value(
        &self,
        spec: &'a ColumnSpec,
        window: Option<&'a WindowRef>,
        ctx: &EvalContext<'_>,
    ) -> SqlResult<FieldValue> {
        match spec {
            ColumnSpec::Field(name) if name == "*" => Ok(FieldValue::Map(
                ctx.source
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            )),
            ColumnSpec::Field(name) => Ok(ctx.source.resolve(name)),
            ColumnSpec::Lambda(f) => {
                let (view, _) = self.resolve_window(window, ctx)?;
                let rows = view.collect_rows(ctx.group);
                Ok(f(ctx.source, ctx.output_index, &rows))
            }
            ColumnSpec::Call(call) => {
                let (view, spec) = self.resolve_window(window.or(call.window.as_ref()), ctx)?;
                self.evaluate_call(call, &view, spec, ctx.group)
            }
            ColumnSpec::Windowed { inner, window: own } => {
                self.evaluate_value(inner, window.or(Some(own)), ctx)
            }
        }
    }

    fn resolve_window(
        &self,
        window: Option<&'a WindowRef>,
        ctx: &EvalContext<'_>,
    ) -> SqlResult<(WindowView, Option<&'a WindowSpec>)> {
        let spec = match window {
            None | Some(WindowRef::Whole) => {
                return Ok((WindowView::whole(ctx.group.len(), ctx.anchor), None));
            }
            Some(WindowRef::Inline(spec)) => spec,
            Some(WindowRef::Named(name)) => self.windows.get(name).ok_or_else(|| {
                SqlError::configuration_error(format!("Unknown window '{}'", name))
            })?,
        };
        let view = WindowEvaluator::evaluate(spec, ctx.group, ctx.anchor)?;
        Ok((view, Some(spec)))
    }

    fn evaluate_call(
        &self,
        call: &BuiltinCall,
        view: &WindowView,
        spec: Option<&WindowSpec>,
        group: &[Row],
    ) -> SqlResult<FieldValue> {
        let rows = view.collect_rows(group);
        let value = match call.function {
            BuiltinFunction::RowNumber => view
                .position
                .map(|p| FieldValue::Integer(p as i64 + 1))
                .unwrap_or(FieldValue::Null),
            BuiltinFunction::Aggregate(f) => {
                if rows.is_empty() && matches!(f, AggregateFunction::Sum | AggregateFunction::Avg) {
                    return Ok(FieldValue::Null);
                }
                f.apply(&extract_values(&rows, call), self.config)
            }
            BuiltinFunction::Ranking(f) => {
                let order_by = required_order_by(call, spec)?;
                match view.position {
                    Some(position) => f.apply(&RankingInput {
                        rows: &rows,
                        position,
                        order_by,
                        args: &call.args,
                    })?,
                    None => FieldValue::Null,
                }
            }
            BuiltinFunction::Position(f) => {
                required_order_by(call, spec)?;
                match view.position {
                    Some(position) => f.apply(
                        &extract_values(&rows, call),
                        position,
                        &call.args,
                        self.config,
                    )?,
                    None => FieldValue::Null,
                }
            }
            BuiltinFunction::Statistical(f) => f.apply(&extract_values(&rows, call)),
        };
        Ok(null_if_nan(value))
    }
}

struct EvalContext<'r> {
    group: &'r [Row],
    anchor: Option<usize>,
    source: &'r Row,
    output_index: usize,
}

fn required_order_by<'s>(call: &BuiltinCall, spec: Option<&'s WindowSpec>) -> SqlResult<&'s OrderBy> {
    spec.and_then(|s| s.order_by.as_ref()).ok_or_else(|| {
        SqlError::configuration_error(format!(
            "{} requires a window with an ORDER BY",
            call.name
        ))
    })
}

/// One value per row from the call's source field; `*` or no argument
/// extracts the whole row
fn extract_values(rows: &[&Row], call: &BuiltinCall) -> Vec<FieldValue> {
    match call.source_field() {
        Some(field) if field != "*" => rows.iter().map(|r| r.resolve(field)).collect(),
        _ => rows
            .iter()
            .map(|r| FieldValue::Map(r.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()))
            .collect(),
    }
}

fn null_if_nan(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Float(f) if f.is_nan() => FieldValue::Null,
        other => other,
    }
}

/// `"*"` copies every field; under another alias the keys are prefixed
fn copy_all(alias: &str, source: &Row, out: &mut Row) {
    for (name, value) in source.iter() {
        if alias == "*" {
            out.insert(name, value.clone());
        } else {
            out.insert(format!("{}.{}", alias, name), value.clone());
        }
    }
}
