/*!
# Selection

A [`Selection`] maps output aliases to [`ColumnSpec`]s and defines the shape
of every row a query yields. Column specs are resolved once, when the
selection is built:

- [`ColumnSpec::Field`] copies a field through (`"*"` copies the whole row)
- [`ColumnSpec::Call`] is a builtin call such as `SUM(amount) OVER w`
- [`ColumnSpec::Lambda`] maps `(row, output_index, row_group)` to a value
- [`ColumnSpec::Windowed`] evaluates any other spec over a window

```rust
use veloquery::sql::execution::selection::{ColumnSpec, Selection};

let selection = Selection::new()
    .field("region")
    .expr("total", "SUM(amount)")
    .unwrap()
    .column("rank", ColumnSpec::parse("RANK()").unwrap().over("by_amount"));
assert_eq!(selection.len(), 3);
```
*/

pub mod call_parser;
pub mod evaluator;

pub use evaluator::SelectionEvaluator;

use crate::sql::error::SqlError;
use crate::sql::execution::functions::BuiltinFunction;
use crate::sql::execution::types::{FieldValue, Row};
use crate::sql::execution::window::WindowRef;
use std::fmt;
use std::sync::Arc;

/// Caller-supplied column: `(source_row, output_index, row_group) -> value`
///
/// `output_index` is 1-based. `row_group` is the (possibly windowed) set of
/// rows the source row is evaluated against.
pub type ColumnFn = Arc<dyn Fn(&Row, usize, &[&Row]) -> FieldValue + Send + Sync>;

/// A builtin call with its name already resolved
#[derive(Debug, Clone)]
pub struct BuiltinCall {
    pub name: String,
    pub function: BuiltinFunction,
    pub args: Vec<String>,
    pub window: Option<WindowRef>,
}

impl BuiltinCall {
    /// Parse `NAME(args) [OVER window]`; `Ok(None)` for plain field names
    pub fn parse(text: &str) -> Result<Option<BuiltinCall>, SqlError> {
        let Some(parsed) = call_parser::parse_call(text)? else {
            return Ok(None);
        };
        let function = BuiltinFunction::lookup(&parsed.name).ok_or_else(|| {
            SqlError::configuration_error(format!(
                "Unknown builtin function '{}' in '{}'",
                parsed.name,
                text.trim()
            ))
        })?;
        Ok(Some(BuiltinCall {
            name: parsed.name,
            function,
            args: parsed.args,
            window: parsed.window.map(WindowRef::from),
        }))
    }

    /// The field the call reads values from (`args[0]`)
    pub fn source_field(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// How one output column is computed
#[derive(Clone)]
pub enum ColumnSpec {
    Field(String),
    Call(BuiltinCall),
    Lambda(ColumnFn),
    Windowed {
        inner: Box<ColumnSpec>,
        window: WindowRef,
    },
}

impl ColumnSpec {
    /// Resolve a selection string: a builtin call or a field name
    pub fn parse(text: &str) -> Result<ColumnSpec, SqlError> {
        Ok(match BuiltinCall::parse(text)? {
            Some(call) => ColumnSpec::Call(call),
            None => ColumnSpec::Field(text.trim().to_string()),
        })
    }

    pub fn field(name: impl Into<String>) -> ColumnSpec {
        ColumnSpec::Field(name.into())
    }

    pub fn lambda<F>(f: F) -> ColumnSpec
    where
        F: Fn(&Row, usize, &[&Row]) -> FieldValue + Send + Sync + 'static,
    {
        ColumnSpec::Lambda(Arc::new(f))
    }

    /// Evaluate this spec over `window`
    ///
    /// A call without its own `OVER` clause takes the window directly; any
    /// other spec is wrapped. The outermost window wins.
    pub fn over(self, window: impl Into<WindowRef>) -> ColumnSpec {
        let window = window.into();
        match self {
            ColumnSpec::Call(mut call) if call.window.is_none() => {
                call.window = Some(window);
                ColumnSpec::Call(call)
            }
            ColumnSpec::Windowed { inner, .. } => ColumnSpec::Windowed { inner, window },
            other => ColumnSpec::Windowed {
                inner: Box::new(other),
                window,
            },
        }
    }

    /// Whether evaluating this column needs a window pre-pass
    pub fn uses_window(&self) -> bool {
        match self {
            ColumnSpec::Call(call) => call.window.is_some(),
            ColumnSpec::Windowed { .. } => true,
            ColumnSpec::Field(_) | ColumnSpec::Lambda(_) => false,
        }
    }

    /// An unwindowed aggregate or statistical call
    pub fn is_group_aggregate(&self) -> bool {
        matches!(self, ColumnSpec::Call(call) if call.window.is_none() && call.function.is_group_aggregate())
    }
}

impl fmt::Debug for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Field(name) => f.debug_tuple("Field").field(name).finish(),
            ColumnSpec::Call(call) => f.debug_tuple("Call").field(call).finish(),
            ColumnSpec::Lambda(_) => write!(f, "Lambda(<fn>)"),
            ColumnSpec::Windowed { inner, window } => f
                .debug_struct("Windowed")
                .field("inner", inner)
                .field("window", window)
                .finish(),
        }
    }
}

impl From<&str> for ColumnSpec {
    /// Field reference; use [`ColumnSpec::parse`] for builtin calls
    fn from(value: &str) -> Self {
        ColumnSpec::Field(value.to_string())
    }
}

/// Ordered alias to column mapping
#[derive(Debug, Clone, Default)]
pub struct Selection {
    columns: Vec<(String, ColumnSpec)>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity selection of plain field names
    ///
    /// Names are never parsed as builtin calls; see [`Selection::parse`].
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Selection::new();
        for name in names {
            selection = selection.field(name);
        }
        selection
    }

    /// Parse each entry as a selection string, aliased to itself
    pub fn parse<I, S>(entries: I) -> Result<Self, SqlError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut selection = Selection::new();
        for entry in entries {
            let text = entry.as_ref();
            selection = selection.expr(text.trim(), text)?;
        }
        Ok(selection)
    }

    /// Add or replace a column; replacing keeps the original position
    pub fn column(mut self, alias: impl Into<String>, spec: ColumnSpec) -> Self {
        let alias = alias.into();
        match self.columns.iter_mut().find(|(a, _)| *a == alias) {
            Some(slot) => slot.1 = spec,
            None => self.columns.push((alias, spec)),
        }
        self
    }

    /// Copy a field through under its own name
    pub fn field(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.column(name.clone(), ColumnSpec::Field(name))
    }

    /// Add a column from a selection string (`"SUM(a) OVER w"`, `"price"`)
    pub fn expr(self, alias: impl Into<String>, text: &str) -> Result<Self, SqlError> {
        Ok(self.column(alias, ColumnSpec::parse(text)?))
    }

    pub fn lambda<F>(self, alias: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Row, usize, &[&Row]) -> FieldValue + Send + Sync + 'static,
    {
        self.column(alias, ColumnSpec::lambda(f))
    }

    /// Add `spec` evaluated over `window`
    pub fn windowed(
        self,
        alias: impl Into<String>,
        spec: ColumnSpec,
        window: impl Into<WindowRef>,
    ) -> Self {
        self.column(alias, spec.over(window))
    }

    pub fn columns(&self) -> &[(String, ColumnSpec)] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn uses_window(&self) -> bool {
        self.columns.iter().any(|(_, spec)| spec.uses_window())
    }

    pub fn has_group_aggregate(&self) -> bool {
        self.columns.iter().any(|(_, spec)| spec.is_group_aggregate())
    }
}

/// Plain field names only: `"SUM(a)"` selects a field literally named
/// `SUM(a)`. Use [`Selection::parse`] for builtin call strings.
impl From<Vec<&str>> for Selection {
    fn from(names: Vec<&str>) -> Self {
        Selection::fields(names)
    }
}

/// Plain field names only: `"SUM(a)"` selects a field literally named
/// `SUM(a)`. Use [`Selection::parse`] for builtin call strings.
impl<const N: usize> From<[&str; N]> for Selection {
    fn from(names: [&str; N]) -> Self {
        Selection::fields(names)
    }
}

/// Plain field names only: `"SUM(a)"` selects a field literally named
/// `SUM(a)`. Use [`Selection::parse`] for builtin call strings.
impl From<Vec<String>> for Selection {
    fn from(names: Vec<String>) -> Self {
        Selection::fields(names)
    }
}
