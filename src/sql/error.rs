/*!
# Query Error Handling

Every failure the engine can surface is a [`SqlError`]. The engine has no
recovery layer: errors are raised synchronously at the point of evaluation
and terminate the row stream that produced them.

## Error Categories

- **Configuration Errors**: unresolvable named windows, unsupported framing
  units, ranking/position functions without an `orderBy`, unknown builtin
  function names
- **Parse Errors**: malformed builtin-call selection strings or sort strings
- **Execution Errors**: failures raised by caller-supplied join stages and
  row sources, or invalid function arguments discovered while evaluating
- **Type Errors**: values that cannot be coerced to the type an operation needs

Empty aggregate inputs are *not* errors: they produce sentinel values
(`±∞` for MAX/MIN, `0` for COUNT, `NULL` for SUM/AVG at the query layer).

## Examples

```rust
use veloquery::sql::error::SqlError;

let error = SqlError::parse_error("Expected ')' after argument list", Some(7));
assert_eq!(
    error.to_string(),
    "Parse error at position 7: Expected ')' after argument list"
);
```
*/

use thiserror::Error;

/// Errors raised while building or executing a query pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SqlError {
    /// The query definition references something that cannot be resolved.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// A selection or sort string does not follow its mini-grammar.
    #[error("{}", format_parse_error(.message, .position))]
    ParseError {
        message: String,
        position: Option<usize>,
    },

    /// A runtime failure while rows were flowing through the pipeline.
    #[error("{}", format_execution_error(.message, .query))]
    ExecutionError {
        message: String,
        query: Option<String>,
    },

    /// A value had the wrong type for the requested operation.
    #[error("Type error: expected {expected}, got {actual}")]
    TypeError {
        expected: String,
        actual: String,
        value: Option<String>,
    },
}

fn format_parse_error(message: &str, position: &Option<usize>) -> String {
    match position {
        Some(pos) => format!("Parse error at position {}: {}", pos, message),
        None => format!("Parse error: {}", message),
    }
}

fn format_execution_error(message: &str, query: &Option<String>) -> String {
    match query {
        Some(q) => format!("Query execution error in '{}': {}", q, message),
        None => format!("Query execution error: {}", message),
    }
}

impl SqlError {
    /// Create a configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        SqlError::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a parse error with an optional character position
    pub fn parse_error(message: impl Into<String>, position: Option<usize>) -> Self {
        SqlError::ParseError {
            message: message.into(),
            position,
        }
    }

    /// Create an execution error
    pub fn execution_error(message: impl Into<String>, query: Option<String>) -> Self {
        SqlError::ExecutionError {
            message: message.into(),
            query,
        }
    }

    /// Create a type error
    pub fn type_error(
        expected: impl Into<String>,
        actual: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        SqlError::TypeError {
            expected: expected.into(),
            actual: actual.into(),
            value,
        }
    }

    /// True for the configuration-error category
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, SqlError::ConfigurationError { .. })
    }
}

/// Result type for query operations
pub type SqlResult<T> = Result<T, SqlError>;
