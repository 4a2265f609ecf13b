//! Parser for builtin-call selection strings.
//!
//! Grammar (whitespace around tokens is ignored):
//!
//! ```text
//! call   := NAME "(" [arg ("," arg)*] ")" [ "OVER" window ]
//! NAME   := [A-Z_]+
//! arg    := any text without "," or ")"
//! window := IDENT | "()"
//! ```
//!
//! A string that does not start with `NAME(` is not a call; it is a field
//! reference and the parser returns `None` for it.

use crate::sql::error::SqlError;

/// The pieces of a parsed call string, before name resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub name: String,
    pub args: Vec<String>,
    /// Window name, or `"()"` for the whole row-group
    pub window: Option<String>,
}

/// Parse `input` as a builtin call; `Ok(None)` means it is a plain field reference
pub fn parse_call(input: &str) -> Result<Option<ParsedCall>, SqlError> {
    let offset = input.len() - input.trim_start().len();
    let text = input.trim();

    let name_len = text
        .find(|c: char| !(c.is_ascii_uppercase() || c == '_'))
        .unwrap_or(text.len());
    if name_len == 0 || !text[name_len..].starts_with('(') {
        return Ok(None);
    }
    let name = &text[..name_len];
    let open = name_len;

    let close = match text[open + 1..].find(|c: char| c == ')' || c == '(') {
        Some(rel) if text.as_bytes()[open + 1 + rel] == b')' => open + 1 + rel,
        Some(rel) => {
            return Err(SqlError::parse_error(
                format!("Nested parentheses are not allowed in arguments of {}", name),
                Some(offset + open + 1 + rel),
            ));
        }
        None => {
            return Err(SqlError::parse_error(
                format!("Expected ')' to close the argument list of {}", name),
                Some(offset + text.len()),
            ));
        }
    };

    let raw_args = text[open + 1..close].trim();
    let args = if raw_args.is_empty() {
        Vec::new()
    } else {
        raw_args.split(',').map(|a| a.trim().to_string()).collect()
    };
    if args.iter().any(|a| a.is_empty()) {
        return Err(SqlError::parse_error(
            format!("Empty argument in call to {}", name),
            Some(offset + open + 1),
        ));
    }

    let rest = &text[close + 1..];
    let window = parse_over_clause(rest, offset + close + 1)?;

    Ok(Some(ParsedCall {
        name: name.to_string(),
        args,
        window,
    }))
}

fn parse_over_clause(rest: &str, position: usize) -> Result<Option<String>, SqlError> {
    let trimmed = rest.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let Some(after) = trimmed.strip_prefix("OVER") else {
        return Err(SqlError::parse_error(
            format!("Unexpected text after call: '{}'", trimmed),
            Some(position),
        ));
    };
    if !after.starts_with(char::is_whitespace) && !after.starts_with('(') {
        return Err(SqlError::parse_error(
            "Expected whitespace after OVER",
            Some(position),
        ));
    }
    let target: String = after.split_whitespace().collect();
    let valid = target == "()"
        || (!target.is_empty() && target.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !valid {
        return Err(SqlError::parse_error(
            format!("Expected a window name or () after OVER, found '{}'", after.trim()),
            Some(position),
        ));
    }
    Ok(Some(target))
}
