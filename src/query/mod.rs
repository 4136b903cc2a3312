//! Query-string encoder
//!
//! Flattens nested maps and sequences into a PHP/Rack-style bracketed query
//! string:
//! - `{a: 1}`            -> `a=1`
//! - `{a: {b: "x"}}`     -> `a%5Bb%5D=x`
//! - `{a: ["x", "y"]}`   -> `a%5B%5D=x&a%5B%5D=y`
//! - `{a: [{b: 1}]}`     -> `a%5B0%5D%5Bb%5D=1`
//!
//! Output is deterministic: fragments are sorted at every map level and at
//! the top level, so the host's iteration order never leaks into the result.

mod escape;

pub use escape::{EscapeError, escape, unescape};

use std::borrow::Cow;

/// A value that can be flattened into a query string
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Bool(bool),
    Number(f64),
    String(String),
    /// String-keyed entries in host iteration order
    Map(Vec<(String, QueryValue)>),
    Seq(Vec<QueryValue>),
    /// A host value outside the encodable set (null, functions, ...).
    /// Never rendered.
    Unsupported,
}

impl QueryValue {
    /// Map or sequence
    pub fn is_composite(&self) -> bool {
        matches!(self, QueryValue::Map(_) | QueryValue::Seq(_))
    }

    /// Literal text used where a value is emitted without escaping.
    ///
    /// Composite and unsupported values have no literal form and render empty.
    pub fn literal(&self) -> Cow<'_, str> {
        match self {
            QueryValue::Bool(true) => Cow::Borrowed("true"),
            QueryValue::Bool(false) => Cow::Borrowed("false"),
            QueryValue::Number(n) => Cow::Owned(number_literal(*n)),
            QueryValue::String(s) => Cow::Borrowed(s),
            QueryValue::Map(_) | QueryValue::Seq(_) | QueryValue::Unsupported => {
                Cow::Borrowed("")
            }
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Number(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Number(value as f64)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<serde_json::Value> for QueryValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => QueryValue::Unsupported,
            Value::Bool(b) => QueryValue::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map(QueryValue::Number)
                .unwrap_or(QueryValue::Unsupported),
            Value::String(s) => QueryValue::String(s),
            Value::Array(items) => QueryValue::Seq(items.into_iter().map(Into::into).collect()),
            Value::Object(entries) => QueryValue::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

/// Number text: `f64` display for finite values (`1`, `2.5`). Non-finite
/// values are spelled `nan`, `inf` and `-inf`; `f64` would print `NaN`.
fn number_literal(n: f64) -> String {
    if n.is_nan() {
        "nan".to_string()
    } else if n.is_infinite() {
        let text = if n > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        n.to_string()
    }
}

/// Encode top-level entries into a query string
pub fn encode(root: &[(String, QueryValue)]) -> String {
    let mut fragments = Vec::with_capacity(root.len());
    for (key, value) in root {
        render(key, value, &mut fragments);
    }
    fragments.sort();
    fragments.join("&")
}

/// Append the fragment for `value` named by `prefix`, if it has one
fn render(prefix: &str, value: &QueryValue, out: &mut Vec<String>) {
    match value {
        QueryValue::Bool(_) | QueryValue::Number(_) => {
            out.push(format!("{}={}", escape(prefix), value.literal()));
        }
        QueryValue::String(s) => {
            out.push(format!("{}={}", escape(prefix), escape(s)));
        }
        QueryValue::Map(entries) => {
            let mut nested = Vec::with_capacity(entries.len());
            for (key, value) in entries {
                render(&format!("{prefix}[{key}]"), value, &mut nested);
            }
            nested.sort();
            out.push(nested.join("&"));
        }
        // An empty sequence is indistinguishable from an empty map
        QueryValue::Seq(items) if items.is_empty() => out.push(String::new()),
        QueryValue::Seq(items) => {
            // A parent already using `[]` stops the recursion: elements are
            // written as literals, whatever their type.
            let bracketed = prefix.ends_with("[]");
            let mut nested = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                if bracketed {
                    nested.push(format!("{}={}", escape(prefix), item.literal()));
                } else if item.is_composite() {
                    // Keys embed the zero-based position
                    render(&format!("{prefix}[{index}]"), item, &mut nested);
                } else {
                    render(&format!("{prefix}[]"), item, &mut nested);
                }
            }
            out.push(nested.join("&"));
        }
        QueryValue::Unsupported => {}
    }
}
