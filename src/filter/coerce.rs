//! Scalar filter values and the numeric-or-string coercion rule
//!
//! A raw bound counts as numeric when, after trimming ASCII whitespace, it
//! matches `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`.
//! Anything else, including the empty string, `0x1F`, `Infinity` and
//! partially numeric text like `30k`, is kept verbatim as a string.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Number;

static NUMERIC_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$")
        .expect("numeric literal pattern is valid")
});

static INTEGER_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer literal pattern is valid"));

/// A single filter operand as it appears on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(Number),
    Text(String),
}

impl Scalar {
    /// Text form used when rendering filters and cells
    pub fn as_display(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Decode a JSON value that must be a scalar
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Scalar::Bool(*b)),
            serde_json::Value::Number(n) => Some(Scalar::Number(n.clone())),
            serde_json::Value::String(s) => Some(Scalar::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_display())
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Text(s)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n.into())
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

/// Whether `raw` is entirely numeric-looking
pub fn is_numeric_literal(raw: &str) -> bool {
    NUMERIC_LITERAL.is_match(raw.trim())
}

/// Parse as a number when entirely numeric, else keep the string unchanged
pub fn coerce(raw: &str) -> Scalar {
    let trimmed = raw.trim();
    if !NUMERIC_LITERAL.is_match(trimmed) {
        return Scalar::Text(raw.to_string());
    }

    if INTEGER_LITERAL.is_match(trimmed) {
        if let Ok(n) = trimmed.parse::<i64>() {
            return Scalar::Number(n.into());
        }
    }

    // Out-of-range integers and decimals go through f64; overflow to
    // infinity has no JSON form, so those stay strings.
    match trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Scalar::Number(n),
        None => Scalar::Text(raw.to_string()),
    }
}
