//! Typed sensor values: threshold literals and coerced live readings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// A threshold or current reading, tagged by kind.
///
/// Integers and floats share the `Numeric` kind; `5` and `5.0` compare equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Numeric(f64),
    Text(String),
}

/// The kind of a [`SensorValue`], used in type-mismatch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Numeric,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Numeric => write!(f, "numeric"),
            ValueKind::Text => write!(f, "text"),
        }
    }
}

impl SensorValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            SensorValue::Numeric(_) => ValueKind::Numeric,
            SensorValue::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SensorValue::Numeric(n) => Some(*n),
            SensorValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SensorValue::Text(s) => Some(s),
            SensorValue::Numeric(_) => None,
        }
    }
}

/// Renders the value the way it would be written in an expression:
/// text quoted, numbers bare.
impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Numeric(n) => write!(f, "{}", n),
            SensorValue::Text(s) => write!(f, "'{}'", s),
        }
    }
}

/// Parse a threshold literal.
///
/// - `'...'` → text with the quotes stripped (closing quote required)
/// - contains `.` → floating point
/// - otherwise → integer
pub fn parse_threshold(text: &str) -> Result<SensorValue, SensorError> {
    if let Some(rest) = text.strip_prefix('\'') {
        return match rest.strip_suffix('\'') {
            Some(inner) => Ok(SensorValue::Text(inner.to_string())),
            None => Err(SensorError::threshold(text, "missing closing quote")),
        };
    }

    if !text.contains('.') && !is_integer_literal(text) {
        return Err(SensorError::threshold(text, "invalid digit found in string"));
    }
    // Integers go straight to f64 so counters beyond i64 still parse.
    let number = text
        .parse::<f64>()
        .map_err(|e| SensorError::threshold(text, e.to_string()))?;

    if !number.is_finite() {
        return Err(SensorError::threshold(text, "not a finite number"));
    }
    Ok(SensorValue::Numeric(number))
}

/// An optionally signed, non-empty run of ASCII digits.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(&['-', '+'][..]).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Coerce a raw state string the way thresholds are parsed, falling back to
/// the raw text when it is not a valid literal.
pub fn coerce_current(raw: &str) -> SensorValue {
    parse_threshold(raw).unwrap_or_else(|_| SensorValue::Text(raw.to_string()))
}
