//! Failures that turn a sensor expression into a malformed result.

use serde::{Serialize, Serializer};

use crate::value::ValueKind;

/// Text shown for expressions that do not match `<entity> <operator> <threshold>`.
pub const FORMAT_HINT: &str = "Incorrect format! Should be: <entity> <operator> <threshold>";

/// Everything that can go wrong while evaluating one sensor expression.
///
/// None of these abort evaluation: the evaluator records the error on the
/// offending expression and moves on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SensorError {
    /// Expression does not have the `<entity> <operator> <threshold>` shape.
    #[error("{}", FORMAT_HINT)]
    Format,

    /// The state provider has no value for the entity.
    #[error("state provider didn't return a current value for this entity")]
    MissingState,

    /// Threshold literal is neither a quoted string nor a number.
    #[error("invalid threshold {text:?}: {reason}")]
    ThresholdParse { text: String, reason: String },

    /// Current value and threshold are of different kinds.
    #[error("type mismatch: current value is {value} but threshold is {threshold}")]
    TypeMismatch {
        value: ValueKind,
        threshold: ValueKind,
    },

    /// Operator-like token outside `=`, `<`, `<=`, `>`, `>=`, `!=`.
    #[error("unsupported operator '{0}'")]
    UnsupportedOperator(String),
}

impl SensorError {
    pub(crate) fn threshold(text: &str, reason: impl Into<String>) -> Self {
        SensorError::ThresholdParse {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

impl Serialize for SensorError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(SensorError::Format.to_string(), FORMAT_HINT);
        assert!(SensorError::MissingState
            .to_string()
            .contains("didn't return a current value"));
        assert_eq!(
            SensorError::TypeMismatch {
                value: ValueKind::Numeric,
                threshold: ValueKind::Text,
            }
            .to_string(),
            "type mismatch: current value is numeric but threshold is text"
        );
        assert_eq!(
            SensorError::threshold("abc", "not a number").to_string(),
            "invalid threshold \"abc\": not a number"
        );
    }

    #[test]
    fn serializes_as_message() {
        let json = serde_json::to_string(&SensorError::UnsupportedOperator("==".into())).unwrap();
        assert_eq!(json, "\"unsupported operator '=='\"");
    }
}
