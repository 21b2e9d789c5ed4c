//! Sensor expression parser.
//!
//! An expression is `<entity> <operator> <threshold>`: an entity id without
//! whitespace, one of six comparison operators, and a threshold literal that
//! runs to the end of the string (so quoted text may contain spaces).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::value::{parse_threshold, SensorValue};

// ── Operator ────────────────────────────────────────────────────────

/// Comparison operator of a sensor expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Neq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Neq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Neq => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
        }
    }

    /// Apply the operator to `current <op> threshold`.
    ///
    /// Both sides must be the same kind. Numbers use numeric ordering, text
    /// uses lexicographic ordering.
    pub fn apply(self, current: &SensorValue, threshold: &SensorValue) -> Result<bool, SensorError> {
        match (current, threshold) {
            (SensorValue::Numeric(a), SensorValue::Numeric(b)) => Ok(self.holds(a, b)),
            (SensorValue::Text(a), SensorValue::Text(b)) => Ok(self.holds(a.as_str(), b.as_str())),
            (value, threshold) => Err(SensorError::TypeMismatch {
                value: value.kind(),
                threshold: threshold.kind(),
            }),
        }
    }

    fn holds<T: PartialOrd + ?Sized>(self, a: &T, b: &T) -> bool {
        match self {
            Operator::Eq => a == b,
            Operator::Neq => a != b,
            Operator::Lt => a < b,
            Operator::Lte => a <= b,
            Operator::Gt => a > b,
            Operator::Gte => a >= b,
        }
    }

    /// Tokens built only from operator characters are treated as attempted
    /// operators; anything else is a format error.
    fn looks_like_operator(token: &str) -> bool {
        !token.is_empty() && token.chars().all(|c| matches!(c, '<' | '>' | '=' | '!'))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| SensorError::UnsupportedOperator(s.to_string()))
    }
}

// ── Expression ──────────────────────────────────────────────────────

/// A parsed `<entity> <operator> <threshold>` expression.
///
/// The threshold is kept as raw text; [`SensorExpression::threshold`] parses
/// it so that a bad literal can be reported separately from a bad shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorExpression {
    pub entity_id: String,
    pub operator: Operator,
    pub threshold_raw: String,
}

impl SensorExpression {
    pub fn parse(raw: &str) -> Result<Self, SensorError> {
        let (entity_id, rest) = split_token(raw.trim()).ok_or(SensorError::Format)?;
        let (op_token, threshold_raw) = split_token(rest).ok_or(SensorError::Format)?;

        if threshold_raw.is_empty() {
            return Err(SensorError::Format);
        }
        if !Operator::looks_like_operator(op_token) {
            return Err(SensorError::Format);
        }
        let operator = op_token.parse::<Operator>()?;

        Ok(Self {
            entity_id: entity_id.to_string(),
            operator,
            threshold_raw: threshold_raw.to_string(),
        })
    }

    pub fn threshold(&self) -> Result<SensorValue, SensorError> {
        parse_threshold(&self.threshold_raw)
    }
}

impl FromStr for SensorExpression {
    type Err = SensorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SensorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.entity_id, self.operator, self.threshold_raw)
    }
}

/// Split off the first whitespace-delimited token, returning it and the
/// remainder with leading whitespace removed.
fn split_token(s: &str) -> Option<(&str, &str)> {
    let idx = s.find(char::is_whitespace)?;
    Some((&s[..idx], s[idx..].trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_equality() {
        let expr = SensorExpression::parse("binary_sensor.ping = 'on'").unwrap();
        assert_eq!(expr.entity_id, "binary_sensor.ping");
        assert_eq!(expr.operator, Operator::Eq);
        assert_eq!(expr.threshold_raw, "'on'");
        assert_eq!(expr.threshold().unwrap(), SensorValue::Text("on".into()));
    }

    #[test]
    fn threshold_keeps_inner_whitespace() {
        let expr = SensorExpression::parse("  device_tracker.ups   !=   'not home'  ").unwrap();
        assert_eq!(expr.entity_id, "device_tracker.ups");
        assert_eq!(expr.operator, Operator::Neq);
        assert_eq!(expr.threshold_raw, "'not home'");
    }

    #[test]
    fn every_operator_parses() {
        for op in Operator::ALL {
            let raw = format!("sensor.temp {} 40", op);
            assert_eq!(SensorExpression::parse(&raw).unwrap().operator, op);
        }
    }

    #[test]
    fn missing_threshold_is_format_error() {
        assert_eq!(SensorExpression::parse("sensor.x >"), Err(SensorError::Format));
        assert_eq!(SensorExpression::parse("sensor.x >   "), Err(SensorError::Format));
    }

    #[test]
    fn missing_operator_is_format_error() {
        assert_eq!(SensorExpression::parse("sensor.x"), Err(SensorError::Format));
        assert_eq!(SensorExpression::parse("sensor.x 5"), Err(SensorError::Format));
        assert_eq!(SensorExpression::parse("sensor.x is 5"), Err(SensorError::Format));
        assert_eq!(SensorExpression::parse(""), Err(SensorError::Format));
    }

    #[test]
    fn unknown_operator_symbol_is_unsupported() {
        assert_eq!(
            SensorExpression::parse("sensor.x == 5"),
            Err(SensorError::UnsupportedOperator("==".into()))
        );
        assert_eq!(
            "=>".parse::<Operator>(),
            Err(SensorError::UnsupportedOperator("=>".into()))
        );
    }

    #[test]
    fn numeric_operators_are_exhaustive() {
        let three = SensorValue::Numeric(3.0);
        let five = SensorValue::Numeric(5.0);
        let expected = [
            (Operator::Eq, false),
            (Operator::Neq, true),
            (Operator::Lt, true),
            (Operator::Lte, true),
            (Operator::Gt, false),
            (Operator::Gte, false),
        ];
        for (op, want) in expected {
            assert_eq!(op.apply(&three, &five), Ok(want), "3 {} 5", op);
        }
        assert_eq!(Operator::Lte.apply(&five, &five), Ok(true));
        assert_eq!(Operator::Gte.apply(&five, &five), Ok(true));
    }

    #[test]
    fn integer_and_float_compare_equal() {
        assert_eq!(
            Operator::Eq.apply(&SensorValue::Numeric(5.0), &SensorValue::Numeric(5.0)),
            Ok(true)
        );
    }

    #[test]
    fn text_ordering_is_lexicographic() {
        let a = SensorValue::Text("apple".into());
        let b = SensorValue::Text("banana".into());
        assert_eq!(Operator::Lt.apply(&a, &b), Ok(true));
        assert_eq!(Operator::Gte.apply(&a, &b), Ok(false));
        assert_eq!(Operator::Eq.apply(&a, &a), Ok(true));
    }

    #[test]
    fn mixed_kinds_are_rejected() {
        let err = Operator::Eq
            .apply(&SensorValue::Numeric(5.0), &SensorValue::Text("5".into()))
            .unwrap_err();
        assert!(matches!(err, SensorError::TypeMismatch { .. }));
    }

    #[test]
    fn display_round_trips() {
        let raw = "sensor.load >= 0.75";
        assert_eq!(SensorExpression::parse(raw).unwrap().to_string(), raw);
    }
}
