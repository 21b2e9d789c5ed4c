//! Evaluation output types consumed by the rendering layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SensorError;
use crate::expression::{Operator, SensorExpression};
use crate::value::SensorValue;

/// Outcome class of one sensor expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// The healthy condition holds.
    Nominal,
    /// The healthy condition is false: an active alarm.
    Triggered,
    /// The expression or its data could not be evaluated. Counts as an alarm.
    Malformed,
}

impl Classification {
    pub fn is_alarm(self) -> bool {
        !matches!(self, Classification::Nominal)
    }
}

/// Result of evaluating a single sensor expression.
///
/// `Malformed` results always carry `error`. `Nominal` and `Triggered`
/// results carry operator, threshold and current value; the only exception
/// is an unmonitored pass (no state lookup configured), which is `Nominal`
/// without a current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Entity id, or the raw expression when it could not be parsed.
    pub entity_id: String,
    /// The expression as written in the descriptor.
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<SensorValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SensorError>,
    pub classification: Classification,
}

impl EvaluationResult {
    pub(crate) fn malformed(expression: &str, entity_id: &str, error: SensorError) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            expression: expression.to_string(),
            operator: None,
            threshold: None,
            value: None,
            error: Some(error),
            classification: Classification::Malformed,
        }
    }

    /// Start from a successfully parsed expression. Still unclassified, so
    /// it is `Malformed` until [`classify`](Self::classify) is called.
    pub(crate) fn parsed(expression: &str, expr: &SensorExpression) -> Self {
        Self {
            entity_id: expr.entity_id.clone(),
            expression: expression.to_string(),
            operator: Some(expr.operator),
            threshold: None,
            value: None,
            error: None,
            classification: Classification::Malformed,
        }
    }

    pub(crate) fn fail(mut self, error: SensorError) -> Self {
        self.error = Some(error);
        self.classification = Classification::Malformed;
        self
    }

    pub(crate) fn classify(mut self, holds: bool) -> Self {
        self.error = None;
        self.classification = if holds {
            Classification::Nominal
        } else {
            Classification::Triggered
        };
        self
    }

    /// Entity id and operator come from the parsed expression when it
    /// parses, the raw text otherwise.
    pub(crate) fn unmonitored(expression: &str) -> Self {
        let parsed = SensorExpression::parse(expression).ok();
        Self {
            entity_id: parsed
                .as_ref()
                .map_or_else(|| expression.to_string(), |expr| expr.entity_id.clone()),
            expression: expression.to_string(),
            operator: parsed.map(|expr| expr.operator),
            threshold: None,
            value: None,
            error: None,
            classification: Classification::Nominal,
        }
    }

    pub fn is_alarm(&self) -> bool {
        self.classification.is_alarm()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// One tooltip line per result.
impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(error) = &self.error {
            return write!(f, "{}: {}", self.entity_id, error);
        }
        match (&self.operator, &self.threshold, &self.value) {
            (Some(op), Some(threshold), Some(value)) => write!(
                f,
                "{} {} {} (current: {})",
                self.entity_id, op, threshold, value
            ),
            _ => write!(f, "{} (not monitored)", self.expression),
        }
    }
}

/// Results for one equipment item, split by outcome.
///
/// `triggered` holds both triggered and malformed results. Each list keeps
/// the order the expressions were declared in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensorReport {
    pub nominal: Vec<EvaluationResult>,
    pub triggered: Vec<EvaluationResult>,
}

impl SensorReport {
    pub(crate) fn push(&mut self, result: EvaluationResult) {
        if result.is_alarm() {
            self.triggered.push(result);
        } else {
            self.nominal.push(result);
        }
    }

    /// True when at least one expression is triggered or malformed.
    pub fn is_alarm(&self) -> bool {
        !self.triggered.is_empty()
    }

    pub fn malformed_count(&self) -> usize {
        self.triggered
            .iter()
            .filter(|r| r.classification == Classification::Malformed)
            .count()
    }

    /// True when the equipment has no sensor expressions at all.
    pub fn is_empty(&self) -> bool {
        self.nominal.is_empty() && self.triggered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nominal.len() + self.triggered.len()
    }

    /// Tooltip text: alarms first, then nominal results.
    pub fn tooltip_lines(&self) -> Vec<String> {
        self.triggered
            .iter()
            .chain(self.nominal.iter())
            .map(ToString::to_string)
            .collect()
    }
}
