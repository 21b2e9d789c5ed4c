//! Sensor expression checks.

use racker_core::RackConfig;

use super::fuzzy::fuzzy_match;
use super::ValidationResult;
use crate::error::SensorError;
use crate::expression::{Operator, SensorExpression};
use crate::value::SensorValue;

pub(super) fn validate_sensors(rack: &RackConfig, result: &mut ValidationResult) {
    for (i, equipment) in rack.equipment.iter().enumerate() {
        for (j, raw) in equipment.entity.iter().enumerate() {
            let path = format!("equipment[{}].entity[{}]", i, j);
            check_expression(raw, &path, result);
        }
    }
}

fn check_expression(raw: &str, path: &str, result: &mut ValidationResult) {
    let expr = match SensorExpression::parse(raw) {
        Ok(expr) => expr,
        Err(SensorError::UnsupportedOperator(op)) => {
            let symbols: Vec<&str> = Operator::ALL.iter().map(|op| op.symbol()).collect();
            let suggestion = fuzzy_match(&op, &symbols).map(|s| format!("Did you mean '{}'?", s));
            result.error_with_suggestion(
                path,
                format!("{}: unsupported operator '{}'", raw, op),
                suggestion,
            );
            return;
        }
        Err(e) => {
            result.error(path, format!("{}: {}", raw, e));
            return;
        }
    };

    match expr.threshold() {
        Ok(SensorValue::Text(_))
            if !matches!(expr.operator, Operator::Eq | Operator::Neq) =>
        {
            result.warn(
                path,
                format!(
                    "{}: '{}' on a text threshold compares lexicographically",
                    raw, expr.operator
                ),
            );
        }
        Ok(_) => {}
        Err(e) => result.error(path, format!("{}: {}", raw, e)),
    }
}
