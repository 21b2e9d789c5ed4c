//! Sensor expression evaluator.
//!
//! Each expression in an equipment's sensor set is parsed, resolved against
//! the live-state lookup, type-checked and compared. Expressions describe the
//! *healthy* condition, so a comparison that comes out false is an alarm.
//!
//! Nothing here fails: every problem becomes a `Malformed` result on the
//! expression that caused it, and sibling expressions are still evaluated.

mod result;

use racker_core::EquipmentSensorSet;
use tracing::debug;

use crate::error::SensorError;
use crate::expression::SensorExpression;
use crate::state::StateLookup;
use crate::value::coerce_current;

pub use result::{Classification, EvaluationResult, SensorReport};

// ── Sensor evaluator ────────────────────────────────────────────────

/// Evaluates equipment sensor sets against a state lookup.
pub struct SensorEvaluator;

impl SensorEvaluator {
    /// Evaluate every expression of one equipment item.
    ///
    /// With no lookup configured nothing is evaluated and every expression
    /// is reported nominal: missing monitoring must not raise alarms.
    pub fn evaluate(set: &EquipmentSensorSet, lookup: Option<&dyn StateLookup>) -> SensorReport {
        let mut report = SensorReport::default();
        for raw in set.iter() {
            let result = match lookup {
                Some(lookup) => Self::evaluate_expression(raw, lookup),
                None => EvaluationResult::unmonitored(raw),
            };
            debug!(
                entity = %result.entity_id,
                classification = ?result.classification,
                "evaluated sensor expression"
            );
            report.push(result);
        }
        report
    }

    /// Evaluate a single raw expression.
    pub fn evaluate_expression(raw: &str, lookup: &dyn StateLookup) -> EvaluationResult {
        let expr = match SensorExpression::parse(raw) {
            Ok(expr) => expr,
            Err(error) => return EvaluationResult::malformed(raw, raw, error),
        };

        let mut result = EvaluationResult::parsed(raw, &expr);

        let Some(state) = lookup.lookup(&expr.entity_id) else {
            return result.fail(SensorError::MissingState);
        };

        let threshold = match expr.threshold() {
            Ok(threshold) => threshold,
            Err(error) => return result.fail(error),
        };
        let current = coerce_current(&state.state);

        let outcome = expr.operator.apply(&current, &threshold);
        result.threshold = Some(threshold);
        result.value = Some(current);

        match outcome {
            Ok(holds) => result.classify(holds),
            Err(error) => result.fail(error),
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FORMAT_HINT;
    use crate::expression::Operator;
    use crate::state::StateSnapshot;
    use crate::value::{SensorValue, ValueKind};

    fn snapshot(pairs: &[(&str, &str)]) -> StateSnapshot {
        StateSnapshot::from_pairs(pairs.iter().copied())
    }

    fn eval(raw: &str, states: &StateSnapshot) -> EvaluationResult {
        SensorEvaluator::evaluate_expression(raw, states)
    }

    #[test]
    fn matching_text_is_nominal() {
        let states = snapshot(&[("binary_sensor.ping", "on")]);
        let result = eval("binary_sensor.ping = 'on'", &states);
        assert_eq!(result.classification, Classification::Nominal);
        assert_eq!(result.operator, Some(Operator::Eq));
        assert_eq!(result.threshold, Some(SensorValue::Text("on".into())));
        assert_eq!(result.value, Some(SensorValue::Text("on".into())));
        assert!(result.error.is_none());
    }

    #[test]
    fn mismatching_text_is_triggered() {
        let states = snapshot(&[("binary_sensor.ping", "off")]);
        let result = eval("binary_sensor.ping = 'on'", &states);
        assert_eq!(result.classification, Classification::Triggered);
        assert!(result.error.is_none());
        assert_eq!(result.to_string(), "binary_sensor.ping = 'on' (current: 'off')");
    }

    #[test]
    fn large_counters_compare_numerically() {
        let states = snapshot(&[("sensor.rx_bytes", "18446744073709551615")]);
        let result = eval("sensor.rx_bytes > 0", &states);
        assert_eq!(result.classification, Classification::Nominal);

        let result = eval("sensor.rx_bytes < 99999999999999999999", &states);
        assert_eq!(result.classification, Classification::Nominal);
        assert!(result.error.is_none());
    }

    #[test]
    fn missing_state_is_malformed() {
        let result = eval("binary_sensor.gone = 'on'", &StateSnapshot::new());
        assert_eq!(result.classification, Classification::Malformed);
        assert_eq!(result.entity_id, "binary_sensor.gone");
        assert!(result
            .error_message()
            .unwrap()
            .contains("didn't return a current value"));
    }

    #[test]
    fn unparseable_expression_keeps_raw_text_as_entity() {
        let result = eval("sensor.x >", &StateSnapshot::new());
        assert_eq!(result.classification, Classification::Malformed);
        assert_eq!(result.entity_id, "sensor.x >");
        assert_eq!(result.error, Some(SensorError::Format));
        assert_eq!(result.error_message().as_deref(), Some(FORMAT_HINT));
        assert!(result.operator.is_none());
    }

    #[test]
    fn unsupported_operator_is_malformed() {
        let states = snapshot(&[("sensor.x", "1")]);
        let result = eval("sensor.x == 1", &states);
        assert_eq!(result.classification, Classification::Malformed);
        assert_eq!(result.error, Some(SensorError::UnsupportedOperator("==".into())));
    }

    #[test]
    fn bad_threshold_names_the_text() {
        let states = snapshot(&[("sensor.temp", "40")]);
        let result = eval("sensor.temp < abc", &states);
        assert_eq!(result.classification, Classification::Malformed);
        assert!(matches!(
            &result.error,
            Some(SensorError::ThresholdParse { text, .. }) if text == "abc"
        ));
    }

    #[test]
    fn quoted_number_does_not_match_numeric_reading() {
        let states = snapshot(&[("sensor.fans", "5")]);
        let result = eval("sensor.fans = '5'", &states);
        assert_eq!(result.threshold, Some(SensorValue::Text("5".into())));
        assert_eq!(result.value, Some(SensorValue::Numeric(5.0)));
        assert_eq!(result.classification, Classification::Malformed);
        assert_eq!(
            result.error,
            Some(SensorError::TypeMismatch {
                value: ValueKind::Numeric,
                threshold: ValueKind::Text,
            })
        );
    }

    #[test]
    fn numeric_threshold_against_text_reading_is_malformed() {
        let states = snapshot(&[("sensor.temp", "unavailable")]);
        let result = eval("sensor.temp < 55", &states);
        assert_eq!(result.classification, Classification::Malformed);
        assert!(matches!(result.error, Some(SensorError::TypeMismatch { .. })));
    }

    #[test]
    fn numeric_comparisons() {
        let states = snapshot(&[("sensor.temp", "41.5"), ("sensor.fans", "4")]);
        assert_eq!(eval("sensor.temp < 55", &states).classification, Classification::Nominal);
        assert_eq!(eval("sensor.temp >= 50.0", &states).classification, Classification::Triggered);
        assert_eq!(eval("sensor.fans = 4", &states).classification, Classification::Nominal);
        assert_eq!(eval("sensor.fans != 4.0", &states).classification, Classification::Triggered);
    }

    #[test]
    fn report_splits_results_in_order() {
        let states = snapshot(&[("a", "on"), ("b", "off"), ("c", "on")]);
        let set = EquipmentSensorSet::new(["a = 'on'", "b = 'on'", "c = 'on'", "garbage"]);
        let report = SensorEvaluator::evaluate(&set, Some(&states));

        let nominal: Vec<_> = report.nominal.iter().map(|r| r.entity_id.as_str()).collect();
        let triggered: Vec<_> = report.triggered.iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(nominal, vec!["a", "c"]);
        assert_eq!(triggered, vec!["b", "garbage"]);
        assert_eq!(report.malformed_count(), 1);
        assert!(report.is_alarm());
        assert_eq!(report.tooltip_lines()[0], "b = 'on' (current: 'off')");
    }

    #[test]
    fn no_lookup_reports_everything_nominal() {
        let set = EquipmentSensorSet::new(["a = 'on'", "not an expression"]);
        let report = SensorEvaluator::evaluate(&set, None);
        assert_eq!(report.nominal.len(), 2);
        assert!(report.triggered.is_empty());
        assert!(report.nominal.iter().all(|r| r.value.is_none()));
        assert_eq!(report.nominal[0].to_string(), "a = 'on' (not monitored)");
        assert_eq!(report.nominal[0].entity_id, "a");
        assert_eq!(report.nominal[0].operator, Some(Operator::Eq));
        assert_eq!(report.nominal[1].entity_id, "not an expression");
        assert!(report.nominal[1].operator.is_none());
    }

    #[test]
    fn empty_set_yields_empty_report() {
        let states = snapshot(&[]);
        let report = SensorEvaluator::evaluate(&EquipmentSensorSet::default(), Some(&states));
        assert!(report.is_empty());
        assert!(!report.is_alarm());
    }

    #[test]
    fn repeated_evaluation_is_identical() {
        let states = snapshot(&[("a", "on"), ("b", "3")]);
        let set = EquipmentSensorSet::new(["a = 'on'", "b > 5", "c = 1", "d"]);
        let first = SensorEvaluator::evaluate(&set, Some(&states));
        for _ in 0..3 {
            let again = SensorEvaluator::evaluate(&set, Some(&states));
            assert_eq!(again, first);
            assert_eq!(
                serde_json::to_string(&again).unwrap(),
                serde_json::to_string(&first).unwrap()
            );
        }
    }
}
