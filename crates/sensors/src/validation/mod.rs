//! Offline rack descriptor validation with structured errors and suggestions.
//!
//! Checks what can be checked without live state: sensor expression syntax,
//! threshold literals, model references and rack positions. Returns a
//! [`ValidationResult`] with errors (the rack will render alarms or broken
//! images) and warnings (advisory).

mod position_checks;
mod sensor_checks;

mod fuzzy;

use racker_core::RackConfig;
use serde::{Deserialize, Serialize};

use crate::loader::DescriptorCatalog;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `"equipment[2].entity[0]"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion,
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a rack descriptor against the loaded model catalog.
pub fn validate_rack(rack: &RackConfig, catalog: &DescriptorCatalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    sensor_checks::validate_sensors(rack, &mut result);
    position_checks::validate_models(rack, catalog, &mut result);
    position_checks::validate_positions(rack, catalog, &mut result);
    position_checks::validate_hostnames(rack, &mut result);
    result
}

/// Parse a rack descriptor from YAML and validate it.
pub fn validate_yaml(yaml: &str, catalog: &DescriptorCatalog) -> ValidationResult {
    match RackConfig::from_yaml(yaml) {
        Ok(rack) => validate_rack(&rack, catalog),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::Descriptor;
    use racker_core::EquipmentModel;

    fn catalog() -> DescriptorCatalog {
        let catalog = DescriptorCatalog::default();
        for (id, rack_u) in [("dell-r740", 2), ("cisco-9300", 1), ("apc-smt1500", 2)] {
            catalog.insert(
                id.to_string(),
                Descriptor::Model(EquipmentModel {
                    rack_u,
                    width_inches: 19.0,
                    img_type: "jpg".to_string(),
                }),
            );
        }
        catalog
    }

    fn paths(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|e| e.path.as_str()).collect()
    }

    #[test]
    fn valid_rack_passes() {
        let result = validate_yaml(
            r#"
rack_height: 42
equipment:
  - hostname: sw1
    model: cisco-9300
    position_topu: 42
    entity: binary_sensor.sw1 = 'on'
  - hostname: db1
    model: dell-r740
    position_topu: 30
    entity:
      - binary_sensor.db1 = 'on'
      - sensor.db1_temp < 70
"#,
            &catalog(),
        );
        assert!(result.valid, "unexpected errors: {:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn reports_every_problem_with_paths() {
        let result = validate_yaml(
            r#"
rack_height: 42
equipment:
  - hostname: sw1
    model: cisco-9300
    position_topu: 50
    entity: binary_sensor.sw1 >
  - hostname: sw1
    model: dell-r470
    position_topu: 10
    entity: sensor.temp < hot
"#,
            &catalog(),
        );
        assert!(!result.valid);
        assert_eq!(
            paths(&result),
            vec![
                "equipment[0].entity[0]",
                "equipment[1].entity[0]",
                "equipment[1].model",
                "equipment[0].position_topu",
            ]
        );
        let model_error = &result.errors[2];
        assert_eq!(model_error.suggestion.as_deref(), Some("Did you mean 'dell-r740'?"));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.path == "equipment[1].hostname"));
    }

    #[test]
    fn yaml_errors_are_reported() {
        let result = validate_yaml("equipment: [", &catalog());
        assert!(!result.valid);
        assert!(result.errors[0].message.starts_with("YAML parse error"));
    }
}
