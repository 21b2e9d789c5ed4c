//! Rack-level alarm aggregation.
//!
//! A rack is in alarm when any of its equipment has at least one triggered
//! or malformed sensor expression. State is derived fresh on every pass;
//! nothing is remembered between passes.

use std::fmt;

use racker_core::EquipmentConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::evaluator::{SensorEvaluator, SensorReport};
use crate::state::StateLookup;

// ── Alarm state ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RackAlarm {
    #[default]
    Clear,
    Alarm,
}

/// Change between two consecutive passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmTransition {
    Raised,
    Cleared,
}

impl RackAlarm {
    pub fn from_flag(alarm: bool) -> Self {
        if alarm {
            RackAlarm::Alarm
        } else {
            RackAlarm::Clear
        }
    }

    pub fn is_alarm(self) -> bool {
        self == RackAlarm::Alarm
    }

    /// Compare the previous pass with the current one.
    pub fn transition(previous: RackAlarm, current: RackAlarm) -> Option<AlarmTransition> {
        match (previous, current) {
            (RackAlarm::Clear, RackAlarm::Alarm) => Some(AlarmTransition::Raised),
            (RackAlarm::Alarm, RackAlarm::Clear) => Some(AlarmTransition::Cleared),
            _ => None,
        }
    }
}

impl fmt::Display for RackAlarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RackAlarm::Clear => write!(f, "clear"),
            RackAlarm::Alarm => write!(f, "alarm"),
        }
    }
}

// ── Reports ─────────────────────────────────────────────────────────

/// Evaluation results of one equipment item, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentReport {
    /// Position in the rack's equipment list.
    pub index: usize,
    /// Hostname, or model id when no hostname is set.
    pub label: String,
    pub sensors: SensorReport,
}

/// Full evaluation of a rack for one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RackReport {
    pub alarm: RackAlarm,
    pub equipment: Vec<EquipmentReport>,
}

impl RackReport {
    /// Equipment items with at least one triggered or malformed result.
    pub fn alarming(&self) -> impl Iterator<Item = &EquipmentReport> {
        self.equipment.iter().filter(|eq| eq.sensors.is_alarm())
    }
}

// ── Aggregation ─────────────────────────────────────────────────────

/// Evaluate every equipment item and derive the rack alarm.
pub fn evaluate_rack(equipment: &[EquipmentConfig], lookup: Option<&dyn StateLookup>) -> RackReport {
    let equipment: Vec<EquipmentReport> = equipment
        .iter()
        .enumerate()
        .map(|(index, eq)| EquipmentReport {
            index,
            label: eq.label().to_string(),
            sensors: SensorEvaluator::evaluate(&eq.entity, lookup),
        })
        .collect();

    let alarm = RackAlarm::from_flag(equipment.iter().any(|eq| eq.sensors.is_alarm()));
    debug!(equipment = equipment.len(), alarm = %alarm, "evaluated rack");

    RackReport { alarm, equipment }
}

/// Whether the rack is in alarm, stopping at the first offending equipment.
pub fn rack_in_alarm(equipment: &[EquipmentConfig], lookup: Option<&dyn StateLookup>) -> bool {
    equipment.iter().any(|eq| {
        let alarming = SensorEvaluator::evaluate(&eq.entity, lookup).is_alarm();
        if alarming {
            debug!(equipment = %eq.label(), "rack alarm raised by equipment");
        }
        alarming
    })
}

// ── Tests ───────────────────────────────────────────────────────────
