//! Rack sensor evaluation and alarm aggregation.
//!
//! This crate provides:
//! - Sensor expression parsing (`<entity> <operator> <threshold>`) and typed thresholds
//! - Per-equipment evaluation against a live-state lookup
//! - Rack-level alarm aggregation and layout/indicator helpers
//! - Filesystem descriptor loader with hot-reload via `notify` watcher
//! - Offline descriptor validation with "Did you mean" suggestions

pub mod aggregator;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod layout;
pub mod loader;
pub mod state;
pub mod validation;
pub mod value;

pub use aggregator::{evaluate_rack, rack_in_alarm, AlarmTransition, EquipmentReport, RackAlarm, RackReport};
pub use error::SensorError;
pub use evaluator::{Classification, EvaluationResult, SensorEvaluator, SensorReport};
pub use expression::{Operator, SensorExpression};
pub use state::{EntityState, StateLookup, StateSnapshot};
pub use value::{SensorValue, ValueKind};
