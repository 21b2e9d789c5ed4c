//! Rack, equipment and model descriptors.
//!
//! Racks are authored as YAML (or JSON) documents listing equipment in
//! mounting order. Models are small JSON documents describing the physical
//! size of a piece of equipment and which image type it ships with.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{RackerError, Result};

/// Default rack height in rack units when a descriptor does not specify one.
pub const DEFAULT_RACK_HEIGHT: u32 = 48;

// ── Facing ────────────────────────────────────────────────────

/// Which side of the rack (or of a device) is being looked at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Front,
    Rear,
}

impl Facing {
    pub fn opposite(self) -> Self {
        match self {
            Facing::Front => Facing::Rear,
            Facing::Rear => Facing::Front,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Rear => write!(f, "rear"),
        }
    }
}

impl FromStr for Facing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" => Ok(Facing::Front),
            "rear" | "back" => Ok(Facing::Rear),
            other => Err(format!("unknown facing: '{}'", other)),
        }
    }
}

// ── Sensor set ────────────────────────────────────────────────

/// Ordered sensor expressions attached to one equipment item.
///
/// The descriptor field accepts a single string, a list of strings, or
/// nothing at all; all three normalize to a (possibly empty) list. Blank
/// entries are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EquipmentSensorSet(Vec<String>);

impl EquipmentSensorSet {
    pub fn new<I, S>(expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            expressions
                .into_iter()
                .map(Into::into)
                .filter(|s| !s.trim().is_empty())
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for EquipmentSensorSet {
    fn from(expression: &str) -> Self {
        Self::new([expression])
    }
}

impl From<Vec<String>> for EquipmentSensorSet {
    fn from(expressions: Vec<String>) -> Self {
        Self::new(expressions)
    }
}

impl<'de> Deserialize<'de> for EquipmentSensorSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::One(s)) => Self::new([s]),
            Some(Raw::Many(v)) => Self::new(v),
            None => Self::default(),
        })
    }
}

// ── Equipment ─────────────────────────────────────────────────

/// One physical device mounted in a rack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentConfig {
    #[serde(default)]
    pub hostname: Option<String>,
    /// Sensor expressions encoding the device's healthy condition.
    #[serde(default)]
    pub entity: EquipmentSensorSet,
    /// Model id; resolves to `models/<model>.json` in the descriptor root.
    pub model: String,
    /// Highest rack unit the device occupies.
    #[serde(default)]
    pub position_topu: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
    /// Side of the device that faces the rack front. Defaults to front.
    #[serde(default)]
    pub facing: Option<Facing>,
    /// Offset from the left rail, in inches.
    #[serde(default)]
    pub x_offset_inches: f64,
}

impl EquipmentConfig {
    /// Label for logs and tooltips: hostname when present, model otherwise.
    pub fn label(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.model)
    }
}

// ── Rack ──────────────────────────────────────────────────────

/// A rack descriptor, stored under `racks/<id>.yml` in the descriptor root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RackConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// When true, rack units are counted from the top instead of the bottom.
    #[serde(default)]
    pub flip: bool,
    #[serde(default)]
    pub facing: Facing,
    #[serde(default = "default_rack_height")]
    pub rack_height: u32,
    #[serde(default)]
    pub equipment: Vec<EquipmentConfig>,
}

fn default_rack_height() -> u32 {
    DEFAULT_RACK_HEIGHT
}

impl RackConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Parse a descriptor, picking the format from the file extension.
    pub fn from_path_contents(path: &Path, contents: &str) -> Result<Self> {
        match DescriptorFormat::from_path(path) {
            Some(DescriptorFormat::Json) => Self::from_json(contents),
            Some(DescriptorFormat::Yaml) => Self::from_yaml(contents),
            None => Err(RackerError::Other(format!(
                "unsupported descriptor extension: {}",
                path.display()
            ))),
        }
    }
}

/// Dashboard card instance pointing at a rack descriptor by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RackInstance {
    #[serde(default)]
    pub name: Option<String>,
    pub rack: String,
    #[serde(default)]
    pub flip: bool,
}

// ── Model ─────────────────────────────────────────────────────

/// Physical description of an equipment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentModel {
    pub rack_u: u32,
    pub width_inches: f64,
    #[serde(default = "default_img_type")]
    pub img_type: String,
}

fn default_img_type() -> String {
    "jpg".to_string()
}

impl EquipmentModel {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

// ── Format detection ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorFormat {
    Json,
    Yaml,
}

impl DescriptorFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Some(DescriptorFormat::Json),
            Some("yml") | Some("yaml") => Some(DescriptorFormat::Yaml),
            _ => None,
        }
    }
}
