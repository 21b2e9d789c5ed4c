//! In-memory descriptor catalog shared between the loader and its watcher.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use racker_core::{DescriptorFormat, EquipmentModel, RackConfig};

/// Kind of descriptor, decided by the directory a file lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    Rack,
    Model,
}

impl DescriptorKind {
    /// Directory name under the descriptor root.
    pub fn dir_name(self) -> &'static str {
        match self {
            DescriptorKind::Rack => "racks",
            DescriptorKind::Model => "models",
        }
    }

    /// Racks may be YAML or JSON; models are JSON only.
    pub fn accepts(self, path: &Path) -> bool {
        match (self, DescriptorFormat::from_path(path)) {
            (DescriptorKind::Rack, Some(_)) => true,
            (DescriptorKind::Model, Some(DescriptorFormat::Json)) => true,
            _ => false,
        }
    }

    /// Kind of the nearest enclosing `racks/` or `models/` directory.
    pub fn for_path(path: &Path) -> Option<Self> {
        path.ancestors().skip(1).find_map(|dir| {
            match dir.file_name().and_then(|n| n.to_str()) {
                Some("racks") => Some(DescriptorKind::Rack),
                Some("models") => Some(DescriptorKind::Model),
                _ => None,
            }
        })
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorKind::Rack => write!(f, "rack"),
            DescriptorKind::Model => write!(f, "model"),
        }
    }
}

/// A parsed descriptor of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Rack(RackConfig),
    Model(EquipmentModel),
}

impl Descriptor {
    pub fn kind(&self) -> DescriptorKind {
        match self {
            Descriptor::Rack(_) => DescriptorKind::Rack,
            Descriptor::Model(_) => DescriptorKind::Model,
        }
    }

    /// Read and parse a descriptor file of the given kind.
    pub fn read(kind: DescriptorKind, path: &Path) -> racker_core::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(match kind {
            DescriptorKind::Rack => Descriptor::Rack(RackConfig::from_path_contents(path, &contents)?),
            DescriptorKind::Model => Descriptor::Model(EquipmentModel::from_json(&contents)?),
        })
    }
}

/// Load state of a model as seen by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelStatus {
    Ready(EquipmentModel),
    /// The descriptor exists but could not be read; carries the error text.
    Failed(String),
    /// Not loaded (yet).
    Loading,
}

/// Racks, models and per-model load errors keyed by id.
#[derive(Debug, Default)]
pub struct DescriptorCatalog {
    racks: RwLock<HashMap<String, RackConfig>>,
    models: RwLock<HashMap<String, EquipmentModel>>,
    model_errors: RwLock<HashMap<String, String>>,
}

impl DescriptorCatalog {
    pub fn insert(&self, id: String, descriptor: Descriptor) {
        match descriptor {
            Descriptor::Rack(rack) => {
                self.racks
                    .write()
                    .expect("racks lock poisoned")
                    .insert(id, rack);
            }
            Descriptor::Model(model) => {
                self.model_errors
                    .write()
                    .expect("model_errors lock poisoned")
                    .remove(&id);
                self.models
                    .write()
                    .expect("models lock poisoned")
                    .insert(id, model);
            }
        }
    }

    /// Record a model that failed to load. A previously loaded version is kept.
    pub fn record_model_error(&self, id: String, error: String) {
        self.model_errors
            .write()
            .expect("model_errors lock poisoned")
            .insert(id, error);
    }

    pub fn remove(&self, kind: DescriptorKind, id: &str) -> bool {
        match kind {
            DescriptorKind::Rack => self
                .racks
                .write()
                .expect("racks lock poisoned")
                .remove(id)
                .is_some(),
            DescriptorKind::Model => {
                self.model_errors
                    .write()
                    .expect("model_errors lock poisoned")
                    .remove(id);
                self.models
                    .write()
                    .expect("models lock poisoned")
                    .remove(id)
                    .is_some()
            }
        }
    }

    pub fn rack(&self, id: &str) -> Option<RackConfig> {
        self.racks.read().expect("racks lock poisoned").get(id).cloned()
    }

    pub fn model(&self, id: &str) -> Option<EquipmentModel> {
        self.models.read().expect("models lock poisoned").get(id).cloned()
    }

    pub fn model_error(&self, id: &str) -> Option<String> {
        self.model_errors
            .read()
            .expect("model_errors lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn model_status(&self, id: &str) -> ModelStatus {
        if let Some(model) = self.model(id) {
            ModelStatus::Ready(model)
        } else if let Some(error) = self.model_error(id) {
            ModelStatus::Failed(error)
        } else {
            ModelStatus::Loading
        }
    }

    /// Sorted rack ids.
    pub fn rack_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.racks.read().expect("racks lock poisoned").keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Sorted model ids.
    pub fn model_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.models.read().expect("models lock poisoned").keys().cloned().collect();
        ids.sort();
        ids
    }
}
