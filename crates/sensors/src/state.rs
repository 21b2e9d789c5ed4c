//! Live entity state: the lookup capability the evaluator consumes and a
//! snapshot type that implements it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Current state of a single entity as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub state: String,
}

impl EntityState {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
        }
    }
}

/// Synchronous read access to already-materialized entity states.
///
/// Returning `None` means the provider has no value for the entity.
pub trait StateLookup {
    fn lookup(&self, entity_id: &str) -> Option<&EntityState>;
}

impl StateLookup for HashMap<String, EntityState> {
    fn lookup(&self, entity_id: &str) -> Option<&EntityState> {
        self.get(entity_id)
    }
}

/// Point-in-time copy of entity states.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StateSnapshot {
    states: HashMap<String, EntityState>,
}

/// Entry of the host's state list format.
#[derive(Deserialize)]
struct HostState {
    entity_id: String,
    state: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFormat {
    Map(HashMap<String, EntityState>),
    List(Vec<HostState>),
}

impl StateSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(entity_id, state)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut snapshot = Self::new();
        for (entity_id, state) in pairs {
            snapshot.insert(entity_id, state);
        }
        snapshot
    }

    pub fn insert(&mut self, entity_id: impl Into<String>, state: impl Into<String>) {
        self.states.insert(entity_id.into(), EntityState::new(state));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Parse either `{"<entity>": {"state": ".."}}` or the host's
    /// `[{"entity_id": "..", "state": ".."}]` list. Extra fields are ignored.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let states = match serde_json::from_str::<SnapshotFormat>(contents)? {
            SnapshotFormat::Map(states) => states,
            SnapshotFormat::List(list) => list
                .into_iter()
                .map(|s| (s.entity_id, EntityState { state: s.state }))
                .collect(),
        };
        Ok(Self { states })
    }

    pub fn load(path: &Path) -> racker_core::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let snapshot = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), entities = snapshot.len(), "loaded state snapshot");
        Ok(snapshot)
    }
}

impl StateLookup for StateSnapshot {
    fn lookup(&self, entity_id: &str) -> Option<&EntityState> {
        self.states.get(entity_id)
    }
}
