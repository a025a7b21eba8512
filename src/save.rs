use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::GameState;

/// Bumped whenever the serialized state shape changes incompatibly.
pub const SAVE_VERSION: u32 = 1;

pub const AUTOSAVE_SLOT: &str = "autosave";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("save serialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no save named {0:?}")]
    NotFound(String),
    #[error("save version {found} is not supported (expected {SAVE_VERSION})")]
    Version { found: u32 },
}

/// A complete, self-contained snapshot. `data` is the entire [`GameState`];
/// loading replaces the live state wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub id: Uuid,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub version: u32,
    pub data: GameState,
}

impl SaveEnvelope {
    pub fn new(name: &str, state: &GameState) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            timestamp: Utc::now(),
            version: SAVE_VERSION,
            data: state.clone(),
        }
    }

    fn check_version(self) -> Result<Self, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::Version {
                found: self.version,
            });
        }
        Ok(self)
    }
}

/// Summary row for save pickers; never carries the state itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSummary {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub country: String,
    pub week: u32,
    pub year: u32,
}

impl From<&SaveEnvelope> for SaveSummary {
    fn from(envelope: &SaveEnvelope) -> Self {
        Self {
            name: envelope.name.clone(),
            timestamp: envelope.timestamp,
            country: envelope.data.country.clone(),
            week: envelope.data.clock.week,
            year: envelope.data.clock.year,
        }
    }
}

/// Storage backend for named save slots. The autosave slot is a single
/// named slot that is overwritten on every autosave.
pub trait SaveStore {
    fn save(&mut self, name: &str, state: &GameState) -> Result<(), SaveError>;

    fn autosave(&mut self, state: &GameState) -> Result<(), SaveError> {
        self.save(AUTOSAVE_SLOT, state)
    }

    fn load(&self, name: &str) -> Result<GameState, SaveError>;

    fn list(&self) -> Result<Vec<SaveSummary>, SaveError>;

    fn delete(&mut self, name: &str) -> Result<(), SaveError>;

    /// Serialize a slot to a portable JSON string.
    fn export(&self, name: &str) -> Result<String, SaveError>;

    /// Import a previously exported slot under the given name.
    fn import(&mut self, name: &str, payload: &str) -> Result<(), SaveError>;
}

/// In-memory store, primarily for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemorySaveStore {
    slots: BTreeMap<String, SaveEnvelope>,
}

impl SaveStore for MemorySaveStore {
    fn save(&mut self, name: &str, state: &GameState) -> Result<(), SaveError> {
        self.slots
            .insert(name.to_string(), SaveEnvelope::new(name, state));
        Ok(())
    }

    fn load(&self, name: &str) -> Result<GameState, SaveError> {
        let envelope = self
            .slots
            .get(name)
            .cloned()
            .ok_or_else(|| SaveError::NotFound(name.to_string()))?;
        Ok(envelope.check_version()?.data)
    }

    fn list(&self) -> Result<Vec<SaveSummary>, SaveError> {
        Ok(self.slots.values().map(SaveSummary::from).collect())
    }

    fn delete(&mut self, name: &str) -> Result<(), SaveError> {
        self.slots
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SaveError::NotFound(name.to_string()))
    }

    fn export(&self, name: &str) -> Result<String, SaveError> {
        let envelope = self
            .slots
            .get(name)
            .ok_or_else(|| SaveError::NotFound(name.to_string()))?;
        Ok(serde_json::to_string_pretty(envelope)?)
    }

    fn import(&mut self, name: &str, payload: &str) -> Result<(), SaveError> {
        let mut envelope: SaveEnvelope = serde_json::from_str(payload)?;
        envelope = envelope.check_version()?;
        envelope.name = name.to_string();
        self.slots.insert(name.to_string(), envelope);
        Ok(())
    }
}

/// One JSON file per slot under a directory.
pub struct DirSaveStore {
    dir: PathBuf,
}

impl DirSaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn slot_path(&self, name: &str) -> PathBuf {
        // Slot names are caller-controlled; keep them filesystem-safe.
        let safe: String = name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }

    fn read_envelope(&self, path: &Path) -> Result<SaveEnvelope, SaveError> {
        let payload = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&payload)?)
    }
}

impl SaveStore for DirSaveStore {
    fn save(&mut self, name: &str, state: &GameState) -> Result<(), SaveError> {
        let envelope = SaveEnvelope::new(name, state);
        let payload = serde_json::to_string_pretty(&envelope)?;
        fs::write(self.slot_path(name), payload)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<GameState, SaveError> {
        let path = self.slot_path(name);
        if !path.exists() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        Ok(self.read_envelope(&path)?.check_version()?.data)
    }

    fn list(&self) -> Result<Vec<SaveSummary>, SaveError> {
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match self.read_envelope(&path) {
                    Ok(envelope) => summaries.push(SaveSummary::from(&envelope)),
                    Err(err) => {
                        tracing::warn!(?path, %err, "skipping unreadable save file");
                    }
                }
            }
        }
        summaries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(summaries)
    }

    fn delete(&mut self, name: &str) -> Result<(), SaveError> {
        let path = self.slot_path(name);
        if !path.exists() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn export(&self, name: &str) -> Result<String, SaveError> {
        let path = self.slot_path(name);
        if !path.exists() {
            return Err(SaveError::NotFound(name.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    fn import(&mut self, name: &str, payload: &str) -> Result<(), SaveError> {
        let mut envelope: SaveEnvelope = serde_json::from_str(payload)?;
        envelope = envelope.check_version()?;
        envelope.name = name.to_string();
        fs::write(self.slot_path(name), serde_json::to_string_pretty(&envelope)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips_state() {
        let mut store = MemorySaveStore::default();
        let mut state = GameState::default();
        state.economy.set_gdp_growth(3.7);
        state.politics.approval = 61.0;
        store.save("slot-1", &state).unwrap();
        let loaded = store.load("slot-1").unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn missing_slot_is_not_found() {
        let store = MemorySaveStore::default();
        assert!(matches!(store.load("nope"), Err(SaveError::NotFound(_))));
    }

    #[test]
    fn autosave_overwrites_a_single_slot() {
        let mut store = MemorySaveStore::default();
        let mut state = GameState::default();
        store.autosave(&state).unwrap();
        state.clock.week = 30;
        store.autosave(&state).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.load(AUTOSAVE_SLOT).unwrap().clock.week, 30);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut store = MemorySaveStore::default();
        let state = GameState::default();
        let mut envelope = SaveEnvelope::new("old", &state);
        envelope.version = 99;
        let payload = serde_json::to_string(&envelope).unwrap();
        assert!(matches!(
            store.import("old", &payload),
            Err(SaveError::Version { found: 99 })
        ));
    }

    #[test]
    fn dir_store_round_trips_and_lists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirSaveStore::new(dir.path()).unwrap();
        let state = GameState::default();
        store.save("campaign", &state).unwrap();
        assert_eq!(store.load("campaign").unwrap(), state);

        let summaries = store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "campaign");
        assert_eq!(summaries[0].country, state.country);

        store.delete("campaign").unwrap();
        assert!(matches!(
            store.load("campaign"),
            Err(SaveError::NotFound(_))
        ));
    }

    #[test]
    fn json_text_round_trip_is_bit_exact() {
        let mut store = MemorySaveStore::default();
        let mut state = GameState::default();
        // Full-mantissa values that a lossy float parser would perturb.
        state.economy.set_gdp_growth(1.9272005210562615);
        state.economy.sectors[0].growth = 0.1 + 0.2;
        state.politics.approval = 52.000000000000014;
        store.save("exact", &state).unwrap();

        let payload = store.export("exact").unwrap();
        let mut other = MemorySaveStore::default();
        other.import("copy", &payload).unwrap();
        assert_eq!(other.load("copy").unwrap(), state);
    }

    #[test]
    fn export_import_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = DirSaveStore::new(dir.path()).unwrap();
        let mut state = GameState::default();
        state.clock.year = 3;
        store.save("origin", &state).unwrap();
        let payload = store.export("origin").unwrap();

        let mut other = MemorySaveStore::default();
        other.import("copy", &payload).unwrap();
        assert_eq!(other.load("copy").unwrap(), state);
    }
}
