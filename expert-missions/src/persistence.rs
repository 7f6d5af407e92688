//! Save-blob round trip for the base seed, taken-mission ledger and the
//! expert tags on the player's active missions.
//!
//! The host does not persist the expert tag itself, so the indices of
//! expert missions in its player mission list travel with the blob and
//! are re-applied on load.

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ModDataStore;
use crate::ledger::TakenMissionLedger;

/// Errors raised while encoding, decoding or storing the save blob.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to encode save state")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode save state")]
    Decode(#[source] serde_json::Error),
    #[error("save container rejected the blob")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Everything this crate writes into the host's save file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    pub base_seed: i64,
    #[serde(default)]
    pub expert_mission_indices: Vec<usize>,
    /// Alternating origin port / total price pairs.
    #[serde(default)]
    pub taken_missions: Vec<i64>,
}

impl SaveState {
    /// Empty state around an explicit seed.
    #[must_use]
    pub const fn fresh(base_seed: i64) -> Self {
        Self {
            base_seed,
            expert_mission_indices: Vec::new(),
            taken_missions: Vec::new(),
        }
    }

    /// Empty state seeded from the wall clock.
    #[must_use]
    pub fn fresh_from_clock() -> Self {
        Self::fresh(clock_seed())
    }

    /// Serialize to the text blob stored in the host save.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON encoding fails.
    pub fn to_text(&self) -> Result<String, PersistenceError> {
        serde_json::to_string(self).map_err(PersistenceError::Encode)
    }

    /// Parse a text blob produced by [`SaveState::to_text`].
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is not a valid save state.
    pub fn from_text(text: &str) -> Result<Self, PersistenceError> {
        serde_json::from_str(text).map_err(PersistenceError::Decode)
    }
}

/// Seed derived from the current time, used when no save exists yet.
#[must_use]
pub fn clock_seed() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros())
}

/// Build the save state from live session data.
#[must_use]
pub fn to_save_state(
    expert_mission_indices: &[usize],
    base_seed: i64,
    ledger: &TakenMissionLedger,
) -> SaveState {
    SaveState {
        base_seed,
        expert_mission_indices: expert_mission_indices.to_vec(),
        taken_missions: ledger.to_flat(),
    }
}

/// Session data recovered from a save state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoredState {
    pub base_seed: i64,
    pub ledger: TakenMissionLedger,
    pub expert_mission_indices: Vec<usize>,
}

/// Split a save state back into seed, ledger and expert indices.
#[must_use]
pub fn from_save_state(state: SaveState) -> RestoredState {
    let (ledger, skipped) = TakenMissionLedger::from_flat(&state.taken_missions);
    if skipped > 0 {
        warn!("ignored {skipped} malformed taken-mission values in save data");
    }
    RestoredState {
        base_seed: state.base_seed,
        ledger,
        expert_mission_indices: state.expert_mission_indices,
    }
}

/// Where a loaded save state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Saved,
    Missing,
    Corrupt,
}

/// Result of [`load`]; always carries a usable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedState {
    pub state: SaveState,
    pub source: LoadSource,
}

/// Read the blob under `key`, falling back to a fresh clock-seeded state
/// when it is absent, unreadable or corrupt. Never fails.
pub fn load<S: ModDataStore + ?Sized>(store: &S, key: &str) -> LoadedState {
    load_with_fallback(store, key, clock_seed)
}

/// [`load`] with an explicit seed source for the fallback state.
pub fn load_with_fallback<S, F>(store: &S, key: &str, fallback_seed: F) -> LoadedState
where
    S: ModDataStore + ?Sized,
    F: FnOnce() -> i64,
{
    let blob = match store.read_blob(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => {
            info!("no save data for {key}; using defaults");
            return LoadedState {
                state: SaveState::fresh(fallback_seed()),
                source: LoadSource::Missing,
            };
        }
        Err(err) => {
            warn!("failed to read save data for {key}: {err}; using defaults");
            return LoadedState {
                state: SaveState::fresh(fallback_seed()),
                source: LoadSource::Corrupt,
            };
        }
    };
    match SaveState::from_text(&blob) {
        Ok(state) => {
            info!("parsed save data for {key}");
            LoadedState {
                state,
                source: LoadSource::Saved,
            }
        }
        Err(err) => {
            warn!("corrupt save data for {key}: {err}; using defaults");
            LoadedState {
                state: SaveState::fresh(fallback_seed()),
                source: LoadSource::Corrupt,
            }
        }
    }
}

/// Encode `state` and hand it to the host under `key`.
///
/// # Errors
///
/// Returns an error if encoding fails or the host store rejects the blob.
pub fn store<S: ModDataStore + ?Sized>(
    store: &mut S,
    key: &str,
    state: &SaveState,
) -> Result<(), PersistenceError> {
    let blob = state.to_text()?;
    store
        .write_blob(key, blob)
        .map_err(|err| PersistenceError::Store(Box::new(err)))?;
    info!("packed save data for {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::MissionFingerprint;
    use crate::port::PortId;
    use std::collections::HashMap;
    use std::convert::Infallible;

    #[derive(Default)]
    struct MemoryStore {
        blobs: HashMap<String, String>,
    }

    impl ModDataStore for MemoryStore {
        type Error = Infallible;

        fn read_blob(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.blobs.get(key).cloned())
        }

        fn write_blob(&mut self, key: &str, blob: String) -> Result<(), Self::Error> {
            self.blobs.insert(key.to_string(), blob);
            Ok(())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk unavailable")]
    struct DiskError;

    struct BrokenStore;

    impl ModDataStore for BrokenStore {
        type Error = DiskError;

        fn read_blob(&self, _key: &str) -> Result<Option<String>, Self::Error> {
            Err(DiskError)
        }

        fn write_blob(&mut self, _key: &str, _blob: String) -> Result<(), Self::Error> {
            Err(DiskError)
        }
    }

    fn sample_ledger() -> TakenMissionLedger {
        [
            MissionFingerprint::new(PortId(3), 500),
            MissionFingerprint::new(PortId(11), 2_140),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn save_state_round_trips_exactly() {
        let ledger = sample_ledger();
        let state = to_save_state(&[0, 4, 7], -98_765, &ledger);
        let restored = from_save_state(SaveState::from_text(&state.to_text().unwrap()).unwrap());
        assert_eq!(restored.base_seed, -98_765);
        assert_eq!(restored.ledger, ledger);
        assert_eq!(restored.expert_mission_indices, vec![0, 4, 7]);
    }

    #[test]
    fn wire_format_uses_flat_pairs() {
        let state = to_save_state(&[2], 1000, &sample_ledger());
        let value: serde_json::Value = serde_json::from_str(&state.to_text().unwrap()).unwrap();
        assert_eq!(value["base_seed"], 1000);
        assert_eq!(value["expert_mission_indices"], serde_json::json!([2]));
        assert_eq!(value["taken_missions"], serde_json::json!([3, 500, 11, 2140]));
    }

    #[test]
    fn missing_blob_falls_back_to_fresh_state() {
        let loaded = load_with_fallback(&MemoryStore::default(), "ExpertMissions", || 42);
        assert_eq!(loaded.source, LoadSource::Missing);
        assert_eq!(loaded.state, SaveState::fresh(42));
    }

    #[test]
    fn corrupt_blob_falls_back_to_fresh_state() {
        let mut store = MemoryStore::default();
        store
            .blobs
            .insert("ExpertMissions".to_string(), "<xml>nope</xml>".to_string());
        let loaded = load_with_fallback(&store, "ExpertMissions", || 7);
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert_eq!(loaded.state, SaveState::fresh(7));
    }

    #[test]
    fn unreadable_store_falls_back_to_fresh_state() {
        let loaded = load_with_fallback(&BrokenStore, "ExpertMissions", || 9);
        assert_eq!(loaded.source, LoadSource::Corrupt);
        assert_eq!(loaded.state.base_seed, 9);
    }

    #[test]
    fn store_then_load_returns_saved_state() {
        let mut store = MemoryStore::default();
        let state = to_save_state(&[1], 555, &sample_ledger());
        super::store(&mut store, "ExpertMissions", &state).unwrap();
        let loaded = load_with_fallback(&store, "ExpertMissions", || 0);
        assert_eq!(loaded.source, LoadSource::Saved);
        assert_eq!(loaded.state, state);
    }

    #[test]
    fn store_errors_are_reported() {
        let err =
            super::store(&mut BrokenStore, "ExpertMissions", &SaveState::fresh(1)).unwrap_err();
        assert!(matches!(err, PersistenceError::Store(_)));
    }

    #[test]
    fn partial_blob_defaults_missing_lists() {
        let state = SaveState::from_text(r#"{ "base_seed": 12 }"#).unwrap();
        assert_eq!(state, SaveState::fresh(12));
    }
}
