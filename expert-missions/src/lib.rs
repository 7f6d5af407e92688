//! Expert Missions
//!
//! Deterministic generation and reconciliation of high-value "expert"
//! delivery missions for a trading simulation host. The host keeps its own
//! mission generator; this crate supplies an extra list per port and day,
//! remembers which offers the player already took, and persists its small
//! amount of state inside the host's save file.

pub mod config;
pub mod constants;
pub mod generator;
pub mod ledger;
pub mod mission;
pub mod numbers;
pub mod persistence;
pub mod port;
pub mod pricing;
pub mod reconcile;
pub mod seed;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, GeneratorConfig};
pub use constants::SAVE_BLOB_KEY;
pub use generator::{CandidateGenerator, CandidateSet, PortVisit};
pub use ledger::TakenMissionLedger;
pub use mission::{Mission, MissionFingerprint, MissionKind, expert_indices};
pub use persistence::{
    LoadSource, LoadedState, PersistenceError, RestoredState, SaveState, from_save_state,
    to_save_state,
};
pub use port::{Good, GoodId, Port, PortId, WorldGeometry};
pub use pricing::{delivery_reputation, delivery_reward, total_price};
pub use seed::{MissionRng, SeedValue};
pub use session::{DemandAdjustment, ExpertMissions};

/// Insertion hook into the host's mission generation.
///
/// The host calls back into this crate while building a port's offer list
/// and receives the expert missions here; it is responsible for sorting
/// the combined list by price per distance and assigning it.
pub trait MissionListExtension {
    fn extend_missions(&mut self, port: PortId, missions: Vec<Mission>);
}

/// Trait for abstracting the host's named save-data container
/// Platform-specific implementations should provide this
pub trait ModDataStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the blob stored under `key`, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the container cannot be read.
    fn read_blob(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store `blob` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the container rejects the write.
    fn write_blob(&mut self, key: &str, blob: String) -> Result<(), Self::Error>;
}
