//! Host event handlers for expert missions.
//!
//! The session owns the base seed and the taken-mission ledger; the host
//! forwards its port menu, acceptance, day and save events here.

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::config::GeneratorConfig;
use crate::constants::SAVE_BLOB_KEY;
use crate::generator::{CandidateGenerator, CandidateSet, PortVisit};
use crate::ledger::TakenMissionLedger;
use crate::mission::Mission;
use crate::persistence::{self, PersistenceError, SaveState};
use crate::port::{GoodId, PortId, WorldGeometry};
use crate::pricing;
use crate::{MissionListExtension, ModDataStore};

/// Demand change the host should apply to keep expert missions from
/// moving island demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandAdjustment {
    pub port: PortId,
    pub good: GoodId,
    pub delta: i32,
}

/// Event-driven front end tying the generator, ledger and persistence
/// together. Owns the base seed and the ledger; nothing else mutates them.
#[derive(Debug, Clone)]
pub struct ExpertMissions {
    config: GeneratorConfig,
    base_seed: i64,
    ledger: TakenMissionLedger,
}

impl ExpertMissions {
    #[must_use]
    pub const fn new(config: GeneratorConfig, base_seed: i64) -> Self {
        Self {
            config,
            base_seed,
            ledger: TakenMissionLedger::new(),
        }
    }

    /// Session for a game without save data yet; the seed comes from the clock.
    #[must_use]
    pub fn with_clock_seed(config: GeneratorConfig) -> Self {
        Self::new(config, persistence::clock_seed())
    }

    #[must_use]
    pub const fn base_seed(&self) -> i64 {
        self.base_seed
    }

    #[must_use]
    pub const fn ledger(&self) -> &TakenMissionLedger {
        &self.ledger
    }

    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Candidates for `visit` with today's taken missions removed.
    pub fn offers<W: WorldGeometry + ?Sized>(
        &self,
        visit: &PortVisit<'_>,
        world: &W,
    ) -> CandidateSet {
        let candidates =
            CandidateGenerator::new(&self.config).generate(visit, self.base_seed, world);
        crate::reconcile::filter(candidates, &self.ledger, visit.port.id)
    }

    /// Port menu opened: hand the reconciled offers to the host before it
    /// sorts its own list.
    pub fn on_port_menu_opened<W, H>(&self, visit: &PortVisit<'_>, world: &W, host: &mut H)
    where
        W: WorldGeometry + ?Sized,
        H: MissionListExtension + ?Sized,
    {
        let offers = self.offers(visit, world);
        debug!("offering {} expert missions at {}", offers.len(), visit.port.id);
        host.extend_missions(visit.port.id, offers.into_vec());
    }

    /// Mission accepted. Expert missions are recorded in the ledger and the
    /// host's demand reduction at the destination is undone.
    #[must_use]
    pub fn on_mission_accepted(&mut self, mission: &Mission) -> Option<DemandAdjustment> {
        if !mission.is_expert() {
            return None;
        }
        self.ledger.record(mission.fingerprint());
        debug!(
            "recorded taken expert mission {} -> {} priced {}",
            mission.origin, mission.destination, mission.total_price
        );
        Some(DemandAdjustment {
            port: mission.destination,
            good: mission.good,
            delta: i32::try_from(mission.quantity).unwrap_or(i32::MAX),
        })
    }

    /// Mission about to be abandoned. Cancels the host's demand refund for
    /// the undelivered remainder. The ledger entry stays until rollover.
    #[must_use]
    pub fn on_mission_abandoned(
        &self,
        mission: &Mission,
        delivered: u32,
    ) -> Option<DemandAdjustment> {
        if !mission.is_expert() {
            return None;
        }
        let delta = i64::from(delivered) - i64::from(mission.quantity);
        Some(DemandAdjustment {
            port: mission.destination,
            good: mission.good,
            delta: i32::try_from(delta).unwrap_or(i32::MIN),
        })
    }

    /// Day rollover: taken missions may be offered again.
    pub fn on_day_advanced(&mut self, new_day: u32) {
        if !self.ledger.is_empty() {
            debug!("day {new_day}: clearing {} taken expert missions", self.ledger.len());
        }
        self.ledger.clear();
    }

    /// Reputation override for expert missions; `None` keeps the host formula.
    #[must_use]
    pub fn delivery_reputation(&self, mission: &Mission) -> Option<i32> {
        mission
            .is_expert()
            .then(|| pricing::delivery_reputation(mission.total_price, mission.quantity))
    }

    /// Per-unit gold override for expert missions; `None` keeps the host formula.
    #[must_use]
    pub fn delivery_reward(&self, mission: &Mission, current_day: u32) -> Option<i32> {
        mission.is_expert().then(|| {
            pricing::delivery_reward(
                mission.total_price,
                mission.quantity,
                current_day,
                mission.due_day,
            )
        })
    }

    #[must_use]
    pub fn snapshot(&self, expert_mission_indices: &[usize]) -> SaveState {
        persistence::to_save_state(expert_mission_indices, self.base_seed, &self.ledger)
    }

    /// Replace seed and ledger from `state`, returning the player mission
    /// indices the host should re-tag as expert.
    pub fn restore(&mut self, state: SaveState) -> Vec<usize> {
        let restored = persistence::from_save_state(state);
        self.base_seed = restored.base_seed;
        self.ledger = restored.ledger;
        restored.expert_mission_indices
    }

    /// Save requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be encoded or the host store
    /// rejects it. The failure is also logged so callers may ignore it.
    pub fn on_save<S: ModDataStore + ?Sized>(
        &self,
        store: &mut S,
        expert_mission_indices: &[usize],
    ) -> Result<(), PersistenceError> {
        let state = self.snapshot(expert_mission_indices);
        persistence::store(store, SAVE_BLOB_KEY, &state).inspect_err(|err| {
            error!("failed to save expert mission data: {err}");
        })
    }

    /// Load completed. Never fails; missing or corrupt data resets to a
    /// fresh seed and an empty ledger.
    pub fn on_load<S: ModDataStore + ?Sized>(&mut self, store: &S) -> Vec<usize> {
        let loaded = persistence::load(store, SAVE_BLOB_KEY);
        info!(
            "restored expert missions from {:?} data ({} expert missions in log)",
            loaded.source,
            loaded.state.expert_mission_indices.len()
        );
        self.restore(loaded.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::{MissionFingerprint, MissionKind};
    use crate::port::{Good, Port};
    use std::collections::HashMap;
    use std::convert::Infallible;

    struct GridWorld;

    impl WorldGeometry for GridWorld {
        fn distance(&self, from: PortId, to: PortId) -> f64 {
            f64::from(from.0.abs_diff(to.0)) * 3_500.0 + 900.0
        }

        fn day_length_seconds(&self) -> f64 {
            2_400.0
        }
    }

    #[derive(Default)]
    struct HostList {
        appended: Vec<(PortId, Vec<Mission>)>,
    }

    impl MissionListExtension for HostList {
        fn extend_missions(&mut self, port: PortId, missions: Vec<Mission>) {
            self.appended.push((port, missions));
        }
    }

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

    fn fixture() -> (Vec<Port>, Vec<Good>) {
        let ports = (0..12).map(|id| Port::new(id, format!("Port {id}"))).collect();
        let goods = (0..20)
            .map(|id| Good::new(id, format!("Good {id}"), 3.0))
            .collect();
        (ports, goods)
    }

    fn expert(price: i32) -> Mission {
        Mission {
            origin: PortId(3),
            destination: PortId(5),
            good: GoodId(2),
            quantity: 10,
            total_price: price,
            due_day: 8,
            kind: MissionKind::Expert,
        }
    }

    #[test]
    fn accepted_offer_is_not_offered_again_the_same_day() {
        let (ports, goods) = fixture();
        let mut session = ExpertMissions::new(GeneratorConfig::default(), 31_337);
        let visit = PortVisit {
            port: &ports[3],
            day: 4,
            produced_goods: &goods,
            all_ports: &ports,
        };
        let offers = session.offers(&visit, &GridWorld);
        assert_eq!(offers.len(), 5);

        let taken = offers[1].clone();
        assert!(session.on_mission_accepted(&taken).is_some());
        let after = session.offers(&visit, &GridWorld);
        assert_eq!(after.len(), 4);
        let priced_like = |set: &CandidateSet| {
            set.iter()
                .filter(|m| m.total_price == taken.total_price)
                .count()
        };
        assert_eq!(priced_like(&after), priced_like(&offers) - 1);

        session.on_day_advanced(5);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn port_menu_hands_offers_to_host() {
        let (ports, goods) = fixture();
        let session = ExpertMissions::new(GeneratorConfig::default(), 8);
        let visit = PortVisit {
            port: &ports[2],
            day: 1,
            produced_goods: &goods[..10],
            all_ports: &ports,
        };
        let mut host = HostList::default();
        session.on_port_menu_opened(&visit, &GridWorld, &mut host);
        assert_eq!(host.appended.len(), 1);
        assert_eq!(host.appended[0].0, PortId(2));
        assert_eq!(host.appended[0].1.len(), 3);
    }

    #[test]
    fn accept_and_abandon_neutralise_demand() {
        let mut session = ExpertMissions::new(GeneratorConfig::default(), 1);
        let mission = expert(640);
        let accepted = session.on_mission_accepted(&mission).unwrap();
        assert_eq!(
            accepted,
            DemandAdjustment {
                port: PortId(5),
                good: GoodId(2),
                delta: 10
            }
        );
        let abandoned = session.on_mission_abandoned(&mission, 4).unwrap();
        assert_eq!(abandoned.delta, -6);
        // abandoning keeps the fingerprint reserved
        assert_eq!(
            session.ledger().iter().copied().collect::<Vec<_>>(),
            vec![MissionFingerprint::new(PortId(3), 640)]
        );
    }

    #[test]
    fn baseline_missions_are_left_to_the_host() {
        let mut session = ExpertMissions::new(GeneratorConfig::default(), 1);
        let mut mission = expert(640);
        mission.kind = MissionKind::Baseline;
        assert!(session.on_mission_accepted(&mission).is_none());
        assert!(session.on_mission_abandoned(&mission, 0).is_none());
        assert!(session.delivery_reward(&mission, 3).is_none());
        assert!(session.delivery_reputation(&mission).is_none());
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn delivery_overrides_apply_to_expert_missions() {
        let session = ExpertMissions::new(GeneratorConfig::default(), 1);
        let mission = expert(500);
        assert_eq!(session.delivery_reputation(&mission), Some(35));
        assert_eq!(session.delivery_reward(&mission, 8), Some(50));
        assert_eq!(session.delivery_reward(&mission, 9), Some(25));
    }

    #[test]
    fn save_and_load_restore_seed_ledger_and_tags() {
        let mut session = ExpertMissions::new(GeneratorConfig::default(), -4_242);
        assert!(session.on_mission_accepted(&expert(777)).is_some());
        let mut store = MemoryStore::default();
        session.on_save(&mut store, &[1, 3]).unwrap();

        let mut reloaded = ExpertMissions::new(GeneratorConfig::default(), 0);
        let tags = reloaded.on_load(&store);
        assert_eq!(tags, vec![1, 3]);
        assert_eq!(reloaded.base_seed(), -4_242);
        assert_eq!(reloaded.ledger(), session.ledger());
    }

    #[test]
    fn load_without_save_keeps_session_usable() {
        let mut session = ExpertMissions::new(GeneratorConfig::default(), 5);
        assert!(session.on_mission_accepted(&expert(100)).is_some());
        let tags = session.on_load(&MemoryStore::default());
        assert!(tags.is_empty());
        assert!(session.ledger().is_empty());
    }
}
