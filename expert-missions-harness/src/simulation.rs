use std::hash::Hasher;

use anyhow::{Context, Result};
use expert_missions::{ExpertMissions, Mission, PortVisit, expert_indices};
use log::{info, warn};
use serde::Serialize;
use twox_hash::XxHash64;

use crate::world::{MissionBoard, SaveFile, SimWorld};

/// Knobs for a simulated campaign.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub start_day: u32,
    pub days: u32,
    pub accept_per_port: usize,
    pub player_slots: usize,
    /// Every n-th accepted mission is abandoned the next morning (0 disables).
    pub abandon_every: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            start_day: 1,
            days: 30,
            accept_per_port: 1,
            player_slots: 5,
            abandon_every: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulationReport {
    pub base_seed: i64,
    pub days: u32,
    pub port_visits: u64,
    pub offered: u64,
    pub accepted: u64,
    pub abandoned: u64,
    pub delivered: u64,
    pub late_deliveries: u64,
    pub gold_earned: i64,
    pub reputation_earned: i64,
    pub net_demand_shift: i64,
    pub save_round_trips: u32,
    pub offer_digest: String,
    /// Player slots still holding expert missions when the run ended.
    pub expert_mission_indices: Vec<usize>,
    pub failures: Vec<String>,
}

impl SimulationReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, failure: String) {
        warn!("{failure}");
        self.failures.push(failure);
    }
}

#[derive(Debug, Clone)]
struct ActiveMission {
    mission: Mission,
    lateness: u32,
    abandon: bool,
}

/// Play `params.days` days against `world`, accepting offers greedily and
/// checking reconciliation and save/load equivalence along the way.
pub fn run(
    session: &mut ExpertMissions,
    world: &mut SimWorld,
    save: &mut SaveFile,
    params: SimulationParams,
) -> Result<SimulationReport> {
    let mut report = SimulationReport {
        base_seed: session.base_seed(),
        days: params.days,
        ..SimulationReport::default()
    };
    let mut digest = XxHash64::with_seed(0);
    let mut slots: Vec<Option<ActiveMission>> = vec![None; params.player_slots];
    let ports = world.ports().to_vec();
    let round_trip_day = params.start_day.saturating_add(params.days / 2);

    for day in params.start_day..params.start_day.saturating_add(params.days) {
        settle_missions(session, world, &mut slots, day, &mut report);

        for port in ports.iter().filter(|port| port.playable) {
            let goods = world.produced_goods(port.id).to_vec();
            let visit = PortVisit {
                port,
                day,
                produced_goods: &goods,
                all_ports: &ports,
            };
            let mut board = MissionBoard::default();
            session.on_port_menu_opened(&visit, &*world, &mut board);
            let offers = board.finish(world);
            digest.write(&serde_json::to_vec(&offers).context("encoding offers")?);
            report.port_visits += 1;
            report.offered += offers.len() as u64;

            let mut taken_here = 0usize;
            for offer in offers.iter().take(params.accept_per_port) {
                let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) else {
                    break;
                };
                if let Some(adjustment) = session.on_mission_accepted(offer) {
                    world.apply_demand(adjustment);
                }
                report.accepted += 1;
                taken_here += 1;
                let accepted = usize::try_from(report.accepted).unwrap_or(usize::MAX);
                *slot = Some(ActiveMission {
                    mission: offer.clone(),
                    lateness: u32::try_from(accepted % 3).unwrap_or(0),
                    abandon: params.abandon_every > 0 && accepted % params.abandon_every == 0,
                });
            }

            if taken_here > 0 {
                let reopened = session.offers(&visit, &*world);
                let expected = offers.len().saturating_sub(taken_here);
                if reopened.len() != expected {
                    report.fail(format!(
                        "day {day} {}: reopened menu shows {} offers, expected {expected}",
                        port.id,
                        reopened.len()
                    ));
                }
            }
        }

        if day == round_trip_day {
            round_trip(session, world, save, &ports, &slots, day, &mut report)?;
        }

        session.on_day_advanced(day.saturating_add(1));
        if !session.ledger().is_empty() {
            report.fail(format!("day {day}: ledger not cleared on rollover"));
        }
    }

    report.net_demand_shift = world.net_demand_shift();
    report.offer_digest = format!("{:016x}", digest.finish());
    report.expert_mission_indices = active_expert_indices(&slots);
    info!(
        "simulated {} days: {} offers, {} accepted, digest {}",
        report.days, report.offered, report.accepted, report.offer_digest
    );
    Ok(report)
}

fn active_expert_indices(slots: &[Option<ActiveMission>]) -> Vec<usize> {
    expert_indices(slots.iter().map(|slot| slot.as_ref().map(|active| &active.mission)))
}

fn settle_missions(
    session: &ExpertMissions,
    world: &mut SimWorld,
    slots: &mut [Option<ActiveMission>],
    day: u32,
    report: &mut SimulationReport,
) {
    for slot in slots.iter_mut() {
        let Some(active) = slot.as_ref() else {
            continue;
        };
        let mission = &active.mission;
        if active.abandon {
            let delivered = mission.quantity / 2;
            if let Some(adjustment) = session.on_mission_abandoned(mission, delivered) {
                world.apply_demand(adjustment);
            }
            report.abandoned += 1;
            *slot = None;
            continue;
        }
        if day < mission.due_day.saturating_add(active.lateness) {
            continue;
        }
        let per_unit = session.delivery_reward(mission, day).unwrap_or(0);
        let rep = session.delivery_reputation(mission).unwrap_or(0);
        report.gold_earned += i64::from(per_unit) * i64::from(mission.quantity);
        report.reputation_earned += i64::from(rep) * i64::from(mission.quantity);
        report.delivered += 1;
        if day > mission.due_day {
            report.late_deliveries += 1;
        }
        *slot = None;
    }
}

fn round_trip(
    session: &mut ExpertMissions,
    world: &SimWorld,
    save: &mut SaveFile,
    ports: &[expert_missions::Port],
    slots: &[Option<ActiveMission>],
    day: u32,
    report: &mut SimulationReport,
) -> Result<()> {
    let indices = active_expert_indices(slots);
    let probe = ports
        .iter()
        .filter(|port| port.playable)
        .map(|port| {
            let goods = world.produced_goods(port.id);
            let visit = PortVisit {
                port,
                day,
                produced_goods: goods,
                all_ports: ports,
            };
            session.offers(&visit, world)
        })
        .collect::<Vec<_>>();

    session
        .on_save(save, &indices)
        .context("saving expert mission state")?;
    let mut reloaded = ExpertMissions::new(session.config().clone(), 0);
    let tags = reloaded.on_load(save);

    if tags != indices {
        report.fail(format!(
            "day {day}: expert tags {tags:?} restored, expected {indices:?}"
        ));
    }
    if reloaded.base_seed() != session.base_seed() || reloaded.ledger() != session.ledger() {
        report.fail(format!("day {day}: seed or ledger changed across save/load"));
    }
    let reprobe = ports
        .iter()
        .filter(|port| port.playable)
        .map(|port| {
            let visit = PortVisit {
                port,
                day,
                produced_goods: world.produced_goods(port.id),
                all_ports: ports,
            };
            reloaded.offers(&visit, world)
        })
        .collect::<Vec<_>>();
    if probe != reprobe {
        report.fail(format!("day {day}: offers differ after save/load"));
    }

    *session = reloaded;
    report.save_round_trips += 1;
    Ok(())
}
