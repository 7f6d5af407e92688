//! Simulated host: a small archipelago, its mission board and save file.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use expert_missions::{
    DemandAdjustment, Good, GoodId, Mission, MissionListExtension, ModDataStore, Port, PortId,
    WorldGeometry,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSpec {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_playable")]
    pub playable: bool,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub produces: Vec<u32>,
}

const fn default_playable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSpec {
    pub day_length_seconds: f64,
    pub goods: Vec<Good>,
    pub ports: Vec<PortSpec>,
}

impl WorldSpec {
    /// Load a world description from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading world file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing world file {}", path.display()))
    }

    /// Built-in archipelago: 22 ports on a rough grid, port 7 is the test port,
    /// ports 6 and 20 are the two big trading hubs.
    #[must_use]
    pub fn default_archipelago() -> Self {
        let goods = [
            ("rum", 6.5),
            ("salmon", 3.0),
            ("tobacco", 1.2),
            ("silk", 0.8),
            ("cheese", 4.0),
            ("wine", 7.5),
            ("coffee", 2.4),
            ("spice", 0.6),
            ("timber", 18.0),
            ("iron", 22.0),
            ("cotton", 2.2),
            ("sugar", 5.0),
        ]
        .iter()
        .zip(0u32..)
        .map(|((name, weight), id)| Good::new(id, *name, *weight))
        .collect::<Vec<_>>();

        let ports = (0u32..22)
            .map(|id| {
                let column = f64::from(id % 6);
                let row = f64::from(id / 6);
                let jitter = f64::from((id * 7919) % 13);
                let produce_count = match id {
                    6 | 20 => 3,
                    _ => 1 + (id * 5) % 12,
                };
                PortSpec {
                    id,
                    name: format!("Port {id}"),
                    playable: id != 7,
                    x: column * 9_500.0 + jitter * 310.0,
                    y: row * 8_800.0 + jitter * 170.0,
                    produces: (0..produce_count).map(|g| (g + id) % 12).collect(),
                }
            })
            .collect();

        Self {
            day_length_seconds: 1_800.0,
            goods,
            ports,
        }
    }
}

/// Host world built from a [`WorldSpec`].
#[derive(Debug, Clone)]
pub struct SimWorld {
    ports: Vec<Port>,
    positions: HashMap<PortId, (f64, f64)>,
    produced: HashMap<PortId, Vec<Good>>,
    day_length_seconds: f64,
    demand: BTreeMap<(PortId, GoodId), i64>,
}

impl SimWorld {
    pub fn from_spec(spec: &WorldSpec) -> Result<Self> {
        if spec.ports.is_empty() {
            bail!("world has no ports");
        }
        let goods: HashMap<u32, &Good> = spec.goods.iter().map(|good| (good.id.0, good)).collect();
        let mut ports = Vec::with_capacity(spec.ports.len());
        let mut positions = HashMap::new();
        let mut produced = HashMap::new();
        for port in &spec.ports {
            let mut host_port = Port::new(port.id, port.name.clone());
            host_port.playable = port.playable;
            let produce = port
                .produces
                .iter()
                .map(|id| {
                    goods
                        .get(id)
                        .map(|good| (*good).clone())
                        .with_context(|| format!("port {} produces unknown good {id}", port.name))
                })
                .collect::<Result<Vec<_>>>()?;
            positions.insert(host_port.id, (port.x, port.y));
            produced.insert(host_port.id, produce);
            ports.push(host_port);
        }
        Ok(Self {
            ports,
            positions,
            produced,
            day_length_seconds: spec.day_length_seconds,
            demand: BTreeMap::new(),
        })
    }

    #[must_use]
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    #[must_use]
    pub fn produced_goods(&self, port: PortId) -> &[Good] {
        self.produced.get(&port).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn apply_demand(&mut self, adjustment: DemandAdjustment) {
        *self
            .demand
            .entry((adjustment.port, adjustment.good))
            .or_insert(0) += i64::from(adjustment.delta);
    }

    /// Net demand shift the expert missions caused, summed over all islands.
    #[must_use]
    pub fn net_demand_shift(&self) -> i64 {
        self.demand.values().sum()
    }
}

impl WorldGeometry for SimWorld {
    fn distance(&self, from: PortId, to: PortId) -> f64 {
        match (self.positions.get(&from), self.positions.get(&to)) {
            (Some((ax, ay)), Some((bx, by))) => (ax - bx).hypot(ay - by),
            _ => 0.0,
        }
    }

    fn day_length_seconds(&self) -> f64 {
        self.day_length_seconds
    }
}

/// The host's port menu list: receives expert missions, then sorts the
/// combined list by gold per kilometre, best first.
#[derive(Debug, Default)]
pub struct MissionBoard {
    missions: Vec<Mission>,
}

impl MissionBoard {
    pub fn finish(mut self, world: &SimWorld) -> Vec<Mission> {
        let per_km = |mission: &Mission| {
            let km = world.distance(mission.origin, mission.destination) / 1_000.0;
            if km > 0.0 {
                f64::from(mission.total_price) / km
            } else {
                0.0
            }
        };
        self.missions.sort_by(|a, b| per_km(b).total_cmp(&per_km(a)));
        self.missions
    }
}

impl MissionListExtension for MissionBoard {
    fn extend_missions(&mut self, _port: PortId, missions: Vec<Mission>) {
        self.missions.extend(missions);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("save file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("save file is not valid mod data")]
    Format(#[from] serde_json::Error),
}

/// Mod-data section of a save game, optionally backed by a JSON file.
#[derive(Debug, Default)]
pub struct SaveFile {
    path: Option<PathBuf>,
    mod_data: BTreeMap<String, String>,
}

impl SaveFile {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or prepare to create) a save file on disk.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let mod_data = match fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            mod_data,
        })
    }
}

impl ModDataStore for SaveFile {
    type Error = StoreError;

    fn read_blob(&self, key: &str) -> Result<Option<String>, Self::Error> {
        Ok(self.mod_data.get(key).cloned())
    }

    fn write_blob(&mut self, key: &str, blob: String) -> Result<(), Self::Error> {
        self.mod_data.insert(key.to_string(), blob);
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_vec_pretty(&self.mod_data)?)?;
        }
        Ok(())
    }
}
