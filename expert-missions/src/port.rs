//! Host-supplied port and cargo descriptions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index of a port in the host's port table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortId(pub u32);

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "port#{}", self.0)
    }
}

/// Prefab index of a tradeable good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoodId(pub u32);

impl fmt::Display for GoodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "good#{}", self.0)
    }
}

/// A port as the host exposes it to mission generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    /// Test and debug ports are never offered as destinations.
    #[serde(default = "default_playable")]
    pub playable: bool,
}

const fn default_playable() -> bool {
    true
}

impl Port {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: PortId(id),
            name: name.into(),
            playable: true,
        }
    }

    #[must_use]
    pub fn non_playable(mut self) -> Self {
        self.playable = false;
        self
    }
}

/// A good a port produces, with the shipping weight of one unit.
///
/// For crates the host reports the crate mass plus its contents; for
/// bottles the bottle mass plus its fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub id: GoodId,
    pub name: String,
    pub unit_weight: f64,
}

impl Good {
    #[must_use]
    pub fn new(id: u32, name: impl Into<String>, unit_weight: f64) -> Self {
        Self {
            id: GoodId(id),
            name: name.into(),
            unit_weight,
        }
    }
}

/// Geometry and clock inputs owned by the host.
pub trait WorldGeometry {
    /// Distance between two ports in the host's world units (metres).
    fn distance(&self, from: PortId, to: PortId) -> f64;

    /// Real-time length of one in-game day, in seconds.
    fn day_length_seconds(&self) -> f64;
}
