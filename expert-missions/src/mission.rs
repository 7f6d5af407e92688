//! Mission records handed to the host and the fingerprints used to track them.

use serde::{Deserialize, Serialize};

use crate::port::{GoodId, PortId};

/// Whether a mission came from the host's own generator or from this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    #[default]
    Baseline,
    Expert,
}

impl MissionKind {
    #[must_use]
    pub const fn is_expert(self) -> bool {
        matches!(self, Self::Expert)
    }
}

/// A delivery contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub origin: PortId,
    pub destination: PortId,
    pub good: GoodId,
    pub quantity: u32,
    pub total_price: i32,
    pub due_day: u32,
    #[serde(default)]
    pub kind: MissionKind,
}

impl Mission {
    #[must_use]
    pub const fn fingerprint(&self) -> MissionFingerprint {
        MissionFingerprint {
            origin: self.origin,
            total_price: self.total_price,
        }
    }

    #[must_use]
    pub const fn is_expert(&self) -> bool {
        self.kind.is_expert()
    }
}

/// Stand-in identity for a mission across save/reload: origin port plus
/// total price. Two offers from the same port with the same price are
/// indistinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MissionFingerprint {
    pub origin: PortId,
    pub total_price: i32,
}

impl MissionFingerprint {
    #[must_use]
    pub const fn new(origin: PortId, total_price: i32) -> Self {
        Self {
            origin,
            total_price,
        }
    }
}

/// Indices of the expert missions in the host's player mission slots.
#[must_use]
pub fn expert_indices<'a, I>(slots: I) -> Vec<usize>
where
    I: IntoIterator<Item = Option<&'a Mission>>,
{
    slots
        .into_iter()
        .enumerate()
        .filter_map(|(idx, slot)| slot.filter(|mission| mission.is_expert()).map(|_| idx))
        .collect()
}
