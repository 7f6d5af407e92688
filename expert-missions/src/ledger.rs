//! Expert missions taken since the last day rollover.

use serde::{Deserialize, Serialize};

use crate::mission::MissionFingerprint;
use crate::port::PortId;

/// Ordered record of accepted expert-mission fingerprints for the current day.
///
/// Entries are only ever appended or cleared wholesale. Abandoning a
/// mission keeps its entry so the same offer does not reappear before the
/// day turns over.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TakenMissionLedger {
    entries: Vec<MissionFingerprint>,
}

impl TakenMissionLedger {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, fingerprint: MissionFingerprint) {
        self.entries.push(fingerprint);
    }

    /// Drop every entry. Called once per day advance.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &MissionFingerprint> {
        self.entries.iter()
    }

    /// Entries recorded against `origin`, in insertion order.
    pub fn for_origin(&self, origin: PortId) -> impl Iterator<Item = &MissionFingerprint> {
        self.entries.iter().filter(move |entry| entry.origin == origin)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten to alternating origin/price integers for the save blob.
    #[must_use]
    pub fn to_flat(&self) -> Vec<i64> {
        self.entries
            .iter()
            .flat_map(|entry| [i64::from(entry.origin.0), i64::from(entry.total_price)])
            .collect()
    }

    /// Rebuild from the flat save representation.
    ///
    /// A trailing unpaired value and pairs whose values do not fit the
    /// port/price ranges are skipped; the count of skipped values is
    /// returned alongside the ledger.
    #[must_use]
    pub fn from_flat(values: &[i64]) -> (Self, usize) {
        let mut ledger = Self::new();
        let mut skipped = values.len() % 2;
        for pair in values.chunks_exact(2) {
            match (u32::try_from(pair[0]), i32::try_from(pair[1])) {
                (Ok(origin), Ok(price)) => {
                    ledger.record(MissionFingerprint::new(PortId(origin), price));
                }
                _ => skipped += 2,
            }
        }
        (ledger, skipped)
    }
}

impl<'a> IntoIterator for &'a TakenMissionLedger {
    type Item = &'a MissionFingerprint;
    type IntoIter = std::slice::Iter<'a, MissionFingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<MissionFingerprint> for TakenMissionLedger {
    fn from_iter<T: IntoIterator<Item = MissionFingerprint>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
