//! Removes already-taken missions from a fresh candidate set.

use log::warn;

use crate::generator::CandidateSet;
use crate::ledger::TakenMissionLedger;
use crate::port::PortId;

/// Drop candidates the player already accepted today at `origin`.
///
/// Each ledger entry removes at most one candidate: the first, in stable
/// order, whose total price equals the entry's price. When several
/// candidates share that price only one goes, and a warning is logged.
#[must_use]
pub fn filter(
    mut candidates: CandidateSet,
    ledger: &TakenMissionLedger,
    origin: PortId,
) -> CandidateSet {
    for taken in ledger.for_origin(origin) {
        let mut matches = candidates
            .iter()
            .enumerate()
            .filter(|(_, mission)| mission.total_price == taken.total_price)
            .map(|(idx, _)| idx);
        let Some(first) = matches.next() else {
            continue;
        };
        if matches.next().is_some() {
            warn!(
                "fingerprint collision at {origin}: several offers priced {}; removing the first",
                taken.total_price
            );
        }
        candidates.remove(first);
    }
    candidates
}
