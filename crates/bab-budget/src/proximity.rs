//! Per-channel win log used by the proximity restriction.
//!
//! Entries are kept ordered by air time.  A proximity scan only visits
//! the open interval `(t - gap, t + gap)`; entries outside it are never
//! touched, so the cost is bounded by the wins actually in range.

use std::collections::BTreeMap;
use std::ops::Bound::Excluded;

use bab_schemas::BreakId;
use chrono::{DateTime, Duration, Utc};

/// What the proximity exception needs to know about a prior win.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SpotProximityData {
    pub break_id: BreakId,
    pub duration_secs: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProximityLog {
    wins: BTreeMap<DateTime<Utc>, Vec<SpotProximityData>>,
}

impl ProximityLog {
    pub(crate) fn insert(&mut self, at: DateTime<Utc>, data: SpotProximityData) {
        self.wins.entry(at).or_default().push(data);
    }

    /// Remove one entry equal to `data` at `at`.  Returns false if none.
    pub(crate) fn remove(&mut self, at: DateTime<Utc>, data: SpotProximityData) -> bool {
        let Some(slot) = self.wins.get_mut(&at) else {
            return false;
        };
        let Some(pos) = slot.iter().rposition(|d| *d == data) else {
            return false;
        };
        slot.remove(pos);
        if slot.is_empty() {
            self.wins.remove(&at);
        }
        true
    }

    /// Prior wins strictly closer than `gap_secs` to `at`, in time order.
    pub fn within(
        &self,
        at: DateTime<Utc>,
        gap_secs: u32,
    ) -> impl Iterator<Item = (DateTime<Utc>, SpotProximityData)> + '_ {
        let gap = Duration::seconds(i64::from(gap_secs));
        self.wins
            .range((Excluded(at - gap), Excluded(at + gap)))
            .flat_map(|(t, entries)| entries.iter().map(move |d| (*t, *d)))
    }

    pub fn len(&self) -> usize {
        self.wins.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.wins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, SpotProximityData)> + '_ {
        self.wins
            .iter()
            .flat_map(|(t, entries)| entries.iter().map(move |d| (*t, *d)))
    }
}
