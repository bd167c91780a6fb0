//! Leaf accumulators of the ledger tree.
//!
//! - [`AuctionTally`]: spend + impressions for one scope.
//! - [`DimensionalTally`]: key → tally, created on first write.
//! - [`WinCounter`]: key → refcount for win tracking and placement occupancy.
//!
//! Entries that net back to zero are dropped, so a commit followed by its
//! unroll leaves the maps structurally identical to where they started.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;

use bab_schemas::Money;

/// Spend and impressions accumulated for one scope.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AuctionTally {
    spending: Money,
    impressions: i64,
}

impl AuctionTally {
    pub const ZERO: AuctionTally = AuctionTally {
        spending: Money::ZERO,
        impressions: 0,
    };

    pub fn new(spending: Money, impressions: i64) -> Self {
        Self {
            spending,
            impressions,
        }
    }

    pub fn spending(&self) -> Money {
        self.spending
    }

    pub fn impressions(&self) -> i64 {
        self.impressions
    }

    /// Apply a signed delta.  Negative deltas (unroll) are never clamped.
    pub fn update(&mut self, delta_spending: Money, delta_impressions: i64) {
        self.spending += delta_spending;
        self.impressions += delta_impressions;
    }

    pub fn is_zero(&self) -> bool {
        self.spending.is_zero() && self.impressions == 0
    }
}

impl Add for AuctionTally {
    type Output = AuctionTally;
    fn add(self, rhs: AuctionTally) -> AuctionTally {
        AuctionTally::new(
            self.spending + rhs.spending,
            self.impressions + rhs.impressions,
        )
    }
}

impl Sum for AuctionTally {
    fn sum<I: Iterator<Item = AuctionTally>>(iter: I) -> AuctionTally {
        iter.fold(AuctionTally::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a AuctionTally> for AuctionTally {
    fn sum<I: Iterator<Item = &'a AuctionTally>>(iter: I) -> AuctionTally {
        iter.copied().sum()
    }
}

/// Tallies keyed by one dimension (channel, daypart, quality class, creative).
///
/// Absent keys read as zero; they are never an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DimensionalTally<K: Ord> {
    entries: BTreeMap<K, AuctionTally>,
}

impl<K: Ord> Default for DimensionalTally<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K: Ord> DimensionalTally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key: K, delta_spending: Money, delta_impressions: i64) {
        match self.entries.entry(key) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().update(delta_spending, delta_impressions);
                if slot.get().is_zero() {
                    slot.remove();
                }
            }
            Entry::Vacant(slot) => {
                let tally = AuctionTally::new(delta_spending, delta_impressions);
                if !tally.is_zero() {
                    slot.insert(tally);
                }
            }
        }
    }

    pub fn get(&self, key: &K) -> AuctionTally {
        self.entries.get(key).copied().unwrap_or_default()
    }

    pub fn current_spending(&self, key: &K) -> Money {
        self.get(key).spending()
    }

    pub fn current_impressions(&self, key: &K) -> i64 {
        self.get(key).impressions()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &AuctionTally)> {
        self.entries.iter()
    }

    /// Sum over every key.
    pub fn total(&self) -> AuctionTally {
        self.entries.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Reference counts keyed by break, program, daypart, channel or attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinCounter<K: Ord> {
    counts: BTreeMap<K, u32>,
}

impl<K: Ord> Default for WinCounter<K> {
    fn default() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }
}

impl<K: Ord> WinCounter<K> {
    pub fn get(&self, key: &K) -> u32 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.counts.contains_key(key)
    }

    pub(crate) fn increment(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Decrement and drop the key at zero.  Decrementing an absent key is a
    /// no-op.
    pub(crate) fn decrement(&mut self, key: &K) {
        if let Some(n) = self.counts.get_mut(key) {
            *n -= 1;
            if *n == 0 {
                self.counts.remove(key);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> {
        self.counts.iter().map(|(k, n)| (k, *n))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.counts.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}
