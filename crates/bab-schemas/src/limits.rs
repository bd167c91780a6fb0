use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ChannelId, DaypartId, Money};

/// Audience-rating-confidence class of a spot, used as a demographic limit
/// dimension.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityClass {
    /// Measured audience; no quality-class limit is ever enforced for it.
    Rated,
    /// Network carries no rating service.
    UnratedNetwork,
    /// Network is rated but the estimate for this spot is missing.
    MissingData,
}

impl QualityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityClass::Rated => "rated",
            QualityClass::UnratedNetwork => "unrated_network",
            QualityClass::MissingData => "missing_data",
        }
    }
}

/// A cap on one scope plus its per-dimension caps.
///
/// `None` / an absent key means "no limit", which is NOT the same as a zero
/// limit (a zero limit rejects every paid bid).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSet<T> {
    pub total: Option<T>,
    pub by_daypart: BTreeMap<DaypartId, T>,
    pub by_channel: BTreeMap<ChannelId, T>,
    pub by_quality: BTreeMap<QualityClass, T>,
}

impl<T> Default for LimitSet<T> {
    fn default() -> Self {
        Self {
            total: None,
            by_daypart: BTreeMap::new(),
            by_channel: BTreeMap::new(),
            by_quality: BTreeMap::new(),
        }
    }
}

impl<T: Copy> LimitSet<T> {
    /// Only a total cap, no dimension caps.
    pub fn total(limit: T) -> Self {
        Self {
            total: Some(limit),
            ..Self::default()
        }
    }

    pub fn daypart(&self, daypart: DaypartId) -> Option<T> {
        self.by_daypart.get(&daypart).copied()
    }

    pub fn channel(&self, channel: ChannelId) -> Option<T> {
        self.by_channel.get(&channel).copied()
    }

    pub fn quality(&self, class: QualityClass) -> Option<T> {
        self.by_quality.get(&class).copied()
    }
}

/// Weekly caps for one media buy.  Day slots are indexed Monday = 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekLimits {
    pub spending: LimitSet<Money>,
    pub impressions: LimitSet<i64>,
    pub daily_spending: [Option<Money>; 7],
    pub daily_impressions: [Option<i64>; 7],
}

/// Spend/impressions already booked against a week before this auction.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Booked {
    pub spending: Money,
    pub impressions: i64,
}

/// Configuration of one broadcast week of a media buy.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekConfig {
    pub limits: WeekLimits,
    pub booked: Booked,
}

impl WeekConfig {
    /// Limits after subtracting what is already booked.
    ///
    /// Only the weekly totals are reduced; dimension and daily caps apply to
    /// this auction's wins as configured.
    pub fn effective_limits(&self) -> WeekLimits {
        let mut eff = self.limits.clone();
        eff.spending.total = eff.spending.total.map(|cap| cap - self.booked.spending);
        eff.impressions.total = eff
            .impressions
            .total
            .map(|cap| cap - self.booked.impressions);
        eff
    }
}
