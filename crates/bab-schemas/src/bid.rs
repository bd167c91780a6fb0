use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::{
    BidId, BreakId, BuyConfig, BuyId, CampaignId, ChannelId, CreativeId, DaypartId, Money,
    ProgramOccurrenceId, QualityClass, WeekIndex,
};

/// Product/placement attribute of a creative (e.g. "automotive", "alcohol").
/// Two creatives sharing an attribute may not air in the same break.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementAttribute(pub String);

impl PlacementAttribute {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

pub type AttributeSet = BTreeSet<PlacementAttribute>;

/// Candidate creatives of a bid with their placement attributes.
pub type CreativeSet = BTreeMap<CreativeId, AttributeSet>;

/// Creatives a bid may still air with after product adjacency.
///
/// `forced` is set when the bid fills the second half of a short-spot pair
/// and must reuse the creative already placed in the break.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeSelection {
    pub creatives: CreativeSet,
    pub forced: bool,
}

impl CreativeSelection {
    pub fn ids(&self) -> impl Iterator<Item = CreativeId> + '_ {
        self.creatives.keys().copied()
    }
}

/// Break metadata shared by every avail in the break.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakInfo {
    pub id: BreakId,
    pub channel: ChannelId,
    pub program: ProgramOccurrenceId,
    pub start_time: DateTime<Utc>,
}

/// Metadata of the avail a bid targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotInfo {
    pub week: WeekIndex,
    pub weekday: Weekday,
    pub daypart: DaypartId,
    pub quality: QualityClass,
    /// Spot length in seconds.
    pub duration_secs: u32,
    /// Avail airs after the current booking horizon.
    pub is_future: bool,
    pub impressions: i64,
    pub air_time: DateTime<Utc>,
}

impl SpotInfo {
    /// Monday = 0 … Sunday = 6.
    pub fn day_index(&self) -> usize {
        self.weekday.num_days_from_monday() as usize
    }
}

/// Read-only descriptor of one candidate bid.
///
/// Cheap to clone: the buy configuration and break metadata are shared.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBid {
    pub id: BidId,
    pub buy: Arc<BuyConfig>,
    pub brk: Arc<BreakInfo>,
    pub spot: SpotInfo,
    pub cost: Money,
    pub creatives: CreativeSet,
    /// Spot is a short spot eligible for the two-wins-per-break exception.
    #[serde(default)]
    pub double_win_eligible: bool,
}

impl CandidateBid {
    pub fn buy_id(&self) -> BuyId {
        self.buy.id
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.buy.campaign_id()
    }

    pub fn break_id(&self) -> BreakId {
        self.brk.id
    }

    pub fn channel(&self) -> ChannelId {
        self.brk.channel
    }

    /// The creative counted against per-creative tallies: lowest id wins.
    pub fn primary_creative(&self) -> Option<(CreativeId, &AttributeSet)> {
        self.creatives.iter().next().map(|(id, attrs)| (*id, attrs))
    }

    /// Replace the candidate creative set (e.g. after adjacency pruning).
    pub fn with_creatives(mut self, creatives: CreativeSet) -> Self {
        self.creatives = creatives;
        self
    }

    pub fn with_selection(self, selection: CreativeSelection) -> Self {
        self.with_creatives(selection.creatives)
    }
}
