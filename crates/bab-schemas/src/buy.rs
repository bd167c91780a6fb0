use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{BuyId, CampaignId, LimitSet, Money, WeekConfig, WeekIndex};

/// Which quota family gates a buy's bids.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountingMode {
    #[default]
    Spending,
    Impressions,
}

/// Campaign-level configuration shared by all of its buys.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignConfig {
    pub id: CampaignId,
    /// Effective remaining campaign budget for this auction.
    #[serde(default)]
    pub spending_limit: Option<Money>,
    #[serde(default)]
    pub impression_limit: Option<i64>,
}

impl CampaignConfig {
    pub fn unlimited(id: CampaignId) -> Self {
        Self {
            id,
            spending_limit: None,
            impression_limit: None,
        }
    }
}

/// Per-buy adjacency rule configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjacencyRules {
    /// Operator approves two short spots of this buy in one break.
    pub operator_allows_double: bool,
    /// Advertiser approves two short spots of this buy in one break.
    pub advertiser_allows_double: bool,
    /// No other buy of the same campaign may hold a win in the same break.
    pub campaign_exclusive_break: bool,
    pub max_wins_per_program: Option<u32>,
    pub max_wins_per_daypart: Option<u32>,
}

impl AdjacencyRules {
    /// Both parties must approve before a second same-break win is allowed.
    pub fn allows_two_wins_per_break(&self) -> bool {
        self.operator_allows_double && self.advertiser_allows_double
    }
}

/// Static configuration of one media buy, as snapshotted by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyConfig {
    pub id: BuyId,
    pub campaign: Arc<CampaignConfig>,
    #[serde(default)]
    pub accounting: AccountingMode,
    /// Effective remaining spend caps across the whole flight.
    #[serde(default)]
    pub spending: LimitSet<Money>,
    #[serde(default)]
    pub impressions: LimitSet<i64>,
    #[serde(default)]
    pub weeks: BTreeMap<WeekIndex, WeekConfig>,
    #[serde(default)]
    pub adjacency: AdjacencyRules,
    /// Minimum seconds between two wins of this buy on the same channel.
    #[serde(default)]
    pub proximity_secs: Option<u32>,
}

impl BuyConfig {
    pub fn new(id: BuyId, campaign: Arc<CampaignConfig>) -> Self {
        Self {
            id,
            campaign,
            accounting: AccountingMode::Spending,
            spending: LimitSet::default(),
            impressions: LimitSet::default(),
            weeks: BTreeMap::new(),
            adjacency: AdjacencyRules::default(),
            proximity_secs: None,
        }
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign.id
    }

    /// Proximity gap, treating a configured zero as "no restriction".
    pub fn proximity_gap_secs(&self) -> Option<u32> {
        self.proximity_secs.filter(|secs| *secs > 0)
    }

    pub fn is_impression_limited(&self) -> bool {
        self.accounting == AccountingMode::Impressions
    }
}
