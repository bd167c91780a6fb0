use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use bab_schemas::{
    BreakId, BuyConfig, BuyId, CampaignConfig, CampaignId, CandidateBid, PlacementAttribute,
};
use tracing::info;
use uuid::Uuid;

use crate::buy::BuyLedger;
use crate::campaign::CampaignLedger;
use crate::settings::BudgetSettings;
use crate::tally::WinCounter;

/// Root of the ledger tree for one auction run.
///
/// Scopes are addressed by id: campaign → buy → week.  Nothing holds a
/// reference into the tree; the client buy is remembered as an id pair.
/// One instance is driven by one thread; run independent auctions on
/// independent instances.
#[derive(Debug)]
pub struct AuctionBudget {
    pub(crate) settings: BudgetSettings,
    pub(crate) campaigns: BTreeMap<CampaignId, CampaignLedger>,
    pub(crate) buy_index: BTreeMap<BuyId, CampaignId>,
    pub(crate) client_buy: Option<(CampaignId, BuyId)>,
    /// Placement attributes held by winners, per break.
    pub(crate) placements: BTreeMap<BreakId, WinCounter<PlacementAttribute>>,

    // Receipt bookkeeping.
    pub(crate) ledger_id: Uuid,
    pub(crate) generation: u64,
    pub(crate) next_serial: u64,
    pub(crate) open_budget: BTreeSet<u64>,
    pub(crate) open_content: BTreeSet<u64>,
}

/// Ledger state only, for equality comparisons across commit/unroll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub campaigns: BTreeMap<CampaignId, CampaignLedger>,
    pub placements: BTreeMap<BreakId, WinCounter<PlacementAttribute>>,
}

impl AuctionBudget {
    pub fn new(settings: BudgetSettings) -> Self {
        Self {
            settings,
            campaigns: BTreeMap::new(),
            buy_index: BTreeMap::new(),
            client_buy: None,
            placements: BTreeMap::new(),
            ledger_id: Uuid::new_v4(),
            generation: 0,
            next_serial: 0,
            open_budget: BTreeSet::new(),
            open_content: BTreeSet::new(),
        }
    }

    pub fn settings(&self) -> &BudgetSettings {
        &self.settings
    }

    /// Toggle budget enforcement for the client buy (what-if preview).
    pub fn set_use_budget(&mut self, on: bool) {
        self.settings.use_budget = on;
    }

    pub fn set_use_advertiser_adjacency(&mut self, on: bool) {
        self.settings.use_advertiser_adjacency = on;
    }

    /// Rebuild the ledger tree from this run's candidate bids.
    ///
    /// Every campaign, buy and week referenced by a bid gets a node; the
    /// first bid seen for a node supplies its limit snapshot.  Outstanding
    /// receipts become stale.
    pub fn init_budget<'a>(&mut self, bids: impl IntoIterator<Item = &'a CandidateBid>) {
        self.campaigns.clear();
        self.buy_index.clear();
        self.client_buy = None;
        self.placements.clear();
        self.invalidate_receipts();

        let mut weeks_seeded = 0usize;
        for bid in bids {
            let (campaign_id, buy_id) = (bid.campaign_id(), bid.buy_id());
            let buy = self.ensure_buy(&bid.buy);
            if buy.week(bid.spot.week).is_none() {
                weeks_seeded += 1;
            }
            buy.ensure_week(bid.spot.week);

            if self.settings.client_buy_id == Some(buy_id) && self.client_buy.is_none() {
                self.client_buy = Some((campaign_id, buy_id));
            }
        }

        info!(
            campaigns = self.campaigns.len(),
            buys = self.buy_index.len(),
            weeks = weeks_seeded,
            client_buy_found = self.client_buy.is_some(),
            generation = self.generation,
            "auction budget initialised"
        );
    }

    pub fn campaign(&self, id: CampaignId) -> Option<&CampaignLedger> {
        self.campaigns.get(&id)
    }

    pub fn campaigns(&self) -> impl Iterator<Item = &CampaignLedger> {
        self.campaigns.values()
    }

    pub fn buy(&self, id: BuyId) -> Option<&BuyLedger> {
        let campaign = self.buy_index.get(&id)?;
        self.campaigns.get(campaign)?.buy(id)
    }

    /// Ledger of the designated client buy, if it appeared in `init_budget`.
    pub fn client_buy_ledger(&self) -> Option<&BuyLedger> {
        let (campaign, buy) = self.client_buy?;
        self.campaigns.get(&campaign)?.buy(buy)
    }

    pub fn placements(&self, brk: BreakId) -> Option<&WinCounter<PlacementAttribute>> {
        self.placements.get(&brk)
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            campaigns: self.campaigns.clone(),
            placements: self.placements.clone(),
        }
    }

    /// Zero every tally and all win tracking.  Nodes and limit snapshots
    /// are kept; outstanding receipts become stale.
    pub fn reset_auction_budget_values(&mut self) {
        for campaign in self.campaigns.values_mut() {
            campaign.reset_values();
        }
        self.placements.clear();
        self.invalidate_receipts();
        info!(generation = self.generation, "auction budget values reset");
    }

    /// Drop each week's booked baseline ahead of a from-scratch weekly run.
    pub fn clear_weekly_values(&mut self) {
        let mut weeks = 0usize;
        for campaign in self.campaigns.values_mut() {
            for buy in campaign.buys_mut() {
                for week in buy.weeks_mut() {
                    week.clear_initial();
                    weeks += 1;
                }
            }
        }
        info!(weeks, "weekly baselines cleared");
    }

    pub(crate) fn is_client(&self, bid: &CandidateBid) -> bool {
        self.client_buy == Some((bid.campaign_id(), bid.buy_id()))
    }

    pub(crate) fn campaign_ledger(&self, bid: &CandidateBid) -> Option<&CampaignLedger> {
        self.campaigns.get(&bid.campaign_id())
    }

    pub(crate) fn buy_ledger(&self, bid: &CandidateBid) -> Option<&BuyLedger> {
        self.campaign_ledger(bid)?.buy(bid.buy_id())
    }

    /// Snapshotted buy configuration, or the bid's own if the buy was not
    /// seeded.
    pub(crate) fn buy_config<'a>(&'a self, bid: &'a CandidateBid) -> &'a BuyConfig {
        self.buy_ledger(bid)
            .map(BuyLedger::config)
            .unwrap_or(bid.buy.as_ref())
    }

    pub(crate) fn campaign_config<'a>(&'a self, bid: &'a CandidateBid) -> &'a CampaignConfig {
        self.campaign_ledger(bid)
            .map(CampaignLedger::config)
            .unwrap_or(bid.buy.campaign.as_ref())
    }

    pub(crate) fn ensure_campaign(&mut self, config: &Arc<CampaignConfig>) -> &mut CampaignLedger {
        self.campaigns
            .entry(config.id)
            .or_insert_with(|| CampaignLedger::new(Arc::clone(config)))
    }

    pub(crate) fn ensure_buy(&mut self, config: &Arc<BuyConfig>) -> &mut BuyLedger {
        self.buy_index.entry(config.id).or_insert(config.campaign_id());
        self.ensure_campaign(&config.campaign).ensure_buy(config)
    }

    fn invalidate_receipts(&mut self) {
        self.generation += 1;
        self.open_budget.clear();
        self.open_content.clear();
    }
}
