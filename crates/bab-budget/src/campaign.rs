use std::collections::BTreeMap;
use std::sync::Arc;

use bab_schemas::{BreakId, BuyConfig, BuyId, CampaignConfig, CampaignId, CandidateBid};

use crate::buy::{BuyLedger, Direction};
use crate::tally::{AuctionTally, WinCounter};

/// Aggregate of one campaign's buys present in this auction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampaignLedger {
    config: Arc<CampaignConfig>,
    overall: AuctionTally,
    buys: BTreeMap<BuyId, BuyLedger>,
    /// Breaks where any buy of this campaign holds a win.
    break_wins: WinCounter<BreakId>,
}

impl CampaignLedger {
    pub(crate) fn new(config: Arc<CampaignConfig>) -> Self {
        Self {
            config,
            overall: AuctionTally::ZERO,
            buys: BTreeMap::new(),
            break_wins: WinCounter::default(),
        }
    }

    pub fn id(&self) -> CampaignId {
        self.config.id
    }

    pub fn config(&self) -> &CampaignConfig {
        &self.config
    }

    pub fn overall(&self) -> AuctionTally {
        self.overall
    }

    pub fn buy(&self, id: BuyId) -> Option<&BuyLedger> {
        self.buys.get(&id)
    }

    pub fn buys(&self) -> impl Iterator<Item = &BuyLedger> {
        self.buys.values()
    }

    pub fn break_wins(&self, brk: BreakId) -> u32 {
        self.break_wins.get(&brk)
    }

    pub fn break_win_counts(&self) -> &WinCounter<BreakId> {
        &self.break_wins
    }

    /// First configuration seen for a buy id wins.
    pub(crate) fn ensure_buy(&mut self, config: &Arc<BuyConfig>) -> &mut BuyLedger {
        self.buys
            .entry(config.id)
            .or_insert_with(|| BuyLedger::new(Arc::clone(config)))
    }

    pub(crate) fn buys_mut(&mut self) -> impl Iterator<Item = &mut BuyLedger> {
        self.buys.values_mut()
    }

    pub(crate) fn apply_budget(&mut self, bid: &CandidateBid, dir: Direction) {
        let (ds, di) = dir.deltas(bid);
        self.overall.update(ds, di);
        self.ensure_buy(&bid.buy).apply_budget(bid, dir);
    }

    pub(crate) fn apply_content(&mut self, bid: &CandidateBid, dir: Direction, short_double: bool) {
        match dir {
            Direction::Commit => self.break_wins.increment(bid.break_id()),
            Direction::Unroll => self.break_wins.decrement(&bid.break_id()),
        }
        self.ensure_buy(&bid.buy)
            .apply_content(bid, dir, short_double);
    }

    pub(crate) fn reset_values(&mut self) {
        self.overall = AuctionTally::ZERO;
        self.break_wins.clear();
        for buy in self.buys.values_mut() {
            buy.reset_values();
        }
    }
}
