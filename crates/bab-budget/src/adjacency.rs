//! Adjacency, proximity and product-attribute checks, plus `admit`.
//!
//! All of these read only the win-tracking state that commit/unroll
//! maintain.  None of them touch the bid.

use bab_schemas::{CandidateBid, CreativeSelection, CreativeSet};

use crate::budget::AuctionBudget;
use crate::checks::log_reject;
use crate::reason::RejectReason;

impl AuctionBudget {
    /// Whether this bid may be the second short spot in a break.
    ///
    /// Requires operator and advertiser approval on the buy, the bid's own
    /// eligibility flag and the configured short duration.
    pub fn double_win_applies(&self, bid: &CandidateBid) -> bool {
        self.buy_config(bid).adjacency.allows_two_wins_per_break()
            && bid.double_win_eligible
            && bid.spot.duration_secs == self.settings.short_spot_duration_secs
    }

    /// At most one win per break per buy, or two under the double-win
    /// exception.
    ///
    /// The exception needs both spots to qualify: the existing win must
    /// hold the break's short slot, which only a qualifying short spot fills.
    pub fn auto_adjacency_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        let brk = bid.break_id();
        let buy = self.buy_ledger(bid);
        let wins = buy.map(|b| b.break_wins(brk)).unwrap_or(0);
        let short_held = buy
            .and_then(|b| b.short_slot(brk))
            .is_some_and(|slot| slot.wins == 1);
        match wins {
            0 => Ok(()),
            1 if short_held && self.double_win_applies(bid) => Ok(()),
            _ => reject(bid, RejectReason::BreakAdjacency),
        }
    }

    pub fn advertiser_adjacency_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        if !self.settings.use_advertiser_adjacency && self.is_client(bid) {
            return Ok(());
        }
        let rules = &self.buy_config(bid).adjacency;
        let brk = bid.break_id();
        let buy = self.buy_ledger(bid);

        if rules.campaign_exclusive_break {
            let campaign_wins = self
                .campaign_ledger(bid)
                .map(|c| c.break_wins(brk))
                .unwrap_or(0);
            let own_wins = buy.map(|b| b.break_wins(brk)).unwrap_or(0);
            if campaign_wins > own_wins {
                return reject(bid, RejectReason::CampaignAdjacency);
            }
        }

        if let Some(max) = rules.max_wins_per_program {
            let wins = buy.map(|b| b.program_wins(bid.brk.program)).unwrap_or(0);
            if wins >= max {
                return reject(bid, RejectReason::ProgramAdjacency);
            }
        }

        if let Some(max) = rules.max_wins_per_daypart {
            let wins = buy.map(|b| b.daypart_wins(bid.spot.daypart)).unwrap_or(0);
            if wins >= max {
                return reject(bid, RejectReason::DaypartAdjacency);
            }
        }

        Ok(())
    }

    /// Any prior win on the same channel strictly closer than the buy's
    /// gap fails, except the short-spot partner in the same break.
    pub fn proximity_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        let Some(gap) = self.buy_config(bid).proximity_gap_secs() else {
            return Ok(());
        };
        let Some(log) = self
            .buy_ledger(bid)
            .and_then(|b| b.proximity_log(bid.channel()))
        else {
            return Ok(());
        };

        let short = self.settings.short_spot_duration_secs;
        let paired = self.double_win_applies(bid);
        let conflict = log.within(bid.spot.air_time, gap).any(|(_, prior)| {
            !(paired && prior.break_id == bid.break_id() && prior.duration_secs == short)
        });

        if conflict {
            return reject(bid, RejectReason::ChannelProximity);
        }
        Ok(())
    }

    /// Creatives the bid may air with in this break.
    ///
    /// The second half of a short-spot pair is forced onto the creative
    /// already placed.  Otherwise creatives sharing a placement attribute
    /// with an existing winner in the break are pruned.
    pub fn product_adjacency_pass(
        &self,
        bid: &CandidateBid,
    ) -> Result<CreativeSelection, RejectReason> {
        if bid.creatives.is_empty() {
            return reject(bid, RejectReason::NoCreative);
        }
        let brk = bid.break_id();

        if self.double_win_applies(bid) {
            let placed = self
                .buy_ledger(bid)
                .and_then(|b| b.short_slot(brk))
                .filter(|slot| slot.wins == 1)
                .and_then(|slot| slot.creative.as_ref());
            if let Some((id, attrs)) = placed {
                let mut creatives = CreativeSet::new();
                creatives.insert(*id, attrs.clone());
                return Ok(CreativeSelection {
                    creatives,
                    forced: true,
                });
            }
        }

        let Some(occupied) = self.placements.get(&brk) else {
            return Ok(CreativeSelection {
                creatives: bid.creatives.clone(),
                forced: false,
            });
        };

        let creatives: CreativeSet = bid
            .creatives
            .iter()
            .filter(|(_, attrs)| !attrs.iter().any(|a| occupied.contains(a)))
            .map(|(id, attrs)| (*id, attrs.clone()))
            .collect();

        if creatives.is_empty() {
            return reject(bid, RejectReason::ProductAdjacency);
        }
        Ok(CreativeSelection {
            creatives,
            forced: false,
        })
    }

    /// Every admission check in order: budget, auto adjacency, advertiser
    /// adjacency, proximity, product adjacency.
    ///
    /// On success returns the creatives the bid may be committed with; narrow
    /// the bid with `CandidateBid::with_selection` before committing.
    pub fn admit(&self, bid: &CandidateBid) -> Result<CreativeSelection, RejectReason> {
        self.budget_pass(bid)?;
        self.auto_adjacency_pass(bid)?;
        self.advertiser_adjacency_pass(bid)?;
        self.proximity_pass(bid)?;
        self.product_adjacency_pass(bid)
    }
}

fn reject<T>(bid: &CandidateBid, reason: RejectReason) -> Result<T, RejectReason> {
    log_reject(bid, reason);
    Err(reason)
}
