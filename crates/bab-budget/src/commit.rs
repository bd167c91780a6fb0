//! Winner commit / unroll.
//!
//! Each commit hands back a receipt holding a snapshot of the bid.  The
//! matching unroll consumes it, so an unroll can only ever replay exactly
//! what was committed, at most once.  Receipts are tied to one ledger
//! instance and one generation; `init_budget` and
//! `reset_auction_budget_values` start a new generation.

use bab_schemas::{BidId, CandidateBid};
use tracing::{trace, warn};
use uuid::Uuid;

use crate::budget::AuctionBudget;
use crate::buy::Direction;
use crate::reason::LedgerError;

#[derive(Debug)]
#[must_use = "dropping the receipt makes this commit impossible to unroll"]
pub struct BudgetReceipt {
    serial: u64,
    generation: u64,
    ledger_id: Uuid,
    bid: CandidateBid,
}

impl BudgetReceipt {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn bid(&self) -> &CandidateBid {
        &self.bid
    }
}

#[derive(Debug)]
#[must_use = "dropping the receipt makes this commit impossible to unroll"]
pub struct ContentReceipt {
    serial: u64,
    generation: u64,
    ledger_id: Uuid,
    bid: CandidateBid,
    /// Whether the commit filled a short-spot slot; unroll must match.
    short_double: bool,
}

impl ContentReceipt {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn bid(&self) -> &CandidateBid {
        &self.bid
    }
}

impl AuctionBudget {
    /// Add the bid's cost and impressions to every scope it touches.
    pub fn commit_budget(&mut self, bid: &CandidateBid) -> BudgetReceipt {
        self.ensure_buy(&bid.buy);
        self.ensure_campaign(&bid.buy.campaign)
            .apply_budget(bid, Direction::Commit);

        let serial = self.issue_serial();
        self.open_budget.insert(serial);
        trace!(bid = %bid.id, buy = %bid.buy_id(), cost = %bid.cost, serial, "budget committed");

        BudgetReceipt {
            serial,
            generation: self.generation,
            ledger_id: self.ledger_id,
            bid: bid.clone(),
        }
    }

    pub fn unroll_budget(&mut self, receipt: BudgetReceipt) -> Result<(), LedgerError> {
        let BudgetReceipt {
            serial,
            generation,
            ledger_id,
            bid,
        } = receipt;
        self.redeem(Slot::Budget, serial, generation, ledger_id, bid.id)?;

        self.ensure_campaign(&bid.buy.campaign)
            .apply_budget(&bid, Direction::Unroll);
        trace!(bid = %bid.id, buy = %bid.buy_id(), serial, "budget unrolled");
        Ok(())
    }

    /// Record the bid as a winner in its break: win counters, the short
    /// slot and placement-attribute occupancy.
    pub fn commit_content(&mut self, bid: &CandidateBid) -> ContentReceipt {
        let short_double = self.double_win_applies(bid);
        self.ensure_buy(&bid.buy);
        self.ensure_campaign(&bid.buy.campaign)
            .apply_content(bid, Direction::Commit, short_double);

        if let Some((_, attrs)) = bid.primary_creative() {
            let occupied = self.placements.entry(bid.break_id()).or_default();
            for attr in attrs {
                occupied.increment(attr.clone());
            }
        }

        let serial = self.issue_serial();
        self.open_content.insert(serial);
        trace!(bid = %bid.id, buy = %bid.buy_id(), brk = %bid.break_id(), serial, "content committed");

        ContentReceipt {
            serial,
            generation: self.generation,
            ledger_id: self.ledger_id,
            bid: bid.clone(),
            short_double,
        }
    }

    pub fn unroll_content(&mut self, receipt: ContentReceipt) -> Result<(), LedgerError> {
        let ContentReceipt {
            serial,
            generation,
            ledger_id,
            bid,
            short_double,
        } = receipt;
        self.redeem(Slot::Content, serial, generation, ledger_id, bid.id)?;

        self.ensure_campaign(&bid.buy.campaign)
            .apply_content(&bid, Direction::Unroll, short_double);

        let brk = bid.break_id();
        if let Some((_, attrs)) = bid.primary_creative() {
            if let Some(occupied) = self.placements.get_mut(&brk) {
                for attr in attrs {
                    occupied.decrement(attr);
                }
                if occupied.is_empty() {
                    self.placements.remove(&brk);
                }
            }
        }
        trace!(bid = %bid.id, buy = %bid.buy_id(), brk = %brk, serial, "content unrolled");
        Ok(())
    }

    fn issue_serial(&mut self) -> u64 {
        self.next_serial += 1;
        self.next_serial
    }

    fn redeem(
        &mut self,
        slot: Slot,
        serial: u64,
        generation: u64,
        ledger_id: Uuid,
        bid: BidId,
    ) -> Result<(), LedgerError> {
        let outcome = if ledger_id != self.ledger_id {
            Err(LedgerError::ForeignReceipt)
        } else if generation != self.generation {
            Err(LedgerError::StaleReceipt {
                issued: generation,
                current: self.generation,
            })
        } else {
            let open = match slot {
                Slot::Budget => &mut self.open_budget,
                Slot::Content => &mut self.open_content,
            };
            if open.remove(&serial) {
                Ok(())
            } else {
                Err(LedgerError::UnknownReceipt { serial })
            }
        };

        if let Err(err) = &outcome {
            warn!(bid = %bid, serial, error = %err, "unroll refused");
        }
        outcome
    }
}

#[derive(Copy, Clone)]
enum Slot {
    Budget,
    Content,
}
