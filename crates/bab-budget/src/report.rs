//! Read-only views over the ledger for diagnostics and spreadsheet export.
//! Nothing here feeds back into the checks.

use std::fmt::Write as _;

use anyhow::{anyhow, Context, Result};
use bab_schemas::{BuyId, CampaignId, CandidateBid, Money, WeekIndex};

use crate::budget::AuctionBudget;
use crate::tally::AuctionTally;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RowLevel {
    Campaign,
    Buy,
    Week,
}

impl RowLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowLevel::Campaign => "campaign",
            RowLevel::Buy => "buy",
            RowLevel::Week => "week",
        }
    }
}

/// One line of the spending report.
///
/// `current`/`future` are only filled on buy rows.  Week rows carry the
/// effective (baseline-adjusted) total limits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpendingRow {
    pub level: RowLevel,
    pub campaign: CampaignId,
    pub buy: Option<BuyId>,
    pub week: Option<WeekIndex>,
    pub total: AuctionTally,
    pub current: Option<AuctionTally>,
    pub future: Option<AuctionTally>,
    pub spending_limit: Option<Money>,
    pub impression_limit: Option<i64>,
}

impl SpendingRow {
    pub fn remaining_spending(&self) -> Option<Money> {
        self.spending_limit.map(|cap| cap - self.total.spending())
    }

    pub fn remaining_impressions(&self) -> Option<i64> {
        self.impression_limit
            .map(|cap| cap - self.total.impressions())
    }
}

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl AuctionBudget {
    /// Per-weekday totals for one buy, summed across its weeks (Monday first).
    pub fn day_of_week_tally(&self, buy: BuyId) -> Option<[AuctionTally; 7]> {
        let ledger = self.buy(buy)?;
        let mut days = [AuctionTally::ZERO; 7];
        for week in ledger.weeks() {
            for (slot, day) in days.iter_mut().zip(week.daily()) {
                *slot = *slot + *day;
            }
        }
        Some(days)
    }

    /// Campaign, buy and week rows in id order.
    pub fn spending_rows(&self) -> Vec<SpendingRow> {
        let mut rows = Vec::new();
        for campaign in self.campaigns() {
            let config = campaign.config();
            rows.push(SpendingRow {
                level: RowLevel::Campaign,
                campaign: campaign.id(),
                buy: None,
                week: None,
                total: campaign.overall(),
                current: None,
                future: None,
                spending_limit: config.spending_limit,
                impression_limit: config.impression_limit,
            });

            for buy in campaign.buys() {
                let config = buy.config();
                rows.push(SpendingRow {
                    level: RowLevel::Buy,
                    campaign: campaign.id(),
                    buy: Some(buy.id()),
                    week: None,
                    total: buy.overall(),
                    current: Some(buy.current()),
                    future: Some(buy.future()),
                    spending_limit: config.spending.total,
                    impression_limit: config.impressions.total,
                });

                for week in buy.weeks() {
                    rows.push(SpendingRow {
                        level: RowLevel::Week,
                        campaign: campaign.id(),
                        buy: Some(buy.id()),
                        week: Some(week.week()),
                        total: week.overall(),
                        current: None,
                        future: None,
                        spending_limit: week.limits().spending.total,
                        impression_limit: week.limits().impressions.total,
                    });
                }
            }
        }
        rows
    }

    /// Indented tree of the spending rows.
    pub fn dump_spending(&self) -> String {
        let mut out = String::new();
        for row in self.spending_rows() {
            let (indent, label) = match row.level {
                RowLevel::Campaign => ("", format!("campaign {}", row.campaign)),
                RowLevel::Buy => ("  ", format!("buy {}", opt(row.buy))),
                RowLevel::Week => ("    ", format!("week {}", opt(row.week))),
            };
            let _ = write!(
                out,
                "{indent}{label}: spent {} of {} ({} imps of {})",
                row.total.spending(),
                row.spending_limit
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "-".into()),
                row.total.impressions(),
                row.impression_limit
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".into()),
            );
            if let (Some(current), Some(future)) = (row.current, row.future) {
                let _ = write!(
                    out,
                    " [current {} / future {}]",
                    current.spending(),
                    future.spending()
                );
            }
            out.push('\n');
        }
        out
    }

    /// CSV export of `spending_rows`, one record per row.
    pub fn dump_budget_chart(&self) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.write_record([
            "level",
            "campaign",
            "buy",
            "week",
            "spending",
            "impressions",
            "current_spending",
            "future_spending",
            "spending_limit",
            "remaining_spending",
            "impression_limit",
            "remaining_impressions",
        ])
        .context("write budget chart header")?;

        for row in self.spending_rows() {
            wtr.write_record([
                row.level.as_str().to_string(),
                row.campaign.to_string(),
                opt(row.buy),
                opt(row.week),
                row.total.spending().to_string(),
                row.total.impressions().to_string(),
                opt(row.current.map(|t| t.spending())),
                opt(row.future.map(|t| t.spending())),
                opt(row.spending_limit),
                opt(row.remaining_spending()),
                opt(row.impression_limit),
                opt(row.remaining_impressions()),
            ])
            .with_context(|| format!("write budget chart row for campaign {}", row.campaign))?;
        }

        wtr.flush().context("flush budget chart")?;
        let bytes = wtr
            .into_inner()
            .map_err(|e| anyhow!("finish budget chart: {}", e.error()))?;
        String::from_utf8(bytes).context("budget chart is not utf-8")
    }

    /// Win-tracking state around the bid's break, after whatever commit or
    /// unroll the caller just made.
    pub fn content_trace(&self, bid: &CandidateBid) -> String {
        let brk = bid.break_id();
        let mut out = format!("bid {} buy {} break {}:", bid.id, bid.buy_id(), brk);

        match self.buy_ledger(bid) {
            Some(buy) => {
                let _ = write!(
                    out,
                    " break_wins={} program_wins={} daypart_wins={} channels_won={}",
                    buy.break_wins(brk),
                    buy.program_wins(bid.brk.program),
                    buy.daypart_wins(bid.spot.daypart),
                    buy.channels_won().len(),
                );
                if let Some(slot) = buy.short_slot(brk) {
                    let _ = write!(
                        out,
                        " short_slot={}x{}",
                        slot.wins,
                        opt(slot.creative.as_ref().map(|(id, _)| *id))
                    );
                }
            }
            None => out.push_str(" (buy not in ledger)"),
        }

        if let Some(campaign) = self.campaign_ledger(bid) {
            let _ = write!(out, " campaign_break_wins={}", campaign.break_wins(brk));
        }

        let attrs: Vec<String> = self
            .placements(brk)
            .map(|occ| occ.iter().map(|(a, n)| format!("{}x{n}", a.0)).collect())
            .unwrap_or_default();
        let _ = write!(out, " placements=[{}]", attrs.join(","));
        out
    }
}
