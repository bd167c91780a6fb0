//! Sum-consistency audit over the whole ledger tree.
//!
//! Every parent total must equal the sum of its parts, exactly:
//!
//! - campaign overall = Σ buy overall
//! - buy overall = Σ week overall = current + future = Σ daypart = Σ channel = Σ quality
//! - week overall = Σ day = Σ week daypart = Σ week channel = Σ week quality
//! - campaign break occupancy = Σ buy break wins
//!
//! Placement occupancy entries are never left empty.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use bab_schemas::{BreakId, BuyId, CampaignId, WeekIndex};

use crate::budget::AuctionBudget;
use crate::tally::AuctionTally;

/// Where a sum check failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    Campaign(CampaignId),
    Buy(BuyId),
    Week(BuyId, WeekIndex),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Campaign(id) => write!(f, "campaign {id}"),
            Scope::Buy(id) => write!(f, "buy {id}"),
            Scope::Week(buy, week) => write!(f, "buy {buy} week {week}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IntegrityBreach {
    /// `recorded` at `scope` differs from the sum over `parts`.
    SumMismatch {
        scope: Scope,
        parts: &'static str,
        recorded: AuctionTally,
        summed: AuctionTally,
    },
    /// Campaign break occupancy disagrees with its buys' break wins.
    BreakOccupancy {
        campaign: CampaignId,
        brk: BreakId,
        campaign_wins: u32,
        buy_wins: u32,
    },
    EmptyPlacement { brk: BreakId },
}

impl fmt::Display for IntegrityBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SumMismatch {
                scope,
                parts,
                recorded,
                summed,
            } => write!(
                f,
                "{scope}: recorded {}/{} != sum of {parts} {}/{}",
                recorded.spending(),
                recorded.impressions(),
                summed.spending(),
                summed.impressions()
            ),
            Self::BreakOccupancy {
                campaign,
                brk,
                campaign_wins,
                buy_wins,
            } => write!(
                f,
                "campaign {campaign} break {brk}: {campaign_wins} wins recorded, buys hold {buy_wins}"
            ),
            Self::EmptyPlacement { brk } => write!(f, "break {brk}: empty placement entry"),
        }
    }
}

struct Audit {
    breaches: Vec<IntegrityBreach>,
}

impl Audit {
    fn sum(&mut self, scope: &Scope, parts: &'static str, recorded: AuctionTally, summed: AuctionTally) {
        if recorded != summed {
            self.breaches.push(IntegrityBreach::SumMismatch {
                scope: scope.clone(),
                parts,
                recorded,
                summed,
            });
        }
    }
}

impl AuctionBudget {
    /// Recompute every aggregate from its parts.  Empty means consistent.
    pub fn verify_integrity(&self) -> Vec<IntegrityBreach> {
        let mut audit = Audit {
            breaches: Vec::new(),
        };

        for campaign in self.campaigns.values() {
            let scope = Scope::Campaign(campaign.id());
            audit.sum(
                &scope,
                "buys",
                campaign.overall(),
                campaign.buys().map(|b| b.overall()).sum(),
            );

            let mut buy_breaks: BTreeMap<BreakId, u32> = BTreeMap::new();
            for buy in campaign.buys() {
                for (brk, n) in buy.break_win_counts().iter() {
                    *buy_breaks.entry(*brk).or_insert(0) += n;
                }

                let scope = Scope::Buy(buy.id());
                let overall = buy.overall();
                audit.sum(&scope, "weeks", overall, buy.weeks().map(|w| w.overall()).sum());
                audit.sum(&scope, "current+future", overall, buy.current() + buy.future());
                audit.sum(&scope, "dayparts", overall, buy.by_daypart().total());
                audit.sum(&scope, "channels", overall, buy.by_channel().total());
                audit.sum(&scope, "quality classes", overall, buy.by_quality().total());

                for week in buy.weeks() {
                    let scope = Scope::Week(buy.id(), week.week());
                    let overall = week.overall();
                    audit.sum(&scope, "days", overall, week.daily().iter().sum());
                    audit.sum(&scope, "dayparts", overall, week.by_daypart().total());
                    audit.sum(&scope, "channels", overall, week.by_channel().total());
                    audit.sum(&scope, "quality classes", overall, week.by_quality().total());
                }
            }

            let campaign_breaks: BTreeMap<BreakId, u32> = campaign
                .break_win_counts()
                .iter()
                .map(|(brk, n)| (*brk, n))
                .collect();
            if campaign_breaks != buy_breaks {
                let keys: BTreeSet<BreakId> = campaign_breaks
                    .keys()
                    .chain(buy_breaks.keys())
                    .copied()
                    .collect();
                for brk in keys {
                    let campaign_wins = campaign_breaks.get(&brk).copied().unwrap_or(0);
                    let buy_wins = buy_breaks.get(&brk).copied().unwrap_or(0);
                    if campaign_wins != buy_wins {
                        audit.breaches.push(IntegrityBreach::BreakOccupancy {
                            campaign: campaign.id(),
                            brk,
                            campaign_wins,
                            buy_wins,
                        });
                    }
                }
            }
        }

        for (brk, occupied) in &self.placements {
            if occupied.is_empty() {
                audit
                    .breaches
                    .push(IntegrityBreach::EmptyPlacement { brk: *brk });
            }
        }

        audit.breaches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::BudgetSettings;

    #[test]
    fn empty_ledger_is_consistent() {
        let budget = AuctionBudget::new(BudgetSettings::default());
        assert!(budget.verify_integrity().is_empty());
    }

    #[test]
    fn breach_display_names_scope() {
        let breach = IntegrityBreach::SumMismatch {
            scope: Scope::Week(BuyId(3), WeekIndex(12)),
            parts: "days",
            recorded: AuctionTally::ZERO,
            summed: AuctionTally::new(bab_schemas::Money::from_units(1), 0),
        };
        let text = breach.to_string();
        assert!(text.starts_with("buy 3 week 12"));
        assert!(text.contains("days"));
    }
}
