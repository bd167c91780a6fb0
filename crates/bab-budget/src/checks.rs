//! Budget constraint checks.
//!
//! Both flavours walk the same ladder, stopping at the first level whose
//! `current + candidate` would exceed its limit:
//!
//! campaign, buy, buy daypart, buy channel, buy quality class,
//! week, week daypart, week channel, week quality class, day.
//!
//! Reaching a limit exactly passes.  An absent limit is no limit.  The week
//! levels are skipped when the buy has no ledger for the bid's week.

use bab_schemas::{
    AccountingMode, BuyConfig, CampaignConfig, CandidateBid, LimitSet, Money, QualityClass,
    WeekLimits,
};
use tracing::debug;

use crate::budget::AuctionBudget;
use crate::buy::BuyLedger;
use crate::reason::RejectReason;
use crate::tally::AuctionTally;

/// Reason reported at each rung of the ladder.
struct Ladder {
    campaign: RejectReason,
    buy: RejectReason,
    buy_daypart: RejectReason,
    buy_channel: RejectReason,
    buy_unrated: RejectReason,
    buy_missing: RejectReason,
    week: RejectReason,
    week_daypart: RejectReason,
    week_channel: RejectReason,
    week_unrated: RejectReason,
    week_missing: RejectReason,
    day: RejectReason,
}

/// Which half of a tally and which limits a check compares.
trait Quota {
    type Unit: Copy + Ord;

    const LADDER: Ladder;
    const ZERO: Self::Unit;

    fn checked_add(a: Self::Unit, b: Self::Unit) -> Option<Self::Unit>;

    /// `current + candidate > cap`; a sum past the top of the range
    /// exceeds every cap, one past the bottom exceeds none.
    fn exceeds(current: Self::Unit, candidate: Self::Unit, cap: Self::Unit) -> bool {
        match Self::checked_add(current, candidate) {
            Some(total) => total > cap,
            None => candidate > Self::ZERO,
        }
    }

    fn of(tally: AuctionTally) -> Self::Unit;
    fn candidate(bid: &CandidateBid) -> Self::Unit;
    fn campaign_limit(config: &CampaignConfig) -> Option<Self::Unit>;
    fn buy_limits(config: &BuyConfig) -> &LimitSet<Self::Unit>;
    fn week_limits(limits: &WeekLimits) -> &LimitSet<Self::Unit>;
    fn daily_limit(limits: &WeekLimits, day: usize) -> Option<Self::Unit>;
}

struct Spending;

impl Quota for Spending {
    type Unit = Money;

    const LADDER: Ladder = Ladder {
        campaign: RejectReason::CampaignBudgetExceeded,
        buy: RejectReason::BuyBudgetExceeded,
        buy_daypart: RejectReason::BuyDaypartBudgetExceeded,
        buy_channel: RejectReason::BuyChannelBudgetExceeded,
        buy_unrated: RejectReason::BuyUnratedNetworkBudgetExceeded,
        buy_missing: RejectReason::BuyMissingDataBudgetExceeded,
        week: RejectReason::WeeklyBudgetExceeded,
        week_daypart: RejectReason::WeeklyDaypartBudgetExceeded,
        week_channel: RejectReason::WeeklyChannelBudgetExceeded,
        week_unrated: RejectReason::WeeklyUnratedNetworkBudgetExceeded,
        week_missing: RejectReason::WeeklyMissingDataBudgetExceeded,
        day: RejectReason::DailyBudgetExceeded,
    };
    const ZERO: Money = Money::ZERO;

    fn checked_add(a: Money, b: Money) -> Option<Money> {
        a.checked_add(b)
    }

    fn of(tally: AuctionTally) -> Money {
        tally.spending()
    }

    fn candidate(bid: &CandidateBid) -> Money {
        bid.cost
    }

    fn campaign_limit(config: &CampaignConfig) -> Option<Money> {
        config.spending_limit
    }

    fn buy_limits(config: &BuyConfig) -> &LimitSet<Money> {
        &config.spending
    }

    fn week_limits(limits: &WeekLimits) -> &LimitSet<Money> {
        &limits.spending
    }

    fn daily_limit(limits: &WeekLimits, day: usize) -> Option<Money> {
        limits.daily_spending.get(day).copied().flatten()
    }
}

struct Impressions;

impl Quota for Impressions {
    type Unit = i64;

    const LADDER: Ladder = Ladder {
        campaign: RejectReason::CampaignImpressionsExceeded,
        buy: RejectReason::BuyImpressionsExceeded,
        buy_daypart: RejectReason::BuyDaypartImpressionsExceeded,
        buy_channel: RejectReason::BuyChannelImpressionsExceeded,
        buy_unrated: RejectReason::BuyUnratedNetworkImpressionsExceeded,
        buy_missing: RejectReason::BuyMissingDataImpressionsExceeded,
        week: RejectReason::WeeklyImpressionsExceeded,
        week_daypart: RejectReason::WeeklyDaypartImpressionsExceeded,
        week_channel: RejectReason::WeeklyChannelImpressionsExceeded,
        week_unrated: RejectReason::WeeklyUnratedNetworkImpressionsExceeded,
        week_missing: RejectReason::WeeklyMissingDataImpressionsExceeded,
        day: RejectReason::DailyImpressionsExceeded,
    };
    const ZERO: i64 = 0;

    fn checked_add(a: i64, b: i64) -> Option<i64> {
        a.checked_add(b)
    }

    fn of(tally: AuctionTally) -> i64 {
        tally.impressions()
    }

    fn candidate(bid: &CandidateBid) -> i64 {
        bid.spot.impressions
    }

    fn campaign_limit(config: &CampaignConfig) -> Option<i64> {
        config.impression_limit
    }

    fn buy_limits(config: &BuyConfig) -> &LimitSet<i64> {
        &config.impressions
    }

    fn week_limits(limits: &WeekLimits) -> &LimitSet<i64> {
        &limits.impressions
    }

    fn daily_limit(limits: &WeekLimits, day: usize) -> Option<i64> {
        limits.daily_impressions.get(day).copied().flatten()
    }
}

/// Quality classes with their own limit and reason; `Rated` has neither.
fn quality_reason(class: QualityClass, unrated: RejectReason, missing: RejectReason) -> Option<RejectReason> {
    match class {
        QualityClass::Rated => None,
        QualityClass::UnratedNetwork => Some(unrated),
        QualityClass::MissingData => Some(missing),
    }
}

impl AuctionBudget {
    /// Spending or impression check, chosen by the buy's accounting mode.
    pub fn budget_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        match self.buy_config(bid).accounting {
            AccountingMode::Spending => self.spending_pass(bid),
            AccountingMode::Impressions => self.impressions_pass(bid),
        }
    }

    pub fn spending_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        if self.budget_bypassed(bid) {
            return Ok(());
        }
        self.run_ladder::<Spending>(bid).inspect_err(|reason| log_reject(bid, *reason))
    }

    /// Passes unconditionally for buys not accounted by impressions.
    pub fn impressions_pass(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        if !self.buy_config(bid).is_impression_limited() || self.budget_bypassed(bid) {
            return Ok(());
        }
        self.run_ladder::<Impressions>(bid).inspect_err(|reason| log_reject(bid, *reason))
    }

    fn budget_bypassed(&self, bid: &CandidateBid) -> bool {
        !self.settings.use_budget && self.is_client(bid)
    }

    fn run_ladder<Q: Quota>(&self, bid: &CandidateBid) -> Result<(), RejectReason> {
        let ladder = Q::LADDER;
        let candidate = Q::candidate(bid);
        let spot = &bid.spot;
        let channel = bid.channel();

        let check = |current: AuctionTally, limit: Option<Q::Unit>, reason: RejectReason| {
            match limit {
                Some(cap) if Q::exceeds(Q::of(current), candidate, cap) => Err(reason),
                _ => Ok(()),
            }
        };

        let campaign_now = self
            .campaign_ledger(bid)
            .map(|c| c.overall())
            .unwrap_or_default();
        check(
            campaign_now,
            Q::campaign_limit(self.campaign_config(bid)),
            ladder.campaign,
        )?;

        let buy = self.buy_ledger(bid);
        let limits = Q::buy_limits(self.buy_config(bid));

        check(
            buy.map(BuyLedger::overall).unwrap_or_default(),
            limits.total,
            ladder.buy,
        )?;
        check(
            buy.map(|b| b.by_daypart().get(&spot.daypart))
                .unwrap_or_default(),
            limits.daypart(spot.daypart),
            ladder.buy_daypart,
        )?;
        check(
            buy.map(|b| b.by_channel().get(&channel)).unwrap_or_default(),
            limits.channel(channel),
            ladder.buy_channel,
        )?;
        if let Some(reason) = quality_reason(spot.quality, ladder.buy_unrated, ladder.buy_missing) {
            check(
                buy.map(|b| b.by_quality().get(&spot.quality))
                    .unwrap_or_default(),
                limits.quality(spot.quality),
                reason,
            )?;
        }

        let Some(week) = buy.and_then(|b| b.week(spot.week)) else {
            return Ok(());
        };
        let week_limits = Q::week_limits(week.limits());

        check(week.overall(), week_limits.total, ladder.week)?;
        check(
            week.by_daypart().get(&spot.daypart),
            week_limits.daypart(spot.daypart),
            ladder.week_daypart,
        )?;
        check(
            week.by_channel().get(&channel),
            week_limits.channel(channel),
            ladder.week_channel,
        )?;
        if let Some(reason) = quality_reason(spot.quality, ladder.week_unrated, ladder.week_missing) {
            check(
                week.by_quality().get(&spot.quality),
                week_limits.quality(spot.quality),
                reason,
            )?;
        }

        let day = spot.day_index();
        check(
            week.day(day),
            Q::daily_limit(week.limits(), day),
            ladder.day,
        )
    }
}

pub(crate) fn log_reject(bid: &CandidateBid, reason: RejectReason) {
    debug!(
        bid = %bid.id,
        buy = %bid.buy_id(),
        brk = %bid.break_id(),
        reason = reason.code(),
        "bid rejected"
    );
}
