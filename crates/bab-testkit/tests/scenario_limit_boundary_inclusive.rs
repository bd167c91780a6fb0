//! Scenario: Limit Boundary Is Inclusive
//!
//! # Invariant under test
//! A check passes when `current + candidate == limit` and fails when it is
//! one smallest unit (one micro, one impression) over.  The first level
//! that would be exceeded is the one reported, in the fixed order:
//! campaign, buy, buy daypart, buy channel, buy quality, week, week
//! daypart, week channel, week quality, day.

use bab_budget::{AuctionBudget, BudgetSettings, RejectReason};
use bab_schemas::{ChannelId, DaypartId, LimitSet, QualityClass, WeekConfig, MICROS_SCALE};
use bab_testkit::{at, brk, campaign, campaign_with_limits, units, BidBuilder, BuyBuilder};

const M: i64 = MICROS_SCALE;

#[test]
fn buy_total_passes_at_limit_and_fails_one_micro_over() {
    let buy = BuyBuilder::new(1, &campaign(1)).spending_total(500).build();
    let b = brk(1, 1, 1, at(20, 0, 0));
    let won = BidBuilder::new(&buy, &b).cost(400).build();
    let exact = BidBuilder::new(&buy, &b).cost(100).build();
    let over = BidBuilder::new(&buy, &b).cost_micros(100 * M + 1).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&won, &exact, &over]);
    let _r = budget.commit_budget(&won);

    assert_eq!(budget.spending_pass(&exact), Ok(()));
    assert_eq!(budget.spending_pass(&over), Err(RejectReason::BuyBudgetExceeded));
}

#[test]
fn campaign_is_reported_before_buy() {
    let c = campaign_with_limits(1, Some(300), None);
    let buy = BuyBuilder::new(1, &c).spending_total(200).build();
    let sibling = BuyBuilder::new(2, &c).build();
    let b = brk(1, 1, 1, at(20, 0, 0));
    let sibling_win = BidBuilder::new(&sibling, &b).cost(250).build();
    let candidate = BidBuilder::new(&buy, &b).cost(51).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&sibling_win, &candidate]);
    let _r = budget.commit_budget(&sibling_win);

    assert_eq!(
        budget.spending_pass(&candidate),
        Err(RejectReason::CampaignBudgetExceeded)
    );
    let fits = BidBuilder::new(&buy, &b).cost(50).build();
    assert_eq!(budget.spending_pass(&fits), Ok(()));
}

#[test]
fn buy_total_is_reported_before_daypart_and_channel() {
    let buy = BuyBuilder::new(1, &campaign(1))
        .spending_total(100)
        .daypart_spending(1, 50)
        .channel_spending(1, 50)
        .build();
    let b = brk(1, 1, 1, at(20, 0, 0));
    let bid = BidBuilder::new(&buy, &b).cost(101).build();
    let budget = AuctionBudget::new(BudgetSettings::default());
    assert_eq!(budget.spending_pass(&bid), Err(RejectReason::BuyBudgetExceeded));

    let daypart_only = BidBuilder::new(&buy, &b).cost(51).build();
    assert_eq!(
        budget.spending_pass(&daypart_only),
        Err(RejectReason::BuyDaypartBudgetExceeded)
    );

    let other_daypart = BidBuilder::new(&buy, &b).cost(51).daypart(2).build();
    assert_eq!(
        budget.spending_pass(&other_daypart),
        Err(RejectReason::BuyChannelBudgetExceeded)
    );
}

#[test]
fn week_and_day_boundaries() {
    let mut week = WeekConfig::default();
    week.limits.spending.total = Some(units(300));
    week.limits.spending.by_channel.insert(ChannelId(1), units(250));
    week.limits.daily_spending[0] = Some(units(200));
    let buy = BuyBuilder::new(1, &campaign(1)).week(10, week).build();
    let b = brk(1, 1, 1, at(20, 0, 0));
    let won = BidBuilder::new(&buy, &b).cost(150).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&won]);
    let _r = budget.commit_budget(&won);

    let at_day_cap = BidBuilder::new(&buy, &b).cost(50).build();
    let over_day = BidBuilder::new(&buy, &b).cost_micros(50 * M + 1).build();
    assert_eq!(budget.spending_pass(&at_day_cap), Ok(()));
    assert_eq!(budget.spending_pass(&over_day), Err(RejectReason::DailyBudgetExceeded));

    let over_channel = BidBuilder::new(&buy, &b).cost_micros(100 * M + 1).build();
    assert_eq!(
        budget.spending_pass(&over_channel),
        Err(RejectReason::WeeklyChannelBudgetExceeded)
    );

    let over_week = BidBuilder::new(&buy, &b).cost_micros(150 * M + 1).build();
    assert_eq!(budget.spending_pass(&over_week), Err(RejectReason::WeeklyBudgetExceeded));
}

#[test]
fn impression_boundary_counts_single_impressions() {
    let buy = BuyBuilder::new(1, &campaign(1))
        .impressions_total(5_000)
        .build();
    let b = brk(1, 1, 1, at(20, 0, 0));
    let won = BidBuilder::new(&buy, &b).impressions(4_000).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&won]);
    let _r = budget.commit_budget(&won);

    let exact = BidBuilder::new(&buy, &b).impressions(1_000).build();
    let over = BidBuilder::new(&buy, &b).impressions(1_001).build();
    assert_eq!(budget.impressions_pass(&exact), Ok(()));
    assert_eq!(
        budget.impressions_pass(&over),
        Err(RejectReason::BuyImpressionsExceeded)
    );
    assert_eq!(budget.budget_pass(&over), Err(RejectReason::BuyImpressionsExceeded));

    // Spending has no limit here, so cost never matters.
    let pricey = BidBuilder::new(&buy, &b).cost(1_000_000).impressions(1).build();
    assert_eq!(budget.budget_pass(&pricey), Ok(()));
    assert_eq!(budget.spending_pass(&pricey), Ok(()));
}

/// Caps every weekly rung at `cap` so a candidate of `cap + 1` breaks them all.
fn cap_week<T: Copy>(limits: &mut LimitSet<T>, daily: &mut [Option<T>; 7], cap: T) {
    limits.total = Some(cap);
    limits.by_daypart.insert(DaypartId(1), cap);
    limits.by_channel.insert(ChannelId(1), cap);
    limits.by_quality.insert(QualityClass::UnratedNetwork, cap);
    daily[0] = Some(cap);
}

/// Lift the rung at `step`: total, daypart, channel, quality, then day.
fn lift_rung<T>(limits: &mut LimitSet<T>, daily: &mut [Option<T>; 7], step: usize) {
    match step {
        0 => limits.total = None,
        1 => limits.by_daypart.clear(),
        2 => limits.by_channel.clear(),
        3 => limits.by_quality.clear(),
        _ => daily[0] = None,
    }
}

#[test]
fn weekly_spending_rungs_report_in_order() {
    let mut week = WeekConfig::default();
    cap_week(
        &mut week.limits.spending,
        &mut week.limits.daily_spending,
        units(100),
    );
    let b = brk(1, 1, 1, at(20, 0, 0));
    let expected = [
        RejectReason::WeeklyBudgetExceeded,
        RejectReason::WeeklyDaypartBudgetExceeded,
        RejectReason::WeeklyChannelBudgetExceeded,
        RejectReason::WeeklyUnratedNetworkBudgetExceeded,
        RejectReason::DailyBudgetExceeded,
    ];

    for (step, reason) in expected.into_iter().enumerate() {
        let buy = BuyBuilder::new(1, &campaign(1)).week(10, week.clone()).build();
        let bid = BidBuilder::new(&buy, &b)
            .cost(101)
            .quality(QualityClass::UnratedNetwork)
            .build();
        let mut budget = AuctionBudget::new(BudgetSettings::default());
        budget.init_budget([&bid]);
        assert_eq!(budget.spending_pass(&bid), Err(reason), "step {step}");

        let limits = &mut week.limits;
        lift_rung(&mut limits.spending, &mut limits.daily_spending, step);
    }

    let buy = BuyBuilder::new(1, &campaign(1)).week(10, week).build();
    let bid = BidBuilder::new(&buy, &b)
        .cost(101)
        .quality(QualityClass::UnratedNetwork)
        .build();
    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&bid]);
    assert_eq!(budget.spending_pass(&bid), Ok(()));
}

#[test]
fn weekly_impression_rungs_report_in_order() {
    let mut week = WeekConfig::default();
    cap_week(
        &mut week.limits.impressions,
        &mut week.limits.daily_impressions,
        1_000,
    );
    let b = brk(1, 1, 1, at(20, 0, 0));
    let expected = [
        RejectReason::WeeklyImpressionsExceeded,
        RejectReason::WeeklyDaypartImpressionsExceeded,
        RejectReason::WeeklyChannelImpressionsExceeded,
        RejectReason::WeeklyUnratedNetworkImpressionsExceeded,
        RejectReason::DailyImpressionsExceeded,
    ];

    for (step, reason) in expected.into_iter().enumerate() {
        let buy = BuyBuilder::new(1, &campaign(1))
            .impressions_total(1_000_000)
            .week(10, week.clone())
            .build();
        let bid = BidBuilder::new(&buy, &b)
            .impressions(1_001)
            .quality(QualityClass::UnratedNetwork)
            .build();
        let mut budget = AuctionBudget::new(BudgetSettings::default());
        budget.init_budget([&bid]);
        assert_eq!(budget.impressions_pass(&bid), Err(reason), "step {step}");
        assert_eq!(budget.budget_pass(&bid), Err(reason), "step {step}");

        let limits = &mut week.limits;
        lift_rung(&mut limits.impressions, &mut limits.daily_impressions, step);
    }
}
