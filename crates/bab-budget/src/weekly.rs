use bab_schemas::{
    Booked, ChannelId, DaypartId, Money, QualityClass, SpotInfo, WeekConfig, WeekIndex, WeekLimits,
};

use crate::tally::{AuctionTally, DimensionalTally};

/// One broadcast week of one media buy.
///
/// Limits are snapshotted when the ledger is created and stay fixed until
/// the next `init_budget` or `clear_weekly_values`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WeeklyLedger {
    week: WeekIndex,
    configured: WeekLimits,
    effective: WeekLimits,
    initial: AuctionTally,
    overall: AuctionTally,
    daily: [AuctionTally; 7],
    by_channel: DimensionalTally<ChannelId>,
    by_daypart: DimensionalTally<DaypartId>,
    by_quality: DimensionalTally<QualityClass>,
}

impl WeeklyLedger {
    /// A week with no configuration enforces no weekly limits.
    pub(crate) fn new(week: WeekIndex, config: Option<&WeekConfig>) -> Self {
        let (configured, effective, booked) = match config {
            Some(cfg) => (cfg.limits.clone(), cfg.effective_limits(), cfg.booked),
            None => (WeekLimits::default(), WeekLimits::default(), Booked::default()),
        };
        Self {
            week,
            configured,
            effective,
            initial: AuctionTally::new(booked.spending, booked.impressions),
            overall: AuctionTally::ZERO,
            daily: [AuctionTally::ZERO; 7],
            by_channel: DimensionalTally::new(),
            by_daypart: DimensionalTally::new(),
            by_quality: DimensionalTally::new(),
        }
    }

    pub fn week(&self) -> WeekIndex {
        self.week
    }

    /// Effective limits the checks compare against.
    pub fn limits(&self) -> &WeekLimits {
        &self.effective
    }

    pub fn configured_limits(&self) -> &WeekLimits {
        &self.configured
    }

    /// Booked baseline carried in from before this auction.
    pub fn initial(&self) -> AuctionTally {
        self.initial
    }

    pub fn overall(&self) -> AuctionTally {
        self.overall
    }

    /// Monday = 0.
    pub fn day(&self, day_index: usize) -> AuctionTally {
        self.daily.get(day_index).copied().unwrap_or_default()
    }

    pub fn daily(&self) -> &[AuctionTally; 7] {
        &self.daily
    }

    pub fn by_channel(&self) -> &DimensionalTally<ChannelId> {
        &self.by_channel
    }

    pub fn by_daypart(&self) -> &DimensionalTally<DaypartId> {
        &self.by_daypart
    }

    pub fn by_quality(&self) -> &DimensionalTally<QualityClass> {
        &self.by_quality
    }

    pub(crate) fn apply(
        &mut self,
        spot: &SpotInfo,
        channel: ChannelId,
        delta_spending: Money,
        delta_impressions: i64,
    ) {
        self.overall.update(delta_spending, delta_impressions);
        if let Some(day) = self.daily.get_mut(spot.day_index()) {
            day.update(delta_spending, delta_impressions);
        }
        self.by_channel
            .update(channel, delta_spending, delta_impressions);
        self.by_daypart
            .update(spot.daypart, delta_spending, delta_impressions);
        self.by_quality
            .update(spot.quality, delta_spending, delta_impressions);
    }

    /// Zero this auction's running totals; baseline and limits are kept.
    pub(crate) fn reset_values(&mut self) {
        self.overall = AuctionTally::ZERO;
        self.daily = [AuctionTally::ZERO; 7];
        self.by_channel.clear();
        self.by_daypart.clear();
        self.by_quality.clear();
    }

    /// Forget the booked baseline ahead of a from-scratch weekly run.
    pub(crate) fn clear_initial(&mut self) {
        self.initial = AuctionTally::ZERO;
        self.effective = self.configured.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bab_schemas::LimitSet;
    use chrono::{TimeZone, Utc, Weekday};

    fn spot(weekday: Weekday) -> SpotInfo {
        SpotInfo {
            week: WeekIndex(3),
            weekday,
            daypart: DaypartId(2),
            quality: QualityClass::MissingData,
            duration_secs: 30,
            is_future: false,
            impressions: 800,
            air_time: Utc.with_ymd_and_hms(2026, 1, 14, 21, 0, 0).unwrap(),
        }
    }

    fn config() -> WeekConfig {
        WeekConfig {
            limits: WeekLimits {
                spending: LimitSet::total(Money::from_units(500)),
                ..WeekLimits::default()
            },
            booked: Booked {
                spending: Money::from_units(120),
                impressions: 0,
            },
        }
    }

    #[test]
    fn apply_reaches_day_and_dimensions() {
        let mut week = WeeklyLedger::new(WeekIndex(3), None);
        week.apply(&spot(Weekday::Fri), ChannelId(8), Money::from_units(40), 800);

        assert_eq!(week.overall(), AuctionTally::new(Money::from_units(40), 800));
        assert_eq!(week.day(4), week.overall());
        assert_eq!(week.day(0), AuctionTally::ZERO);
        assert_eq!(week.by_channel().current_impressions(&ChannelId(8)), 800);
        assert_eq!(
            week.by_quality().current_spending(&QualityClass::MissingData),
            Money::from_units(40)
        );
    }

    #[test]
    fn snapshot_uses_effective_limits() {
        let week = WeeklyLedger::new(WeekIndex(3), Some(&config()));
        assert_eq!(week.limits().spending.total, Some(Money::from_units(380)));
        assert_eq!(
            week.configured_limits().spending.total,
            Some(Money::from_units(500))
        );
        assert_eq!(week.initial().spending(), Money::from_units(120));
    }

    #[test]
    fn clear_initial_restores_configured_limits() {
        let mut week = WeeklyLedger::new(WeekIndex(3), Some(&config()));
        week.clear_initial();
        assert_eq!(week.initial(), AuctionTally::ZERO);
        assert_eq!(week.limits().spending.total, Some(Money::from_units(500)));
    }

    #[test]
    fn reset_values_keeps_limits() {
        let mut week = WeeklyLedger::new(WeekIndex(3), Some(&config()));
        week.apply(&spot(Weekday::Mon), ChannelId(1), Money::from_units(10), 5);
        week.reset_values();
        assert_eq!(week.overall(), AuctionTally::ZERO);
        assert!(week.by_channel().is_empty());
        assert_eq!(week.limits().spending.total, Some(Money::from_units(380)));
    }
}
