//! bab-testkit
//!
//! Fixture builders for campaigns, buys, breaks and candidate bids, plus a
//! JSON bid loader.  Scenario suites live under `tests/`.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use bab_budget::AuctionBudget;
use bab_schemas::{
    AccountingMode, AttributeSet, BidId, BreakId, BreakInfo, BuyConfig, BuyId, CampaignConfig,
    CampaignId, CandidateBid, ChannelId, CreativeId, CreativeSet, DaypartId, Money,
    PlacementAttribute, ProgramOccurrenceId, QualityClass, SpotInfo, WeekConfig, WeekIndex,
};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

/// Monday 2026-03-02 at the given time of day (UTC).
pub fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, hour, min, sec)
        .single()
        .expect("valid fixture time")
}

pub fn secs(n: i64) -> Duration {
    Duration::seconds(n)
}

pub fn units(n: i64) -> Money {
    Money::from_units(n)
}

pub fn attr(s: &str) -> PlacementAttribute {
    PlacementAttribute::new(s)
}

pub fn campaign(id: u64) -> Arc<CampaignConfig> {
    Arc::new(CampaignConfig::unlimited(CampaignId(id)))
}

pub fn campaign_with_limits(
    id: u64,
    spending: Option<i64>,
    impressions: Option<i64>,
) -> Arc<CampaignConfig> {
    Arc::new(CampaignConfig {
        id: CampaignId(id),
        spending_limit: spending.map(Money::from_units),
        impression_limit: impressions,
    })
}

pub fn brk(id: u64, channel: u32, program: u64, start: DateTime<Utc>) -> Arc<BreakInfo> {
    Arc::new(BreakInfo {
        id: BreakId(id),
        channel: ChannelId(channel),
        program: ProgramOccurrenceId(program),
        start_time: start,
    })
}

/// Builder over `BuyConfig`; everything unlimited until set.
pub struct BuyBuilder {
    cfg: BuyConfig,
}

impl BuyBuilder {
    pub fn new(id: u64, campaign: &Arc<CampaignConfig>) -> Self {
        Self {
            cfg: BuyConfig::new(BuyId(id), Arc::clone(campaign)),
        }
    }

    pub fn spending_total(mut self, limit: i64) -> Self {
        self.cfg.spending.total = Some(units(limit));
        self
    }

    pub fn daypart_spending(mut self, daypart: u32, limit: i64) -> Self {
        self.cfg
            .spending
            .by_daypart
            .insert(DaypartId(daypart), units(limit));
        self
    }

    pub fn channel_spending(mut self, channel: u32, limit: i64) -> Self {
        self.cfg
            .spending
            .by_channel
            .insert(ChannelId(channel), units(limit));
        self
    }

    pub fn quality_spending(mut self, class: QualityClass, limit: i64) -> Self {
        self.cfg.spending.by_quality.insert(class, units(limit));
        self
    }

    /// Switch to impression accounting with the given buy total.
    pub fn impressions_total(mut self, limit: i64) -> Self {
        self.cfg.accounting = AccountingMode::Impressions;
        self.cfg.impressions.total = Some(limit);
        self
    }

    pub fn quality_impressions(mut self, class: QualityClass, limit: i64) -> Self {
        self.cfg.accounting = AccountingMode::Impressions;
        self.cfg.impressions.by_quality.insert(class, limit);
        self
    }

    pub fn week(mut self, week: i32, config: WeekConfig) -> Self {
        self.cfg.weeks.insert(WeekIndex(week), config);
        self
    }

    /// Operator and advertiser both approve two short spots per break.
    pub fn allow_double(mut self) -> Self {
        self.cfg.adjacency.operator_allows_double = true;
        self.cfg.adjacency.advertiser_allows_double = true;
        self
    }

    pub fn campaign_exclusive(mut self) -> Self {
        self.cfg.adjacency.campaign_exclusive_break = true;
        self
    }

    pub fn max_per_program(mut self, n: u32) -> Self {
        self.cfg.adjacency.max_wins_per_program = Some(n);
        self
    }

    pub fn max_per_daypart(mut self, n: u32) -> Self {
        self.cfg.adjacency.max_wins_per_daypart = Some(n);
        self
    }

    pub fn proximity(mut self, secs: u32) -> Self {
        self.cfg.proximity_secs = Some(secs);
        self
    }

    pub fn build(self) -> Arc<BuyConfig> {
        Arc::new(self.cfg)
    }
}

/// Builder over `CandidateBid`.
///
/// Defaults: airs at the break start, week 10, daypart 1, rated, 30s,
/// current avail, 1000 impressions, cost 100, creative #1 with no
/// attributes.
pub struct BidBuilder {
    bid: CandidateBid,
}

impl BidBuilder {
    pub fn new(buy: &Arc<BuyConfig>, brk: &Arc<BreakInfo>) -> Self {
        let mut creatives = CreativeSet::new();
        creatives.insert(CreativeId(1), AttributeSet::new());
        Self {
            bid: CandidateBid {
                id: BidId::new_random(),
                buy: Arc::clone(buy),
                brk: Arc::clone(brk),
                spot: SpotInfo {
                    week: WeekIndex(10),
                    weekday: brk.start_time.weekday(),
                    daypart: DaypartId(1),
                    quality: QualityClass::Rated,
                    duration_secs: 30,
                    is_future: false,
                    impressions: 1_000,
                    air_time: brk.start_time,
                },
                cost: units(100),
                creatives,
                double_win_eligible: false,
            },
        }
    }

    pub fn cost(mut self, n: i64) -> Self {
        self.bid.cost = units(n);
        self
    }

    pub fn cost_micros(mut self, raw: i64) -> Self {
        self.bid.cost = Money::new(raw);
        self
    }

    pub fn impressions(mut self, n: i64) -> Self {
        self.bid.spot.impressions = n;
        self
    }

    /// Also moves the weekday to match.
    pub fn air_time(mut self, t: DateTime<Utc>) -> Self {
        self.bid.spot.air_time = t;
        self.bid.spot.weekday = t.weekday();
        self
    }

    pub fn week(mut self, week: i32) -> Self {
        self.bid.spot.week = WeekIndex(week);
        self
    }

    pub fn daypart(mut self, daypart: u32) -> Self {
        self.bid.spot.daypart = DaypartId(daypart);
        self
    }

    pub fn quality(mut self, class: QualityClass) -> Self {
        self.bid.spot.quality = class;
        self
    }

    pub fn duration(mut self, secs: u32) -> Self {
        self.bid.spot.duration_secs = secs;
        self
    }

    pub fn future(mut self) -> Self {
        self.bid.spot.is_future = true;
        self
    }

    /// A 15s spot flagged for the double-win exception.
    pub fn short_pair(mut self) -> Self {
        self.bid.spot.duration_secs = 15;
        self.bid.double_win_eligible = true;
        self
    }

    pub fn no_creatives(mut self) -> Self {
        self.bid.creatives.clear();
        self
    }

    /// Add a creative; call `no_creatives` first to drop the default #1.
    pub fn creative(mut self, id: u64, attrs: &[&str]) -> Self {
        self.bid
            .creatives
            .insert(CreativeId(id), attrs.iter().map(|a| attr(a)).collect());
        self
    }

    pub fn build(self) -> CandidateBid {
        self.bid
    }
}

/// Load a JSON array of candidate bids.
pub fn load_bids_json(path: &str) -> Result<Vec<CandidateBid>> {
    let s = fs::read_to_string(path).with_context(|| format!("read bids: {path}"))?;
    let bids: Vec<CandidateBid> = serde_json::from_str(&s).context("parse bids json")?;
    Ok(bids)
}

/// Panic with every breach listed if the ledger is not sum-consistent.
pub fn assert_consistent(budget: &AuctionBudget) {
    let breaches = budget.verify_integrity();
    assert!(
        breaches.is_empty(),
        "ledger inconsistent:\n{}",
        breaches
            .iter()
            .map(|b| b.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    );
}
