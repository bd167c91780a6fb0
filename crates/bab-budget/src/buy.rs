use std::collections::BTreeMap;
use std::sync::Arc;

use bab_schemas::{
    AttributeSet, BreakId, BuyConfig, BuyId, CandidateBid, ChannelId, CreativeId, DaypartId,
    Money, ProgramOccurrenceId, QualityClass, WeekIndex,
};

use crate::proximity::{ProximityLog, SpotProximityData};
use crate::tally::{AuctionTally, DimensionalTally, WinCounter};
use crate::weekly::WeeklyLedger;

/// The buy's one permitted short-spot win in a break, and its creative.
///
/// A second short win in the same break must carry the same creative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortSlot {
    pub creative: Option<(CreativeId, AttributeSet)>,
    pub wins: u32,
}

/// One media buy's totals and win tracking for one auction run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuyLedger {
    config: Arc<BuyConfig>,
    overall: AuctionTally,
    current: AuctionTally,
    future: AuctionTally,
    by_daypart: DimensionalTally<DaypartId>,
    by_channel: DimensionalTally<ChannelId>,
    by_quality: DimensionalTally<QualityClass>,
    weeks: BTreeMap<WeekIndex, WeeklyLedger>,

    // Win tracking: touched only by commit/unroll.
    break_wins: WinCounter<BreakId>,
    program_wins: WinCounter<ProgramOccurrenceId>,
    daypart_wins: WinCounter<DaypartId>,
    channel_wins: WinCounter<ChannelId>,
    short_slots: BTreeMap<BreakId, ShortSlot>,
    proximity: BTreeMap<ChannelId, ProximityLog>,
    creatives: DimensionalTally<CreativeId>,
}

impl BuyLedger {
    pub(crate) fn new(config: Arc<BuyConfig>) -> Self {
        Self {
            config,
            overall: AuctionTally::ZERO,
            current: AuctionTally::ZERO,
            future: AuctionTally::ZERO,
            by_daypart: DimensionalTally::new(),
            by_channel: DimensionalTally::new(),
            by_quality: DimensionalTally::new(),
            weeks: BTreeMap::new(),
            break_wins: WinCounter::default(),
            program_wins: WinCounter::default(),
            daypart_wins: WinCounter::default(),
            channel_wins: WinCounter::default(),
            short_slots: BTreeMap::new(),
            proximity: BTreeMap::new(),
            creatives: DimensionalTally::new(),
        }
    }

    pub fn id(&self) -> BuyId {
        self.config.id
    }

    /// Configuration snapshot taken from the first bid seen for this buy.
    pub fn config(&self) -> &BuyConfig {
        &self.config
    }

    pub fn overall(&self) -> AuctionTally {
        self.overall
    }

    /// Wins on avails inside the current booking horizon.
    pub fn current(&self) -> AuctionTally {
        self.current
    }

    pub fn future(&self) -> AuctionTally {
        self.future
    }

    pub fn by_daypart(&self) -> &DimensionalTally<DaypartId> {
        &self.by_daypart
    }

    pub fn by_channel(&self) -> &DimensionalTally<ChannelId> {
        &self.by_channel
    }

    pub fn by_quality(&self) -> &DimensionalTally<QualityClass> {
        &self.by_quality
    }

    pub fn week(&self, week: WeekIndex) -> Option<&WeeklyLedger> {
        self.weeks.get(&week)
    }

    pub fn weeks(&self) -> impl Iterator<Item = &WeeklyLedger> {
        self.weeks.values()
    }

    pub(crate) fn weeks_mut(&mut self) -> impl Iterator<Item = &mut WeeklyLedger> {
        self.weeks.values_mut()
    }

    pub fn break_wins(&self, brk: BreakId) -> u32 {
        self.break_wins.get(&brk)
    }

    pub fn break_win_counts(&self) -> &WinCounter<BreakId> {
        &self.break_wins
    }

    pub fn program_wins(&self, program: ProgramOccurrenceId) -> u32 {
        self.program_wins.get(&program)
    }

    pub fn daypart_wins(&self, daypart: DaypartId) -> u32 {
        self.daypart_wins.get(&daypart)
    }

    /// Channel bundling: channels this buy currently holds wins on.
    pub fn channels_won(&self) -> &WinCounter<ChannelId> {
        &self.channel_wins
    }

    pub fn short_slot(&self, brk: BreakId) -> Option<&ShortSlot> {
        self.short_slots.get(&brk)
    }

    pub fn proximity_log(&self, channel: ChannelId) -> Option<&ProximityLog> {
        self.proximity.get(&channel)
    }

    pub fn creative_tallies(&self) -> &DimensionalTally<CreativeId> {
        &self.creatives
    }

    pub(crate) fn ensure_week(&mut self, week: WeekIndex) -> &mut WeeklyLedger {
        let config = &self.config;
        self.weeks
            .entry(week)
            .or_insert_with(|| WeeklyLedger::new(week, config.weeks.get(&week)))
    }

    /// Spend/impression side of a commit or unroll.
    pub(crate) fn apply_budget(&mut self, bid: &CandidateBid, dir: Direction) {
        let (ds, di) = dir.deltas(bid);
        let spot = &bid.spot;
        let channel = bid.channel();

        self.overall.update(ds, di);
        if spot.is_future {
            self.future.update(ds, di);
        } else {
            self.current.update(ds, di);
        }
        self.by_daypart.update(spot.daypart, ds, di);
        self.by_channel.update(channel, ds, di);
        self.by_quality.update(spot.quality, ds, di);
        self.ensure_week(spot.week).apply(spot, channel, ds, di);

        if let Some((creative, _)) = bid.primary_creative() {
            self.creatives.update(creative, ds, di);
        }

        // Only buys with a restriction keep a log; otherwise it would grow
        // without bound and never be read.
        if self.config.proximity_gap_secs().is_some() {
            let entry = SpotProximityData {
                break_id: bid.break_id(),
                duration_secs: spot.duration_secs,
            };
            if dir == Direction::Commit {
                self.proximity
                    .entry(channel)
                    .or_default()
                    .insert(spot.air_time, entry);
            } else if let Some(log) = self.proximity.get_mut(&channel) {
                log.remove(spot.air_time, entry);
                if log.is_empty() {
                    self.proximity.remove(&channel);
                }
            }
        }
    }

    /// Win-tracking side of a commit or unroll.
    pub(crate) fn apply_content(&mut self, bid: &CandidateBid, dir: Direction, short_double: bool) {
        let brk = bid.break_id();
        if dir == Direction::Commit {
            self.break_wins.increment(brk);
            self.program_wins.increment(bid.brk.program);
            self.daypart_wins.increment(bid.spot.daypart);
            self.channel_wins.increment(bid.channel());
        } else {
            self.break_wins.decrement(&brk);
            self.program_wins.decrement(&bid.brk.program);
            self.daypart_wins.decrement(&bid.spot.daypart);
            self.channel_wins.decrement(&bid.channel());
        }

        if !short_double {
            return;
        }
        if dir == Direction::Commit {
            self.short_slots
                .entry(brk)
                .and_modify(|slot| slot.wins += 1)
                .or_insert_with(|| ShortSlot {
                    creative: bid
                        .primary_creative()
                        .map(|(id, attrs)| (id, attrs.clone())),
                    wins: 1,
                });
        } else if let Some(slot) = self.short_slots.get_mut(&brk) {
            slot.wins -= 1;
            if slot.wins == 0 {
                self.short_slots.remove(&brk);
            }
        }
    }

    /// Zero all tallies and win tracking; configuration and week limits stay.
    pub(crate) fn reset_values(&mut self) {
        self.overall = AuctionTally::ZERO;
        self.current = AuctionTally::ZERO;
        self.future = AuctionTally::ZERO;
        self.by_daypart.clear();
        self.by_channel.clear();
        self.by_quality.clear();
        for week in self.weeks.values_mut() {
            week.reset_values();
        }
        self.break_wins.clear();
        self.program_wins.clear();
        self.daypart_wins.clear();
        self.channel_wins.clear();
        self.short_slots.clear();
        self.proximity.clear();
        self.creatives.clear();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Commit,
    Unroll,
}

impl Direction {
    /// The bid's cost and impressions, negated for an unroll.
    pub(crate) fn deltas(self, bid: &CandidateBid) -> (Money, i64) {
        match self {
            Direction::Commit => (bid.cost, bid.spot.impressions),
            Direction::Unroll => (-bid.cost, -bid.spot.impressions),
        }
    }
}
