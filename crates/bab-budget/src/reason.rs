//! Rejection reasons and ledger misuse errors.
//!
//! A failed admission check is a normal outcome, not a fault: predicates
//! return `Err(RejectReason)` and the scheduler records it against the bid.
//! `LedgerError` is reserved for broken commit/unroll pairing.

use std::fmt;

/// Grouping of reasons by cause.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RejectCategory {
    Budget,
    Impressions,
    Adjacency,
    Proximity,
    Input,
}

/// Why a candidate bid was not admitted.  Exactly one per failed check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    // Spending
    CampaignBudgetExceeded,
    BuyBudgetExceeded,
    BuyDaypartBudgetExceeded,
    BuyChannelBudgetExceeded,
    BuyUnratedNetworkBudgetExceeded,
    BuyMissingDataBudgetExceeded,
    WeeklyBudgetExceeded,
    WeeklyDaypartBudgetExceeded,
    WeeklyChannelBudgetExceeded,
    WeeklyUnratedNetworkBudgetExceeded,
    WeeklyMissingDataBudgetExceeded,
    DailyBudgetExceeded,

    // Impressions (mirrors the spending set)
    CampaignImpressionsExceeded,
    BuyImpressionsExceeded,
    BuyDaypartImpressionsExceeded,
    BuyChannelImpressionsExceeded,
    BuyUnratedNetworkImpressionsExceeded,
    BuyMissingDataImpressionsExceeded,
    WeeklyImpressionsExceeded,
    WeeklyDaypartImpressionsExceeded,
    WeeklyChannelImpressionsExceeded,
    WeeklyUnratedNetworkImpressionsExceeded,
    WeeklyMissingDataImpressionsExceeded,
    DailyImpressionsExceeded,

    // Adjacency
    BreakAdjacency,
    CampaignAdjacency,
    ProgramAdjacency,
    DaypartAdjacency,
    ProductAdjacency,

    ChannelProximity,

    /// The bid has no creative left to air.
    NoCreative,
}

impl RejectReason {
    /// Stable code for logs and reports.
    pub fn code(&self) -> &'static str {
        use RejectReason::*;
        match self {
            CampaignBudgetExceeded => "CAMPAIGN_BUDGET",
            BuyBudgetExceeded => "BUY_BUDGET",
            BuyDaypartBudgetExceeded => "BUY_DAYPART_BUDGET",
            BuyChannelBudgetExceeded => "BUY_CHANNEL_BUDGET",
            BuyUnratedNetworkBudgetExceeded => "BUY_UNRATED_NETWORK_BUDGET",
            BuyMissingDataBudgetExceeded => "BUY_MISSING_DATA_BUDGET",
            WeeklyBudgetExceeded => "WEEKLY_BUDGET",
            WeeklyDaypartBudgetExceeded => "WEEKLY_DAYPART_BUDGET",
            WeeklyChannelBudgetExceeded => "WEEKLY_CHANNEL_BUDGET",
            WeeklyUnratedNetworkBudgetExceeded => "WEEKLY_UNRATED_NETWORK_BUDGET",
            WeeklyMissingDataBudgetExceeded => "WEEKLY_MISSING_DATA_BUDGET",
            DailyBudgetExceeded => "DAILY_BUDGET",
            CampaignImpressionsExceeded => "CAMPAIGN_IMPRESSIONS",
            BuyImpressionsExceeded => "BUY_IMPRESSIONS",
            BuyDaypartImpressionsExceeded => "BUY_DAYPART_IMPRESSIONS",
            BuyChannelImpressionsExceeded => "BUY_CHANNEL_IMPRESSIONS",
            BuyUnratedNetworkImpressionsExceeded => "BUY_UNRATED_NETWORK_IMPRESSIONS",
            BuyMissingDataImpressionsExceeded => "BUY_MISSING_DATA_IMPRESSIONS",
            WeeklyImpressionsExceeded => "WEEKLY_IMPRESSIONS",
            WeeklyDaypartImpressionsExceeded => "WEEKLY_DAYPART_IMPRESSIONS",
            WeeklyChannelImpressionsExceeded => "WEEKLY_CHANNEL_IMPRESSIONS",
            WeeklyUnratedNetworkImpressionsExceeded => "WEEKLY_UNRATED_NETWORK_IMPRESSIONS",
            WeeklyMissingDataImpressionsExceeded => "WEEKLY_MISSING_DATA_IMPRESSIONS",
            DailyImpressionsExceeded => "DAILY_IMPRESSIONS",
            BreakAdjacency => "BREAK_ADJACENCY",
            CampaignAdjacency => "CAMPAIGN_ADJACENCY",
            ProgramAdjacency => "PROGRAM_ADJACENCY",
            DaypartAdjacency => "DAYPART_ADJACENCY",
            ProductAdjacency => "PRODUCT_ADJACENCY",
            ChannelProximity => "CHANNEL_PROXIMITY",
            NoCreative => "NO_CREATIVE",
        }
    }

    pub fn category(&self) -> RejectCategory {
        use RejectReason::*;
        match self {
            CampaignBudgetExceeded
            | BuyBudgetExceeded
            | BuyDaypartBudgetExceeded
            | BuyChannelBudgetExceeded
            | BuyUnratedNetworkBudgetExceeded
            | BuyMissingDataBudgetExceeded
            | WeeklyBudgetExceeded
            | WeeklyDaypartBudgetExceeded
            | WeeklyChannelBudgetExceeded
            | WeeklyUnratedNetworkBudgetExceeded
            | WeeklyMissingDataBudgetExceeded
            | DailyBudgetExceeded => RejectCategory::Budget,

            CampaignImpressionsExceeded
            | BuyImpressionsExceeded
            | BuyDaypartImpressionsExceeded
            | BuyChannelImpressionsExceeded
            | BuyUnratedNetworkImpressionsExceeded
            | BuyMissingDataImpressionsExceeded
            | WeeklyImpressionsExceeded
            | WeeklyDaypartImpressionsExceeded
            | WeeklyChannelImpressionsExceeded
            | WeeklyUnratedNetworkImpressionsExceeded
            | WeeklyMissingDataImpressionsExceeded
            | DailyImpressionsExceeded => RejectCategory::Impressions,

            BreakAdjacency | CampaignAdjacency | ProgramAdjacency | DaypartAdjacency
            | ProductAdjacency => RejectCategory::Adjacency,

            ChannelProximity => RejectCategory::Proximity,
            NoCreative => RejectCategory::Input,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::error::Error for RejectReason {}

/// Broken commit/unroll pairing, detected through receipts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// The receipt predates the last `init_budget` or value reset.
    StaleReceipt { issued: u64, current: u64 },
    /// The receipt was issued by a different `AuctionBudget`.
    ForeignReceipt,
    /// Not outstanding on this ledger: never issued or already consumed.
    UnknownReceipt { serial: u64 },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleReceipt { issued, current } => write!(
                f,
                "ledger invariant: receipt from generation {issued}, ledger is at {current}"
            ),
            Self::ForeignReceipt => {
                write!(f, "ledger invariant: receipt issued by another auction budget")
            }
            Self::UnknownReceipt { serial } => {
                write!(f, "ledger invariant: receipt #{serial} is not outstanding")
            }
        }
    }
}

impl std::error::Error for LedgerError {}
