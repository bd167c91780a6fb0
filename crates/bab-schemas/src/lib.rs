//! bab-schemas
//!
//! Read-only descriptor types consumed by the auction budget engine:
//! identifiers, fixed-point money, limit sets, campaign/buy configuration,
//! break and spot metadata, and the candidate bid itself.
//!
//! Everything here is plain data (serde-derived, no behaviour beyond small
//! accessors).  The ledger never mutates these values.

mod bid;
mod buy;
mod ids;
mod limits;
mod money;

pub use bid::{
    AttributeSet, BreakInfo, CandidateBid, CreativeSelection, CreativeSet, PlacementAttribute,
    SpotInfo,
};
pub use buy::{AccountingMode, AdjacencyRules, BuyConfig, CampaignConfig};
pub use ids::{
    BidId, BreakId, BuyId, CampaignId, ChannelId, CreativeId, DaypartId, ProgramOccurrenceId,
    WeekIndex,
};
pub use limits::{Booked, LimitSet, QualityClass, WeekConfig, WeekLimits};
pub use money::{Money, MICROS_SCALE};
