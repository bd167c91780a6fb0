//! bab-budget
//!
//! Budget and adjacency admission engine for one broadcast-ad auction run.
//!
//! - Ledger tree: campaign → buy → week → day, cross-cut by channel,
//!   daypart and quality class
//! - Ordered spending / impression checks with one reason per level
//! - Break, campaign, program, daypart, proximity and product adjacency
//! - Commit / unroll pairs with move-only receipts
//! - Sum-consistency audit and read-only reports
//!
//! Synchronous, in-memory, single-threaded per instance.  Rejections are
//! values (`Err(RejectReason)`), never panics.

mod adjacency;
mod budget;
mod buy;
mod campaign;
mod checks;
mod commit;
mod integrity;
mod proximity;
mod reason;
mod report;
mod settings;
mod tally;
mod weekly;

pub use budget::{AuctionBudget, LedgerSnapshot};
pub use buy::{BuyLedger, ShortSlot};
pub use campaign::CampaignLedger;
pub use commit::{BudgetReceipt, ContentReceipt};
pub use integrity::{IntegrityBreach, Scope};
pub use proximity::{ProximityLog, SpotProximityData};
pub use reason::{LedgerError, RejectCategory, RejectReason};
pub use report::{RowLevel, SpendingRow};
pub use settings::{BudgetSettings, DEFAULT_SHORT_SPOT_SECS};
pub use tally::{AuctionTally, DimensionalTally, WinCounter};
pub use weekly::WeeklyLedger;
