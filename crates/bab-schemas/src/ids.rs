use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Advertiser campaign.
    CampaignId(u64)
);
numeric_id!(
    /// Media buy (a purchasable unit of a campaign).
    BuyId(u64)
);
numeric_id!(
    /// Scheduled block of avails within a program on a channel.
    BreakId(u64)
);
numeric_id!(ChannelId(u32));
numeric_id!(DaypartId(u32));
numeric_id!(
    /// One airing of a program (not the program title).
    ProgramOccurrenceId(u64)
);
numeric_id!(CreativeId(u64));
numeric_id!(
    /// Broadcast week index used for weekly accounting.
    WeekIndex(i32)
);

/// Identity of one candidate bid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidId(pub Uuid);

impl BidId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
