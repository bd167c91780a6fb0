use anyhow::{anyhow, Result};
use bab_schemas::BuyId;
use serde_json::Value;

/// Spot length (seconds) that qualifies for the double-win exception.
pub const DEFAULT_SHORT_SPOT_SECS: u32 = 15;

/// Auction-wide switches read once from the canonical config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetSettings {
    /// Buy whose checks may be bypassed for what-if previews.
    pub client_buy_id: Option<BuyId>,
    pub use_budget: bool,
    pub use_advertiser_adjacency: bool,
    pub short_spot_duration_secs: u32,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            client_buy_id: None,
            use_budget: true,
            use_advertiser_adjacency: true,
            short_spot_duration_secs: DEFAULT_SHORT_SPOT_SECS,
        }
    }
}

impl BudgetSettings {
    /// All keys are optional:
    /// - auction.client_buy_id (integer)
    /// - auction.use_budget (bool); default=true
    /// - auction.use_advertiser_adjacency (bool); default=true
    /// - auction.short_spot_duration_secs (integer > 0); default=15
    pub fn from_config_json(cfg: &Value) -> Result<Self> {
        let mut out = Self::default();

        match cfg.pointer("/auction/client_buy_id") {
            None | Some(Value::Null) => {}
            Some(v) => {
                let id = v
                    .as_u64()
                    .ok_or_else(|| anyhow!("auction.client_buy_id must be a non-negative integer (got {v})"))?;
                out.client_buy_id = Some(BuyId(id));
            }
        }

        out.use_budget = read_bool(cfg, "/auction/use_budget", out.use_budget)?;
        out.use_advertiser_adjacency = read_bool(
            cfg,
            "/auction/use_advertiser_adjacency",
            out.use_advertiser_adjacency,
        )?;

        if let Some(v) = cfg.pointer("/auction/short_spot_duration_secs") {
            let secs = v
                .as_i64()
                .ok_or_else(|| anyhow!("auction.short_spot_duration_secs must be an integer (got {v})"))?;
            if secs <= 0 {
                return Err(anyhow!(
                    "auction.short_spot_duration_secs must be > 0 (got {secs})"
                ));
            }
            out.short_spot_duration_secs = u32::try_from(secs)
                .map_err(|_| anyhow!("auction.short_spot_duration_secs out of range: {secs}"))?;
        }

        Ok(out)
    }
}

fn read_bool(cfg: &Value, pointer: &str, default: bool) -> Result<bool> {
    match cfg.pointer(pointer) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(anyhow!("{pointer} must be a bool (got {other})")),
    }
}
