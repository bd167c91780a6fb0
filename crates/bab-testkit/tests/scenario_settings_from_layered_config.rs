//! Scenario: Settings From Layered Config
//!
//! # Invariant under test
//! Auction settings come from the canonical merged config: later layers
//! override earlier ones, missing keys keep their defaults, malformed
//! values are refused, and keys nothing consumes are reported (or fail
//! under the strict policy).

use bab_budget::{AuctionBudget, BudgetSettings, RejectReason, DEFAULT_SHORT_SPOT_SECS};
use bab_config::{load_layered_yaml, load_layered_yaml_from_strings, report_unused_keys, UnusedKeyPolicy};
use bab_schemas::BuyId;
use bab_testkit::{at, brk, campaign, BidBuilder, BuyBuilder};

const BASE: &str = r#"
auction:
  use_budget: true
  use_advertiser_adjacency: true
  short_spot_duration_secs: 15
"#;

const PREVIEW: &str = r#"
auction:
  client_buy_id: 42
  use_budget: false
"#;

#[test]
fn later_layer_overrides_and_defaults_fill_in() {
    let loaded = load_layered_yaml_from_strings(&[BASE, PREVIEW]).unwrap();
    let settings = BudgetSettings::from_config_json(&loaded.config_json).unwrap();
    assert_eq!(
        settings,
        BudgetSettings {
            client_buy_id: Some(BuyId(42)),
            use_budget: false,
            use_advertiser_adjacency: true,
            short_spot_duration_secs: DEFAULT_SHORT_SPOT_SECS,
        }
    );

    let empty = load_layered_yaml_from_strings(&["{}"]).unwrap();
    assert_eq!(
        BudgetSettings::from_config_json(&empty.config_json).unwrap(),
        BudgetSettings::default()
    );
}

#[test]
fn malformed_values_are_refused() {
    for doc in [
        "auction:\n  client_buy_id: -3\n",
        "auction:\n  client_buy_id: \"42\"\n",
        "auction:\n  use_budget: \"no\"\n",
        "auction:\n  short_spot_duration_secs: 0\n",
        "auction:\n  short_spot_duration_secs: 7.5\n",
    ] {
        let loaded = load_layered_yaml_from_strings(&[doc]).unwrap();
        let err = BudgetSettings::from_config_json(&loaded.config_json).unwrap_err();
        assert!(err.to_string().contains("auction"), "{doc}: {err}");
    }
}

#[test]
fn unused_keys_fail_under_strict_policy() {
    let typo = "auction:\n  use_budjet: false\n";
    let loaded = load_layered_yaml_from_strings(&[BASE, typo]).unwrap();

    let report = report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn).unwrap();
    assert_eq!(report.unused_leaf_pointers, vec!["/auction/use_budjet".to_string()]);
    assert!(report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Fail).is_err());

    let clean = load_layered_yaml_from_strings(&[BASE, PREVIEW]).unwrap();
    assert!(report_unused_keys(&clean.config_json, UnusedKeyPolicy::Fail)
        .unwrap()
        .is_clean());
}

#[test]
fn settings_file_drives_the_client_bypass() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.yaml");
    let preview = dir.path().join("preview.yaml");
    std::fs::write(&base, BASE).unwrap();
    std::fs::write(&preview, PREVIEW).unwrap();

    let loaded =
        load_layered_yaml(&[base.to_str().unwrap(), preview.to_str().unwrap()]).unwrap();
    let settings = BudgetSettings::from_config_json(&loaded.config_json).unwrap();

    let client = BuyBuilder::new(42, &campaign(1)).spending_total(1).build();
    let bid = BidBuilder::new(&client, &brk(1, 1, 1, at(20, 0, 0))).cost(500).build();

    let mut budget = AuctionBudget::new(settings);
    budget.init_budget([&bid]);
    assert_eq!(budget.spending_pass(&bid), Ok(()));
    budget.set_use_budget(true);
    assert_eq!(budget.spending_pass(&bid), Err(RejectReason::BuyBudgetExceeded));
}
