//! Scenario: Product Attribute Pruning
//!
//! # Invariant under test
//! A candidate with creatives {A, B}, where A shares a placement attribute
//! with an existing winner in the break and B does not, passes narrowed to
//! {B}.  If both conflict it fails with the product-adjacency reason.  An
//! empty creative set fails with the no-creative reason.  The second half
//! of a short-spot pair is forced onto the creative already placed.
//! Occupancy is refcounted and disappears with the last winner.

use bab_budget::{AuctionBudget, BudgetSettings, RejectReason};
use bab_schemas::{BreakId, BuyId, CreativeId};
use bab_testkit::{at, attr, brk, campaign, units, BidBuilder, BuyBuilder};

#[test]
fn conflicting_creative_is_pruned() {
    let incumbent = BuyBuilder::new(9, &campaign(9)).build();
    let buy = BuyBuilder::new(1, &campaign(1)).build();
    let b = brk(5, 1, 1, at(20, 0, 0));
    let winner = BidBuilder::new(&incumbent, &b)
        .no_creatives()
        .creative(100, &["auto"])
        .build();
    let candidate = BidBuilder::new(&buy, &b)
        .no_creatives()
        .creative(10, &["auto", "family"])
        .creative(11, &["food"])
        .build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&winner, &candidate]);
    let rc = budget.commit_content(&winner);

    let selection = budget.product_adjacency_pass(&candidate).unwrap();
    assert!(!selection.forced);
    assert_eq!(selection.ids().collect::<Vec<_>>(), vec![CreativeId(11)]);
    // The bid itself is untouched until the caller narrows it.
    assert_eq!(candidate.creatives.len(), 2);

    budget.unroll_content(rc).unwrap();
    assert!(budget.placements(BreakId(5)).is_none());
    let selection = budget.product_adjacency_pass(&candidate).unwrap();
    assert_eq!(selection.creatives, candidate.creatives);
}

#[test]
fn all_conflicting_fails() {
    let incumbent = BuyBuilder::new(9, &campaign(9)).build();
    let buy = BuyBuilder::new(1, &campaign(1)).build();
    let b = brk(5, 1, 1, at(20, 0, 0));
    let winners = [
        BidBuilder::new(&incumbent, &b)
            .no_creatives()
            .creative(100, &["auto"])
            .build(),
        BidBuilder::new(&incumbent, &b)
            .no_creatives()
            .creative(101, &["luxury"])
            .build(),
    ];
    let candidate = BidBuilder::new(&buy, &b)
        .no_creatives()
        .creative(10, &["auto"])
        .creative(11, &["luxury", "travel"])
        .build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget(winners.iter().chain([&candidate]));
    let _held: Vec<_> = winners.iter().map(|w| budget.commit_content(w)).collect();

    assert_eq!(
        budget.product_adjacency_pass(&candidate),
        Err(RejectReason::ProductAdjacency)
    );
    assert_eq!(
        budget.admit(&candidate),
        Err(RejectReason::ProductAdjacency)
    );
}

#[test]
fn empty_creative_set_is_an_input_defect() {
    let buy = BuyBuilder::new(1, &campaign(1)).build();
    let bid = BidBuilder::new(&buy, &brk(5, 1, 1, at(20, 0, 0)))
        .no_creatives()
        .build();
    let budget = AuctionBudget::new(BudgetSettings::default());
    assert_eq!(
        budget.product_adjacency_pass(&bid),
        Err(RejectReason::NoCreative)
    );
}

#[test]
fn refcount_survives_until_last_holder_leaves() {
    let a = BuyBuilder::new(1, &campaign(1)).build();
    let c = BuyBuilder::new(2, &campaign(2)).build();
    let b = brk(5, 1, 1, at(20, 0, 0));
    let w1 = BidBuilder::new(&a, &b).no_creatives().creative(1, &["soda"]).build();
    let w2 = BidBuilder::new(&c, &b).no_creatives().creative(2, &["soda"]).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&w1, &w2]);
    let r1 = budget.commit_content(&w1);
    let r2 = budget.commit_content(&w2);
    assert_eq!(budget.placements(BreakId(5)).unwrap().get(&attr("soda")), 2);

    budget.unroll_content(r1).unwrap();
    assert_eq!(budget.placements(BreakId(5)).unwrap().get(&attr("soda")), 1);
    budget.unroll_content(r2).unwrap();
    assert!(budget.placements(BreakId(5)).is_none());
}

#[test]
fn second_short_spot_is_forced_onto_placed_creative() {
    let buy = BuyBuilder::new(1, &campaign(1)).allow_double().build();
    let b = brk(5, 1, 1, at(20, 0, 0));
    let first = BidBuilder::new(&buy, &b)
        .short_pair()
        .no_creatives()
        .creative(21, &["beer"])
        .cost(30)
        .build();
    let second = BidBuilder::new(&buy, &b)
        .short_pair()
        .no_creatives()
        .creative(22, &["beer"])
        .creative(23, &[])
        .cost(30)
        .build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&first, &second]);
    let _r = (budget.commit_budget(&first), budget.commit_content(&first));

    let selection = budget.admit(&second).unwrap();
    assert!(selection.forced);
    assert_eq!(selection.ids().collect::<Vec<_>>(), vec![CreativeId(21)]);

    let second = second.with_selection(selection);
    let _r2 = (budget.commit_budget(&second), budget.commit_content(&second));
    let ledger = budget.buy(BuyId(1)).unwrap();
    assert_eq!(
        ledger.creative_tallies().current_spending(&CreativeId(21)),
        units(60)
    );
    let slot = ledger.short_slot(BreakId(5)).unwrap();
    assert_eq!(slot.wins, 2);
    assert_eq!(slot.creative.as_ref().map(|(id, _)| *id), Some(CreativeId(21)));

    let third = BidBuilder::new(&buy, &b).short_pair().build();
    assert_eq!(budget.admit(&third), Err(RejectReason::BreakAdjacency));
}

#[test]
fn admit_runs_checks_in_order() {
    let buy = BuyBuilder::new(1, &campaign(1))
        .spending_total(50)
        .max_per_daypart(1)
        .build();
    let b1 = brk(5, 1, 1, at(20, 0, 0));
    let b2 = brk(6, 1, 2, at(20, 30, 0));
    let won = BidBuilder::new(&buy, &b1).cost(20).build();

    let mut budget = AuctionBudget::new(BudgetSettings::default());
    budget.init_budget([&won]);
    let _r = (budget.commit_budget(&won), budget.commit_content(&won));

    // Over budget and same break: budget is reported first.
    let greedy = BidBuilder::new(&buy, &b1).cost(31).build();
    assert_eq!(budget.admit(&greedy), Err(RejectReason::BuyBudgetExceeded));

    let same_break = BidBuilder::new(&buy, &b1).cost(1).build();
    assert_eq!(budget.admit(&same_break), Err(RejectReason::BreakAdjacency));

    let same_daypart = BidBuilder::new(&buy, &b2).cost(1).build();
    assert_eq!(budget.admit(&same_daypart), Err(RejectReason::DaypartAdjacency));

    let fine = BidBuilder::new(&buy, &b2).cost(1).daypart(2).build();
    assert!(budget.admit(&fine).is_ok());
}
