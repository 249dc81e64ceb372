mod common;

use common::record;
use crypto_portfolio_bot::utils::holdings_from_f64;
use crypto_portfolio_bot::{WatchlistState, WatchlistStore};
use rust_decimal::Decimal;

fn expected_total(state: &WatchlistState) -> Decimal {
    state
        .records()
        .iter()
        .map(|record| record.holdings * record.current_price)
        .sum()
}

// Small deterministic generator so operation sequences are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

#[test]
fn total_matches_sum_after_every_operation() {
    let ids = ["bitcoin", "ethereum", "solana", "dogecoin"];

    for seed in 0..20 {
        let store = WatchlistStore::new();
        let mut rng = Lcg(seed);

        for _ in 0..200 {
            let id = ids[rng.below(ids.len() as u64) as usize];
            let amount = Decimal::new(rng.below(2_000_000) as i64 - 500_000, 3);
            match rng.below(6) {
                0 => {
                    store.add_token(record(id));
                }
                1 => {
                    store.remove_token(id);
                }
                2 => {
                    store.set_holdings(id, amount);
                }
                3 => {
                    store.apply_price_update(id, amount, Decimal::new(15, 1), None);
                }
                4 => {
                    store.set_editing_mode(id, rng.below(2) == 0);
                }
                _ => {
                    store.set_holdings_from_input(id, &amount.to_string());
                }
            }

            let state = store.snapshot();
            assert_eq!(state.total_value(), expected_total(&state), "seed {}", seed);
        }
    }
}

#[test]
fn holdings_are_never_negative() {
    let store = WatchlistStore::new();
    store.add_token(record("bitcoin"));

    store.set_holdings("bitcoin", Decimal::from(-5));
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::ZERO);

    store.set_holdings("bitcoin", holdings_from_f64(f64::NAN));
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::ZERO);

    store.set_holdings("bitcoin", holdings_from_f64(f64::NEG_INFINITY));
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::ZERO);

    for input in ["-3", "abc", "", "NaN", "1.2.3", "--1", "-0.5e2"] {
        store.set_holdings("bitcoin", Decimal::ONE);
        store.set_holdings_from_input("bitcoin", input);
        assert_eq!(
            store.get("bitcoin").unwrap().holdings,
            Decimal::ZERO,
            "input {:?}",
            input
        );
    }

    store.set_holdings_from_input("bitcoin", "1,250.5");
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::new(12505, 1));
}

#[test]
fn operations_on_missing_id_leave_state_unchanged() {
    let store = WatchlistStore::new();
    let mut btc = record("bitcoin");
    btc.holdings = Decimal::from(3);
    store.add_token(btc);
    store.apply_price_update("bitcoin", Decimal::from(10), Decimal::ZERO, Some(vec![1.0, 2.0]));

    let before = store.snapshot();
    let mut updates = store.subscribe();

    assert!(!store.set_holdings("ghost", Decimal::from(7)));
    assert!(!store.apply_price_update("ghost", Decimal::from(7), Decimal::ONE, None));
    assert!(!store.remove_token("ghost"));
    assert!(!store.set_editing_mode("ghost", true));

    assert_eq!(store.snapshot(), before);
    assert!(!updates.has_changed().unwrap());
}

#[test]
fn add_set_holdings_then_price() {
    let store = WatchlistStore::new();

    store.add_token(record("btc"));
    assert_eq!(store.total_value(), Decimal::ZERO);

    store.set_holdings("btc", Decimal::from(2));
    assert_eq!(store.total_value(), Decimal::ZERO);

    store.apply_price_update("btc", Decimal::from(50000), Decimal::new(12, 1), None);
    assert_eq!(store.total_value(), Decimal::from(100000));

    let btc = store.get("btc").unwrap();
    assert_eq!(btc.current_price, Decimal::from(50000));
    assert_eq!(btc.price_change_percentage_24h, Decimal::new(12, 1));
}

#[test]
fn removing_the_only_token_empties_the_watchlist() {
    let store = WatchlistStore::new();
    store.add_token(record("btc"));
    store.set_holdings("btc", Decimal::from(2));
    store.apply_price_update("btc", Decimal::from(50000), Decimal::new(12, 1), None);

    assert!(store.remove_token("btc"));

    assert!(store.is_empty());
    assert_eq!(store.total_value(), Decimal::ZERO);
}

#[test]
fn negative_holdings_become_zero() {
    let store = WatchlistStore::new();
    store.add_token(record("btc"));

    store.set_holdings("btc", Decimal::from(-5));

    assert_eq!(store.get("btc").unwrap().holdings, Decimal::ZERO);
}

#[test]
fn percentage_is_zero_when_total_is_zero() {
    let store = WatchlistStore::new();
    store.add_token(record("bitcoin"));
    store.add_token(record("ethereum"));
    store.apply_price_update("bitcoin", Decimal::from(100), Decimal::ZERO, None);

    let state = store.snapshot();
    assert_eq!(state.total_value(), Decimal::ZERO);
    for record in state.records() {
        assert_eq!(state.percentage_of_total(record), Decimal::ZERO);
    }
}

#[test]
fn percentages_add_up_to_one_hundred() {
    let store = WatchlistStore::new();
    for (id, holdings, price) in [("bitcoin", 1, 300), ("ethereum", 2, 50), ("solana", 0, 20)] {
        store.add_token(record(id));
        store.set_holdings(id, Decimal::from(holdings));
        store.apply_price_update(id, Decimal::from(price), Decimal::ZERO, None);
    }

    let state = store.snapshot();
    let bitcoin = state.get("bitcoin").unwrap();
    assert_eq!(state.percentage_of_total(bitcoin), Decimal::from(75));

    let allocations = state.allocations();
    assert_eq!(allocations.len(), 2);
    assert_eq!(allocations[0].id, "bitcoin");
    let sum: Decimal = allocations.iter().map(|a| a.percentage).sum();
    assert_eq!(sum, Decimal::ONE_HUNDRED);
}

#[test]
fn missing_sparkline_keeps_the_previous_one() {
    let store = WatchlistStore::new();
    store.add_token(record("bitcoin"));
    store.apply_price_update("bitcoin", Decimal::ONE, Decimal::ZERO, Some(vec![1.0, 2.0, 3.0]));

    store.apply_price_update("bitcoin", Decimal::TWO, Decimal::ZERO, None);

    let bitcoin = store.get("bitcoin").unwrap();
    assert_eq!(bitcoin.current_price, Decimal::TWO);
    assert_eq!(bitcoin.sparkline, vec![1.0, 2.0, 3.0]);
}

#[test]
fn re_adding_overwrites_in_place() {
    let store = WatchlistStore::new();
    store.add_token(record("bitcoin"));
    store.add_token(record("ethereum"));
    store.set_holdings("bitcoin", Decimal::from(4));

    store.add_token(record("bitcoin"));

    assert_eq!(store.token_ids(), vec!["bitcoin", "ethereum"]);
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::ZERO);
}

#[test]
fn blank_id_is_rejected() {
    let store = WatchlistStore::new();

    assert!(!store.add_token(record("   ")));
    assert!(store.is_empty());
}

#[test]
fn editing_flags_are_independent_in_the_store() {
    let store = WatchlistStore::new();
    store.add_token(record("bitcoin"));
    store.add_token(record("ethereum"));

    store.set_editing_mode("bitcoin", true);
    store.set_editing_mode("ethereum", true);
    assert!(store.get("bitcoin").unwrap().is_editing_holdings);
    assert!(store.get("ethereum").unwrap().is_editing_holdings);

    store.clear_editing_except("ethereum");
    assert!(!store.get("bitcoin").unwrap().is_editing_holdings);
    assert!(store.get("ethereum").unwrap().is_editing_holdings);
}

#[test]
fn records_by_value_sorts_descending() {
    let store = WatchlistStore::new();
    for (id, holdings) in [("a-token", 1), ("b-token", 5), ("c-token", 3)] {
        store.add_token(record(id));
        store.set_holdings(id, Decimal::from(holdings));
        store.apply_price_update(id, Decimal::TEN, Decimal::ZERO, None);
    }

    let state = store.snapshot();
    let ids: Vec<&str> = state
        .records_by_value()
        .iter()
        .map(|record| record.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b-token", "c-token", "a-token"]);
}
