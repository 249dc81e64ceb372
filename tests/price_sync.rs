mod common;

use common::{quote, record, GatedProvider, StaticProvider};
use crypto_portfolio_bot::{
    PortfolioError, PriceSyncCoordinator, SyncOutcome, WatchlistStore,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn store_with(ids: &[&str]) -> Arc<WatchlistStore> {
    let store = Arc::new(WatchlistStore::new());
    for id in ids {
        store.add_token(record(id));
        store.set_holdings(id, Decimal::ONE);
    }
    store
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[tokio::test]
async fn applies_quotes_in_one_batch() {
    let store = store_with(&["bitcoin", "ethereum"]);
    let provider = Arc::new(StaticProvider::with_quotes(&[
        ("bitcoin", quote(50000).with_sparkline(vec![1.0, 2.0])),
        ("ethereum", quote(3000)),
    ]));
    let coordinator = PriceSyncCoordinator::new(store.clone(), provider.clone());

    let outcome = coordinator
        .sync(&ids(&["bitcoin", "ethereum", "bitcoin"]))
        .await;

    assert_eq!(outcome, SyncOutcome::Applied { updated: 2 });
    assert_eq!(provider.calls(), 1);
    assert_eq!(provider.requested(), vec![ids(&["bitcoin", "ethereum"])]);
    assert_eq!(store.total_value(), Decimal::from(53000));
    assert_eq!(store.get("bitcoin").unwrap().sparkline, vec![1.0, 2.0]);
    assert!(coordinator.status().last_success.is_some());
}

#[tokio::test]
async fn empty_id_set_does_not_call_the_provider() {
    let store = store_with(&[]);
    let provider = Arc::new(StaticProvider::default());
    let coordinator = PriceSyncCoordinator::new(store, provider.clone());

    assert_eq!(coordinator.sync(&[]).await, SyncOutcome::Skipped);
    assert_eq!(coordinator.refresh().await, SyncOutcome::Skipped);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn ids_missing_from_the_response_keep_their_price() {
    let store = store_with(&["bitcoin", "obscure-coin"]);
    store.apply_price_update("obscure-coin", Decimal::from(7), Decimal::ONE, None);
    let provider = Arc::new(StaticProvider::with_quotes(&[("bitcoin", quote(100))]));
    let coordinator = PriceSyncCoordinator::new(store.clone(), provider);

    let outcome = coordinator.refresh().await;

    assert_eq!(outcome, SyncOutcome::Applied { updated: 1 });
    let obscure = store.get("obscure-coin").unwrap();
    assert_eq!(obscure.current_price, Decimal::from(7));
    assert_eq!(obscure.price_change_percentage_24h, Decimal::ONE);
    assert_eq!(store.total_value(), Decimal::from(107));
}

#[tokio::test]
async fn failure_keeps_prices_and_reports_status() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(StaticProvider::with_quotes(&[("bitcoin", quote(100))]));
    let coordinator = PriceSyncCoordinator::new(store.clone(), provider.clone());
    coordinator.refresh().await;
    let before = store.snapshot();

    provider.set_failing(true);
    let outcome = coordinator.refresh().await;

    assert!(matches!(outcome, SyncOutcome::Failed(ref message) if message.contains("503")));
    assert_eq!(store.snapshot(), before);
    let status = coordinator.status();
    assert!(!status.is_syncing);
    assert!(status.last_error.is_some());

    provider.set_failing(false);
    coordinator.refresh().await;
    assert_eq!(coordinator.status().last_error, None);
}

#[tokio::test]
async fn earlier_response_never_overwrites_a_later_one() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(GatedProvider::default());
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));

    let gate_a = provider.gate();
    let gate_b = provider.gate();

    let request_a = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.sync(&ids(&["bitcoin"])).await }
    });
    provider.wait_for_calls(1).await;

    let request_b = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.sync(&ids(&["bitcoin"])).await }
    });
    provider.wait_for_calls(2).await;
    assert!(coordinator.is_syncing());

    // B resolves first
    gate_b
        .send(Ok(HashMap::from([("bitcoin".to_string(), quote(200))])))
        .unwrap();
    assert_eq!(request_b.await.unwrap(), SyncOutcome::Applied { updated: 1 });
    assert!(coordinator.is_syncing());

    gate_a
        .send(Ok(HashMap::from([("bitcoin".to_string(), quote(100))])))
        .unwrap();
    assert_eq!(request_a.await.unwrap(), SyncOutcome::Stale { sequence: 1 });

    assert_eq!(store.get("bitcoin").unwrap().current_price, Decimal::from(200));
    assert!(!coordinator.is_syncing());
}

#[tokio::test]
async fn stale_failure_after_success_keeps_the_newer_prices() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(GatedProvider::default());
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));

    let gate_a = provider.gate();
    let gate_b = provider.gate();
    let request_a = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.sync(&ids(&["bitcoin"])).await }
    });
    provider.wait_for_calls(1).await;
    let request_b = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.sync(&ids(&["bitcoin"])).await }
    });
    provider.wait_for_calls(2).await;

    gate_b
        .send(Ok(HashMap::from([("bitcoin".to_string(), quote(300))])))
        .unwrap();
    request_b.await.unwrap();
    gate_a
        .send(Err(PortfolioError::MarketApi("timeout".to_string())))
        .unwrap();
    assert!(matches!(request_a.await.unwrap(), SyncOutcome::Failed(_)));

    assert_eq!(store.get("bitcoin").unwrap().current_price, Decimal::from(300));
}

#[tokio::test]
async fn refresh_during_flight_is_coalesced() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(GatedProvider::default());
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));

    let first_gate = provider.gate();
    let second_gate = provider.gate();

    let running = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.refresh().await }
    });
    provider.wait_for_calls(1).await;

    // Tracked set changes while the first request is out
    store.add_token(record("ethereum"));
    assert_eq!(coordinator.refresh().await, SyncOutcome::Coalesced);

    first_gate
        .send(Ok(HashMap::from([("bitcoin".to_string(), quote(10))])))
        .unwrap();
    provider.wait_for_calls(2).await;
    second_gate
        .send(Ok(HashMap::from([
            ("bitcoin".to_string(), quote(11)),
            ("ethereum".to_string(), quote(5)),
        ])))
        .unwrap();

    assert_eq!(running.await.unwrap(), SyncOutcome::Applied { updated: 2 });
    assert_eq!(provider.calls(), 2);
    assert_eq!(store.get("ethereum").unwrap().current_price, Decimal::from(5));
}

#[tokio::test]
async fn user_mutations_apply_while_a_sync_is_in_flight() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(GatedProvider::default());
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));
    let gate = provider.gate();

    let running = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.refresh().await }
    });
    provider.wait_for_calls(1).await;

    store.set_holdings("bitcoin", Decimal::from(3));
    assert_eq!(store.get("bitcoin").unwrap().holdings, Decimal::from(3));

    gate.send(Ok(HashMap::from([("bitcoin".to_string(), quote(10))])))
        .unwrap();
    running.await.unwrap();

    assert_eq!(store.total_value(), Decimal::from(30));
}

#[tokio::test(start_paused = true)]
async fn polling_runs_on_the_interval_until_stopped() {
    let store = store_with(&["bitcoin"]);
    let provider = Arc::new(StaticProvider::with_quotes(&[("bitcoin", quote(1))]));
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));

    coordinator.start_polling(Duration::from_secs(60));
    assert!(coordinator.is_polling());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(provider.calls(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(provider.calls(), 2);

    coordinator.stop_polling().await;
    assert!(!coordinator.is_polling());
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn polling_skips_an_empty_watchlist() {
    let store = store_with(&[]);
    let provider = Arc::new(StaticProvider::default());
    let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));

    coordinator.start_polling(Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(provider.calls(), 0);

    store.add_token(record("bitcoin"));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(provider.calls(), 1);

    coordinator.stop_polling().await;
}
