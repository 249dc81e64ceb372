use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::select;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::market::MarketDataProvider;
use crate::store::WatchlistStore;

/// UI-facing status of the coordinator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Nothing tracked, the provider was not called
    Skipped,
    /// Response applied; `updated` records received a new price
    Applied { updated: usize },
    /// A later request had already been applied; this response was dropped
    Stale { sequence: u64 },
    /// Transport or parse failure, store left untouched
    Failed(String),
    /// Another sync was in flight; it will run once more with fresh ids
    Coalesced,
}

#[derive(Default)]
struct SyncGate {
    in_flight: bool,
    pending: bool,
}

/// Refreshes prices of every tracked token and feeds them into the store.
///
/// Each request is tagged with a monotonic sequence number and a response is
/// applied only if no later request has been applied before it.
pub struct PriceSyncCoordinator {
    store: Arc<WatchlistStore>,
    provider: Arc<dyn MarketDataProvider>,
    next_sequence: AtomicU64,
    last_applied: Mutex<u64>,
    requests_in_flight: Mutex<usize>,
    gate: Mutex<SyncGate>,
    status: watch::Sender<SyncStatus>,
    stop_tx: Mutex<Option<mpsc::Sender<()>>>,
}

impl PriceSyncCoordinator {
    pub fn new(store: Arc<WatchlistStore>, provider: Arc<dyn MarketDataProvider>) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            store,
            provider,
            next_sequence: AtomicU64::new(0),
            last_applied: Mutex::new(0),
            requests_in_flight: Mutex::new(0),
            gate: Mutex::new(SyncGate::default()),
            status,
            stop_tx: Mutex::new(None),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn is_syncing(&self) -> bool {
        self.status.borrow().is_syncing
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Fetches quotes for `ids` in one batch and applies them to the store.
    pub async fn sync(&self, ids: &[String]) -> SyncOutcome {
        let mut seen = HashSet::new();
        let ids: Vec<String> = ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .cloned()
            .collect();

        if ids.is_empty() {
            debug!("No tracked tokens, skipping price sync");
            return SyncOutcome::Skipped;
        }

        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Price sync #{} for {} tokens", sequence, ids.len());

        self.enter_request();
        let result = self.provider.fetch_prices(&ids).await;
        let outcome = match result {
            Ok(quotes) => {
                let mut last_applied = self
                    .last_applied
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                if sequence < *last_applied {
                    debug!(
                        "Discarding stale price response #{} (already applied #{})",
                        sequence, *last_applied
                    );
                    SyncOutcome::Stale { sequence }
                } else {
                    *last_applied = sequence;
                    let mut updated = 0;
                    for (id, quote) in quotes {
                        // Ids missing from the response keep their last known price
                        if self.store.apply_quote(&id, quote) {
                            updated += 1;
                        }
                    }
                    info!("Price sync #{} updated {} tokens", sequence, updated);
                    SyncOutcome::Applied { updated }
                }
            }
            Err(e) => {
                warn!("Price sync #{} failed, keeping last known prices: {}", sequence, e);
                SyncOutcome::Failed(e.to_string())
            }
        };
        self.leave_request(&outcome);

        outcome
    }

    /// Single-flight refresh of every tracked token.
    ///
    /// A call made while another refresh is running is coalesced into one
    /// extra pass of the running refresh.
    pub async fn refresh(&self) -> SyncOutcome {
        {
            let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            if gate.in_flight {
                gate.pending = true;
                debug!("Price sync already running, coalescing request");
                return SyncOutcome::Coalesced;
            }
            gate.in_flight = true;
        }

        loop {
            let outcome = self.sync(&self.store.token_ids()).await;

            let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            if gate.pending {
                gate.pending = false;
                continue;
            }
            gate.in_flight = false;
            return outcome;
        }
    }

    /// Starts refreshing on a fixed period. A no-op if polling already runs.
    pub fn start_polling(self: &Arc<Self>, period: Duration) {
        let mut stop_slot = self.stop_tx.lock().unwrap_or_else(PoisonError::into_inner);
        if stop_slot.is_some() {
            warn!("Price polling is already running");
            return;
        }

        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
        *stop_slot = Some(stop_tx);

        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last_run = Instant::now();

            loop {
                select! {
                    _ = ticker.tick() => {
                        if coordinator.store.is_empty() {
                            continue;
                        }
                        debug!("Polling prices (last run: {:.2?} ago)", last_run.elapsed());
                        coordinator.refresh().await;
                        last_run = Instant::now();
                    }
                    _ = stop_rx.recv() => {
                        info!("Stopping price polling");
                        break;
                    }
                }
            }
        });

        info!("Price polling started, every {:?}", period);
    }

    pub async fn stop_polling(&self) {
        let stop_tx = self
            .stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = stop_tx {
            let _ = tx.send(()).await;
            info!("Price polling stop signal sent");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.stop_tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn enter_request(&self) {
        let mut in_flight = self
            .requests_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *in_flight += 1;
        self.status.send_if_modified(|status| {
            let changed = !status.is_syncing;
            status.is_syncing = true;
            changed
        });
    }

    fn leave_request(&self, outcome: &SyncOutcome) {
        let mut in_flight = self
            .requests_in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *in_flight = in_flight.saturating_sub(1);
        let still_syncing = *in_flight > 0;

        self.status.send_modify(|status| {
            status.is_syncing = still_syncing;
            match outcome {
                SyncOutcome::Applied { .. } => {
                    status.last_error = None;
                    status.last_success = Some(Utc::now());
                }
                SyncOutcome::Failed(message) => {
                    status.last_error = Some(message.clone());
                }
                _ => {}
            }
        });
    }
}
