use chrono::{DateTime, Utc};
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::entity::{PriceQuote, TokenRecord};
use crate::store::TokenMap;
use crate::utils::{coerce_holdings, parse_holdings};

/// Snapshot of the watchlist: tracked tokens plus the derived portfolio value.
///
/// `total_value` has no setter; it is recomputed by every mutation that can
/// change a holdings or price term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchlistState {
    tokens: TokenMap,
    total_value: Decimal,
}

/// One slice of the distribution chart
#[derive(Debug, Clone, PartialEq)]
pub struct Allocation {
    pub id: String,
    pub symbol: String,
    pub value: Decimal,
    pub percentage: Decimal,
}

/// On-disk layout: `{ "tokens": { "<id>": record } }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedWatchlist {
    #[serde(default)]
    pub tokens: TokenMap,
}

impl WatchlistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds state from stored tokens. Blank ids are dropped, edit flags
    /// reset, holdings and prices are clamped, and the total is derived.
    pub fn from_tokens(stored: TokenMap) -> Self {
        let mut tokens = TokenMap::new();
        for mut record in stored.values().cloned() {
            if record.id.trim().is_empty() {
                warn!("Dropping stored token with empty id");
                continue;
            }
            record.is_editing_holdings = false;
            record.holdings = coerce_holdings(record.holdings);
            record.current_price = record.current_price.max(Decimal::ZERO);
            tokens.insert(record);
        }
        let mut state = Self {
            tokens,
            total_value: Decimal::ZERO,
        };
        state.recompute_total();
        state
    }

    pub fn to_persisted(&self) -> PersistedWatchlist {
        PersistedWatchlist {
            tokens: self.tokens.clone(),
        }
    }

    pub fn tokens(&self) -> &TokenMap {
        &self.tokens
    }

    pub fn total_value(&self) -> Decimal {
        self.total_value
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TokenRecord> {
        self.tokens.get(id)
    }

    pub fn token_ids(&self) -> Vec<String> {
        self.tokens.ids().cloned().collect()
    }

    /// All records in insertion order
    pub fn records(&self) -> Vec<&TokenRecord> {
        self.tokens.values().collect()
    }

    /// All records, highest value first; equal values keep insertion order
    pub fn records_by_value(&self) -> Vec<&TokenRecord> {
        let mut records = self.records();
        records.sort_by(|a, b| b.value().cmp(&a.value()));
        records
    }

    pub fn held_records(&self) -> Vec<&TokenRecord> {
        self.tokens
            .values()
            .filter(|record| record.holdings > Decimal::ZERO)
            .collect()
    }

    pub fn value_of(&self, record: &TokenRecord) -> Decimal {
        record.value()
    }

    /// Share of the total in percent; 0 for every record when the total is 0.
    pub fn percentage_of_total(&self, record: &TokenRecord) -> Decimal {
        if self.total_value.is_zero() {
            return Decimal::ZERO;
        }
        record
            .value()
            .checked_div(self.total_value)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .unwrap_or(Decimal::ZERO)
    }

    /// Series consumed by the distribution chart, largest position first
    pub fn allocations(&self) -> Vec<Allocation> {
        let mut allocations: Vec<Allocation> = self
            .held_records()
            .into_iter()
            .map(|record| Allocation {
                id: record.id.clone(),
                symbol: record.display_symbol(),
                value: record.value(),
                percentage: self.percentage_of_total(record),
            })
            .collect();
        allocations.sort_by(|a, b| b.value.cmp(&a.value));
        allocations
    }

    /// Most recent price update across all records
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.tokens.values().map(|record| record.last_updated).max()
    }

    fn recompute_total(&mut self) {
        self.total_value = self
            .tokens
            .values()
            .fold(Decimal::ZERO, |total, record| total.saturating_add(record.value()));
    }
}

/// Single owner of the watchlist state.
///
/// The state lives inside a watch channel: every operation mutates it through
/// `send_if_modified`, so operations are atomic with respect to each other and
/// subscribers are notified only when something actually changed.
pub struct WatchlistStore {
    state: watch::Sender<WatchlistState>,
}

impl Default for WatchlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchlistStore {
    pub fn new() -> Self {
        Self::with_state(WatchlistState::new())
    }

    pub fn with_state(state: WatchlistState) -> Self {
        let (state, _) = watch::channel(state);
        Self { state }
    }

    /// Read-only handle for renderers and the persistence observer
    pub fn subscribe(&self) -> watch::Receiver<WatchlistState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> WatchlistState {
        self.state.borrow().clone()
    }

    pub fn total_value(&self) -> Decimal {
        self.state.borrow().total_value()
    }

    pub fn token_ids(&self) -> Vec<String> {
        self.state.borrow().token_ids()
    }

    pub fn get(&self, id: &str) -> Option<TokenRecord> {
        self.state.borrow().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state.borrow().tokens.contains(id)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().is_empty()
    }

    /// Inserts the record, overwriting any record with the same id.
    ///
    /// Returns `false` without touching state when the id is blank.
    pub fn add_token(&self, mut record: TokenRecord) -> bool {
        if record.id.trim().is_empty() {
            warn!("Ignoring token with empty id");
            return false;
        }

        record.is_editing_holdings = false;
        record.holdings = coerce_holdings(record.holdings);
        if record.current_price < Decimal::ZERO {
            record.current_price = Decimal::ZERO;
        }

        self.state.send_modify(|state| {
            debug!("Adding token {} to watchlist", record.id);
            if state.tokens.insert(record).is_some() {
                debug!("Existing watchlist entry overwritten");
            }
            state.recompute_total();
        });
        true
    }

    pub fn remove_token(&self, id: &str) -> bool {
        self.state.send_if_modified(|state| {
            if state.tokens.remove(id).is_none() {
                return false;
            }
            debug!("Removed token {} from watchlist", id);
            state.recompute_total();
            true
        })
    }

    /// Sets holdings to `max(0, value)`; no-op for an untracked id.
    pub fn set_holdings(&self, id: &str, value: Decimal) -> bool {
        let holdings = coerce_holdings(value);
        self.state.send_if_modified(|state| {
            let Some(record) = state.tokens.get_mut(id) else {
                return false;
            };
            record.holdings = holdings;
            debug!("Holdings for {} set to {}", id, holdings);
            state.recompute_total();
            true
        })
    }

    /// Parses user text; anything non-numeric or negative becomes 0.
    pub fn set_holdings_from_input(&self, id: &str, input: &str) -> bool {
        self.set_holdings(id, parse_holdings(input))
    }

    pub fn set_editing_mode(&self, id: &str, editing: bool) -> bool {
        self.state.send_if_modified(|state| match state.tokens.get_mut(id) {
            Some(record) if record.is_editing_holdings != editing => {
                record.is_editing_holdings = editing;
                true
            }
            _ => false,
        })
    }

    /// Clears the edit flag on every record other than `id`.
    pub fn clear_editing_except(&self, id: &str) -> bool {
        self.state.send_if_modified(|state| {
            let mut changed = false;
            for record in state.tokens.values_mut() {
                if record.id != id && record.is_editing_holdings {
                    record.is_editing_holdings = false;
                    changed = true;
                }
            }
            changed
        })
    }

    pub fn apply_price_update(
        &self,
        id: &str,
        price: Decimal,
        change_24h: Decimal,
        sparkline: Option<Vec<f64>>,
    ) -> bool {
        self.state.send_if_modified(|state| {
            let Some(record) = state.tokens.get_mut(id) else {
                return false;
            };
            record.current_price = price.max(Decimal::ZERO);
            record.price_change_percentage_24h = change_24h;
            if let Some(sparkline) = sparkline {
                record.sparkline = sparkline;
            }
            record.last_updated = Utc::now();
            state.recompute_total();
            true
        })
    }

    pub fn apply_quote(&self, id: &str, quote: PriceQuote) -> bool {
        self.apply_price_update(id, quote.price, quote.change_24h_percent, quote.sparkline)
    }
}
