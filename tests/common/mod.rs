#![allow(dead_code)]

use async_trait::async_trait;
use crypto_portfolio_bot::{
    MarketDataProvider, PortfolioError, PortfolioResult, PriceQuote, TokenRecord, TokenSummary,
};
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub type PriceResponse = PortfolioResult<HashMap<String, PriceQuote>>;

pub fn record(id: &str) -> TokenRecord {
    TokenRecord::new(id, id.to_uppercase(), &id[..id.len().min(3)], "")
}

pub fn quote(price: i64) -> PriceQuote {
    PriceQuote::new(Decimal::from(price), Decimal::ZERO)
}

pub fn summary(id: &str) -> TokenSummary {
    TokenSummary {
        id: id.to_string(),
        name: id.to_uppercase(),
        symbol: id[..id.len().min(3)].to_string(),
        thumbnail_uri: format!("https://img.example/{}.png", id),
        market_cap_rank: None,
    }
}

/// Answers every price request from a fixed table, or fails on demand
#[derive(Default)]
pub struct StaticProvider {
    quotes: Mutex<HashMap<String, PriceQuote>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<String>>>,
}

impl StaticProvider {
    pub fn with_quotes(quotes: &[(&str, PriceQuote)]) -> Self {
        let provider = Self::default();
        for (id, quote) in quotes {
            provider.set_quote(id, quote.clone());
        }
        provider
    }

    pub fn set_quote(&self, id: &str, quote: PriceQuote) {
        self.quotes.lock().unwrap().insert(id.to_string(), quote);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn fetch_prices(&self, ids: &[String]) -> PriceResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(ids.to_vec());

        if self.failing.load(Ordering::SeqCst) {
            return Err(PortfolioError::MarketApi("503 Service Unavailable".to_string()));
        }

        let quotes = self.quotes.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| quotes.get(id).map(|quote| (id.clone(), quote.clone())))
            .collect())
    }

    async fn search_tokens(&self, term: &str) -> PortfolioResult<Vec<TokenSummary>> {
        Ok(vec![summary(term)])
    }

    async fn fetch_trending(&self) -> PortfolioResult<Vec<TokenSummary>> {
        Ok(vec![summary("bitcoin"), summary("solana")])
    }
}

/// Each price request waits until the test hands it a response
#[derive(Default)]
pub struct GatedProvider {
    pending: Mutex<VecDeque<oneshot::Receiver<PriceResponse>>>,
    calls: AtomicUsize,
}

impl GatedProvider {
    /// Queues a gate for the next request and returns its release handle
    pub fn gate(&self) -> oneshot::Sender<PriceResponse> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn wait_for_calls(&self, calls: usize) {
        while self.calls() < calls {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl MarketDataProvider for GatedProvider {
    async fn fetch_prices(&self, _ids: &[String]) -> PriceResponse {
        let gate = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("no gate queued for this request");
        self.calls.fetch_add(1, Ordering::SeqCst);
        gate.await
            .unwrap_or_else(|_| Err(PortfolioError::MarketApi("gate dropped".to_string())))
    }

    async fn search_tokens(&self, _term: &str) -> PortfolioResult<Vec<TokenSummary>> {
        Ok(Vec::new())
    }

    async fn fetch_trending(&self) -> PortfolioResult<Vec<TokenSummary>> {
        Ok(Vec::new())
    }
}

/// Search that hangs for `slow_term` until released, answers others at once
pub struct SlowSearchProvider {
    pub slow_term: String,
    release: tokio::sync::Notify,
    searches: AtomicUsize,
}

impl SlowSearchProvider {
    pub fn new(slow_term: &str) -> Self {
        Self {
            slow_term: slow_term.to_string(),
            release: tokio::sync::Notify::new(),
            searches: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.release.notify_waiters();
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for SlowSearchProvider {
    async fn fetch_prices(&self, _ids: &[String]) -> PriceResponse {
        Ok(HashMap::new())
    }

    async fn search_tokens(&self, term: &str) -> PortfolioResult<Vec<TokenSummary>> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if term == self.slow_term {
            self.release.notified().await;
        }
        Ok(vec![summary(term)])
    }

    async fn fetch_trending(&self) -> PortfolioResult<Vec<TokenSummary>> {
        Ok(Vec::new())
    }
}
