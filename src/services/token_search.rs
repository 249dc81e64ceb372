use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::select;
use tokio::sync::oneshot;

use crate::entity::{PortfolioResult, TokenSummary};
use crate::market::MarketDataProvider;

/// Shortest term that is sent to the provider
pub const MIN_SEARCH_TERM_LEN: usize = 2;

/// Token search with at most one outstanding request.
///
/// Starting a search cancels the one before it; the superseded call resolves
/// to `Ok(None)`. Every summary returned is remembered so an id picked from
/// the results can later be turned into a watchlist record.
pub struct TokenSearch {
    provider: Arc<dyn MarketDataProvider>,
    cancel_current: Mutex<Option<oneshot::Sender<()>>>,
    known: Mutex<HashMap<String, TokenSummary>>,
}

impl TokenSearch {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            cancel_current: Mutex::new(None),
            known: Mutex::new(HashMap::new()),
        }
    }

    /// Lowercased, trimmed form of a user-entered term
    pub fn normalize_term(term: &str) -> String {
        term.trim().to_lowercase()
    }

    pub async fn search(&self, term: &str) -> PortfolioResult<Option<Vec<TokenSummary>>> {
        let term = Self::normalize_term(term);
        let mut cancel_rx = self.begin_request();

        if term.chars().count() < MIN_SEARCH_TERM_LEN {
            debug!("Search term {:?} too short, not querying", term);
            return Ok(Some(Vec::new()));
        }

        select! {
            result = self.provider.search_tokens(&term) => {
                let results = result?;
                info!("Search {:?} returned {} results", term, results.len());
                self.remember(&results);
                Ok(Some(results))
            }
            _ = &mut cancel_rx => {
                debug!("Search {:?} superseded by a newer one", term);
                Ok(None)
            }
        }
    }

    pub async fn trending(&self) -> PortfolioResult<Vec<TokenSummary>> {
        let results = self.provider.fetch_trending().await?;
        self.remember(&results);
        Ok(results)
    }

    /// Summary previously returned by `search` or `trending`
    pub fn lookup(&self, id: &str) -> Option<TokenSummary> {
        self.known
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    // Installs a fresh cancellation token; dropping the old sender cancels
    // whichever search still waits on it.
    fn begin_request(&self) -> oneshot::Receiver<()> {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let previous = self
            .cancel_current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel_tx);
        if let Some(previous) = previous {
            let _ = previous.send(());
        }
        cancel_rx
    }

    fn remember(&self, results: &[TokenSummary]) {
        let mut known = self.known.lock().unwrap_or_else(PoisonError::into_inner);
        for summary in results {
            known.insert(summary.id.clone(), summary.clone());
        }
    }
}
