use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::entity::TokenSummary;
use crate::services::TokenSearch;
use crate::store::WatchlistStore;

/// A search result and whether it is already on the watchlist
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub summary: TokenSummary,
    pub tracked: bool,
}

#[async_trait]
pub trait SearchInteractor: Send + Sync {
    /// `None` when a newer search superseded this one
    async fn search(&self, term: &str) -> Result<Option<Vec<SearchHit>>>;
    async fn trending(&self) -> Result<Vec<SearchHit>>;
}

pub struct SearchInteractorImpl {
    search: Arc<TokenSearch>,
    store: Arc<WatchlistStore>,
}

impl SearchInteractorImpl {
    pub fn new(search: Arc<TokenSearch>, store: Arc<WatchlistStore>) -> Self {
        Self { search, store }
    }

    fn to_hits(&self, results: Vec<TokenSummary>) -> Vec<SearchHit> {
        results
            .into_iter()
            .map(|summary| SearchHit {
                tracked: self.store.contains(&summary.id),
                summary,
            })
            .collect()
    }
}

#[async_trait]
impl SearchInteractor for SearchInteractorImpl {
    async fn search(&self, term: &str) -> Result<Option<Vec<SearchHit>>> {
        let results = self.search.search(term).await?;
        Ok(results.map(|results| self.to_hits(results)))
    }

    async fn trending(&self) -> Result<Vec<SearchHit>> {
        let results = self.search.trending().await?;
        Ok(self.to_hits(results))
    }
}
