use async_trait::async_trait;
use std::collections::HashMap;

use crate::entity::{PortfolioResult, PriceQuote, TokenSummary};

/// Interface of the external price-data collaborator
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Current quotes for a batch of ids. Ids the provider does not know are
    /// simply absent from the map.
    async fn fetch_prices(&self, ids: &[String]) -> PortfolioResult<HashMap<String, PriceQuote>>;

    /// Free-text token search
    async fn search_tokens(&self, term: &str) -> PortfolioResult<Vec<TokenSummary>>;

    /// Currently trending tokens
    async fn fetch_trending(&self) -> PortfolioResult<Vec<TokenSummary>>;
}
