// Wire models of the CoinGecko API
use serde::Deserialize;

use crate::entity::TokenSummary;

// Error envelope, e.g. {"status":{"error_code":429,"error_message":"..."}}
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub status: Option<ApiErrorStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorStatus {
    #[serde(default)]
    pub error_code: Option<u32>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ApiErrorResponse {
    pub fn message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        let status = self.status.as_ref()?;
        match (&status.error_code, &status.error_message) {
            (Some(code), Some(message)) => Some(format!("{} (code {})", message, code)),
            (None, Some(message)) => Some(message.clone()),
            (Some(code), None) => Some(format!("error code {}", code)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CoinSearchItem {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub large: String,
}

impl From<CoinSearchItem> for TokenSummary {
    fn from(item: CoinSearchItem) -> Self {
        let thumbnail_uri = if item.thumb.is_empty() {
            item.large
        } else {
            item.thumb
        };
        Self {
            id: item.id,
            name: item.name,
            symbol: item.symbol,
            thumbnail_uri,
            market_cap_rank: item.market_cap_rank,
        }
    }
}

// GET /search?query=
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub coins: Vec<CoinSearchItem>,
}

// GET /search/trending
#[derive(Debug, Deserialize)]
pub struct TrendingResponse {
    #[serde(default)]
    pub coins: Vec<TrendingCoin>,
}

#[derive(Debug, Deserialize)]
pub struct TrendingCoin {
    pub item: CoinSearchItem,
}
