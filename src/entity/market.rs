use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest quote for a single asset as returned by the price-data provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub price: Decimal,
    pub change_24h_percent: Decimal,
    pub sparkline: Option<Vec<f64>>, // None leaves the stored history untouched
}

impl PriceQuote {
    pub fn new(price: Decimal, change_24h_percent: Decimal) -> Self {
        Self {
            price,
            change_24h_percent,
            sparkline: None,
        }
    }

    pub fn with_sparkline(mut self, sparkline: Vec<f64>) -> Self {
        self.sparkline = Some(sparkline);
        self
    }
}

/// Search or trending hit: enough to create a watchlist record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub thumbnail_uri: String,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}
