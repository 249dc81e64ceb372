use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A tracked asset together with the user's holdings and the latest market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub id: String,     // Stable provider id (e.g. "bitcoin")
    pub name: String,   // Display name
    pub symbol: String, // Ticker symbol
    pub image: String,  // Icon URI
    #[serde(default)]
    pub holdings: Decimal,
    #[serde(default)]
    pub current_price: Decimal,
    #[serde(default)]
    pub price_change_percentage_24h: Decimal,
    #[serde(default)]
    pub sparkline: Vec<f64>,
    pub last_updated: DateTime<Utc>,
    // Transient UI flag, never persisted
    #[serde(skip)]
    pub is_editing_holdings: bool,
}

impl TokenRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        symbol: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            symbol: symbol.into(),
            image: image.into(),
            holdings: Decimal::ZERO,
            current_price: Decimal::ZERO,
            price_change_percentage_24h: Decimal::ZERO,
            sparkline: Vec::new(),
            last_updated: Utc::now(),
            is_editing_holdings: false,
        }
    }

    /// Market value of the position: `holdings × currentPrice`.
    pub fn value(&self) -> Decimal {
        self.holdings.saturating_mul(self.current_price)
    }

    pub fn display_symbol(&self) -> String {
        self.symbol.to_uppercase()
    }
}
