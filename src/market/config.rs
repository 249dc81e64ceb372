use std::time::Duration;

/// Market data API configuration
#[derive(Debug, Clone)]
pub struct MarketConfig {
    /// Base URL of the CoinGecko v3 API
    pub api_url: String,

    /// Optional demo API key, sent as `x-cg-demo-api-key`
    pub api_key: Option<String>,

    /// Reference currency for prices (e.g. "usd")
    pub vs_currency: String,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: None,
            vs_currency: "usd".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}
