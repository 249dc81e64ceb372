use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

use crate::entity::PortfolioResult;
use crate::market::MarketConfig;
use crate::persistence::DEFAULT_STORAGE_KEY;

/// Application configuration, read from environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Telegram bot token
    pub telegram_bot_token: String,

    /// PostgreSQL URL; file storage is used when absent
    #[serde(default)]
    pub database_url: Option<String>,

    /// Directory for file storage
    pub data_dir: String,

    /// Namespace key of the persisted watchlist
    pub storage_key: String,

    pub coingecko_api_url: String,

    #[serde(default)]
    pub coingecko_api_key: Option<String>,

    /// Reference currency for prices
    pub vs_currency: String,

    pub poll_interval_secs: u64,

    pub request_timeout_secs: u64,

    /// Only this chat may use the bot; also receives sync failure notices
    #[serde(default)]
    pub owner_chat_id: Option<i64>,
}

impl AppConfig {
    /// Loads configuration from the process environment
    pub fn from_env() -> PortfolioResult<Self> {
        Self::from_environment(Environment::default().try_parsing(true))
    }

    pub fn from_environment(environment: Environment) -> PortfolioResult<Self> {
        let defaults = MarketConfig::default();

        let config = Config::builder()
            .set_default("data_dir", "./data")?
            .set_default("storage_key", DEFAULT_STORAGE_KEY)?
            .set_default("coingecko_api_url", defaults.api_url)?
            .set_default("vs_currency", defaults.vs_currency)?
            .set_default("poll_interval_secs", 60_i64)?
            .set_default("request_timeout_secs", defaults.request_timeout.as_secs() as i64)?
            .add_source(environment)
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn market_config(&self) -> MarketConfig {
        MarketConfig {
            api_url: self.coingecko_api_url.clone(),
            api_key: self.coingecko_api_key.clone().filter(|key| !key.is_empty()),
            vs_currency: self.vs_currency.to_lowercase(),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}
