pub mod coingecko;
pub mod config;
pub mod models;
pub mod price_provider;

pub use coingecko::CoinGeckoClient;
pub use config::MarketConfig;
pub use price_provider::MarketDataProvider;
