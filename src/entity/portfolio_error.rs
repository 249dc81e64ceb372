#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Market data API error: {0}")]
    MarketApi(String),

    #[error("Failed to parse market data: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Telegram API error: {0}")]
    TelegramApi(#[from] teloxide::RequestError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type PortfolioResult<T> = std::result::Result<T, PortfolioError>;
