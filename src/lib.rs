pub mod commands;
pub mod config;
pub mod di;
pub mod entity;
pub mod interactor;
pub mod market;
pub mod persistence;
pub mod presenter;
pub mod router;
pub mod services;
pub mod store;
pub mod utils;
pub mod view;

use std::sync::Arc;
use teloxide::{dispatching::dialogue::InMemStorage, Bot};

// Re-export commonly used items
pub use crate::config::AppConfig;
pub use di::ServiceContainer;
pub use entity::*;
pub use market::{CoinGeckoClient, MarketConfig, MarketDataProvider};
pub use persistence::{
    FileStorage, KeyValueStorage, MemoryStorage, PersistenceAdapter, PostgresStorage,
};
pub use router::{Router, TelegramRouter};
pub use services::{PriceSyncCoordinator, SyncOutcome, SyncStatus, TokenSearch};
pub use store::{Allocation, TokenMap, WatchlistState, WatchlistStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Builds the Telegram front end around an assembled service container
pub fn create_application(
    bot: Bot,
    services: Arc<ServiceContainer>,
) -> (
    TelegramRouter,
    Bot,
    Arc<ServiceContainer>,
    Arc<InMemStorage<State>>,
) {
    let router = TelegramRouter::new(services.clone());
    let storage = InMemStorage::<State>::new();
    (router, bot, services, storage)
}
