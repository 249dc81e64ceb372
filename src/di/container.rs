use std::sync::Arc;

use crate::config::AppConfig;
use crate::market::MarketDataProvider;
use crate::persistence::PersistenceAdapter;
use crate::services::{PriceSyncCoordinator, TokenSearch};
use crate::store::WatchlistStore;

/// ServiceContainer provides access to core application dependencies
pub struct ServiceContainer {
    config: AppConfig,

    // Portfolio state and the services feeding it
    store: Arc<WatchlistStore>,
    coordinator: Arc<PriceSyncCoordinator>,
    search: Arc<TokenSearch>,

    provider: Arc<dyn MarketDataProvider>,
    persistence: Arc<PersistenceAdapter>,
}

impl ServiceContainer {
    /// Wires the coordinator and search around an already restored store
    pub fn new(
        config: AppConfig,
        store: Arc<WatchlistStore>,
        provider: Arc<dyn MarketDataProvider>,
        persistence: Arc<PersistenceAdapter>,
    ) -> Self {
        let coordinator = Arc::new(PriceSyncCoordinator::new(store.clone(), provider.clone()));
        let search = Arc::new(TokenSearch::new(provider.clone()));

        Self {
            config,
            store,
            coordinator,
            search,
            provider,
            persistence,
        }
    }

    // Accessor methods

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<WatchlistStore> {
        self.store.clone()
    }

    pub fn coordinator(&self) -> Arc<PriceSyncCoordinator> {
        self.coordinator.clone()
    }

    pub fn search(&self) -> Arc<TokenSearch> {
        self.search.clone()
    }

    pub fn provider(&self) -> Arc<dyn MarketDataProvider> {
        self.provider.clone()
    }

    pub fn persistence(&self) -> Arc<PersistenceAdapter> {
        self.persistence.clone()
    }

    /// Whether a chat may use the bot; every chat is allowed without an owner
    pub fn is_authorized(&self, chat_id: i64) -> bool {
        self.config
            .owner_chat_id
            .map_or(true, |owner| owner == chat_id)
    }
}
