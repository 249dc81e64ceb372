use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::entity::PortfolioResult;
use crate::persistence::KeyValueStorage;
use crate::store::{PersistedWatchlist, WatchlistState};

pub const DEFAULT_STORAGE_KEY: &str = "portfolio:watchlist";

/// Saves and restores the watchlist across restarts
pub struct PersistenceAdapter {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
}

impl PersistenceAdapter {
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Writes the tokens (without edit flags or the derived total)
    pub async fn save(&self, state: &WatchlistState) -> PortfolioResult<()> {
        let bytes = serde_json::to_vec(&state.to_persisted())?;
        self.storage.set(&self.key, &bytes).await?;
        debug!("Saved watchlist with {} tokens", state.len());
        Ok(())
    }

    /// Last saved state, or the empty state when nothing usable is stored.
    pub async fn load(&self) -> WatchlistState {
        let bytes = match self.storage.get(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("No saved watchlist found, starting empty");
                return WatchlistState::new();
            }
            Err(e) => {
                warn!("Failed to read saved watchlist, starting empty: {}", e);
                return WatchlistState::new();
            }
        };

        match serde_json::from_slice::<PersistedWatchlist>(&bytes) {
            Ok(persisted) => {
                let state = WatchlistState::from_tokens(persisted.tokens);
                info!("Restored watchlist with {} tokens", state.len());
                state
            }
            Err(e) => {
                warn!("Saved watchlist is corrupt, starting empty: {}", e);
                WatchlistState::new()
            }
        }
    }

    /// Saves after every change published on `updates` until the store is dropped.
    pub fn spawn_autosave(
        self: Arc<Self>,
        mut updates: watch::Receiver<WatchlistState>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let state = updates.borrow_and_update().clone();
                if let Err(e) = self.save(&state).await {
                    error!("Failed to save watchlist: {}", e);
                }
            }
            debug!("Watchlist autosave stopped");
        })
    }
}
