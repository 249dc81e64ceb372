use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

use crate::entity::TokenRecord;
use crate::services::{PriceSyncCoordinator, SyncOutcome, SyncStatus, TokenSearch};
use crate::store::{WatchlistState, WatchlistStore};

#[async_trait]
pub trait WatchlistInteractor: Send + Sync {
    async fn get_watchlist(&self) -> Result<WatchlistState>;
    async fn get_token(&self, token_id: &str) -> Result<Option<TokenRecord>>;
    async fn add_token(&self, token_id: &str) -> Result<TokenRecord>;
    async fn remove_token(&self, token_id: &str) -> Result<Option<TokenRecord>>;
    async fn begin_holdings_edit(&self, token_id: &str) -> Result<TokenRecord>;
    async fn save_holdings(&self, token_id: &str, input: &str) -> Result<TokenRecord>;
    async fn cancel_holdings_edit(&self, token_id: &str) -> Result<()>;
    async fn refresh_prices(&self) -> Result<(SyncOutcome, WatchlistState)>;
    fn sync_status(&self) -> SyncStatus;
}

pub struct WatchlistInteractorImpl {
    store: Arc<WatchlistStore>,
    coordinator: Arc<PriceSyncCoordinator>,
    search: Arc<TokenSearch>,
}

impl WatchlistInteractorImpl {
    pub fn new(
        store: Arc<WatchlistStore>,
        coordinator: Arc<PriceSyncCoordinator>,
        search: Arc<TokenSearch>,
    ) -> Self {
        Self {
            store,
            coordinator,
            search,
        }
    }

    fn tracked(&self, token_id: &str) -> Result<TokenRecord> {
        self.store
            .get(token_id)
            .ok_or_else(|| anyhow!("Token {} is not in the watchlist", token_id))
    }
}

#[async_trait]
impl WatchlistInteractor for WatchlistInteractorImpl {
    async fn get_watchlist(&self) -> Result<WatchlistState> {
        Ok(self.store.snapshot())
    }

    async fn get_token(&self, token_id: &str) -> Result<Option<TokenRecord>> {
        Ok(self.store.get(token_id))
    }

    async fn add_token(&self, token_id: &str) -> Result<TokenRecord> {
        if let Some(existing) = self.store.get(token_id) {
            debug!("Token {} already tracked", token_id);
            return Ok(existing);
        }

        let summary = self
            .search
            .lookup(token_id)
            .ok_or_else(|| anyhow!("Unknown token {}, search for it first", token_id))?;

        let record = TokenRecord::new(
            summary.id,
            summary.name,
            summary.symbol,
            summary.thumbnail_uri,
        );
        if !self.store.add_token(record.clone()) {
            return Err(anyhow!("Token id must not be empty"));
        }
        info!("Added {} to the watchlist", record.id);

        // The new record has no price yet
        let coordinator = self.coordinator.clone();
        tokio::spawn(async move {
            coordinator.refresh().await;
        });

        Ok(record)
    }

    async fn remove_token(&self, token_id: &str) -> Result<Option<TokenRecord>> {
        let record = self.store.get(token_id);
        if self.store.remove_token(token_id) {
            info!("Removed {} from the watchlist", token_id);
        }
        Ok(record)
    }

    async fn begin_holdings_edit(&self, token_id: &str) -> Result<TokenRecord> {
        let record = self.tracked(token_id)?;
        self.store.clear_editing_except(token_id);
        self.store.set_editing_mode(token_id, true);
        Ok(record)
    }

    async fn save_holdings(&self, token_id: &str, input: &str) -> Result<TokenRecord> {
        self.tracked(token_id)?;
        self.store.set_holdings_from_input(token_id, input);
        self.store.set_editing_mode(token_id, false);
        self.tracked(token_id)
    }

    async fn cancel_holdings_edit(&self, token_id: &str) -> Result<()> {
        self.store.set_editing_mode(token_id, false);
        Ok(())
    }

    async fn refresh_prices(&self) -> Result<(SyncOutcome, WatchlistState)> {
        let outcome = self.coordinator.refresh().await;
        Ok((outcome, self.store.snapshot()))
    }

    fn sync_status(&self) -> SyncStatus {
        self.coordinator.status()
    }
}
