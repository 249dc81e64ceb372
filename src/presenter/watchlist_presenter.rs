use crate::interactor::watchlist_interactor::WatchlistInteractor;
use crate::view::watchlist_view::WatchlistView;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait WatchlistPresenter: Send + Sync {
    async fn show_watchlist(&self) -> Result<()>;
    async fn show_distribution(&self) -> Result<()>;
    async fn add_token(&self, token_id: &str) -> Result<()>;
    async fn remove_token(&self, token_id: &str) -> Result<()>;
    /// Returns `false` when the token is not tracked and no edit started
    async fn begin_holdings_edit(&self, token_id: &str) -> Result<bool>;
    async fn save_holdings(&self, token_id: &str, input: &str) -> Result<()>;
    async fn cancel_holdings_edit(&self, token_id: &str) -> Result<()>;
    async fn refresh_watchlist(&self) -> Result<()>;
}

pub struct WatchlistPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
}

impl<I, V> WatchlistPresenterImpl<I, V>
where
    I: WatchlistInteractor,
    V: WatchlistView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>) -> Self {
        Self { interactor, view }
    }
}

#[async_trait]
impl<I, V> WatchlistPresenter for WatchlistPresenterImpl<I, V>
where
    I: WatchlistInteractor + Send + Sync,
    V: WatchlistView + Send + Sync,
{
    async fn show_watchlist(&self) -> Result<()> {
        match self.interactor.get_watchlist().await {
            Ok(state) => {
                self.view
                    .display_watchlist(state, self.interactor.sync_status())
                    .await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn show_distribution(&self) -> Result<()> {
        match self.interactor.get_watchlist().await {
            Ok(state) => {
                self.view.display_distribution(state).await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn add_token(&self, token_id: &str) -> Result<()> {
        match self.interactor.add_token(token_id).await {
            Ok(record) => {
                self.view.display_token_added(record).await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn remove_token(&self, token_id: &str) -> Result<()> {
        match self.interactor.remove_token(token_id).await {
            Ok(Some(record)) => {
                self.view
                    .display_token_removed(&record.display_symbol())
                    .await?;
            }
            Ok(None) => {
                self.view
                    .display_error("Token not found in watchlist".to_string())
                    .await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn begin_holdings_edit(&self, token_id: &str) -> Result<bool> {
        match self.interactor.begin_holdings_edit(token_id).await {
            Ok(record) => {
                self.view.prompt_for_holdings(record).await?;
                Ok(true)
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
                Ok(false)
            }
        }
    }

    async fn save_holdings(&self, token_id: &str, input: &str) -> Result<()> {
        match self.interactor.save_holdings(token_id, input).await {
            Ok(record) => {
                let state = self.interactor.get_watchlist().await?;
                self.view.display_holdings_saved(record, state).await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn cancel_holdings_edit(&self, token_id: &str) -> Result<()> {
        self.interactor.cancel_holdings_edit(token_id).await?;
        self.show_watchlist().await
    }

    async fn refresh_watchlist(&self) -> Result<()> {
        match self.interactor.refresh_prices().await {
            Ok((outcome, state)) => {
                self.view.display_refresh_result(outcome).await?;
                self.view
                    .display_watchlist(state, self.interactor.sync_status())
                    .await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }
}
