use crate::interactor::search_interactor::SearchInteractor;
use crate::view::search_view::SearchView;
use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

#[async_trait]
pub trait SearchPresenter: Send + Sync {
    async fn prompt_for_search_term(&self) -> Result<()>;
    async fn search(&self, term: &str) -> Result<()>;
    async fn show_trending(&self) -> Result<()>;
}

pub struct SearchPresenterImpl<I, V> {
    interactor: Arc<I>,
    view: Arc<V>,
}

impl<I, V> SearchPresenterImpl<I, V>
where
    I: SearchInteractor,
    V: SearchView,
{
    pub fn new(interactor: Arc<I>, view: Arc<V>) -> Self {
        Self { interactor, view }
    }
}

#[async_trait]
impl<I, V> SearchPresenter for SearchPresenterImpl<I, V>
where
    I: SearchInteractor + Send + Sync,
    V: SearchView + Send + Sync,
{
    async fn prompt_for_search_term(&self) -> Result<()> {
        self.view.prompt_for_search_term().await
    }

    async fn search(&self, term: &str) -> Result<()> {
        match self.interactor.search(term).await {
            Ok(Some(hits)) => {
                self.view.display_results(term.trim(), hits).await?;
            }
            // A newer search answers instead
            Ok(None) => debug!("Search {:?} superseded", term),
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }

    async fn show_trending(&self) -> Result<()> {
        match self.interactor.trending().await {
            Ok(hits) => {
                self.view.display_trending(hits).await?;
            }
            Err(e) => {
                self.view.display_error(e.to_string()).await?;
            }
        }

        Ok(())
    }
}
