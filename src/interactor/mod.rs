pub mod search_interactor;
pub mod watchlist_interactor;
