pub mod search_presenter;
pub mod watchlist_presenter;
