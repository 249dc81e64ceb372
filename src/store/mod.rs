mod token_map;
mod watchlist_store;

pub use token_map::TokenMap;
pub use watchlist_store::{Allocation, PersistedWatchlist, WatchlistState, WatchlistStore};
