pub mod price_sync;
pub mod sync_notifier;
pub mod token_search;

pub use price_sync::{PriceSyncCoordinator, SyncOutcome, SyncStatus};
pub use sync_notifier::spawn_sync_notifier;
pub use token_search::TokenSearch;
