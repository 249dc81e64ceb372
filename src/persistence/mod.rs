pub mod adapter;
pub mod storage;

pub use adapter::{PersistenceAdapter, DEFAULT_STORAGE_KEY};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, PostgresStorage};
