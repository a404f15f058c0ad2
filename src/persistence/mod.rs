pub mod error;
pub mod files;
pub mod kv;
pub mod migration;
pub mod schema;
pub mod storage;

pub use error::{StorageError, StorageResult};
pub use files::{atomic_write, ensure_data_dir, get_data_dir, init_local_data_dir, read_file};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use migration::{load, read_current, read_stored, Stored};
pub use schema::{CORRUPT_BACKUP_KEY, LEGACY_STORAGE_KEY, STORAGE_KEY};
pub use storage::{default_data, save, try_save};
