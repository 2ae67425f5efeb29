//! Key-value persistence for cart snapshots.
//!
//! The cart only ever reads and writes one whole string value per key, so a
//! backend needs nothing beyond `get` and `set`.

mod file;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when talking to a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or other I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Asynchronous string key-value store.
///
/// Implementations must be safe to share across tasks. A `set` replaces the
/// whole value for the key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
