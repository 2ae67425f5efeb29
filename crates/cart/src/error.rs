//! Error types for the cart store.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by [`CartStore`](crate::CartStore) and
/// [`CartContext`](crate::CartContext).
#[derive(Debug, Error)]
pub enum CartError {
    /// The cart was used without an active store.
    ///
    /// Either the context was never given a store, or the store was never
    /// activated. This is a wiring bug in the caller, not a data problem.
    #[error("cart accessed outside of an active cart context")]
    ContextUnavailable,

    /// The storage backend failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A persisted cart could not be encoded or decoded.
    #[error("Invalid cart snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// The background snapshot writer is no longer running.
    #[error("Snapshot writer stopped")]
    WriterStopped,
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
