//! Explicit cart context.
//!
//! Components that need the cart receive a [`CartContext`] instead of
//! looking one up globally. A context built without a store still exists,
//! but every access through it fails with
//! [`CartError::ContextUnavailable`].

use tracing::error;

use crate::error::{CartError, Result};
use crate::store::CartStore;

/// Handle through which app code reaches the cart.
///
/// Cheap to clone; clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct CartContext {
    store: Option<CartStore>,
}

impl CartContext {
    /// Provide `store` to everything holding this context.
    ///
    /// Activates the store if it hasn't been already.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    #[must_use]
    pub fn provide(store: CartStore) -> Self {
        store.activate();
        Self { store: Some(store) }
    }

    /// A context with no cart behind it.
    #[must_use]
    pub const fn detached() -> Self {
        Self { store: None }
    }

    /// Returns `true` if a store was provided.
    #[must_use]
    pub const fn is_provided(&self) -> bool {
        self.store.is_some()
    }

    /// Returns the provided cart store.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if no store was provided.
    pub fn cart(&self) -> Result<&CartStore> {
        self.store.as_ref().ok_or_else(|| {
            error!("Cart used outside of a cart context");
            CartError::ContextUnavailable
        })
    }
}
