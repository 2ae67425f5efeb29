//! Go Marketplace Cart - Persistent shopping cart store.
//!
//! Holds the products a shopper has added, keeps the list in a key-value
//! storage slot across restarts, and exposes add, increment and decrement.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart. Mutations are serialized through one async
//!   lock, and every change is queued for a background writer that persists
//!   the whole cart as JSON.
//! - [`CartContext`] hands the store to app code explicitly.
//! - [`KeyValueStore`] is the storage seam, with [`MemoryStore`] and
//!   [`FileStore`] backends.
//!
//! # Example
//!
//! ```rust,no_run
//! use go_marketplace_cart::{CartConfig, CartContext, CartStore, MemoryStore};
//! use go_marketplace_core::{CartProduct, ProductId};
//! use rust_decimal::Decimal;
//!
//! # async fn run() -> Result<(), go_marketplace_cart::CartError> {
//! let config = CartConfig::from_env().expect("valid cart config");
//! let context = CartContext::provide(CartStore::new(MemoryStore::new(), &config));
//!
//! let cart = context.cart()?;
//! cart.add_to_cart(CartProduct::new("p1", "Shirt", "https://img/p1", Decimal::from(10)))
//!     .await?;
//! cart.increment(&ProductId::new("p1")).await?;
//!
//! assert_eq!(cart.products()?[0].quantity.get(), 2);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod storage;
pub mod store;
mod writer;

pub use config::{CartConfig, ConfigError, RetryPolicy};
pub use context::CartContext;
pub use error::{CartError, Result};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartSnapshot, CartStore, StoreStatus};
