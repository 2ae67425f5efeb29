//! The cart store.
//!
//! A [`CartStore`] owns the cart for the running app. It is loaded once
//! from storage in the background and written back after every change.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --activate()--> Loading --load finished--> Ready
//! ```
//!
//! Reads during `Loading` see an empty cart. Mutations issued during
//! `Loading` wait for `Ready` and then apply on top of the loaded cart.
//! Every entry point fails with [`CartError::ContextUnavailable`] while the
//! store is still `Uninitialized`.
//!
//! Mutations take a single async lock around the cart, so concurrent calls
//! never compute from a stale list.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, PoisonError};

use go_marketplace_core::{CartEntry, CartProduct, CartState, Decrement, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::storage::KeyValueStore;
use crate::writer::{Snapshot, SnapshotWriter};

/// Read-only view of the cart lines at one point in time.
pub type CartSnapshot = Arc<[CartEntry]>;

/// Where the store is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreStatus {
    /// Created but not yet activated.
    Uninitialized,
    /// Reading the persisted cart.
    Loading,
    /// Loaded and accepting mutations.
    Ready,
}

/// Persistent shopping cart.
///
/// This struct is cheaply cloneable via `Arc`; clones share one cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    key: String,
    storage: Arc<dyn KeyValueStore>,
    cart: Mutex<VersionedCart>,
    status: watch::Sender<StoreStatus>,
    products: watch::Sender<CartSnapshot>,
    snapshots: watch::Sender<Snapshot>,
    persisted: watch::Receiver<u64>,
    writer: std::sync::Mutex<Option<SnapshotWriter>>,
}

/// The cart plus the number of mutations applied to it.
#[derive(Default)]
struct VersionedCart {
    state: CartState,
    generation: u64,
}

impl CartStore {
    /// Create a store over `storage`. Nothing is loaded until [`activate`].
    ///
    /// [`activate`]: Self::activate
    #[must_use]
    pub fn new(storage: impl KeyValueStore + 'static, config: &CartConfig) -> Self {
        Self::with_shared_storage(Arc::new(storage), config)
    }

    /// Create a store over an already shared storage handle.
    #[must_use]
    pub fn with_shared_storage(storage: Arc<dyn KeyValueStore>, config: &CartConfig) -> Self {
        let key = config.storage_key();
        let (status, _) = watch::channel(StoreStatus::Uninitialized);
        let (products, _) = watch::channel(CartSnapshot::from(Vec::new()));
        let (snapshots, snapshot_rx) = watch::channel(Snapshot::default());
        let (persisted_tx, persisted) = watch::channel(0);

        let writer = SnapshotWriter::new(
            Arc::clone(&storage),
            key.clone(),
            config.write_retry,
            snapshot_rx,
            persisted_tx,
        );

        Self {
            inner: Arc::new(CartStoreInner {
                key,
                storage,
                cart: Mutex::new(VersionedCart::default()),
                status,
                products,
                snapshots,
                persisted,
                writer: std::sync::Mutex::new(Some(writer)),
            }),
        }
    }

    /// Start the store: spawn the one-time load and the snapshot writer.
    ///
    /// Only the first call has any effect. Returns immediately; use
    /// [`ready`](Self::ready) to wait for the load.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn activate(&self) {
        let started = self.inner.status.send_if_modified(|status| {
            if *status == StoreStatus::Uninitialized {
                *status = StoreStatus::Loading;
                true
            } else {
                false
            }
        });
        if !started {
            return;
        }

        info!(key = %self.inner.key, "Activating cart store");

        let writer = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(writer) = writer {
            writer.spawn();
        }

        let store = self.clone();
        tokio::spawn(async move {
            store.load().await;
        });
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub fn status(&self) -> StoreStatus {
        *self.inner.status.borrow()
    }

    /// Returns the storage key this store reads and writes.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Wait until the persisted cart has been loaded.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    pub async fn ready(&self) -> Result<()> {
        self.ensure_active()?;

        let mut status = self.inner.status.subscribe();
        status
            .wait_for(|status| *status == StoreStatus::Ready)
            .await
            .map_err(|_| CartError::ContextUnavailable)?;
        Ok(())
    }

    /// Returns the current cart lines.
    ///
    /// While the store is loading this is the empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    pub fn products(&self) -> Result<CartSnapshot> {
        self.ensure_active()?;
        Ok(self.inner.products.borrow().clone())
    }

    /// Subscribe to cart changes.
    ///
    /// The receiver yields a new snapshot after the load and after every
    /// mutation.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    pub fn subscribe(&self) -> Result<watch::Receiver<CartSnapshot>> {
        self.ensure_active()?;
        Ok(self.inner.products.subscribe())
    }

    /// Add one unit of `product` to the cart.
    ///
    /// Returns the line's new quantity. The write to storage happens in the
    /// background.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: CartProduct) -> Result<NonZeroU32> {
        let quantity = self.mutate(|cart| cart.add_to_cart(product)).await?;
        debug!(quantity = quantity.get(), "Added product to cart");
        Ok(quantity)
    }

    /// Add one unit to the line for `id`.
    ///
    /// Returns the new quantity, or `None` if the product is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> Result<Option<NonZeroU32>> {
        let quantity = self.mutate(|cart| cart.increment(id)).await?;
        if quantity.is_none() {
            debug!("Increment for product not in cart");
        }
        Ok(quantity)
    }

    /// Remove one unit from the line for `id`, dropping it at zero.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> Result<Decrement> {
        let outcome = self.mutate(|cart| cart.decrement(id)).await?;
        debug!(?outcome, "Decremented cart line");
        Ok(outcome)
    }

    /// Wait until every change made so far has been handed to storage.
    ///
    /// A write that failed all its retries counts as handled.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ContextUnavailable`] if the store was never
    /// activated, or [`CartError::WriterStopped`] if the writer task ended.
    pub async fn flush(&self) -> Result<()> {
        self.ensure_active()?;

        let target = self.inner.snapshots.borrow().generation;
        let mut persisted = self.inner.persisted.clone();
        persisted
            .wait_for(|generation| *generation >= target)
            .await
            .map_err(|_| CartError::WriterStopped)?;
        Ok(())
    }

    fn ensure_active(&self) -> Result<()> {
        if self.status() == StoreStatus::Uninitialized {
            error!(key = %self.inner.key, "Cart store used before activation");
            return Err(CartError::ContextUnavailable);
        }
        Ok(())
    }

    /// Apply `op` to the loaded cart under the cart lock and publish the
    /// result.
    async fn mutate<T>(&self, op: impl FnOnce(&mut CartState) -> T) -> Result<T> {
        self.ready().await?;

        let mut cart = self.inner.cart.lock().await;
        let outcome = op(&mut cart.state);
        cart.generation += 1;
        self.publish(&cart);
        Ok(outcome)
    }

    /// Push the cart to readers and queue it for the writer.
    ///
    /// Must be called with the cart lock held so generations are published
    /// in order.
    fn publish(&self, cart: &VersionedCart) {
        self.inner
            .products
            .send_replace(CartSnapshot::from(cart.state.entries()));

        match cart.state.to_json() {
            Ok(payload) => {
                self.inner.snapshots.send_replace(Snapshot {
                    generation: cart.generation,
                    payload: payload.into(),
                });
            }
            Err(e) => {
                error!(
                    error = %CartError::from(e),
                    generation = cart.generation,
                    "Failed to encode cart snapshot"
                );
            }
        }
    }

    /// Read the persisted cart and mark the store ready.
    ///
    /// Any read or decode failure leaves the cart empty.
    #[instrument(skip(self), fields(key = %self.inner.key))]
    async fn load(&self) {
        let loaded = match self.read_persisted().await {
            Ok(Some(cart)) => cart,
            Ok(None) => {
                debug!("No stored cart, starting empty");
                CartState::new()
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stored cart, starting empty");
                CartState::new()
            }
        };

        let lines = loaded.len();
        {
            let mut cart = self.inner.cart.lock().await;
            cart.state = loaded;
            self.inner
                .products
                .send_replace(CartSnapshot::from(cart.state.entries()));
        }

        self.inner.status.send_replace(StoreStatus::Ready);
        info!(lines, "Cart store ready");
    }

    async fn read_persisted(&self) -> Result<Option<CartState>> {
        let Some(raw) = self.inner.storage.get(&self.inner.key).await? else {
            return Ok(None);
        };

        let (cart, merged) = CartState::from_json(&raw)?;
        if merged > 0 {
            warn!(merged, "Merged duplicate cart lines from storage");
        }
        Ok(Some(cart))
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}
