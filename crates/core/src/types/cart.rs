//! Cart contents and the list operations behind add/increment/decrement.
//!
//! `CartState` is the pure, synchronous model. It knows nothing about
//! storage or tasks; the store crate wraps it with locking and persistence.
//!
//! ## Invariants
//!
//! - No two entries share a [`ProductId`].
//! - Every quantity is at least one. Decrementing a line at one removes it.
//! - Entries keep insertion order; new products are appended.

use core::num::NonZeroU32;

use super::id::ProductId;
use super::product::{CartEntry, CartProduct};

/// Ordered list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    entries: Vec<CartEntry>,
}

/// Result of decrementing a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The line is still in the cart with this quantity.
    Reduced(NonZeroU32),
    /// The line reached zero and was removed.
    Removed,
    /// No line matched the ID.
    NotFound,
}

impl CartState {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from a list of entries, merging duplicate IDs.
    ///
    /// A duplicate keeps the position and descriptive fields of its first
    /// occurrence and adds its quantity to it. Returns the cart and the
    /// number of duplicates that were merged.
    #[must_use]
    pub fn from_entries(entries: Vec<CartEntry>) -> (Self, usize) {
        let mut cart = Self::new();
        let mut merged = 0;

        for entry in entries {
            if let Some(existing) = cart.entry_mut(&entry.id) {
                existing.quantity = existing.quantity.saturating_add(entry.quantity.get());
                merged += 1;
            } else {
                cart.entries.push(entry);
            }
        }

        (cart, merged)
    }

    /// Decode a cart from its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` is not a JSON array of cart entries, or if
    /// any entry has a quantity that is not a positive integer.
    pub fn from_json(raw: &str) -> Result<(Self, usize), serde_json::Error> {
        let entries: Vec<CartEntry> = serde_json::from_str(raw)?;
        Ok(Self::from_entries(entries))
    }

    /// Encode the cart in its persisted JSON form.
    ///
    /// # Errors
    ///
    /// Returns an error if a price cannot be represented as a JSON number.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    /// Returns the cart lines in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Look up a line by product ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.quantity.get()))
            .sum()
    }

    /// Add one unit of `product`.
    ///
    /// An existing line for the same ID gains one unit and keeps its
    /// title, image and price. Otherwise a new line with quantity one is
    /// appended. Returns the line's new quantity.
    pub fn add_to_cart(&mut self, product: CartProduct) -> NonZeroU32 {
        if let Some(existing) = self.entry_mut(&product.id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return existing.quantity;
        }

        let entry = CartEntry::from_product(product);
        let quantity = entry.quantity;
        self.entries.push(entry);
        quantity
    }

    /// Add one unit to the line for `id`.
    ///
    /// Returns the new quantity, or `None` if no line matched (the cart is
    /// left unchanged).
    pub fn increment(&mut self, id: &ProductId) -> Option<NonZeroU32> {
        let entry = self.entry_mut(id)?;
        entry.quantity = entry.quantity.saturating_add(1);
        Some(entry.quantity)
    }

    /// Remove one unit from the line for `id`, dropping the line at zero.
    pub fn decrement(&mut self, id: &ProductId) -> Decrement {
        let Some(index) = self.entries.iter().position(|entry| &entry.id == id) else {
            return Decrement::NotFound;
        };

        let Some(entry) = self.entries.get_mut(index) else {
            return Decrement::NotFound;
        };

        match NonZeroU32::new(entry.quantity.get() - 1) {
            Some(quantity) => {
                entry.quantity = quantity;
                Decrement::Reduced(quantity)
            }
            None => {
                self.entries.remove(index);
                Decrement::Removed
            }
        }
    }

    fn entry_mut(&mut self, id: &ProductId) -> Option<&mut CartEntry> {
        self.entries.iter_mut().find(|entry| &entry.id == id)
    }
}

impl From<CartState> for Vec<CartEntry> {
    fn from(cart: CartState) -> Self {
        cart.entries
    }
}
