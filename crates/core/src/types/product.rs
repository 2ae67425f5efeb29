//! Cart line types.
//!
//! Field names match the persisted storage format exactly, including the
//! snake_case `image_url`, so carts saved by earlier app versions still load.

use core::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// A product as offered to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    /// Unit price, stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl CartProduct {
    /// Create a new cart product descriptor.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image_url: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image_url: image_url.into(),
            price,
        }
    }
}

/// One product line in the cart.
///
/// `quantity` is never zero: a line that would drop to zero is removed from
/// the cart instead, and a persisted zero fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ProductId,
    pub title: String,
    pub image_url: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: NonZeroU32,
}

impl CartEntry {
    /// Start a new line for `product` with a quantity of one.
    #[must_use]
    pub fn from_product(product: CartProduct) -> Self {
        let CartProduct {
            id,
            title,
            image_url,
            price,
        } = product;

        Self {
            id,
            title,
            image_url,
            price,
            quantity: NonZeroU32::MIN,
        }
    }

    /// Returns the product descriptor without the quantity.
    #[must_use]
    pub fn product(&self) -> CartProduct {
        CartProduct {
            id: self.id.clone(),
            title: self.title.clone(),
            image_url: self.image_url.clone(),
            price: self.price,
        }
    }
}

impl From<CartProduct> for CartEntry {
    fn from(product: CartProduct) -> Self {
        Self::from_product(product)
    }
}
