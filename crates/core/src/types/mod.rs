//! Core types for Go Marketplace.
//!
//! This module provides the cart line types and the pure cart model.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{CartState, Decrement};
pub use id::ProductId;
pub use product::{CartEntry, CartProduct};
