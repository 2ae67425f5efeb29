//! Go Marketplace Core - Shared cart types.
//!
//! This crate provides the types used across all Go Marketplace components:
//! - `cart` - Persistent cart store for the app
//! - `cli` - Command-line tool for inspecting and editing a stored cart
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no async runtime. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, cart lines, and the [`CartState`] list model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
