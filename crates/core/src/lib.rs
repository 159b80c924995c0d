//! Go Marketplace Core - Shared types library.
//!
//! This crate provides the types shared by every Go Marketplace component:
//! - `cart` - The persisted shopping-cart state container
//! - `cli` - Command-line driver for inspecting and mutating a cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no async runtime. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, quantities, and cart entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
