//! Shoe POS Core - Shared domain types.
//!
//! This crate provides the types shared by the POS client components:
//! - `shoe-pos` - Cart manager, catalog, and REST client library
//! - `pos-cli` - Command-line POS front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure conversions - no I/O, no
//! storage, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere, including the mock API in the integration tests.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, prices, inventory entities, cart lines, and
//!   the sale item wire encoding

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
