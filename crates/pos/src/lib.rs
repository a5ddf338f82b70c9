//! Shoe POS library.
//!
//! Cart manager, catalog, and REST client behind the `pos` command-line
//! front end. Everything a front end needs lives here so it can be tested
//! without a terminal.
//!
//! # Flow
//!
//! 1. [`config::PosConfig::from_env`] reads the environment
//! 2. [`catalog::CatalogLoader`] pulls every catalog page through
//!    [`api::PosApiClient`]
//! 3. [`cart::Cart`] is hydrated from a [`store::FileStore`] and mutated by
//!    operator commands, persisting after every change
//! 4. [`cart::Cart::checkout`] records the sale and clears the cart
//! 5. [`render`] draws the cart panel, product grid, and receipt

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod render;
pub mod store;

pub use error::PosError;
