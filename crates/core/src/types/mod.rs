//! Core types for Shoe POS.
//!
//! This module provides type-safe wrappers for the POS domain concepts.

pub mod cart;
pub mod id;
pub mod inventory;
pub mod price;
pub mod sale;

pub use cart::CartLine;
pub use id::*;
pub use inventory::{Brand, Category, Demographic, Product, Variant};
pub use price::{CurrencyCode, Price, round_currency};
pub use sale::{SaleItem, SaleItems, SaleItemsError};
