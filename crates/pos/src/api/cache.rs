//! Cache types for inventory suggestion responses.

use shoe_pos_core::Brand;

use super::inventory::FilterOptions;

/// Cache key for suggestion lists.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Brands,
    FilterOptions,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Brands(Vec<Brand>),
    FilterOptions(FilterOptions),
}
