//! POS cart manager.
//!
//! The cart is an ordered list of [`CartLine`]s mirrored into a
//! [`KeyValueStore`] under [`CART_STORAGE_KEY`]. Every mutation writes the
//! full list back to the store and then calls the render hook with the full
//! list; there is no incremental diffing.
//!
//! A failed write rolls the in-memory cart back, so memory and store never
//! disagree.
//!
//! # Example
//!
//! ```rust,ignore
//! use shoe_pos::cart::Cart;
//! use shoe_pos::store::FileStore;
//!
//! let mut cart = Cart::load(FileStore::open(config.store_path())?);
//! let catalog = loader.snapshot().await;
//! cart.add(VariantId::new(5), 2, catalog.as_ref())?;
//! let summary = cart.compute_total(&catalog);
//! ```

mod checkout;
mod error;
mod pricing;

use shoe_pos_core::{CartLine, VariantId};
use tracing::{debug, warn};

use crate::catalog::{Catalog, StockLookup};
use crate::store::KeyValueStore;

pub use checkout::Receipt;
pub use error::{CartError, CheckoutError};
pub use pricing::{CartSummary, OrphanedLine, PricedLine, resolve_line, summarize};

/// Store key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "pos_cart";

/// Called with the full line list after load and after every mutation.
pub type RenderHook = Box<dyn FnMut(&[CartLine]) + Send>;

/// The POS cart.
pub struct Cart<S> {
    lines: Vec<CartLine>,
    store: S,
    render: Option<RenderHook>,
}

impl<S> std::fmt::Debug for Cart<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cart")
            .field("lines", &self.lines)
            .field("render", &self.render.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: KeyValueStore> Cart<S> {
    /// Create an empty cart over `store` without reading it.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            lines: Vec::new(),
            store,
            render: None,
        }
    }

    /// Hydrate a cart from `store`.
    ///
    /// Missing, unreadable, or corrupt data yields an empty cart. Duplicate
    /// lines for one variant are merged.
    #[must_use]
    pub fn load(store: S) -> Self {
        let mut cart = Self::new(store);
        cart.reload();
        cart
    }

    /// Replace the in-memory lines with what the store holds, then render.
    pub fn reload(&mut self) {
        self.lines = match self.store.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => parse_lines(&raw),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read persisted cart, starting empty");
                Vec::new()
            }
        };

        debug!(lines = self.lines.len(), "Cart loaded");
        self.render();
    }

    /// Attach a render hook.
    #[must_use]
    pub fn with_render_hook(mut self, hook: RenderHook) -> Self {
        self.set_render_hook(hook);
        self
    }

    /// Replace the render hook.
    pub fn set_render_hook(&mut self, hook: RenderHook) {
        self.render = Some(hook);
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Add `quantity` units of a variant.
    ///
    /// Increments the existing line for the variant, or appends a new one.
    /// The resulting line quantity must not exceed the variant's stock.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `quantity` is zero
    /// - `UnknownVariant` if `stock` does not know the variant
    /// - `InsufficientStock` if the line would exceed available stock
    /// - `Storage` if the cart cannot be persisted (the cart is unchanged)
    pub fn add(
        &mut self,
        variant_id: VariantId,
        quantity: u32,
        stock: &impl StockLookup,
    ) -> Result<CartLine, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(0));
        }
        let available = stock
            .stock_of(variant_id)
            .ok_or(CartError::UnknownVariant(variant_id))?;

        let position = self.position_of(variant_id);
        let current = position
            .and_then(|i| self.lines.get(i))
            .map_or(0, |l| l.quantity);
        let requested = u64::from(current) + u64::from(quantity);
        if requested > u64::from(available) {
            return Err(CartError::InsufficientStock {
                variant_id,
                requested,
                available,
            });
        }
        // requested <= available, which is a u32
        let new_quantity = u32::try_from(requested).unwrap_or(available);

        let previous = self.lines.clone();
        let line = match position.and_then(|i| self.lines.get_mut(i)) {
            Some(line) => {
                line.quantity = new_quantity;
                *line
            }
            None => {
                let line = CartLine::new(variant_id, new_quantity);
                self.lines.push(line);
                line
            }
        };
        self.commit(previous)?;

        debug!(%variant_id, quantity = line.quantity, "Added to cart");
        Ok(line)
    }

    /// Remove the line at `index`.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if there is no such line
    /// - `Storage` if the cart cannot be persisted (the cart is unchanged)
    pub fn remove(&mut self, index: usize) -> Result<CartLine, CartError> {
        self.check_index(index)?;

        let previous = self.lines.clone();
        let removed = self.lines.remove(index);
        self.commit(previous)?;

        debug!(variant_id = %removed.variant_id, index, "Removed from cart");
        Ok(removed)
    }

    /// Set the quantity of the line at `index`.
    ///
    /// A quantity of zero or less removes the line. Increases are checked
    /// against stock; decreases are always allowed, even for variants that
    /// are no longer in the catalog.
    ///
    /// Returns the updated line, or `None` if it was removed.
    ///
    /// # Errors
    ///
    /// - `IndexOutOfRange` if there is no such line
    /// - `InvalidQuantity` if `new_quantity` does not fit a `u32`
    /// - `UnknownVariant` / `InsufficientStock` for increases that fail the stock check
    /// - `Storage` if the cart cannot be persisted (the cart is unchanged)
    pub fn update_quantity(
        &mut self,
        index: usize,
        new_quantity: i64,
        stock: &impl StockLookup,
    ) -> Result<Option<CartLine>, CartError> {
        let current = self.check_index(index)?;

        if new_quantity <= 0 {
            return self.remove(index).map(|_| None);
        }
        let quantity =
            u32::try_from(new_quantity).map_err(|_| CartError::InvalidQuantity(new_quantity))?;

        if quantity > current.quantity {
            let available = stock
                .stock_of(current.variant_id)
                .ok_or(CartError::UnknownVariant(current.variant_id))?;
            if quantity > available {
                return Err(CartError::InsufficientStock {
                    variant_id: current.variant_id,
                    requested: u64::from(quantity),
                    available,
                });
            }
        }

        let previous = self.lines.clone();
        let updated = self.lines.get_mut(index).map(|line| {
            line.quantity = quantity;
            *line
        });
        self.commit(previous)?;

        debug!(variant_id = %current.variant_id, quantity, "Updated cart quantity");
        Ok(updated)
    }

    /// Price the cart against `catalog`.
    #[must_use]
    pub fn compute_total(&self, catalog: &Catalog) -> CartSummary {
        summarize(&self.lines, catalog)
    }

    /// Remove every line whose variant is missing from `catalog`.
    ///
    /// Returns the removed lines.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the cart cannot be persisted (the cart is unchanged).
    pub fn purge_orphans(&mut self, catalog: &Catalog) -> Result<Vec<CartLine>, CartError> {
        let (kept, orphans): (Vec<_>, Vec<_>) = self
            .lines
            .iter()
            .partition(|line| catalog.resolve(line.variant_id).is_some());
        if orphans.is_empty() {
            return Ok(Vec::new());
        }

        let previous = std::mem::replace(&mut self.lines, kept);
        self.commit(previous)?;

        warn!(removed = orphans.len(), "Purged cart lines missing from catalog");
        Ok(orphans)
    }

    /// Empty the cart and drop its stored entry; a missing entry loads as empty.
    ///
    /// Unlike other mutations, memory stays cleared even if the write fails.
    pub(crate) fn clear(&mut self) -> Result<(), crate::store::StoreError> {
        self.lines.clear();
        let result = self.store.remove(CART_STORAGE_KEY);
        self.render();
        result
    }

    fn position_of(&self, variant_id: VariantId) -> Option<usize> {
        self.lines.iter().position(|l| l.variant_id == variant_id)
    }

    fn check_index(&self, index: usize) -> Result<CartLine, CartError> {
        self.lines
            .get(index)
            .copied()
            .ok_or(CartError::IndexOutOfRange {
                index,
                len: self.lines.len(),
            })
    }

    /// Persist the current lines, restoring `previous` if that fails, then render.
    fn commit(&mut self, previous: Vec<CartLine>) -> Result<(), CartError> {
        if let Err(e) = self.persist() {
            self.lines = previous;
            return Err(e.into());
        }
        self.render();
        Ok(())
    }

    fn persist(&mut self) -> Result<(), crate::store::StoreError> {
        // Serializing plain structs of integers cannot fail
        let serialized = serde_json::to_string(&self.lines).unwrap_or_else(|_| "[]".to_string());
        self.store.set(CART_STORAGE_KEY, &serialized)
    }

    fn render(&mut self) {
        if let Some(hook) = self.render.as_mut() {
            hook(&self.lines);
        }
    }
}

/// Parse a persisted cart, merging duplicate variants. Corrupt data yields an empty cart.
fn parse_lines(raw: &str) -> Vec<CartLine> {
    let parsed: Vec<CartLine> = match serde_json::from_str(raw) {
        Ok(lines) => lines,
        Err(e) => {
            warn!(error = %e, "Persisted cart is corrupt, starting empty");
            return Vec::new();
        }
    };

    let mut lines: Vec<CartLine> = Vec::with_capacity(parsed.len());
    for line in parsed {
        match lines.iter_mut().find(|l| l.variant_id == line.variant_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            None => lines.push(line),
        }
    }
    lines
}
