//! Line and order totals.
//!
//! Each line resolves through the catalog to a priced line or to an orphan.
//! Orphans contribute nothing to the total and are reported alongside it.

use rust_decimal::Decimal;
use shoe_pos_core::{CartLine, VariantId};

use crate::catalog::Catalog;

/// A cart line resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Position in the cart.
    pub index: usize,
    pub variant_id: VariantId,
    pub quantity: u32,
    pub shoe_name: String,
    pub brand_name: String,
    pub size_label: String,
    /// Stock of the variant at the time of pricing.
    pub available: u32,
    /// Unit price with markup, unrounded.
    pub unit_price: Decimal,
    /// `unit_price * quantity`, unrounded.
    pub line_total: Decimal,
}

/// A cart line whose variant is missing from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrphanedLine {
    /// Position in the cart.
    pub index: usize,
    pub line: CartLine,
}

/// Priced view of a cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSummary {
    pub lines: Vec<PricedLine>,
    pub orphans: Vec<OrphanedLine>,
    /// Sum of priced line totals, unrounded.
    pub total: Decimal,
}

impl CartSummary {
    /// Whether any line failed to resolve.
    #[must_use]
    pub fn has_orphans(&self) -> bool {
        !self.orphans.is_empty()
    }

    /// Units across priced lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Variant ids of orphaned lines, in cart order.
    #[must_use]
    pub fn orphan_ids(&self) -> Vec<VariantId> {
        self.orphans.iter().map(|o| o.line.variant_id).collect()
    }
}

/// Resolve one line through the catalog.
///
/// # Errors
///
/// Returns the line as an [`OrphanedLine`] if its variant is not in the catalog.
pub fn resolve_line(index: usize, line: &CartLine, catalog: &Catalog) -> Result<PricedLine, OrphanedLine> {
    let resolved = catalog
        .resolve(line.variant_id)
        .ok_or(OrphanedLine { index, line: *line })?;

    let unit_price = resolved.product.unit_price();
    Ok(PricedLine {
        index,
        variant_id: line.variant_id,
        quantity: line.quantity,
        shoe_name: resolved.product.shoe_name.clone(),
        brand_name: resolved.product.brand_name.clone(),
        size_label: resolved.variant.size_label(),
        available: resolved.variant.available(),
        unit_price,
        line_total: unit_price * Decimal::from(line.quantity),
    })
}

/// Price every line and sum the order total.
#[must_use]
pub fn summarize(lines: &[CartLine], catalog: &Catalog) -> CartSummary {
    let mut summary = CartSummary::default();

    for (index, line) in lines.iter().enumerate() {
        match resolve_line(index, line, catalog) {
            Ok(priced) => {
                summary.total += priced.line_total;
                summary.lines.push(priced);
            }
            Err(orphan) => summary.orphans.push(orphan),
        }
    }

    summary
}
