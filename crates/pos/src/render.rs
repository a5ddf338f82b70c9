//! Plain-text rendering of the cart panel, product grid, and receipt.
//!
//! Every render is a full redraw from current state. Money is rounded to
//! currency precision here and nowhere earlier.

use std::fmt;

use rust_decimal::Decimal;
use shoe_pos_core::{CurrencyCode, Price, Product};

use crate::cart::{CartSummary, Receipt};

fn money(amount: Decimal, currency: CurrencyCode) -> Price {
    Price::new(amount, currency)
}

/// The cart panel: one row per priced line, orphan warnings, and the total.
///
/// Rows are numbered from 1.
#[derive(Debug, Clone, Copy)]
pub struct CartPanel<'a> {
    pub summary: &'a CartSummary,
    pub currency: CurrencyCode,
}

impl<'a> CartPanel<'a> {
    #[must_use]
    pub const fn new(summary: &'a CartSummary, currency: CurrencyCode) -> Self {
        Self { summary, currency }
    }
}

impl fmt::Display for CartPanel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        if summary.lines.is_empty() && summary.orphans.is_empty() {
            return writeln!(f, "Cart is empty");
        }

        for line in &summary.lines {
            writeln!(
                f,
                "{:>3}. {} ({}) [{}]  {} x {} = {}",
                line.index + 1,
                line.shoe_name,
                line.brand_name,
                line.size_label,
                line.quantity,
                money(line.unit_price, self.currency),
                money(line.line_total, self.currency),
            )?;
        }

        for orphan in &summary.orphans {
            writeln!(
                f,
                "{:>3}. WARNING: variant {} (qty {}) is not in the catalog and is excluded from the total",
                orphan.index + 1,
                orphan.line.variant_id,
                orphan.line.quantity,
            )?;
        }

        writeln!(
            f,
            "Total ({} items): {}",
            summary.item_count(),
            money(summary.total, self.currency)
        )
    }
}

/// The product grid: one block per product listing its variants and stock.
#[derive(Debug, Clone, Copy)]
pub struct ProductGrid<'a> {
    pub products: &'a [&'a Product],
    pub currency: CurrencyCode,
}

impl<'a> ProductGrid<'a> {
    #[must_use]
    pub const fn new(products: &'a [&'a Product], currency: CurrencyCode) -> Self {
        Self { products, currency }
    }
}

impl fmt::Display for ProductGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.products.is_empty() {
            return writeln!(f, "No products found");
        }

        for product in self.products {
            writeln!(
                f,
                "{} - {} ({})  {}",
                product.shoe_id,
                product.shoe_name,
                product.brand_name,
                money(product.unit_price(), self.currency),
            )?;
            for variant in &product.variants {
                let stock = match variant.available() {
                    0 => "out of stock".to_string(),
                    n => format!("{n} in stock"),
                };
                writeln!(f, "    #{} {}  {stock}", variant.variant_id, variant.size_label())?;
            }
        }
        Ok(())
    }
}

/// A printed receipt for a completed checkout.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptView<'a> {
    pub receipt: &'a Receipt,
    pub currency: CurrencyCode,
}

impl<'a> ReceiptView<'a> {
    #[must_use]
    pub const fn new(receipt: &'a Receipt, currency: CurrencyCode) -> Self {
        Self { receipt, currency }
    }
}

impl fmt::Display for ReceiptView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.receipt;
        writeln!(f, "Sale {}", r.checkout_id)?;
        writeln!(f, "Customer: {}", r.customer_name)?;
        writeln!(f, "Date: {}", r.completed_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        for line in &r.lines {
            writeln!(
                f,
                "  {} [{}] x{}  {}",
                line.shoe_name,
                line.size_label,
                line.quantity,
                money(line.line_total, self.currency),
            )?;
        }
        writeln!(f, "Total:  {}", money(r.total, self.currency))?;
        writeln!(f, "Cash:   {}", money(r.cash_received, self.currency))?;
        writeln!(f, "Change: {}", money(r.change, self.currency))?;
        if !r.message.is_empty() {
            writeln!(f, "{}", r.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use shoe_pos_core::{CartLine, VariantId};

    use super::*;
    use crate::cart::summarize;
    use crate::catalog::Catalog;
    use crate::catalog::fixtures::{product, variant};

    #[test]
    fn test_cart_panel_lines_and_total() {
        let catalog = Catalog::new(vec![product(1, "Glide", 100, 10, vec![variant(5, 10)])]);
        let summary = summarize(&[CartLine::new(VariantId::new(5), 2)], &catalog);

        let text = CartPanel::new(&summary, CurrencyCode::PHP).to_string();

        assert_eq!(
            text,
            "  1. Glide (Stride) [US:9 UK:8 EU:42]  2 x ₱110.00 = ₱220.00\nTotal (2 items): ₱220.00\n"
        );
    }

    #[test]
    fn test_cart_panel_warns_about_orphans() {
        let catalog = Catalog::new(vec![product(1, "Glide", 100, 0, vec![variant(5, 10)])]);
        let summary = summarize(
            &[
                CartLine::new(VariantId::new(42), 3),
                CartLine::new(VariantId::new(5), 1),
            ],
            &catalog,
        );

        let text = CartPanel::new(&summary, CurrencyCode::USD).to_string();

        assert!(text.contains("  1. WARNING: variant 42 (qty 3) is not in the catalog"));
        assert!(text.contains("  2. Glide"));
        assert!(text.ends_with("Total (1 items): $100.00\n"));
    }

    #[test]
    fn test_empty_cart_panel() {
        let summary = CartSummary::default();
        assert_eq!(
            CartPanel::new(&summary, CurrencyCode::PHP).to_string(),
            "Cart is empty\n"
        );
    }

    #[test]
    fn test_product_grid_shows_stock() {
        let p = product(1, "Glide", 100, 10, vec![variant(5, 2), variant(6, 0)]);
        let products = [&p];

        let text = ProductGrid::new(&products, CurrencyCode::PHP).to_string();

        assert!(text.starts_with("1 - Glide (Stride)  ₱110.00\n"));
        assert!(text.contains("#5 US:9 UK:8 EU:42  2 in stock"));
        assert!(text.contains("#6 US:9 UK:8 EU:42  out of stock"));
    }
}
