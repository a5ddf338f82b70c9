//! Loaded product catalog.
//!
//! A [`Catalog`] is an immutable snapshot of the products returned by the
//! inventory API, indexed by variant id so cart lines can be priced and
//! stock-checked without scanning every product.

mod filter;
mod loader;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use shoe_pos_core::{Product, Variant, VariantId};
use tracing::warn;

pub use filter::ProductFilter;
pub use loader::{CatalogLoader, CatalogSource, ReloadOutcome, ReloadTicket, fetch_all_pages};

/// Source of truth for how many units of a variant may be sold.
pub trait StockLookup {
    /// Units available, or `None` if the variant is unknown.
    fn stock_of(&self, variant_id: VariantId) -> Option<u32>;
}

/// A variant together with the product that owns it.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedVariant<'a> {
    pub product: &'a Product,
    pub variant: &'a Variant,
}

/// Indexed snapshot of loaded products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    /// variant id -> (product position, variant position)
    index: HashMap<VariantId, (usize, usize)>,
}

impl Catalog {
    /// Build a catalog, indexing every variant.
    ///
    /// If two products claim the same variant id the first one wins.
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        let mut index = HashMap::new();
        for (p, product) in products.iter().enumerate() {
            for (v, variant) in product.variants.iter().enumerate() {
                match index.entry(variant.variant_id) {
                    Entry::Vacant(slot) => {
                        slot.insert((p, v));
                    }
                    Entry::Occupied(_) => warn!(
                        variant_id = %variant.variant_id,
                        shoe_id = %product.shoe_id,
                        "Variant listed under more than one product"
                    ),
                }
            }
        }
        Self { products, index }
    }

    /// An empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// All products in load order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether no products are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Number of indexed variants.
    #[must_use]
    pub fn variant_count(&self) -> usize {
        self.index.len()
    }

    /// Find the product and variant for a variant id.
    #[must_use]
    pub fn resolve(&self, variant_id: VariantId) -> Option<ResolvedVariant<'_>> {
        let &(p, v) = self.index.get(&variant_id)?;
        let product = self.products.get(p)?;
        let variant = product.variants.get(v)?;
        Some(ResolvedVariant { product, variant })
    }
}

impl StockLookup for Catalog {
    fn stock_of(&self, variant_id: VariantId) -> Option<u32> {
        self.resolve(variant_id).map(|r| r.variant.available())
    }
}

impl<T: StockLookup + ?Sized> StockLookup for &T {
    fn stock_of(&self, variant_id: VariantId) -> Option<u32> {
        (**self).stock_of(variant_id)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;
    use shoe_pos_core::{BrandId, Product, ShoeId, Variant, VariantId};

    /// A US 9 / UK 8 / EU 42 variant with the given id and stock.
    pub fn variant(id: i32, stock: i32) -> Variant {
        Variant {
            variant_id: VariantId::new(id),
            shoe_id: None,
            size_id: None,
            us_size: Some(Decimal::new(9, 0)),
            uk_size: Some(Decimal::new(8, 0)),
            eu_size: Some(Decimal::new(42, 0)),
            variant_stock: stock,
        }
    }

    /// A product priced at `price` with `markup` percent.
    pub fn product(id: i32, name: &str, price: i64, markup: i64, variants: Vec<Variant>) -> Product {
        Product {
            shoe_id: ShoeId::new(id),
            shoe_name: name.to_string(),
            brand_id: BrandId::new(1),
            brand_name: "Stride".to_string(),
            shoe_price: Decimal::new(price, 0),
            markup: Decimal::new(markup, 0),
            first_sale_at: None,
            created_at: None,
            categories: Vec::new(),
            demographics: Vec::new(),
            variants,
        }
    }
}
