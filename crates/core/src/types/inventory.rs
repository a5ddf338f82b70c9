//! Inventory entities as served by the inventory API.
//!
//! Field names follow the API's JSON (`shoe_name`, `variant_stock`, ...), so
//! these types deserialize directly from `/api/inventory/shoes/all` pages and
//! the suggestion endpoints.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{BrandId, CategoryId, DemographicId, ShoeId, SizeId, VariantId};

/// A shoe brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub brand_id: BrandId,
    pub brand_name: String,
}

/// A product category (e.g., "Running", "Basketball").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub category_name: String,
}

/// A target demographic (e.g., "M", "W", "K").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Demographic {
    pub demographic_id: DemographicId,
    /// Short code; the API spells this field `demographic_Code`.
    #[serde(rename = "demographic_Code")]
    pub code: String,
}

/// A size-specific, separately stocked instance of a shoe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: VariantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoe_id: Option<ShoeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_id: Option<SizeId>,
    #[serde(default)]
    pub us_size: Option<Decimal>,
    #[serde(default)]
    pub uk_size: Option<Decimal>,
    #[serde(default)]
    pub eu_size: Option<Decimal>,
    pub variant_stock: i32,
}

impl Variant {
    /// Units available for sale. Negative stock counts as none.
    #[must_use]
    pub fn available(&self) -> u32 {
        u32::try_from(self.variant_stock).unwrap_or(0)
    }

    /// Human-readable size label, e.g. `US:9.5 UK:8.5 EU:43`.
    #[must_use]
    pub fn size_label(&self) -> String {
        fn part(system: &str, size: Option<Decimal>) -> String {
            size.map_or_else(
                || format!("{system}:-"),
                |s| format!("{system}:{}", s.normalize()),
            )
        }

        [
            part("US", self.us_size),
            part("UK", self.uk_size),
            part("EU", self.eu_size),
        ]
        .join(" ")
    }
}

/// A shoe with its brand, taxonomy, and variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub shoe_id: ShoeId,
    pub shoe_name: String,
    pub brand_id: BrandId,
    #[serde(default)]
    pub brand_name: String,
    /// Base price before markup.
    pub shoe_price: Decimal,
    /// Markup percentage applied at the point of sale.
    #[serde(default)]
    pub markup: Decimal,
    #[serde(default)]
    pub first_sale_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub demographics: Vec<Demographic>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Effective sale price of one unit: `shoe_price * (1 + markup / 100)`.
    ///
    /// Not rounded; callers round at display time.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.shoe_price * (Decimal::ONE + self.markup / Decimal::ONE_HUNDRED)
    }

    /// Find a variant of this product by id.
    #[must_use]
    pub fn variant(&self, variant_id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    /// Whether the product is tagged with the category.
    #[must_use]
    pub fn has_category(&self, category_id: CategoryId) -> bool {
        self.categories.iter().any(|c| c.category_id == category_id)
    }

    /// Whether the product is tagged with the demographic.
    #[must_use]
    pub fn has_demographic(&self, demographic_id: DemographicId) -> bool {
        self.demographics
            .iter()
            .any(|d| d.demographic_id == demographic_id)
    }

    /// Total stock across all variants.
    #[must_use]
    pub fn total_stock(&self) -> u64 {
        self.variants.iter().map(|v| u64::from(v.available())).sum()
    }
}
