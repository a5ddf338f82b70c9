//! Client-side product filtering for the product grid.

use std::collections::BTreeSet;

use shoe_pos_core::{BrandId, CategoryId, DemographicId, Product};

/// Search and checkbox filters applied to the loaded catalog.
///
/// - Search matches shoe or brand name, case-insensitively.
/// - Brands: the product's brand is any of the selected ones.
/// - Categories and demographics: the product carries *all* selected ones.
///
/// An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub search: String,
    pub brands: BTreeSet<BrandId>,
    pub categories: BTreeSet<CategoryId>,
    pub demographics: BTreeSet<DemographicId>,
}

impl ProductFilter {
    /// Whether no criteria are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty()
            && self.brands.is_empty()
            && self.categories.is_empty()
            && self.demographics.is_empty()
    }

    /// Reset every criterion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether `product` passes every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.trim().to_lowercase();
        if !search.is_empty()
            && !product.shoe_name.to_lowercase().contains(&search)
            && !product.brand_name.to_lowercase().contains(&search)
        {
            return false;
        }

        if !self.brands.is_empty() && !self.brands.contains(&product.brand_id) {
            return false;
        }

        self.categories.iter().all(|&c| product.has_category(c))
            && self.demographics.iter().all(|&d| product.has_demographic(d))
    }

    /// Products passing the filter, in input order.
    pub fn apply<'p>(&self, products: &'p [Product]) -> impl Iterator<Item = &'p Product> {
        products.iter().filter(move |p| self.matches(p))
    }
}

#[cfg(test)]
mod tests {
    use shoe_pos_core::{Category, Demographic};

    use super::*;
    use crate::catalog::fixtures::{product, variant};

    fn tagged(id: i32, name: &str, brand: i32, categories: &[i32], demographics: &[i32]) -> Product {
        let mut p = product(id, name, 100, 0, vec![variant(id, 1)]);
        p.brand_id = BrandId::new(brand);
        p.brand_name = format!("Brand {brand}");
        p.categories = categories
            .iter()
            .map(|&c| Category {
                category_id: CategoryId::new(c),
                category_name: format!("Cat {c}"),
            })
            .collect();
        p.demographics = demographics
            .iter()
            .map(|&d| Demographic {
                demographic_id: DemographicId::new(d),
                code: format!("D{d}"),
            })
            .collect();
        p
    }

    fn names<'a>(filter: &ProductFilter, products: &'a [Product]) -> Vec<&'a str> {
        filter
            .apply(products)
            .map(|p| p.shoe_name.as_str())
            .collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let products = vec![tagged(1, "Glide", 1, &[], &[]), tagged(2, "Court", 2, &[], &[])];
        let filter = ProductFilter::default();
        assert!(filter.is_empty());
        assert_eq!(names(&filter, &products), vec!["Glide", "Court"]);
    }

    #[test]
    fn test_search_matches_name_or_brand() {
        let products = vec![tagged(1, "Air Glide", 1, &[], &[]), tagged(2, "Court", 2, &[], &[])];
        let filter = ProductFilter {
            search: "GLIDE".to_string(),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter, &products), vec!["Air Glide"]);

        let filter = ProductFilter {
            search: "brand 2".to_string(),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter, &products), vec!["Court"]);
    }

    #[test]
    fn test_brands_are_any_of() {
        let products = vec![
            tagged(1, "A", 1, &[], &[]),
            tagged(2, "B", 2, &[], &[]),
            tagged(3, "C", 3, &[], &[]),
        ];
        let filter = ProductFilter {
            brands: [BrandId::new(1), BrandId::new(3)].into(),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter, &products), vec!["A", "C"]);
    }

    #[test]
    fn test_categories_and_demographics_are_all_of() {
        let products = vec![
            tagged(1, "Both", 1, &[1, 2], &[7, 8]),
            tagged(2, "OneCat", 1, &[1], &[7, 8]),
            tagged(3, "OneDemo", 1, &[1, 2], &[7]),
        ];
        let filter = ProductFilter {
            categories: [CategoryId::new(1), CategoryId::new(2)].into(),
            demographics: [DemographicId::new(7), DemographicId::new(8)].into(),
            ..ProductFilter::default()
        };
        assert_eq!(names(&filter, &products), vec!["Both"]);
    }

    #[test]
    fn test_clear_resets() {
        let mut filter = ProductFilter {
            search: "x".to_string(),
            brands: [BrandId::new(1)].into(),
            ..ProductFilter::default()
        };
        filter.clear();
        assert!(filter.is_empty());
    }
}
