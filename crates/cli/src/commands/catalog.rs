//! Catalog and filter commands.

use std::io::{self, Write};

use shoe_pos::PosError;
use shoe_pos::catalog::ProductFilter;
use shoe_pos::render::ProductGrid;
use shoe_pos_core::{BrandId, CategoryId, DemographicId};

use super::Session;

/// Build a product filter from command-line arguments.
pub fn build_filter(
    search: Option<String>,
    brands: &[i32],
    categories: &[i32],
    demographics: &[i32],
) -> ProductFilter {
    ProductFilter {
        search: search.unwrap_or_default(),
        brands: brands.iter().copied().map(BrandId::new).collect(),
        categories: categories.iter().copied().map(CategoryId::new).collect(),
        demographics: demographics.iter().copied().map(DemographicId::new).collect(),
    }
}

/// Load the catalog and draw the filtered product grid.
pub async fn show(session: &Session, filter: &ProductFilter) -> Result<(), PosError> {
    let catalog = session.load_catalog().await?;
    let products: Vec<_> = filter.apply(catalog.products()).collect();

    let mut out = io::stdout().lock();
    write!(out, "{}", ProductGrid::new(&products, session.config.currency))?;
    writeln!(
        out,
        "{} of {} products, {} variants loaded",
        products.len(),
        catalog.len(),
        catalog.variant_count()
    )?;
    Ok(())
}

/// List brand, category, and demographic ids for use with `catalog`.
pub async fn filters(session: &Session) -> Result<(), PosError> {
    let (brands, options) = tokio::try_join!(session.client.brands(), session.client.filter_options())?;

    let mut out = io::stdout().lock();
    writeln!(out, "Brands:")?;
    for brand in &brands {
        writeln!(out, "  {:>4}  {}", brand.brand_id, brand.brand_name)?;
    }
    writeln!(out, "Categories:")?;
    for category in &options.categories {
        writeln!(out, "  {:>4}  {}", category.category_id, category.category_name)?;
    }
    writeln!(out, "Demographics:")?;
    for demographic in &options.demographics {
        writeln!(out, "  {:>4}  {}", demographic.demographic_id, demographic.code)?;
    }
    Ok(())
}
