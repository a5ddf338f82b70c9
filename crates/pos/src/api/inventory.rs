//! Catalog and filter-suggestion endpoints.

use serde::{Deserialize, Serialize};
use shoe_pos_core::{Brand, BrandId, Category, CategoryId, Demographic, DemographicId, Product, join_ids};
use tracing::{debug, instrument};
use url::Url;

use super::cache::{CacheKey, CacheValue};
use super::{ApiError, PosApiClient};

const CATALOG_PATH: &str = "api/inventory/shoes/all";
const BRAND_SUGGESTIONS_PATH: &str = "api/inventory/brands/suggestions";
const SHOE_SUGGESTIONS_PATH: &str = "api/inventory/shoes/suggestions";

/// Server-side catalog query.
///
/// Brands match any selected id; categories and demographics are filtered by
/// the server. Empty lists and a blank search are omitted from the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub query: Option<String>,
    pub brand_ids: Vec<BrandId>,
    pub category_ids: Vec<CategoryId>,
    pub demographic_ids: Vec<DemographicId>,
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            query: None,
            brand_ids: Vec::new(),
            category_ids: Vec::new(),
            demographic_ids: Vec::new(),
            page: 1,
            limit: 100,
        }
    }
}

impl CatalogQuery {
    /// The same query for another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Append this query's parameters to `url`.
    fn apply_to(&self, url: &mut Url) {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("page", &self.page.max(1).to_string())
            .append_pair("limit", &self.limit.max(1).to_string());

        if let Some(query) = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            pairs.append_pair("query", query);
        }
        if !self.brand_ids.is_empty() {
            pairs.append_pair("brand_ids", &join_ids(&self.brand_ids));
        }
        if !self.category_ids.is_empty() {
            pairs.append_pair("category_ids", &join_ids(&self.category_ids));
        }
        if !self.demographic_ids.is_empty() {
            pairs.append_pair("demographic_ids", &join_ids(&self.demographic_ids));
        }
    }
}

/// One page of `/api/inventory/shoes/all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogPage {
    #[serde(default)]
    pub result: Vec<Product>,
    /// Total matching products across all pages.
    #[serde(default)]
    pub count: u64,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
}

/// Category and demographic lists for the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub demographics: Vec<Demographic>,
}

#[derive(Debug, Deserialize)]
struct BrandSuggestions {
    #[serde(default)]
    brands: Vec<Brand>,
}

impl PosApiClient {
    /// Fetch one page of the catalog, with variants, categories, and demographics embedded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the page cannot be parsed.
    #[instrument(skip(self, query), fields(page = query.page, limit = query.limit))]
    pub async fn fetch_catalog_page(&self, query: &CatalogQuery) -> Result<CatalogPage, ApiError> {
        let mut url = self.endpoint(CATALOG_PATH)?;
        query.apply_to(&mut url);

        let page: CatalogPage = self.get_json(url).await?;
        debug!(
            products = page.result.len(),
            count = page.count,
            pages = page.pages,
            "Fetched catalog page"
        );
        Ok(page)
    }

    /// List all brands for the brand filter. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let url = self.endpoint(BRAND_SUGGESTIONS_PATH)?;
        let BrandSuggestions { brands } = self.get_json(url).await?;

        self.inner
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    /// List categories and demographics for the filter panel. Cached for 5 minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self))]
    pub async fn filter_options(&self) -> Result<FilterOptions, ApiError> {
        if let Some(CacheValue::FilterOptions(options)) =
            self.inner.cache.get(&CacheKey::FilterOptions).await
        {
            debug!("Cache hit for filter options");
            return Ok(options);
        }

        let url = self.endpoint(SHOE_SUGGESTIONS_PATH)?;
        let options: FilterOptions = self.get_json(url).await?;

        self.inner
            .cache
            .insert(
                CacheKey::FilterOptions,
                CacheValue::FilterOptions(options.clone()),
            )
            .await;

        Ok(options)
    }
}
