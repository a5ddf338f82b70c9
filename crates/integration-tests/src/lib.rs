//! Integration tests for the Shoe POS client.
//!
//! Tests drive the real `reqwest`-based [`PosApiClient`] against an in-process
//! `axum` mock of the inventory/sales REST service bound to an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shoe-pos-integration-tests
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockApi::start(MockData::with_products(vec![product(1, "Glide", 1, 100, 10, &[(5, 3)])])).await;
//! let client = mock.client();
//! let page = client.fetch_catalog_page(&CatalogQuery::default()).await?;
//! ```
//!
//! [`PosApiClient`]: shoe_pos::api::PosApiClient

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde_json::json;
use shoe_pos::api::{FilterOptions, PosApiClient};
use shoe_pos::config::ApiConfig;
use shoe_pos_core::{Brand, BrandId, Product, ShoeId, Variant, VariantId};
use tokio::task::JoinHandle;
use url::Url;

// =============================================================================
// Fixtures
// =============================================================================

/// A product with the given variants as `(variant_id, stock)` pairs.
#[must_use]
pub fn product(
    id: i32,
    name: &str,
    brand_id: i32,
    price: i64,
    markup: i64,
    variants: &[(i32, i32)],
) -> Product {
    Product {
        shoe_id: ShoeId::new(id),
        shoe_name: name.to_string(),
        brand_id: BrandId::new(brand_id),
        brand_name: format!("Brand {brand_id}"),
        shoe_price: Decimal::new(price, 0),
        markup: Decimal::new(markup, 0),
        first_sale_at: None,
        created_at: None,
        categories: Vec::new(),
        demographics: Vec::new(),
        variants: variants
            .iter()
            .map(|&(variant_id, stock)| Variant {
                variant_id: VariantId::new(variant_id),
                shoe_id: Some(ShoeId::new(id)),
                size_id: None,
                us_size: Some(Decimal::new(95, 1)),
                uk_size: Some(Decimal::new(85, 1)),
                eu_size: Some(Decimal::new(43, 0)),
                variant_stock: stock,
            })
            .collect(),
    }
}

/// A per-test data directory, removed on drop.
pub struct ScratchDir {
    root: PathBuf,
    store_path: PathBuf,
}

impl ScratchDir {
    /// A directory named after the test; nothing is created until a store opens it.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("shoe-pos-it-{}-{name}", std::process::id()));
        let store_path = root.join("storage.json");
        Self { root, store_path }
    }

    /// Location of the persisted key-value store.
    #[must_use]
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

/// Data served by the mock.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub products: Vec<Product>,
    pub brands: Vec<Brand>,
    pub filter_options: FilterOptions,
}

impl MockData {
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            products,
            ..Self::default()
        }
    }
}

// =============================================================================
// Mock API
// =============================================================================

/// How the sale endpoint answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaleMode {
    /// `200 {"success": true}`
    #[default]
    Accept,
    /// `200 {"success": false, "message": ..}`
    Reject(String),
    /// `500 {"detail": ..}`
    ServerError,
}

#[derive(Default)]
struct MockState {
    data: Mutex<MockData>,
    sale_mode: Mutex<SaleMode>,
    sales: Mutex<Vec<HashMap<String, String>>>,
    catalog_requests: Mutex<Vec<HashMap<String, String>>>,
    search_delays: Mutex<HashMap<String, Duration>>,
    suggestion_hits: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process mock of the inventory/sales REST service.
///
/// The server task is aborted on drop.
pub struct MockApi {
    pub base_url: Url,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockApi {
    /// Bind to an ephemeral port on localhost and start serving `data`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(data: MockData) -> Self {
        let state = Arc::new(MockState {
            data: Mutex::new(data),
            ..MockState::default()
        });

        let app = Router::new()
            .route("/api/inventory/shoes/all", get(catalog_page))
            .route("/api/inventory/brands/suggestions", get(brand_suggestions))
            .route("/api/inventory/shoes/suggestions", get(shoe_suggestions))
            .route("/api/sales/add", post(add_sale))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind mock listener: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock local addr: {e}"));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}/"))
            .unwrap_or_else(|e| panic!("mock base url: {e}"));
        Self {
            base_url,
            state,
            server,
        }
    }

    /// Client configuration pointing at this mock.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        let mut config = ApiConfig::new(self.base_url.clone());
        config.timeout = Duration::from_secs(5);
        config
    }

    /// A real API client pointing at this mock.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> PosApiClient {
        PosApiClient::new(&self.api_config()).unwrap_or_else(|e| panic!("build client: {e}"))
    }

    /// Replace the served products.
    pub fn set_products(&self, products: Vec<Product>) {
        lock(&self.state.data).products = products;
    }

    /// Change how the sale endpoint answers.
    pub fn set_sale_mode(&self, mode: SaleMode) {
        *lock(&self.state.sale_mode) = mode;
    }

    /// Delay every catalog page requested with search text `query`.
    pub fn delay_search(&self, query: &str, delay: Duration) {
        lock(&self.state.search_delays).insert(query.to_string(), delay);
    }

    /// Form bodies received by the sale endpoint, in arrival order.
    #[must_use]
    pub fn sales(&self) -> Vec<HashMap<String, String>> {
        lock(&self.state.sales).clone()
    }

    /// Query parameters of every catalog request, in arrival order.
    #[must_use]
    pub fn catalog_requests(&self) -> Vec<HashMap<String, String>> {
        lock(&self.state.catalog_requests).clone()
    }

    /// Requests served by the suggestion endpoints.
    #[must_use]
    pub fn suggestion_hits(&self) -> usize {
        self.state.suggestion_hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

type Shared = State<Arc<MockState>>;

async fn catalog_page(
    State(state): Shared,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    lock(&state.catalog_requests).push(params.clone());

    let search = params.get("query").map(|q| q.to_lowercase());
    let delay = search
        .as_ref()
        .and_then(|q| lock(&state.search_delays).get(q).copied());
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(100)
        .max(1);
    let brand_ids: Vec<BrandId> = params
        .get("brand_ids")
        .map(|ids| ids.split(',').filter_map(|id| id.parse().ok()).collect())
        .unwrap_or_default();

    let matching: Vec<Product> = lock(&state.data)
        .products
        .iter()
        .filter(|p| {
            search
                .as_ref()
                .is_none_or(|q| p.shoe_name.to_lowercase().contains(q))
        })
        .filter(|p| brand_ids.is_empty() || brand_ids.contains(&p.brand_id))
        .cloned()
        .collect();

    let count = matching.len();
    let pages = count.div_ceil(limit);
    let result: Vec<Product> = matching
        .into_iter()
        .skip((page - 1) * limit)
        .take(limit)
        .collect();

    Json(json!({ "result": result, "count": count, "pages": pages })).into_response()
}

async fn brand_suggestions(State(state): Shared) -> Response {
    state.suggestion_hits.fetch_add(1, Ordering::SeqCst);
    let brands = lock(&state.data).brands.clone();
    Json(json!({ "brands": brands })).into_response()
}

async fn shoe_suggestions(State(state): Shared) -> Response {
    state.suggestion_hits.fetch_add(1, Ordering::SeqCst);
    let options = lock(&state.data).filter_options.clone();
    Json(options).into_response()
}

async fn add_sale(State(state): Shared, Form(form): Form<HashMap<String, String>>) -> Response {
    lock(&state.sales).push(form);

    let mode = lock(&state.sale_mode).clone();
    match mode {
        SaleMode::Accept => Json(json!({ "success": true, "message": "Sale recorded" })).into_response(),
        SaleMode::Reject(message) => {
            Json(json!({ "success": false, "message": message })).into_response()
        }
        SaleMode::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "Database error" })),
        )
            .into_response(),
    }
}
