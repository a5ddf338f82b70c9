//! Inventory and sales REST API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`; the sale endpoint takes a form body
//! - The inventory service is the source of truth; nothing is synced locally
//!   except the cart
//! - In-memory caching via `moka` for filter suggestion lists (5 minute TTL)
//!
//! # Endpoints
//!
//! | Method | Path | Used by |
//! |---|---|---|
//! | GET | `/api/inventory/shoes/all` | [`PosApiClient::fetch_catalog_page`] |
//! | GET | `/api/inventory/brands/suggestions` | [`PosApiClient::brands`] |
//! | GET | `/api/inventory/shoes/suggestions` | [`PosApiClient::filter_options`] |
//! | POST | `/api/sales/add` | [`PosApiClient::record_sale`] |
//!
//! # Example
//!
//! ```rust,ignore
//! use shoe_pos::api::{CatalogQuery, PosApiClient};
//!
//! let client = PosApiClient::new(&config.api)?;
//! let page = client.fetch_catalog_page(&CatalogQuery::default()).await?;
//! ```

mod cache;
mod inventory;
mod sales;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::StatusCode;
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

use cache::{CacheKey, CacheValue};

pub use inventory::{CatalogPage, CatalogQuery, FilterOptions};
pub use sales::{SaleRecorder, SaleSubmission};

/// Maximum characters of a response body echoed into errors and logs.
const BODY_EXCERPT_CHARS: usize = 200;

/// Errors that can occur when talking to the inventory/sales API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// API answered 2xx but reported `success: false`.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Client could not be configured.
    #[error("Client configuration error: {0}")]
    Config(String),
}

/// `{success, message}` envelope returned by mutating endpoints.
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
}

/// Error body shapes: `{success, message}` from the app, `{detail}` from the framework.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    detail: Option<serde_json::Value>,
}

// =============================================================================
// PosApiClient
// =============================================================================

/// Client for the inventory/sales REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct PosApiClient {
    inner: Arc<PosApiClientInner>,
}

struct PosApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl PosApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the session cookie is not a valid header
    /// value, or `ApiError::Http` if the HTTP client fails to build.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = config.cookie_header() {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::Config(format!("invalid session cookie: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(PosApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Resolve an endpoint path against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    /// GET a JSON document.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.inner.client.get(url).send().await?;
        let body = read_success_body(response).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// POST a form to a mutating endpoint and check its `{success, message}` envelope.
    async fn post_form(&self, url: Url, form: &[(&str, String)]) -> Result<String, ApiError> {
        let response = self.inner.client.post(url).form(form).send().await?;
        let body = read_success_body(response).await?;

        // Some deployments answer with an empty 2xx body
        if body.trim().is_empty() {
            return Ok(String::new());
        }

        let envelope: ActionResponse = serde_json::from_str(&body)?;
        if envelope.success {
            Ok(envelope.message)
        } else {
            Err(ApiError::Rejected(envelope.message))
        }
    }
}

/// Read the body of a response, mapping non-success statuses to errors.
async fn read_success_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    // Get response body as text first for better error diagnostics
    let body = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            body = %excerpt(&body),
            "API returned non-success status"
        );
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    Ok(body)
}

/// Pull a human-readable message out of an error body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            detail: Some(serde_json::Value::String(detail)),
            ..
        }) => detail,
        Ok(ErrorBody {
            detail: Some(detail),
            ..
        }) => detail.to_string(),
        _ if body.trim().is_empty() => "(empty response body)".to_string(),
        _ => excerpt(body),
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> PosApiClient {
        PosApiClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Api {
            status: 400,
            message: "shoe_name is empty.".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 400 - shoe_name is empty.");
        assert_eq!(
            ApiError::RateLimited(60).to_string(),
            "Rate limited, retry after 60 seconds"
        );
    }

    #[test]
    fn test_error_message_prefers_message_field() {
        let body = r#"{"success": false, "message": "variant 9 not found"}"#;
        assert_eq!(error_message(body), "variant 9 not found");
    }

    #[test]
    fn test_error_message_reads_detail() {
        assert_eq!(
            error_message(r#"{"detail": "Unauthorized Access"}"#),
            "Unauthorized Access"
        );
        assert!(error_message(r#"{"detail": [{"loc": ["body", "items"]}]}"#).contains("items"));
    }

    #[test]
    fn test_error_message_falls_back_to_excerpt() {
        assert_eq!(error_message(""), "(empty response body)");
        let long = "x".repeat(500);
        assert_eq!(error_message(&long).len(), BODY_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn test_endpoint_joins_under_base_path() {
        let client = client("http://localhost:8000/pos/");
        assert_eq!(
            client.endpoint("/api/sales/add").unwrap().as_str(),
            "http://localhost:8000/pos/api/sales/add"
        );
    }

    #[test]
    fn test_rejects_unprintable_cookie() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:8000/").unwrap());
        config.session_cookie = Some(secrecy::SecretString::from("session=a\nb"));
        assert!(matches!(
            PosApiClient::new(&config),
            Err(ApiError::Config(_))
        ));
    }
}
