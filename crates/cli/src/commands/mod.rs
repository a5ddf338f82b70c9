//! Subcommand implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;

use std::io::{self, Write};
use std::sync::Arc;

use shoe_pos::PosError;
use shoe_pos::api::{CatalogQuery, PosApiClient};
use shoe_pos::cart::Cart;
use shoe_pos::catalog::{Catalog, CatalogLoader};
use shoe_pos::config::PosConfig;
use shoe_pos::render::CartPanel;
use shoe_pos::store::FileStore;

/// Everything a command needs: configuration, API client, and catalog.
pub struct Session {
    pub config: PosConfig,
    pub client: PosApiClient,
    pub loader: CatalogLoader,
}

impl Session {
    pub fn new(config: PosConfig) -> Result<Self, PosError> {
        let client = PosApiClient::new(&config.api)?;
        Ok(Self {
            config,
            client,
            loader: CatalogLoader::new(),
        })
    }

    /// Load every catalog page and return the installed snapshot.
    pub async fn load_catalog(&self) -> Result<Arc<Catalog>, PosError> {
        let query = CatalogQuery {
            limit: self.config.catalog_page_size,
            ..CatalogQuery::default()
        };
        self.loader.reload(&self.client, &query).await?;
        Ok(self.loader.snapshot().await)
    }

    /// Like [`Self::load_catalog`], but an unreachable API yields an empty
    /// catalog. Lines then render as orphans and stock increases are refused.
    pub async fn catalog_or_empty(&self) -> Arc<Catalog> {
        match self.load_catalog().await {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::warn!(error = %e, "Catalog unavailable, continuing without it");
                Arc::new(Catalog::empty())
            }
        }
    }

    /// Open the persisted cart without rendering it.
    pub fn open_cart(&self) -> Result<Cart<FileStore>, PosError> {
        let store = FileStore::open(self.config.store_path())?;
        Ok(Cart::load(store))
    }

    /// Open the persisted cart with a hook that redraws the cart panel on
    /// every change.
    pub fn open_rendered_cart(&self, catalog: Arc<Catalog>) -> Result<Cart<FileStore>, PosError> {
        let mut cart = self.open_cart()?;
        let currency = self.config.currency;
        cart.set_render_hook(Box::new(move |lines| {
            let summary = shoe_pos::cart::summarize(lines, &catalog);
            let mut out = io::stdout().lock();
            if let Err(e) = write!(out, "{}", CartPanel::new(&summary, currency)) {
                tracing::warn!(error = %e, "Failed to draw cart panel");
            }
        }));
        Ok(cart)
    }
}

/// Convert a 1-based line number from the operator into a cart index.
pub fn line_index(line: usize) -> Result<usize, PosError> {
    line.checked_sub(1)
        .ok_or_else(|| PosError::Input("line numbers start at 1".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use shoe_pos::config::{ApiConfig, LogFormat};
    use shoe_pos_core::{CurrencyCode, UserId};
    use url::Url;

    use super::*;

    /// Data directory removed on drop.
    pub(crate) struct ScratchDir(PathBuf);

    impl ScratchDir {
        pub(crate) fn new(name: &str) -> Self {
            Self(std::env::temp_dir().join(format!("pos-cli-{}-{name}", std::process::id())))
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    /// A session whose API listens nowhere.
    pub(crate) fn offline_session(dir: &ScratchDir) -> Session {
        let mut api = ApiConfig::new(Url::parse("http://127.0.0.1:9/").unwrap());
        api.timeout = Duration::from_secs(2);
        Session::new(PosConfig {
            api,
            cashier_id: UserId::new(1),
            data_dir: dir.0.clone(),
            catalog_page_size: 100,
            currency: CurrencyCode::PHP,
            log_format: LogFormat::Text,
            sentry_dsn: None,
            sentry_environment: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_api_gives_empty_catalog() {
        let dir = ScratchDir::new("empty-catalog");
        let session = offline_session(&dir);

        assert!(session.load_catalog().await.is_err());
        assert!(session.catalog_or_empty().await.is_empty());
    }

    #[test]
    fn test_line_index() {
        assert_eq!(line_index(1).unwrap(), 0);
        assert_eq!(line_index(4).unwrap(), 3);
        assert!(matches!(line_index(0), Err(PosError::Input(_))));
    }
}
