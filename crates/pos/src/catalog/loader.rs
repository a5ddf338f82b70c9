//! Sequenced catalog reloads.
//!
//! Every reload takes a ticket from a monotonic counter before it starts
//! fetching. When the fetch completes the result is installed only if no
//! newer ticket has been issued in the meantime, so a slow, stale response
//! can never overwrite the result of a request the user made later.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use super::Catalog;
use crate::api::{ApiError, CatalogPage, CatalogQuery, PosApiClient};

/// Something that serves catalog pages.
pub trait CatalogSource {
    /// Fetch one page of the catalog.
    fn fetch_page(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<CatalogPage, ApiError>> + Send;
}

impl CatalogSource for PosApiClient {
    fn fetch_page(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<CatalogPage, ApiError>> + Send {
        self.fetch_catalog_page(query)
    }
}

/// Fetch every page for `query`, starting at page 1.
///
/// Stops at the last page the server reports, or early if a page comes back
/// empty.
///
/// # Errors
///
/// Returns the first page fetch error.
pub async fn fetch_all_pages<S: CatalogSource + Sync>(
    source: &S,
    query: &CatalogQuery,
) -> Result<Catalog, ApiError> {
    let first = source.fetch_page(&query.with_page(1)).await?;
    let pages = first.pages.max(1);
    let mut products = first.result;

    for page in 2..=pages {
        let next = source.fetch_page(&query.with_page(page)).await?;
        if next.result.is_empty() {
            debug!(page, pages, "Empty catalog page, stopping early");
            break;
        }
        products.extend(next.result);
    }

    Ok(Catalog::new(products))
}

/// Sequence number of a reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReloadTicket(u64);

impl ReloadTicket {
    /// The raw sequence number.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// What happened to a completed reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The result was installed as the current catalog.
    Applied { sequence: u64, products: usize },
    /// A newer reload was issued while this one was in flight; result dropped.
    Superseded { sequence: u64, latest: u64 },
}

impl ReloadOutcome {
    /// Whether the reload's result became the current catalog.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Holds the current catalog and fences racing reloads.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct CatalogLoader {
    inner: Arc<LoaderInner>,
}

#[derive(Default)]
struct LoaderInner {
    /// Last issued sequence number (0 = none yet).
    issued: AtomicU64,
    installed: RwLock<Installed>,
}

#[derive(Default)]
struct Installed {
    sequence: u64,
    catalog: Arc<Catalog>,
}

impl CatalogLoader {
    /// Create a loader holding an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new reload. Invalidates all earlier tickets.
    pub fn begin(&self) -> ReloadTicket {
        ReloadTicket(self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Latest issued sequence number.
    #[must_use]
    pub fn latest(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    /// Install `catalog` if `ticket` is still the newest issued.
    pub async fn install(&self, ticket: ReloadTicket, catalog: Catalog) -> ReloadOutcome {
        let mut installed = self.inner.installed.write().await;

        // Checked under the write lock so two completions cannot both pass
        let latest = self.latest();
        if ticket.0 < latest || ticket.0 <= installed.sequence {
            debug!(sequence = ticket.0, latest, "Discarding stale catalog");
            return ReloadOutcome::Superseded {
                sequence: ticket.0,
                latest,
            };
        }

        let products = catalog.len();
        installed.sequence = ticket.0;
        installed.catalog = Arc::new(catalog);
        ReloadOutcome::Applied {
            sequence: ticket.0,
            products,
        }
    }

    /// Fetch the whole catalog for `query` and install it unless superseded.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the current catalog is left unchanged.
    #[instrument(skip(self, source, query))]
    pub async fn reload<S: CatalogSource + Sync>(
        &self,
        source: &S,
        query: &CatalogQuery,
    ) -> Result<ReloadOutcome, ApiError> {
        let ticket = self.begin();
        debug!(sequence = ticket.0, "Catalog reload started");

        let catalog = fetch_all_pages(source, query).await?;
        let outcome = self.install(ticket, catalog).await;

        if let ReloadOutcome::Applied { sequence, products } = outcome {
            info!(sequence, products, "Catalog loaded");
        }
        Ok(outcome)
    }

    /// The currently installed catalog.
    pub async fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.inner.installed.read().await.catalog)
    }

    /// Sequence number of the installed catalog (0 before the first load).
    pub async fn installed_sequence(&self) -> u64 {
        self.inner.installed.read().await.sequence
    }
}
