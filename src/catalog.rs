//! Catalog sources
//!
//! The catalog of adoptable cats is reference data: it is loaded, never
//! edited. It can come from the collection API (see
//! [`crate::remote::HttpCartApi`]), from a JSON file on disk, or from a
//! fixed list.

use crate::cart::models::CatalogItem;
use crate::error::CatalogError;
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::instrument;

/// Anything that can produce the list of adoptable cats.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, CatalogError>;
}

/// Reads the catalog from a JSON array on disk, e.g. a `cats.json` shipped
/// with the storefront.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    path: PathBuf,
}

impl StaticCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        let raw = tokio::fs::read_to_string(&self.path).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// A catalog fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct InlineCatalog {
    items: Vec<CatalogItem>,
}

impl InlineCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl CatalogSource for InlineCatalog {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogItem>, CatalogError> {
        Ok(self.items.clone())
    }
}
