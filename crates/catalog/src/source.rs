//! Catalog source contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::Product;

/// Failure while reading a catalog.
///
/// The workspace swallows these (it starts with an empty product list), but
/// sources report them so the host can log what went wrong.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Asynchronous provider of the initial product set.
///
/// Runs on the workspace's local task set, hence `?Send`.
#[async_trait(?Send)]
pub trait CatalogSource {
    async fn load_products(&self) -> anyhow::Result<Vec<Product>>;
}

/// In-memory catalog, handy for hosts that embed their own menu and for tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait(?Send)]
impl CatalogSource for StaticCatalog {
    async fn load_products(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.products.clone())
    }
}
