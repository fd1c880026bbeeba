//! JSON file catalog.
//!
//! The file is an array of objects with `Id`, `Name` and `Price` keys. Key
//! matching is case-insensitive (`id`, `NAME`, `Price` all work); missing keys
//! fall back to zero / empty values.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::source::{CatalogError, CatalogSource};
use crate::Product;

/// Relative location of the catalog below the application base directory.
pub const PRODUCTS_RELATIVE_PATH: [&str; 2] = ["Data", "products.json"];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProductRecord {
    id: i64,
    name: String,
    price: Decimal,
}

impl From<ProductRecord> for Product {
    fn from(record: ProductRecord) -> Self {
        Product::new(record.id, record.name, record.price)
    }
}

/// Parse a catalog document. A literal `null` document yields no products.
pub fn parse_products(bytes: &[u8]) -> Result<Vec<Product>, CatalogError> {
    let records: Option<Vec<Map<String, Value>>> = serde_json::from_slice(bytes)?;

    records
        .unwrap_or_default()
        .into_iter()
        .map(|record| -> Result<Product, CatalogError> {
            let normalized: Map<String, Value> = record
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect();
            let record: ProductRecord = serde_json::from_value(Value::Object(normalized))?;
            Ok(Product::from(record))
        })
        .collect()
}

/// Catalog backed by a JSON file on disk.
///
/// Candidate paths are tried in order; the first one that exists is read. When
/// none exists the catalog is simply empty.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    candidates: Vec<PathBuf>,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
        }
    }

    /// `<base_dir>/Data/products.json`.
    pub fn in_base_dir(base_dir: impl AsRef<Path>) -> Self {
        Self::new(products_path(base_dir))
    }

    /// Also try `path` if the earlier candidates are missing.
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.candidates.push(path.into());
        self
    }

    /// Read and parse the first existing candidate.
    pub async fn read(&self) -> Result<Vec<Product>, CatalogError> {
        for path in &self.candidates {
            let exists = tokio::fs::try_exists(path).await.unwrap_or(false);
            if !exists {
                tracing::debug!(path = %path.display(), "catalog candidate missing");
                continue;
            }

            let bytes = tokio::fs::read(path).await.map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let products = parse_products(&bytes)?;
            tracing::info!(path = %path.display(), count = products.len(), "catalog loaded");
            return Ok(products);
        }

        Ok(Vec::new())
    }
}

#[async_trait(?Send)]
impl CatalogSource for JsonCatalog {
    async fn load_products(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.read().await?)
    }
}

/// `<base_dir>/Data/products.json`.
pub fn products_path(base_dir: impl AsRef<Path>) -> PathBuf {
    PRODUCTS_RELATIVE_PATH
        .iter()
        .fold(base_dir.as_ref().to_path_buf(), |path, part| path.join(part))
}
