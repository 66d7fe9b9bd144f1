pub mod csv_file;
pub mod rows;
pub mod sheet;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use agrobill_core::config::{CatalogConfig, CatalogSource};
use agrobill_core::CatalogEntry;

pub use csv_file::CsvCatalog;
pub use sheet::SheetCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    File { path: PathBuf, source: csv::Error },
    #[error("catalog request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("catalog configuration incomplete: {0}")]
    Configuration(String),
}

/// External source of purchasable item names and prices. The billing core
/// never cares which implementation supplied the entries.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Retrieves and cleans the catalog: trimmed names, parsed non-negative
    /// prices, duplicates dropped.
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError>;

    /// The consumer contract: any failure degrades to an empty catalog
    /// after logging, and the presentation layer must tolerate it.
    async fn fetch_or_empty(&self) -> Vec<CatalogEntry> {
        match self.fetch().await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(%error, "catalog fetch failed, continuing with an empty catalog");
                Vec::new()
            }
        }
    }
}

/// Selects the provider implementation from configuration rather than code
/// branching in the core.
pub fn provider_from_config(
    config: &CatalogConfig,
) -> Result<Box<dyn CatalogProvider>, CatalogError> {
    match config.source {
        CatalogSource::File => Ok(Box::new(CsvCatalog::new(config.file_path.clone()))),
        CatalogSource::Sheet => Ok(Box::new(SheetCatalog::from_config(&config.sheet)?)),
    }
}
