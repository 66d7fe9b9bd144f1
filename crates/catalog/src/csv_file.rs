use std::path::PathBuf;

use async_trait::async_trait;

use agrobill_core::CatalogEntry;

use crate::{rows, CatalogError, CatalogProvider};

/// Local spreadsheet provider: reads a CSV export with item names in the
/// first column and prices in the second. A header row is tolerated.
pub struct CsvCatalog {
    path: PathBuf,
}

impl CsvCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_rows(&self) -> Result<Vec<(String, String)>, CatalogError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| CatalogError::File { path: self.path.clone(), source })?;

        let mut raw = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|source| CatalogError::File { path: self.path.clone(), source })?;
            let name = record.get(0).unwrap_or_default().to_string();
            let price = record.get(1).unwrap_or_default().to_string();
            raw.push((name, price));
        }
        Ok(raw)
    }
}

#[async_trait]
impl CatalogProvider for CsvCatalog {
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        Ok(rows::clean(self.read_rows()?))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::CsvCatalog;
    use crate::{CatalogError, CatalogProvider};

    #[tokio::test]
    async fn fetch_reads_and_cleans_the_export() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.csv");
        fs::write(
            &path,
            "Item Name,Price\nMalathion 50EC,₹120.50\nNeem Oil,\"1,250.00\"\nBad Row,n/a\n",
        )
        .expect("write catalog");

        let entries = CsvCatalog::new(&path).fetch().await.expect("fetch catalog");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Malathion 50EC");
        assert_eq!(entries[0].unit_price, Decimal::new(12_050, 2));
        assert_eq!(entries[1].unit_price, Decimal::new(125_000, 2));
    }

    #[tokio::test]
    async fn missing_file_is_a_file_error_and_degrades_to_empty() {
        let dir = TempDir::new().expect("temp dir");
        let provider = CsvCatalog::new(dir.path().join("absent.csv"));

        let error = provider.fetch().await.expect_err("missing file");
        assert!(matches!(error, CatalogError::File { .. }));
        assert!(provider.fetch_or_empty().await.is_empty());
    }
}
