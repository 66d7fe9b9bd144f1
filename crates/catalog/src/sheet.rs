use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use agrobill_core::config::SheetConfig;
use agrobill_core::CatalogEntry;

use crate::{rows, CatalogError, CatalogProvider};

/// Remote shared-spreadsheet provider: reads the first two columns of the
/// configured range through the sheet values API.
#[derive(Debug)]
pub struct SheetCatalog {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    api_key: SecretString,
}

#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetCatalog {
    pub fn from_config(config: &SheetConfig) -> Result<Self, CatalogError> {
        let spreadsheet_id = config
            .spreadsheet_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                CatalogError::Configuration(
                    "sheet source requires catalog.sheet.spreadsheet_id".to_string(),
                )
            })?;
        let api_key = config.api_key.clone().ok_or_else(|| {
            CatalogError::Configuration("sheet source requires catalog.sheet.api_key".to_string())
        })?;

        Ok(Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            spreadsheet_id,
            range: config.range.clone(),
            api_key,
        })
    }

    fn values_url(&self) -> String {
        format!("{}/v4/spreadsheets/{}/values/{}", self.base_url, self.spreadsheet_id, self.range)
    }
}

#[async_trait]
impl CatalogProvider for SheetCatalog {
    async fn fetch(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let response = self
            .client
            .get(self.values_url())
            .query(&[("key", self.api_key.expose_secret())])
            .send()
            .await?
            .error_for_status()?;

        let payload: ValueRange = response.json().await?;
        Ok(entries_from_values(payload.values))
    }
}

fn entries_from_values(values: Vec<Vec<String>>) -> Vec<CatalogEntry> {
    rows::clean(values.into_iter().filter_map(|row| {
        let mut cells = row.into_iter();
        let name = cells.next()?;
        let price = cells.next()?;
        Some((name, price))
    }))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use agrobill_core::config::SheetConfig;

    use super::{entries_from_values, SheetCatalog, ValueRange};
    use crate::CatalogError;

    fn sheet_config() -> SheetConfig {
        SheetConfig {
            base_url: "https://sheets.googleapis.com/".to_string(),
            spreadsheet_id: Some("sheet-123".to_string()),
            range: "Sheet1!A:B".to_string(),
            api_key: Some("key-123".to_string().into()),
        }
    }

    #[test]
    fn value_range_payload_parses_and_cleans() {
        let raw = r#"{
            "range": "Sheet1!A1:B4",
            "values": [
                ["Item Name", "Price"],
                ["Malathion 50EC", "₹120.50"],
                ["Short Row"],
                ["Neem Oil", "99.50"]
            ]
        }"#;

        let payload: ValueRange = serde_json::from_str(raw).expect("parse value range");
        let entries = entries_from_values(payload.values);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Malathion 50EC");
        assert_eq!(entries[1].unit_price, Decimal::new(9_950, 2));
    }

    #[test]
    fn payload_without_values_parses_to_empty() {
        let payload: ValueRange = serde_json::from_str("{}").expect("parse empty payload");
        assert!(entries_from_values(payload.values).is_empty());
    }

    #[test]
    fn from_config_builds_the_values_url() {
        let provider = SheetCatalog::from_config(&sheet_config()).expect("build provider");
        assert_eq!(
            provider.values_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/Sheet1!A:B"
        );
    }

    #[test]
    fn from_config_rejects_missing_credentials() {
        let mut config = sheet_config();
        config.api_key = None;

        let error = SheetCatalog::from_config(&config).expect_err("missing api key");
        assert!(matches!(error, CatalogError::Configuration(_)));
    }
}
