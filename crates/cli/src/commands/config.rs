use secrecy::{ExposeSecret, SecretString};

use agrobill_core::config::{AppConfig, CatalogSource, LoadOptions};

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let source = match config.catalog.source {
        CatalogSource::File => "file",
        CatalogSource::Sheet => "sheet",
    };

    let lines = vec![
        "effective config (source precedence: overrides > env > file > default):".to_string(),
        format!("store.bills_path = {}", config.store.bills_path.display()),
        format!("catalog.source = {source}"),
        format!("catalog.file_path = {}", config.catalog.file_path.display()),
        format!("catalog.sheet.base_url = {}", config.catalog.sheet.base_url),
        format!(
            "catalog.sheet.spreadsheet_id = {}",
            config.catalog.sheet.spreadsheet_id.as_deref().unwrap_or("<unset>")
        ),
        format!("catalog.sheet.range = {}", config.catalog.sheet.range),
        format!(
            "catalog.sheet.api_key = {}",
            redact_key(config.catalog.sheet.api_key.as_ref())
        ),
        format!("logging.level = {}", config.logging.level),
        format!("logging.format = {:?}", config.logging.format),
    ];

    lines.join("\n")
}

fn redact_key(key: Option<&SecretString>) -> String {
    match key {
        None => "<unset>".to_string(),
        Some(key) => {
            let exposed = key.expose_secret();
            let prefix: String = exposed.chars().take(4).collect();
            format!("{prefix}****")
        }
    }
}
