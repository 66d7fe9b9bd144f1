use agrobill_catalog::provider_from_config;
use agrobill_core::config::{AppConfig, LoadOptions};
use agrobill_core::CatalogEntry;

use crate::commands::CommandResult;

pub fn run(search: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult {
                exit_code: 2,
                output: format!("config validation failed: {error}"),
            };
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult {
                exit_code: 3,
                output: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    runtime.block_on(async {
        let provider = match provider_from_config(&config.catalog) {
            Ok(provider) => provider,
            Err(error) => {
                return CommandResult {
                    exit_code: 4,
                    output: format!("catalog source unavailable: {error}"),
                };
            }
        };

        let entries = provider.fetch_or_empty().await;
        CommandResult { exit_code: 0, output: render(&entries, search) }
    })
}

fn render(entries: &[CatalogEntry], search: Option<&str>) -> String {
    let needle = search.unwrap_or_default().trim().to_lowercase();
    let visible: Vec<&CatalogEntry> = entries
        .iter()
        .filter(|entry| needle.is_empty() || entry.name.to_lowercase().contains(&needle))
        .collect();

    if visible.is_empty() {
        return if needle.is_empty() {
            "catalog is empty".to_string()
        } else {
            format!("no catalog items match `{needle}`")
        };
    }

    let mut lines = vec![format!("{} item(s):", visible.len())];
    for entry in visible {
        lines.push(format!("  {}  \u{20b9}{}", entry.name, entry.unit_price));
    }
    lines.join("\n")
}
