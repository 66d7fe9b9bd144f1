use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;

use agrobill_core::CatalogEntry;

/// Parses a raw price cell: strips the currency symbol, thousands
/// separators, and surrounding whitespace. Negative and unparseable values
/// are rejected.
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let cleaned = raw.replace('₹', "").replace(',', "");
    let price = Decimal::from_str(cleaned.trim()).ok()?;
    (price >= Decimal::ZERO).then_some(price)
}

/// Cleans raw `(name, price)` rows into catalog entries: trims names, drops
/// rows with empty names or invalid prices, and deduplicates by name
/// keeping the first occurrence. Header rows drop out naturally because
/// their price cell does not parse.
pub fn clean(rows: impl IntoIterator<Item = (String, String)>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for (name, price) in rows {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let Some(unit_price) = parse_price(&price) else {
            continue;
        };
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        entries.push(CatalogEntry { name: name.to_string(), unit_price });
    }

    entries
}
