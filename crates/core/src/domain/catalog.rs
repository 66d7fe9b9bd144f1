use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One purchasable item as supplied by a catalog source. The core treats
/// entries as read-only; cleaning and deduplication happen at the source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub unit_price: Decimal,
}
