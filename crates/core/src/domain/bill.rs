use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::errors::DomainError;

/// One catalog item plus a quantity, inside a cart or a saved bill.
///
/// Serialized as `{name, price, quantity}` inside a bill's `items` array.
/// Quantity never persists at zero; a cart decrement that reaches zero
/// removes the line instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    #[serde(rename = "price", with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Validated input to a bill store save: a cart snapshot plus the
/// customer/date header supplied by the clerk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillDraft {
    pub customer_name: String,
    pub date: NaiveDate,
    pub items: Vec<LineItem>,
    pub total_amount: Decimal,
}

impl BillDraft {
    pub fn from_cart(customer_name: impl Into<String>, date: NaiveDate, cart: &Cart) -> Self {
        Self {
            customer_name: customer_name.into(),
            date,
            items: cart.snapshot(),
            total_amount: cart.total(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::MissingCustomerName);
        }
        if self.items.is_empty() {
            return Err(DomainError::EmptyItems);
        }
        Ok(())
    }
}

/// An immutable, durably stored record of a completed sale.
///
/// The persisted layout is the on-disk contract: `id`, `customer_name`,
/// `date` (`YYYY-MM-DD`), `items`, `total_amount` (exact JSON number), and
/// `timestamp` (`YYYY-MM-DD HH:MM:SS`, local wall clock at save).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub id: u64,
    pub customer_name: String,
    pub date: NaiveDate,
    pub items: Vec<LineItem>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    #[serde(rename = "timestamp", with = "wall_clock")]
    pub created_at: NaiveDateTime,
}

impl Bill {
    /// Stamps a validated draft with its store-assigned id and save time.
    pub fn from_draft(draft: BillDraft, id: u64, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            customer_name: draft.customer_name,
            date: draft.date,
            items: draft.items,
            total_amount: draft.total_amount,
            created_at,
        }
    }
}

mod wall_clock {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        value: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
