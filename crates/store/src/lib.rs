pub mod json;
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use agrobill_core::domain::bill::{Bill, BillDraft};
use agrobill_core::errors::DomainError;

pub use json::JsonBillStore;
pub use memory::MemoryBillStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error("could not read bill store `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not write bill store `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("bill store `{path}` is malformed: {source}")]
    Malformed { path: PathBuf, source: serde_json::Error },
    #[error("bill store encoding failed: {0}")]
    Encode(serde_json::Error),
}

impl StoreError {
    /// True for failures the clerk can fix by correcting input; false for
    /// persistence failures, after which the caller must keep the cart.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// The durable append-only collection of bills plus its read, search, and
/// append operations.
#[async_trait]
pub trait BillStore: Send + Sync {
    /// Validates the draft, assigns the next sequential id, stamps the save
    /// time, and appends the bill. Not idempotent: repeated calls create
    /// distinct bills with increasing ids.
    async fn save(&self, draft: BillDraft) -> Result<Bill, StoreError>;

    /// Every persisted bill in storage order, which equals id order.
    async fn get_all(&self) -> Result<Vec<Bill>, StoreError>;

    /// Case-insensitive substring match on the customer name, preserving
    /// storage order. An empty or whitespace needle returns all bills.
    /// Full scan; bill volume is retail-shop scale.
    async fn find_by_customer(&self, needle: &str) -> Result<Vec<Bill>, StoreError> {
        let needle = needle.trim().to_lowercase();
        let bills = self.get_all().await?;
        if needle.is_empty() {
            return Ok(bills);
        }
        Ok(bills
            .into_iter()
            .filter(|bill| bill.customer_name.to_lowercase().contains(&needle))
            .collect())
    }
}
