use async_trait::async_trait;
use chrono::Local;
use tokio::sync::RwLock;

use agrobill_core::domain::bill::{Bill, BillDraft};

use crate::{BillStore, StoreError};

/// In-memory bill store with the same id and validation semantics as the
/// file-backed store, minus durability. Test and embedding double.
#[derive(Default)]
pub struct MemoryBillStore {
    bills: RwLock<Vec<Bill>>,
}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn save(&self, draft: BillDraft) -> Result<Bill, StoreError> {
        draft.validate()?;

        let mut bills = self.bills.write().await;
        let id = bills.len() as u64 + 1;
        let bill = Bill::from_draft(draft, id, Local::now().naive_local());
        bills.push(bill.clone());

        Ok(bill)
    }

    async fn get_all(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.bills.read().await.clone())
    }
}
