use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Local;
use tokio::fs;

use agrobill_core::domain::bill::{Bill, BillDraft};

use crate::{BillStore, StoreError};

/// File-backed bill store: one JSON array of bill objects, rewritten in
/// full on every save. Read-modify-write with no locking; a single writer
/// is assumed.
pub struct JsonBillStore {
    path: PathBuf,
}

impl JsonBillStore {
    /// Opens the store at `path`, creating parent directories and
    /// initializing the file to an empty array when absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|source| StoreError::Write { path: path.clone(), source })?;
            }
        }

        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                fs::write(&path, b"[]")
                    .await
                    .map_err(|source| StoreError::Write { path: path.clone(), source })?;
                tracing::debug!(path = %path.display(), "initialized empty bill store");
            }
            Err(source) => return Err(StoreError::Read { path, source }),
        }

        Ok(Self { path })
    }

    async fn load(&self) -> Result<Vec<Bill>, StoreError> {
        let raw = fs::read_to_string(&self.path)
            .await
            .map_err(|source| StoreError::Read { path: self.path.clone(), source })?;
        serde_json::from_str(&raw)
            .map_err(|source| StoreError::Malformed { path: self.path.clone(), source })
    }

    /// Rewrites the whole collection through a sibling temp file and a
    /// rename, so a failed write never truncates the existing store.
    async fn persist(&self, bills: &[Bill]) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(bills).map_err(StoreError::Encode)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)
            .await
            .map_err(|source| StoreError::Write { path: tmp.clone(), source })?;
        fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| StoreError::Write { path: self.path.clone(), source })
    }
}

#[async_trait]
impl BillStore for JsonBillStore {
    async fn save(&self, draft: BillDraft) -> Result<Bill, StoreError> {
        draft.validate()?;

        let mut bills = self.load().await?;
        // `count + 1` id assignment collides under concurrent writers.
        let id = bills.len() as u64 + 1;
        let bill = Bill::from_draft(draft, id, Local::now().naive_local());

        bills.push(bill.clone());
        self.persist(&bills).await?;

        Ok(bill)
    }

    async fn get_all(&self) -> Result<Vec<Bill>, StoreError> {
        self.load().await
    }
}
