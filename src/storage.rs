//! JSON persistence of the item list over a [`BlobStore`].
//!
//! Loading never fails: a missing key, a corrupt blob, or an unavailable
//! store all read as an empty collection. Saving never fails either; a
//! failed write is logged and handed to the optional failure hook while the
//! in-memory collection stays authoritative for the session. A write lost
//! this way is not retried, so the next process start may see older data.

use thiserror::Error;

use crate::models::Item;
use crate::store::{BlobStore, StoreError};

/// Key the item list is stored under.
pub const STORAGE_KEY: &str = "randomItemSelector";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Blob store failed: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to serialize items: {0}")]
    Serialize(#[from] serde_json::Error),
}

type FailureHook = Box<dyn Fn(&PersistenceError) + Send + Sync>;

pub struct ItemStorage {
    store: Box<dyn BlobStore>,
    key: String,
    on_failure: Option<FailureHook>,
}

impl ItemStorage {
    pub fn new(store: impl BlobStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            key: STORAGE_KEY.to_string(),
            on_failure: None,
        }
    }

    /// Observe swallowed save failures without changing the no-error contract.
    pub fn with_failure_hook(
        mut self,
        hook: impl Fn(&PersistenceError) + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(hook));
        self
    }

    pub fn load(&self) -> Vec<Item> {
        let blob = match self.store.get(&self.key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read items, starting empty: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Item>>(&blob) {
            Ok(items) => {
                tracing::debug!("Loaded {} items", items.len());
                items
            }
            Err(e) => {
                tracing::warn!("Stored items are corrupt, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, items: &[Item]) {
        if let Err(e) = self.try_save(items) {
            tracing::error!("Failed to save items: {}", e);
            if let Some(hook) = &self.on_failure {
                hook(&e);
            }
        }
    }

    fn try_save(&self, items: &[Item]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(items)?;
        self.store.set(&self.key, &blob)?;
        tracing::debug!("Saved {} items", items.len());
        Ok(())
    }
}
