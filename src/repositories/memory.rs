use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::crypto::aes::NONCE_SIZE;
use crate::models::record::TokenRecord;
use crate::repositories::store::{RecordStore, StoreError};

#[derive(Default)]
struct Tables {
    records: HashMap<String, TokenRecord>,
    nonces: HashSet<[u8; NONCE_SIZE]>,
}

/// A process-local record store.
///
/// Keeps the same uniqueness rules as the PostgreSQL store but nothing
/// survives a restart. Used by tests and local development.
#[derive(Clone, Default)]
pub struct MemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRecordStore {
    /// Creates a new, empty `MemoryRecordStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.tables.read().await.records.len()
    }

    /// Returns `true` if no records are stored.
    pub async fn is_empty(&self) -> bool {
        self.tables.read().await.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &TokenRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if tables.records.contains_key(&record.token) {
            return Err(StoreError::DuplicateToken);
        }
        if tables.nonces.contains(&record.nonce) {
            return Err(StoreError::DuplicateNonce);
        }

        tables.nonces.insert(record.nonce);
        tables.records.insert(record.token.clone(), record.clone());
        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<TokenRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.records.get(token).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(token: &str, nonce_byte: u8) -> TokenRecord {
        TokenRecord {
            token: token.to_string(),
            ciphertext: vec![1, 2, 3],
            nonce: [nonce_byte; NONCE_SIZE],
            pan_length: 16,
            first6: "411111".to_string(),
            last4: "1111".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn read_after_write() {
        let store = MemoryRecordStore::new();
        assert!(store.is_empty().await);

        let written = record("tok-a", 1);
        store.insert(&written).await.unwrap();

        let found = store.get_by_token("tok-a").await.unwrap().unwrap();
        assert_eq!(found, written);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn missing_token_is_none() {
        let store = MemoryRecordStore::new();
        assert!(store.get_by_token("does-not-exist").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_token_is_rejected_without_overwrite() {
        let store = MemoryRecordStore::new();
        store.insert(&record("tok-a", 1)).await.unwrap();

        let mut other = record("tok-a", 2);
        other.last4 = "9999".to_string();
        assert!(matches!(
            store.insert(&other).await,
            Err(StoreError::DuplicateToken)
        ));

        let kept = store.get_by_token("tok-a").await.unwrap().unwrap();
        assert_eq!(kept.last4, "1111");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn duplicate_nonce_is_rejected() {
        let store = MemoryRecordStore::new();
        store.insert(&record("tok-a", 7)).await.unwrap();
        assert!(matches!(
            store.insert(&record("tok-b", 7)).await,
            Err(StoreError::DuplicateNonce)
        ));
        assert!(store.get_by_token("tok-b").await.unwrap().is_none());
    }
}
