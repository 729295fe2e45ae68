//! The storage contract for token records.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::record::TokenRecord;

/// Errors produced by a record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with the same token already exists.
    #[error("duplicate token")]
    DuplicateToken,

    /// A record with the same nonce already exists.
    #[error("duplicate nonce")]
    DuplicateNonce,

    /// A stored row could not be mapped back to a record.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// A database error.
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// The connection pool could not hand out a connection.
    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The connection pool could not be built.
    #[error("connection pool build error: {0}")]
    PoolBuild(#[from] deadpool_postgres::BuildError),
}

/// Durable mapping from token to [`TokenRecord`].
///
/// Implementations must make `insert` atomic: either the whole record is
/// committed or nothing is. Once `insert` returns `Ok`, `get_by_token` must
/// observe the record. There is no update or delete.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with [`StoreError::DuplicateToken`] if the token is taken and
    /// with [`StoreError::DuplicateNonce`] if the nonce was used before. An
    /// existing record is never overwritten.
    async fn insert(&self, record: &TokenRecord) -> Result<(), StoreError>;

    /// Looks up a record by its token.
    async fn get_by_token(&self, token: &str) -> Result<Option<TokenRecord>, StoreError>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
