use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::{Row, error::SqlState};

use crate::{
    crypto::aes::NONCE_SIZE,
    models::record::TokenRecord,
    repositories::store::{RecordStore, StoreError},
};

const TOKEN_CONSTRAINT: &str = "pan_tokens_pkey";
const NONCE_CONSTRAINT: &str = "pan_tokens_nonce_key";

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS pan_tokens (
        token       TEXT        NOT NULL,
        ciphertext  BYTEA       NOT NULL,
        nonce       BYTEA       NOT NULL,
        pan_length  SMALLINT    NOT NULL CHECK (pan_length BETWEEN 12 AND 19),
        first6      TEXT        NOT NULL,
        last4       TEXT        NOT NULL,
        created_at  TIMESTAMPTZ NOT NULL,
        CONSTRAINT pan_tokens_pkey PRIMARY KEY (token),
        CONSTRAINT pan_tokens_nonce_key UNIQUE (nonce)
    )
"#;

const INSERT_RECORD: &str = r#"
    INSERT INTO pan_tokens (token, ciphertext, nonce, pan_length, first6, last4, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

const SELECT_BY_TOKEN: &str = r#"
    SELECT token, ciphertext, nonce, pan_length, first6, last4, created_at
    FROM pan_tokens
    WHERE token = $1
"#;

/// A helper function to map a `tokio_postgres::Row` to a `TokenRecord`.
fn row_to_record(row: &Row) -> Result<TokenRecord, StoreError> {
    let nonce: Vec<u8> = row.try_get("nonce")?;
    let nonce: [u8; NONCE_SIZE] = nonce
        .try_into()
        .map_err(|_| StoreError::Corrupt("nonce has invalid length".to_string()))?;

    let pan_length: i16 = row.try_get("pan_length")?;
    let pan_length = usize::try_from(pan_length)
        .map_err(|_| StoreError::Corrupt("negative pan_length".to_string()))?;

    Ok(TokenRecord {
        token: row.try_get("token")?,
        ciphertext: row.try_get("ciphertext")?,
        nonce,
        pan_length,
        first6: row.try_get("first6")?,
        last4: row.try_get("last4")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Maps a unique-constraint violation to the matching duplicate error.
fn map_insert_error(e: tokio_postgres::Error) -> StoreError {
    if let Some(db_error) = e.as_db_error() {
        if *db_error.code() == SqlState::UNIQUE_VIOLATION {
            match db_error.constraint() {
                Some(TOKEN_CONSTRAINT) => return StoreError::DuplicateToken,
                Some(NONCE_CONSTRAINT) => return StoreError::DuplicateNonce,
                _ => {}
            }
        }
    }
    StoreError::Database(e)
}

/// PostgreSQL-backed record store.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: Pool,
}

impl PgRecordStore {
    /// Creates a new `PgRecordStore` over an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates the `pan_tokens` table if it does not exist.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_TABLE).await?;
        tracing::info!("✅ pan_tokens table ready");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &TokenRecord) -> Result<(), StoreError> {
        let pan_length = i16::try_from(record.pan_length)
            .map_err(|_| StoreError::Corrupt("pan_length out of range".to_string()))?;
        let nonce: &[u8] = &record.nonce;

        let client = self.pool.get().await?;
        let statement = client.prepare_cached(INSERT_RECORD).await?;

        // Autocommit: the row is durable once execute returns.
        client
            .execute(
                &statement,
                &[
                    &record.token,
                    &record.ciphertext,
                    &nonce,
                    &pan_length,
                    &record.first6,
                    &record.last4,
                    &record.created_at,
                ],
            )
            .await
            .map_err(map_insert_error)?;

        Ok(())
    }

    async fn get_by_token(&self, token: &str) -> Result<Option<TokenRecord>, StoreError> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(SELECT_BY_TOKEN).await?;

        let row = client.query_opt(&statement, &[&token]).await?;
        row.map(|r| row_to_record(&r)).transpose()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.simple_query("SELECT 1").await?;
        Ok(())
    }
}
