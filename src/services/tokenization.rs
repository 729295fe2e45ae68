use chrono::{DateTime, Utc};
use std::sync::Arc;
use zeroize::Zeroizing;

use crate::{
    crypto::{aes::CryptoEngine, token::generate_token},
    error::{AppError, Result},
    masking::mask_pan,
    models::record::TokenRecord,
    repositories::store::{RecordStore, StoreError},
    validation::pan::split_pan,
};

/// How many tokens are tried before a collision streak is reported as a
/// storage failure.
pub const DEFAULT_MAX_TOKEN_ATTEMPTS: usize = 3;

/// The outcome of tokenizing a PAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptResult {
    /// The opaque token that now stands in for the PAN.
    pub token: String,
    /// The masked PAN for display.
    pub masked_pan: String,
}

/// The outcome of resolving a token.
pub struct ResolveResult {
    /// The clear PAN; only present for privileged callers.
    pub pan: Option<Zeroizing<String>>,
    /// The masked PAN for display.
    pub masked_pan: String,
    /// When the token was issued.
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for ResolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveResult")
            .field("pan", &self.pan.as_ref().map(|_| "[REDACTED]"))
            .field("masked_pan", &self.masked_pan)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Tokenizes PANs and resolves tokens back to them.
///
/// The engine and the store are injected so that tests can swap in their own
/// store. Cloning is cheap and clones share both.
#[derive(Clone)]
pub struct TokenizationService {
    engine: Arc<CryptoEngine>,
    store: Arc<dyn RecordStore>,
    max_attempts: usize,
}

impl TokenizationService {
    /// Creates a new `TokenizationService`.
    pub fn new(engine: Arc<CryptoEngine>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            engine,
            store,
            max_attempts: DEFAULT_MAX_TOKEN_ATTEMPTS,
        }
    }

    /// Overrides the number of tokens tried per `tokenize` call (at least 1).
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the underlying record store.
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Encrypts and stores a PAN, returning a fresh token and the masked PAN.
    ///
    /// # Errors
    ///
    /// * [`AppError::InvalidPan`] if `pan` is not 12 to 19 digits.
    /// * [`AppError::Storage`] if the store fails or every token attempt
    ///   collided.
    pub async fn tokenize(&self, pan: &str) -> Result<EncryptResult> {
        let parts = split_pan(pan)?;

        let (nonce, ciphertext) = self.engine.encrypt(pan.as_bytes())?;
        let masked_pan = mask_pan(&parts.first6, &parts.last4, parts.length);

        let mut record = TokenRecord {
            token: String::new(),
            ciphertext,
            nonce,
            pan_length: parts.length,
            first6: parts.first6,
            last4: parts.last4,
            created_at: Utc::now(),
        };

        for attempt in 1..=self.max_attempts {
            record.token = generate_token();

            match self.store.insert(&record).await {
                Ok(()) => {
                    tracing::debug!("✅ PAN tokenized ({})", masked_pan);
                    return Ok(EncryptResult {
                        token: record.token,
                        masked_pan,
                    });
                }
                Err(StoreError::DuplicateToken) => {
                    tracing::warn!(
                        "⚠️  Token collision on attempt {}/{}, regenerating",
                        attempt,
                        self.max_attempts
                    );
                }
                Err(e) => {
                    tracing::error!("❌ Failed to store token record: {}", e);
                    return Err(e.into());
                }
            }
        }

        Err(AppError::Storage(format!(
            "token collision persisted after {} attempts",
            self.max_attempts
        )))
    }

    /// Looks up a token.
    ///
    /// The masked PAN is always returned. The clear PAN is only decrypted and
    /// returned when `privileged` is `true`.
    ///
    /// # Errors
    ///
    /// * [`AppError::TokenNotFound`] if no record exists for `token`.
    /// * [`AppError::Storage`] if the lookup fails.
    /// * [`AppError::Decryption`] if the stored record does not decrypt to a
    ///   PAN consistent with its metadata.
    pub async fn resolve(&self, token: &str, privileged: bool) -> Result<ResolveResult> {
        let record = self
            .store
            .get_by_token(token)
            .await?
            .ok_or(AppError::TokenNotFound)?;

        let masked_pan = mask_pan(&record.first6, &record.last4, record.pan_length);

        if !privileged {
            return Ok(ResolveResult {
                pan: None,
                masked_pan,
                created_at: record.created_at,
            });
        }

        let pan = self.decrypt_record(&record)?;
        tracing::debug!("🔓 Token resolved to clear PAN ({})", masked_pan);

        Ok(ResolveResult {
            pan: Some(pan),
            masked_pan,
            created_at: record.created_at,
        })
    }

    fn decrypt_record(&self, record: &TokenRecord) -> Result<Zeroizing<String>> {
        let bytes = Zeroizing::new(self.engine.decrypt(&record.nonce, &record.ciphertext)?);

        let pan = std::str::from_utf8(&bytes).map_err(|_| AppError::Decryption)?;

        if pan.len() != record.pan_length
            || !pan.starts_with(record.first6.as_str())
            || !pan.ends_with(record.last4.as_str())
        {
            tracing::error!("❌ Decrypted PAN does not match stored metadata");
            return Err(AppError::Decryption);
        }

        Ok(Zeroizing::new(pan.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::MemoryRecordStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn engine() -> Arc<CryptoEngine> {
        Arc::new(CryptoEngine::new(&[0x42; 32]).unwrap())
    }

    fn service() -> TokenizationService {
        TokenizationService::new(engine(), Arc::new(MemoryRecordStore::new()))
    }

    /// Reports a token collision for the first `collisions` inserts.
    struct CollidingStore {
        inner: MemoryRecordStore,
        collisions: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordStore for CollidingStore {
        async fn insert(&self, record: &TokenRecord) -> std::result::Result<(), StoreError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.collisions {
                return Err(StoreError::DuplicateToken);
            }
            self.inner.insert(record).await
        }

        async fn get_by_token(
            &self,
            token: &str,
        ) -> std::result::Result<Option<TokenRecord>, StoreError> {
            self.inner.get_by_token(token).await
        }

        async fn ping(&self) -> std::result::Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn masks_visa_test_card() {
        let result = service().tokenize("4111111111111111").await.unwrap();
        assert_eq!(result.masked_pan, "411111******1111");
    }

    #[tokio::test]
    async fn privileged_round_trip() {
        let svc = service();
        let issued = svc.tokenize("5500000000000004").await.unwrap();

        let resolved = svc.resolve(&issued.token, true).await.unwrap();
        assert_eq!(resolved.pan.as_deref().map(String::as_str), Some("5500000000000004"));
        assert_eq!(resolved.masked_pan, issued.masked_pan);
    }

    #[tokio::test]
    async fn unprivileged_resolve_returns_mask_only() {
        let svc = service();
        let issued = svc.tokenize("4111111111111111").await.unwrap();

        let resolved = svc.resolve(&issued.token, false).await.unwrap();
        assert!(resolved.pan.is_none());
        assert_eq!(resolved.masked_pan, "411111******1111");
    }

    #[tokio::test]
    async fn invalid_pan_stores_nothing() {
        let store = MemoryRecordStore::new();
        let svc = TokenizationService::new(engine(), Arc::new(store.clone()));

        assert!(matches!(svc.tokenize("abcd1234").await, Err(AppError::InvalidPan(_))));
        assert!(matches!(svc.tokenize("1234").await, Err(AppError::InvalidPan(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn retries_through_collisions() {
        let store = Arc::new(CollidingStore {
            inner: MemoryRecordStore::new(),
            collisions: 2,
            calls: AtomicUsize::new(0),
        });
        let svc = TokenizationService::new(engine(), store.clone());

        let issued = svc.tokenize("4111111111111111").await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
        assert!(svc.resolve(&issued.token, false).await.is_ok());
    }

    #[tokio::test]
    async fn collision_streak_escalates_to_storage_error() {
        let store = Arc::new(CollidingStore {
            inner: MemoryRecordStore::new(),
            collisions: usize::MAX,
            calls: AtomicUsize::new(0),
        });
        let svc = TokenizationService::new(engine(), store.clone()).with_max_attempts(5);

        assert!(matches!(
            svc.tokenize("4111111111111111").await,
            Err(AppError::Storage(_))
        ));
        assert_eq!(store.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn zero_attempts_is_clamped_to_one() {
        let svc = service().with_max_attempts(0);
        assert!(svc.tokenize("4111111111111111").await.is_ok());
    }

    #[test]
    fn resolve_result_debug_hides_pan() {
        let result = ResolveResult {
            pan: Some(Zeroizing::new("4111111111111111".to_string())),
            masked_pan: "411111******1111".to_string(),
            created_at: Utc::now(),
        };
        let rendered = format!("{:?}", result);
        assert!(!rendered.contains("4111111111111111"));
        assert!(rendered.contains("411111******1111"));
    }
}
