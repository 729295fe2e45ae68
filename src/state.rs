use std::sync::Arc;
use zeroize::Zeroizing;

use crate::config::Config;
use crate::crypto::aes::CryptoEngine;
use crate::error::Result;
use crate::repositories::{store::RecordStore, token::PgRecordStore};
use crate::services::tokenization::TokenizationService;

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The tokenization core.
    pub vault: TokenizationService,
    /// The shared secret that unlocks privileged resolution.
    pub admin_api_key: Arc<Zeroizing<String>>,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let engine = CryptoEngine::new(&config.master_key)?;
        tracing::info!("✅ Crypto engine initialized ({:?})", engine);

        let pool = crate::db::create_pool(&config.database_url, config.database_pool_size)?;
        tracing::info!(
            "✅ PostgreSQL pool initialized (max {} connections)",
            config.database_pool_size
        );

        let store = PgRecordStore::new(pool);
        store.migrate().await?;

        let vault = TokenizationService::new(Arc::new(engine), Arc::new(store))
            .with_max_attempts(config.tokenize_max_attempts);
        tracing::info!("✅ Tokenization service initialized");

        Ok(Self {
            vault,
            admin_api_key: Arc::new(config.admin_api_key.clone()),
        })
    }

    /// Creates an `AppState` over an arbitrary record store.
    pub fn with_store(
        master_key: &[u8],
        store: Arc<dyn RecordStore>,
        admin_api_key: &str,
    ) -> Result<Self> {
        let engine = CryptoEngine::new(master_key)?;
        Ok(Self {
            vault: TokenizationService::new(Arc::new(engine), store),
            admin_api_key: Arc::new(Zeroizing::new(admin_api_key.to_string())),
        })
    }
}
