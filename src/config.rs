use std::env;
use std::net::SocketAddr;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::aes::KEY_SIZES;
use crate::services::tokenization::DEFAULT_MAX_TOKEN_ATTEMPTS;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The maximum number of pooled database connections.
    pub database_pool_size: usize,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The number of tokens tried before a tokenize call gives up.
    pub tokenize_max_attempts: usize,
    /// The master key used for encryption.
    pub master_key: Zeroizing<Vec<u8>>,
    /// The shared secret that unlocks privileged resolution.
    pub admin_api_key: Zeroizing<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut master_key_hex = env::var("MASTER_KEY")
            .context("MASTER_KEY must be set (generate with: openssl rand -hex 32)")?;

        let master_key = parse_master_key(&master_key_hex);
        master_key_hex.zeroize();
        let master_key = master_key?;

        let admin_api_key = env::var("ADMIN_API_KEY")
            .context("ADMIN_API_KEY must be set")?;
        if admin_api_key.is_empty() {
            anyhow::bail!("ADMIN_API_KEY must not be empty");
        }

        let tokenize_max_attempts: usize = env::var("TOKENIZE_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_TOKEN_ATTEMPTS.to_string())
            .parse()
            .context("Invalid TOKENIZE_MAX_ATTEMPTS")?;
        if tokenize_max_attempts == 0 {
            anyhow::bail!("TOKENIZE_MAX_ATTEMPTS must be at least 1");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            database_pool_size: env::var("DATABASE_POOL_SIZE")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .context("Invalid DATABASE_POOL_SIZE")?,
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            tokenize_max_attempts,
            master_key,
            admin_api_key: Zeroizing::new(admin_api_key),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_pool_size", &self.database_pool_size)
            .field("bind_addr", &self.bind_addr)
            .field("tokenize_max_attempts", &self.tokenize_max_attempts)
            .field("master_key", &"[REDACTED]")
            .field("admin_api_key", &"[REDACTED]")
            .finish()
    }
}

/// Decodes a hex master key and checks it is a valid AES key length.
pub fn parse_master_key(master_key_hex: &str) -> Result<Zeroizing<Vec<u8>>> {
    let master_key = Zeroizing::new(
        hex::decode(master_key_hex.trim()).context("MASTER_KEY must be valid hexadecimal")?,
    );

    if !KEY_SIZES.contains(&master_key.len()) {
        anyhow::bail!(
            "MASTER_KEY must be 16, 24, or 32 bytes (32, 48, or 64 hex characters), got {} bytes",
            master_key.len()
        );
    }

    Ok(master_key)
}
