//! PAN tokenization vault.
//!
//! Card numbers are sealed with AES-GCM under a process-wide master key and
//! stored behind random tokens. The masked form (first six and last four
//! digits) can be rebuilt without decrypting; the clear PAN is only handed
//! back to privileged callers.

pub mod config;
pub mod db;
pub mod error;
pub mod masking;
pub mod router;
pub mod state;

pub mod crypto {
    pub mod aes;
    pub mod token;
}

pub mod models {
    pub mod record;
}

pub mod repositories {
    pub mod memory;
    pub mod store;
    pub mod token;
}

pub mod services {
    pub mod tokenization;
}

pub mod handlers {
    pub mod tokens;
}

pub mod middleware_layer {
    pub mod admin;
}

pub mod validation {
    pub mod pan;
}

pub use crypto::aes::CryptoEngine;
pub use error::{AppError, Result};
pub use repositories::{memory::MemoryRecordStore, store::RecordStore, token::PgRecordStore};
pub use services::tokenization::{EncryptResult, ResolveResult, TokenizationService};
