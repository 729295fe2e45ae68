use chrono::{DateTime, Utc};

use crate::crypto::aes::NONCE_SIZE;

/// A persisted token record.
///
/// Records are written once and never updated. The PAN itself is only present
/// as `ciphertext`; `first6` and `last4` are kept in clear so the masked form
/// can be rebuilt without decrypting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    /// The unique token (primary key).
    pub token: String,
    /// The AES-GCM ciphertext of the PAN, tag included.
    pub ciphertext: Vec<u8>,
    /// The nonce used to encrypt this record.
    pub nonce: [u8; NONCE_SIZE],
    /// The number of digits in the PAN.
    pub pan_length: usize,
    /// The first six digits of the PAN.
    pub first6: String,
    /// The last four digits of the PAN.
    pub last4: String,
    /// The timestamp when the record was created.
    pub created_at: DateTime<Utc>,
}
