use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit, OsRng},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use thiserror::Error;

/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Accepted master key sizes in bytes (AES-128, AES-192, AES-256).
pub const KEY_SIZES: [usize; 3] = [16, 24, 32];

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Errors produced by the crypto engine.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The master key is not 16, 24, or 32 bytes long.
    #[error("invalid key length: expected 16, 24, or 32 bytes, got {0}")]
    InvalidKey(usize),

    /// Sealing the plaintext failed.
    #[error("encryption failed")]
    Encryption,

    /// The authentication tag did not verify (tampered data or wrong key).
    #[error("authentication failed")]
    Authentication,
}

enum Cipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

/// AES-GCM engine bound to the process master key.
///
/// The key length is checked once in [`CryptoEngine::new`]; after that every
/// call uses the prepared key schedule. The engine is read-only and can be
/// shared across tasks behind an `Arc`.
pub struct CryptoEngine {
    cipher: Cipher,
}

impl CryptoEngine {
    /// Creates a new engine from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidKey`] unless `key` is exactly 16, 24, or
    /// 32 bytes long.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        let len = key.len();
        let cipher = match len {
            16 => Cipher::Aes128(
                Aes128Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey(len))?,
            ),
            24 => Cipher::Aes192(
                Aes192Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey(len))?,
            ),
            32 => Cipher::Aes256(
                Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::InvalidKey(len))?,
            ),
            other => return Err(CryptoError::InvalidKey(other)),
        };
        Ok(Self { cipher })
    }

    /// Returns the key size in bits.
    pub fn key_bits(&self) -> usize {
        match self.cipher {
            Cipher::Aes128(_) => 128,
            Cipher::Aes192(_) => 192,
            Cipher::Aes256(_) => 256,
        }
    }

    /// Encrypts `plaintext` under a freshly generated nonce.
    ///
    /// # Returns
    ///
    /// The nonce and the ciphertext (with the 16-byte tag appended). Both must
    /// be persisted to decrypt later.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<([u8; NONCE_SIZE], Vec<u8>), CryptoError> {
        let nonce_bytes = generate_nonce();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let sealed = match &self.cipher {
            Cipher::Aes128(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes192(c) => c.encrypt(nonce, plaintext),
            Cipher::Aes256(c) => c.encrypt(nonce, plaintext),
        };

        let ciphertext = sealed.map_err(|_| CryptoError::Encryption)?;
        Ok((nonce_bytes, ciphertext))
    }

    /// Decrypts and authenticates `ciphertext`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Authentication`] if the tag does not verify.
    pub fn decrypt(&self, nonce: &[u8; NONCE_SIZE], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce = Nonce::from_slice(nonce);

        let opened = match &self.cipher {
            Cipher::Aes128(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes192(c) => c.decrypt(nonce, ciphertext),
            Cipher::Aes256(c) => c.decrypt(nonce, ciphertext),
        };

        opened.map_err(|_| CryptoError::Authentication)
    }
}

impl std::fmt::Debug for CryptoEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        write!(f, "CryptoEngine(AES-{}-GCM, [REDACTED])", self.key_bits())
    }
}

/// Generates a new random AES-GCM nonce from the OS CSPRNG.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key(len: usize) -> Vec<u8> {
        let mut key = vec![0u8; len];
        OsRng.fill_bytes(&mut key);
        key
    }

    #[test]
    fn accepts_all_aes_key_sizes() {
        for len in KEY_SIZES {
            let engine = CryptoEngine::new(&random_key(len)).unwrap();
            assert_eq!(engine.key_bits(), len * 8);

            let (nonce, ciphertext) = engine.encrypt(b"4111111111111111").unwrap();
            assert_eq!(engine.decrypt(&nonce, &ciphertext).unwrap(), b"4111111111111111");
        }
    }

    #[test]
    fn rejects_ten_byte_key() {
        match CryptoEngine::new(&[7u8; 10]) {
            Err(CryptoError::InvalidKey(10)) => {}
            other => panic!("expected InvalidKey(10), got {:?}", other),
        }
    }

    #[test]
    fn rejects_empty_and_oversized_keys() {
        assert!(CryptoEngine::new(&[]).is_err());
        assert!(CryptoEngine::new(&[0u8; 33]).is_err());
        assert!(CryptoEngine::new(&[0u8; 64]).is_err());
    }

    #[test]
    fn ciphertext_carries_tag() {
        let engine = CryptoEngine::new(&random_key(32)).unwrap();
        let (_, ciphertext) = engine.encrypt(b"411111111111").unwrap();
        assert_eq!(ciphertext.len(), 12 + 16);
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let engine = CryptoEngine::new(&random_key(16)).unwrap();
        let (n1, c1) = engine.encrypt(b"5500000000000004").unwrap();
        let (n2, c2) = engine.encrypt(b"5500000000000004").unwrap();
        assert_ne!(n1, n2);
        assert_ne!(c1, c2);
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let engine = CryptoEngine::new(&random_key(32)).unwrap();
        let (nonce, mut ciphertext) = engine.encrypt(b"4111111111111111").unwrap();
        ciphertext[0] ^= 0x01;
        assert!(matches!(
            engine.decrypt(&nonce, &ciphertext),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn tampered_nonce_fails_auth() {
        let engine = CryptoEngine::new(&random_key(24)).unwrap();
        let (mut nonce, ciphertext) = engine.encrypt(b"4111111111111111").unwrap();
        nonce[11] ^= 0x80;
        assert!(engine.decrypt(&nonce, &ciphertext).is_err());
    }

    #[test]
    fn wrong_key_fails_auth() {
        let a = CryptoEngine::new(&random_key(32)).unwrap();
        let b = CryptoEngine::new(&random_key(32)).unwrap();
        let (nonce, ciphertext) = a.encrypt(b"4111111111111111").unwrap();
        assert!(matches!(
            b.decrypt(&nonce, &ciphertext),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let engine = CryptoEngine::new(&[0xAB; 32]).unwrap();
        let rendered = format!("{:?}", engine);
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("171"));
    }
}
