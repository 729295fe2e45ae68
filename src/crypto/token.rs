use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;

/// The number of random bytes behind each token.
pub const TOKEN_BYTES: usize = 24;

/// Generates a new random vault token.
///
/// # Returns
///
/// A URL-safe base64-encoded token without padding (32 characters, 192 bits
/// of entropy). The token is independent of any PAN content.
pub fn generate_token() -> String {
    let mut token = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}
