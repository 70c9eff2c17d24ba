//! Opaque refresh token values

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Entropy per refresh token (256 bits)
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a fresh refresh token value
///
/// 32 bytes from the OS RNG, unpadded URL-safe base64 (43 characters).
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
