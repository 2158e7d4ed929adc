//! Field encryption and API-key primitives.
//!
//! This module is intentionally free of HTTP and storage dependencies.
//!
//! # Ciphertext format
//!
//! ```text
//! base64url(nonce[12] || ciphertext || tag[16])
//! ```
//!
//! The blob is stored as-is in a text column. The key length (16, 24, or 32
//! bytes) selects AES-128, AES-192, or AES-256.
//!
//! # API keys
//!
//! Plaintext tokens are 16 random bytes rendered as unpadded base-32. Only the
//! SHA-256 digest of the plaintext is ever persisted.

pub mod cipher;
pub mod key;
pub mod token;

pub use cipher::{CipherError, FieldCipher};
pub use token::{ApiKey, TokenError, TokenHash};

use aes_gcm::aead::{rand_core::RngCore, OsRng};

/// Fill `buf` from the OS CSPRNG.
///
/// # Errors
///
/// Returns an I/O error if the entropy source is unavailable.
pub(crate) fn fill_random(buf: &mut [u8]) -> std::io::Result<()> {
    OsRng
        .try_fill_bytes(buf)
        .map_err(|e| std::io::Error::other(e.to_string()))
}
