//! [`FieldKey`]: the decoded field-encryption key.

use super::cipher::{CipherError, KEY_LENGTHS};
use super::fill_random;

/// Decoded key bytes (16, 24, or 32 of them).
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which key material lives in RAM.
pub struct FieldKey(Box<[u8]>);

impl FieldKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for FieldKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        write!(f, "FieldKey({} bytes, [REDACTED])", self.0.len())
    }
}

/// Decode a hex-encoded key.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyEncoding`] if `hex_key` is empty or not hex.
/// Returns [`CipherError::InvalidKeyLength`] if it does not decode to 16, 24, or 32 bytes.
pub fn decode_key(hex_key: &str) -> Result<FieldKey, CipherError> {
    let trimmed = hex_key.trim();
    if trimmed.is_empty() {
        return Err(CipherError::InvalidKeyEncoding);
    }
    let bytes = hex::decode(trimmed).map_err(|_| CipherError::InvalidKeyEncoding)?;
    if !KEY_LENGTHS.contains(&bytes.len()) {
        return Err(CipherError::InvalidKeyLength(bytes.len()));
    }
    Ok(FieldKey(bytes.into_boxed_slice()))
}

/// Generate a fresh random key of `len` bytes, hex encoded.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] for unsupported lengths and
/// [`CipherError::Entropy`] if the OS RNG fails.
pub fn generate_key_hex(len: usize) -> Result<String, CipherError> {
    if !KEY_LENGTHS.contains(&len) {
        return Err(CipherError::InvalidKeyLength(len));
    }
    let mut key = vec![0u8; len];
    fill_random(&mut key).map_err(CipherError::Entropy)?;
    let encoded = hex::encode(&key);
    key.iter_mut().for_each(|b| *b = 0);
    Ok(encoded)
}
