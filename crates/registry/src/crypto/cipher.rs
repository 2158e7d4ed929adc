//! AES-GCM encryption and decryption of individual string fields.
//!
//! **Nonces are never reused.** Every call to [`encrypt_field`] draws a fresh
//! 96-bit nonce from the OS CSPRNG, so encrypting the same value twice under
//! the same key produces two different blobs. GCM nonce reuse breaks both
//! confidentiality and authentication.

use std::sync::Arc;

use aes_gcm::{
    aead::{consts::U12, Aead, KeyInit},
    aes::Aes192,
    Aes128Gcm, Aes256Gcm, AesGcm, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use thiserror::Error;

use super::fill_random;
use super::key::FieldKey;

/// Supported key lengths in bytes (AES-128, AES-192, AES-256).
pub const KEY_LENGTHS: [usize; 3] = [16, 24, 32];

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag.
pub const TAG_LEN: usize = 16;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not 16, 24, or 32 bytes long.
    #[error("invalid key length: expected 16, 24, or 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// The configured key is empty or not valid hex.
    #[error("encryption key is not valid hex")]
    InvalidKeyEncoding,

    /// The blob is empty, not base64url, too short, or decrypts to non-UTF-8.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(&'static str),

    /// The authentication tag did not verify (wrong key, corruption, or tampering).
    #[error("ciphertext failed authentication")]
    AuthenticationFailed,

    /// The AEAD seal operation failed.
    #[error("aead seal failed")]
    AeadFailure,

    /// The OS entropy source could not supply a nonce.
    #[error("entropy source unavailable: {0}")]
    Entropy(#[source] std::io::Error),
}

/// One of the three AES-GCM strengths, selected by key length.
enum GcmCipher {
    Aes128(Aes128Gcm),
    Aes192(Aes192Gcm),
    Aes256(Aes256Gcm),
}

impl GcmCipher {
    fn new(key: &[u8]) -> Result<Self, CipherError> {
        let invalid = |_| CipherError::InvalidKeyLength(key.len());
        match key.len() {
            16 => Aes128Gcm::new_from_slice(key).map(Self::Aes128).map_err(invalid),
            24 => Aes192Gcm::new_from_slice(key).map(Self::Aes192).map_err(invalid),
            32 => Aes256Gcm::new_from_slice(key).map(Self::Aes256).map_err(invalid),
            n => Err(CipherError::InvalidKeyLength(n)),
        }
    }

    fn seal(&self, nonce: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            Self::Aes128(c) => c.encrypt(nonce, plaintext),
            Self::Aes192(c) => c.encrypt(nonce, plaintext),
            Self::Aes256(c) => c.encrypt(nonce, plaintext),
        }
    }

    fn open(&self, nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, aes_gcm::Error> {
        let nonce = Nonce::<U12>::from_slice(nonce);
        match self {
            Self::Aes128(c) => c.decrypt(nonce, sealed),
            Self::Aes192(c) => c.decrypt(nonce, sealed),
            Self::Aes256(c) => c.decrypt(nonce, sealed),
        }
    }
}

/// Encrypt a plaintext string field, returning the base64url storage blob.
///
/// # Errors
///
/// Returns [`CipherError::InvalidKeyLength`] if `key` is not 16, 24, or 32 bytes.
/// Returns [`CipherError::Entropy`] if a nonce cannot be drawn.
pub fn encrypt_field(plaintext: &str, key: &[u8]) -> Result<String, CipherError> {
    let cipher = GcmCipher::new(key)?;

    let mut nonce = [0u8; NONCE_LEN];
    fill_random(&mut nonce).map_err(CipherError::Entropy)?;

    let sealed = cipher
        .seal(&nonce, plaintext.as_bytes())
        .map_err(|_| CipherError::AeadFailure)?;

    let mut blob = Vec::with_capacity(NONCE_LEN + sealed.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&sealed);
    Ok(URL_SAFE.encode(blob))
}

/// Decrypt a blob produced by [`encrypt_field`].
///
/// # Errors
///
/// Returns [`CipherError::InvalidCiphertext`] for empty, undecodable, or
/// truncated input. Returns [`CipherError::AuthenticationFailed`] if the tag
/// does not verify; no plaintext is produced in that case.
pub fn decrypt_field(blob: &str, key: &[u8]) -> Result<String, CipherError> {
    if blob.is_empty() {
        return Err(CipherError::InvalidCiphertext("empty input"));
    }
    let cipher = GcmCipher::new(key)?;

    let data = URL_SAFE
        .decode(blob)
        .map_err(|_| CipherError::InvalidCiphertext("not base64url"))?;
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::InvalidCiphertext("insufficient length"));
    }

    let (nonce, sealed) = data.split_at(NONCE_LEN);
    let plaintext = cipher
        .open(nonce, sealed)
        .map_err(|_| CipherError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::InvalidCiphertext("plaintext is not utf-8"))
}

/// Process-wide field cipher bound to the configured key.
///
/// The key is decoded once at start-up and shared by reference; the handle is
/// cheap to clone and holds no mutable state.
#[derive(Clone, Debug)]
pub struct FieldCipher {
    key: Arc<FieldKey>,
}

impl FieldCipher {
    pub fn new(key: FieldKey) -> Self {
        Self { key: Arc::new(key) }
    }

    /// Decode a hex key and build a cipher from it.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyEncoding`] or [`CipherError::InvalidKeyLength`].
    pub fn from_hex(hex_key: &str) -> Result<Self, CipherError> {
        super::key::decode_key(hex_key).map(Self::new)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        encrypt_field(plaintext, self.key.as_bytes())
    }

    pub fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        decrypt_field(blob, self.key.as_bytes())
    }
}
