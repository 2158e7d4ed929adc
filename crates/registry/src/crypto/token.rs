//! API-key generation and hashing.

use data_encoding::BASE32_NOPAD;
use sha2::{Digest, Sha256};
use thiserror::Error;

use common::Validator;

use super::fill_random;

/// Random bytes drawn per token.
pub const TOKEN_BYTES: usize = 16;

/// Length of the unpadded base-32 rendering of [`TOKEN_BYTES`].
pub const TOKEN_LEN: usize = 26;

/// SHA-256 digest length. Changing it invalidates every issued key.
pub const HASH_LEN: usize = 32;

/// Errors produced while issuing tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The OS entropy source is exhausted or unavailable. Not retriable.
    #[error("entropy source unavailable: {0}")]
    Entropy(#[source] std::io::Error),
}

/// One-way digest of a token plaintext; the only form that is persisted.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; HASH_LEN]);

impl TokenHash {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for TokenHash {
    type Error = usize;

    /// Fails with the offending length when `bytes` is not [`HASH_LEN`] long.
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; HASH_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| bytes.len())
    }
}

impl std::fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenHash({})", hex::encode(&self.0[..4]))
    }
}

/// A freshly issued API key.
///
/// `plaintext` exists only here, at issuance time; callers hand it to the
/// client once and drop it.
#[derive(Clone)]
pub struct ApiKey {
    pub plaintext: String,
    pub hash: TokenHash,
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("plaintext", &"[REDACTED]")
            .field("hash", &self.hash)
            .finish()
    }
}

/// Generate a new API key from 16 CSPRNG bytes.
///
/// # Errors
///
/// Returns [`TokenError::Entropy`] if the OS RNG fails.
pub fn generate_api_key() -> Result<ApiKey, TokenError> {
    let mut raw = [0u8; TOKEN_BYTES];
    fill_random(&mut raw).map_err(TokenError::Entropy)?;
    let plaintext = BASE32_NOPAD.encode(&raw);
    let hash = hash_token(&plaintext);
    Ok(ApiKey { plaintext, hash })
}

/// SHA-256 of the plaintext token. Deterministic and pure.
pub fn hash_token(plaintext: &str) -> TokenHash {
    TokenHash(Sha256::digest(plaintext.as_bytes()).into())
}

/// Check that a presented token has the shape [`generate_api_key`] produces.
pub fn validate_token_plaintext(v: &mut Validator, plaintext: &str) {
    v.check(!plaintext.is_empty(), "token", "must be provided");
    v.check(
        plaintext.len() == TOKEN_LEN
            && plaintext
                .bytes()
                .all(|b| b.is_ascii_uppercase() || (b'2'..=b'7').contains(&b)),
        "token",
        "must be valid",
    );
}
