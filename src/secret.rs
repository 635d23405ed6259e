//! CephX secret generation and framing
//!
//! A CephX secret is a base64 blob wrapping a fixed little-endian header
//! and 16 bytes of key material:
//!
//! | field               | type    | value             |
//! |---------------------|---------|-------------------|
//! | format version      | i16 LE  | 1                 |
//! | created (seconds)   | i32 LE  | Unix time         |
//! | created (nanosecs)  | i32 LE  | 0                 |
//! | key length          | i16 LE  | 16                |
//!
//! followed by the raw key bytes. The monitor accepts exactly this layout
//! on `auth import`, so the framing is bit-exact and never varies.

use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

/// Fixed key material length in bytes.
pub const KEY_LEN: usize = 16;

/// Header format version understood by the authority.
pub const FORMAT_VERSION: i16 = 1;

/// Byte length of the little-endian header.
const HEADER_LEN: usize = 12;

/// Result type for secret decoding
pub type SecretResult<T> = Result<T, SecretError>;

/// Errors raised when decoding a secret blob
#[derive(Debug, Error)]
pub enum SecretError {
    /// Not valid base64
    #[error("secret is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// Decoded buffer shorter than the fixed 12-byte header
    #[error("secret blob is truncated: {len} bytes")]
    Truncated { len: usize },
}

/// An opaque, base64-encoded CephX secret
///
/// Either generated here or supplied by the caller. Immutable once
/// constructed; regeneration means delete-and-recreate at the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap caller-supplied base64 text as a secret
    pub fn from_base64(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The base64 text, as passed on the command line
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded header fields of a secret blob
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretHeader {
    pub version: i16,
    pub created_secs: i32,
    pub created_nsecs: i32,
    pub key_len: i16,
}

/// Generate a fresh CephX secret
///
/// Key material comes from the OS CSPRNG. Randomness exhaustion is not
/// modeled; `OsRng` blocks rather than fails.
pub fn generate_secret() -> Secret {
    let mut key = [0u8; KEY_LEN];
    OsRng.fill_bytes(&mut key);
    encode_secret(Utc::now().timestamp() as i32, &key)
}

/// Frame and base64-encode key material with the given creation time
fn encode_secret(created_secs: i32, key: &[u8; KEY_LEN]) -> Secret {
    let mut buf = Vec::with_capacity(HEADER_LEN + KEY_LEN);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&created_secs.to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(KEY_LEN as i16).to_le_bytes());
    buf.extend_from_slice(key);

    Secret(base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        buf,
    ))
}

/// Decode a secret blob into its header and raw key bytes
pub fn decode_secret(secret: &Secret) -> SecretResult<(SecretHeader, Vec<u8>)> {
    let buf = base64::Engine::decode(
        &base64::engine::general_purpose::STANDARD,
        secret.as_str(),
    )?;

    if buf.len() < HEADER_LEN {
        return Err(SecretError::Truncated { len: buf.len() });
    }

    let header = SecretHeader {
        version: i16::from_le_bytes([buf[0], buf[1]]),
        created_secs: i32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
        created_nsecs: i32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
        key_len: i16::from_le_bytes([buf[10], buf[11]]),
    };

    Ok((header, buf[HEADER_LEN..].to_vec()))
}
