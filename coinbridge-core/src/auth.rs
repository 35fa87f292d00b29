//! Signing helpers for authenticated exchange requests.
//!
//! Transports use these to sign private payloads:
//! - HMAC signing (SHA256/SHA384/SHA512)
//! - Plain hashes (SHA256/SHA384/SHA512)
//! - Hex and Base64 encoding of digests

use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::fmt;
use std::str::FromStr;

/// Supported hash algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            _ => Err(Error::invalid_request(format!(
                "Unsupported hash algorithm: {s}"
            ))),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
        };
        f.write_str(s)
    }
}

/// Output encoding for digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestFormat {
    /// Lowercase hexadecimal
    #[default]
    Hex,
    /// Standard Base64 with padding
    Base64,
}

/// HMAC of `message` keyed with `secret`, encoded as requested.
///
/// # Examples
/// ```
/// use coinbridge_core::auth::{hmac_sign, DigestFormat, HashAlgorithm};
///
/// let signature = hmac_sign(
///     b"what do ya want for nothing?",
///     b"Jefe",
///     HashAlgorithm::Sha256,
///     DigestFormat::Hex,
/// ).unwrap();
/// assert_eq!(signature.len(), 64);
/// ```
pub fn hmac_sign(
    message: &[u8],
    secret: &[u8],
    algorithm: HashAlgorithm,
    digest: DigestFormat,
) -> Result<String> {
    hmac_bytes(message, secret, algorithm).map(|bytes| encode_bytes(&bytes, digest))
}

/// Raw HMAC bytes, for signatures built in several stages.
pub fn hmac_bytes(message: &[u8], secret: &[u8], algorithm: HashAlgorithm) -> Result<Vec<u8>> {
    match algorithm {
        HashAlgorithm::Sha256 => mac::<Hmac<Sha256>>(message, secret),
        HashAlgorithm::Sha384 => mac::<Hmac<Sha384>>(message, secret),
        HashAlgorithm::Sha512 => mac::<Hmac<Sha512>>(message, secret),
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(message: &[u8], secret: &[u8]) -> Result<Vec<u8>> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| Error::authentication(format!("invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Keyless hash of `data`, encoded as requested.
pub fn hash(data: &[u8], algorithm: HashAlgorithm, digest: DigestFormat) -> String {
    encode_bytes(&hash_bytes(data, algorithm), digest)
}

/// Raw hash bytes.
pub fn hash_bytes(data: &[u8], algorithm: HashAlgorithm) -> Vec<u8> {
    match algorithm {
        HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}

/// Encodes bytes as hex or Base64.
pub fn encode_bytes(bytes: &[u8], digest: DigestFormat) -> String {
    match digest {
        DigestFormat::Hex => hex::encode(bytes),
        DigestFormat::Base64 => general_purpose::STANDARD.encode(bytes),
    }
}

/// Decodes a standard Base64 string, e.g. a secret issued Base64-encoded.
pub fn base64_decode(data: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|e| Error::authentication(format!("invalid base64: {e}")))
}
