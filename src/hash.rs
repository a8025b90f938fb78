//! SHA-1 digest helpers: hex and raw 20-byte forms, and conversions between
//! them. Pure, deterministic, no I/O.

use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Hex-encoded (40 char, lowercase) SHA-1 of `bytes`.
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(sha1_raw(bytes))
}

/// Raw 20-byte SHA-1 of `bytes`.
pub fn sha1_raw(bytes: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

#[inline]
pub fn raw_to_hex(raw: &[u8; 20]) -> String {
    hex::encode(raw)
}

/// Converts a 40-char hex digest into its raw 20-byte form.
pub fn hex_to_raw(s: &str) -> Result<[u8; 20]> {
    let decoded = hex::decode(s).map_err(|_| Error::MalformedObject(format!("not hex: {s}")))?;
    decoded
        .as_slice()
        .try_into()
        .map_err(|_| Error::MalformedObject(format!("wrong hash length: {s}")))
}
