// Path: crates/crypto/src/hash.rs
//! Argon2id hashing for private fact arguments.
//!
//! Private facts never put their plaintext arguments on the wire. The
//! operator hashes each argument with the investigation id as salt and
//! appends the salt, so a daemon can re-hash candidate local values and
//! compare digests without ever learning the original.
//!
//! Parameters are fixed: Argon2id, time=1, memory=64 MiB, lanes=4, 32-byte
//! output, hex-encoded. The salt suffix is the 8-character investigation id.

use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::CryptoError;
use dexter_types::id::SHORT_ID_LEN;

const MEMORY_KIB: u32 = 64 * 1024;
const TIME_COST: u32 = 1;
const LANES: u32 = 4;
const OUTPUT_LEN: usize = 32;

fn hasher() -> Result<Argon2<'static>, CryptoError> {
    let params = Params::new(MEMORY_KIB, TIME_COST, LANES, Some(OUTPUT_LEN))
        .map_err(|e| CryptoError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a value with the given salt, returning lowercase hex.
pub fn hash_value(value: &str, salt: &str) -> Result<String, CryptoError> {
    let mut output = [0u8; OUTPUT_LEN];
    hasher()?
        .hash_password_into(value.as_bytes(), salt.as_bytes(), &mut output)
        .map_err(|e| CryptoError::Hash(e.to_string()))?;
    Ok(hex::encode(output))
}

/// Hash a value and append the salt, producing the combined on-wire form a
/// private fact argument travels as.
pub fn hash_with_salt_suffix(value: &str, salt: &str) -> Result<String, CryptoError> {
    Ok(format!("{}{}", hash_value(value, salt)?, salt))
}

/// Split a combined on-wire value back into `(digest, salt)`. The salt is
/// the trailing [`SHORT_ID_LEN`] characters. Returns `None` when the value
/// is too short to contain both parts.
pub fn split_digest_and_salt(combined: &str) -> Option<(&str, &str)> {
    if combined.len() <= SHORT_ID_LEN || !combined.is_ascii() {
        return None;
    }
    let boundary = combined.len().checked_sub(SHORT_ID_LEN)?;
    let digest = combined.get(..boundary)?;
    let salt = combined.get(boundary..)?;
    Some((digest, salt))
}
