// Path: crates/crypto/src/bulk.rs
//! AES-128-GCM bulk encryption for report archives.
//!
//! One fresh key and nonce per (report, recipient) pair, both from the OS
//! CSPRNG. Ciphertext carries the 16-byte authentication tag appended; no
//! additional authenticated data is used.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::CryptoError;

/// Bulk data-encryption key length in bytes (AES-128).
pub const DATA_KEY_LEN: usize = 16;
/// GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Encrypt `plaintext` under a fresh random key and nonce, returning
/// `(key, nonce, ciphertext)`.
pub fn seal(plaintext: &[u8]) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>), CryptoError> {
    let mut key = [0u8; DATA_KEY_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut key);
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(&key));
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::BulkCipher)?;

    Ok((key.to_vec(), nonce.to_vec(), ciphertext))
}

/// Decrypt and authenticate a ciphertext produced by [`seal`].
pub fn open(key: &[u8], nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if key.len() != DATA_KEY_LEN || nonce.len() != NONCE_LEN {
        return Err(CryptoError::BulkCipher);
    }
    let cipher = Aes128Gcm::new(Key::<Aes128Gcm>::from_slice(key));
    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::BulkCipher)
}
