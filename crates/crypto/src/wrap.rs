// Path: crates/crypto/src/wrap.rs
//! RSA-OAEP wrapping of data-encryption keys.
//!
//! Each report recipient gets the 16-byte bulk key wrapped to their public
//! key with OAEP/SHA-256 and an empty label. Unwrapping with any other key
//! fails, which is the whole point.

use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;

/// Wrap a data-encryption key to a recipient's public key.
pub fn wrap_key(recipient: &RsaPublicKey, key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut rng = OsRng;
    recipient
        .encrypt(&mut rng, Oaep::new::<Sha256>(), key)
        .map_err(|e| CryptoError::KeyWrap(e.to_string()))
}

/// Unwrap a data-encryption key with the local private key.
pub fn unwrap_key(key: &RsaPrivateKey, wrapped: &[u8]) -> Result<Vec<u8>, CryptoError> {
    key.decrypt(Oaep::new::<Sha256>(), wrapped)
        .map_err(|e| CryptoError::KeyWrap(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_store;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let key = key_store::generate_keypair_with_bits(2048).unwrap();
        let public = RsaPublicKey::from(&key);
        let dek = [0x42u8; 16];

        let wrapped = wrap_key(&public, &dek).unwrap();
        assert_ne!(wrapped, dek.to_vec());
        assert_eq!(unwrap_key(&key, &wrapped).unwrap(), dek.to_vec());
    }

    #[test]
    fn unwrap_rejects_wrong_key() {
        let key = key_store::generate_keypair_with_bits(2048).unwrap();
        let other = key_store::generate_keypair_with_bits(2048).unwrap();
        let dek = [0x42u8; 16];

        let wrapped = wrap_key(&RsaPublicKey::from(&key), &dek).unwrap();
        assert!(unwrap_key(&other, &wrapped).is_err());
    }
}
