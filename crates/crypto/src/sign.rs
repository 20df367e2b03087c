// Path: crates/crypto/src/sign.rs
//! RSA-PSS signatures over the investigation digest.
//!
//! Signing takes the already-computed SHA-256 digest; nothing here hashes
//! the document itself. Verification is boolean on purpose: a signature
//! that fails for any reason (unknown key, garbage bytes, wrong digest) is
//! simply invalid, and callers log context at the call site.

use rand::rngs::OsRng;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::CryptoError;

/// Sign a 32-byte digest with RSA-PSS/SHA-256.
pub fn sign_digest(key: &RsaPrivateKey, digest: &[u8; 32]) -> Result<Vec<u8>, CryptoError> {
    let mut rng = OsRng;
    key.sign_with_rng(&mut rng, Pss::new::<Sha256>(), digest)
        .map_err(|e| CryptoError::Signing(e.to_string()))
}

/// Verify an RSA-PSS/SHA-256 signature over a 32-byte digest.
pub fn verify_digest(key: &RsaPublicKey, digest: &[u8; 32], signature: &[u8]) -> bool {
    key.verify(Pss::new::<Sha256>(), digest, signature).is_ok()
}
