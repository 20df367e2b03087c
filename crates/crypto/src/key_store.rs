// Path: crates/crypto/src/key_store.rs
//! Key generation, portable public key records, and the encrypted private
//! key store.
//!
//! The private key lives on the operator's machine only, as a PKCS#8
//! "ENCRYPTED PRIVATE KEY" PEM: PBES2 with PBKDF2-SHA-256 key derivation
//! and AES-128-CBC. The public key is published to the registry as decimal
//! component strings so any JSON tooling can carry it.

use pkcs8::pkcs5::pbes2;
use pkcs8::{LineEnding, PrivateKeyInfo};
use rand::rngs::OsRng;
use rand::RngCore;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use crate::error::CryptoError;
use dexter_types::PublicKeyRecord;

/// Modulus size for newly generated investigator keys.
pub const KEY_BITS: usize = 4096;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const IV_LEN: usize = 16;
const ENCRYPTED_PEM_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Generate a new investigator private key.
pub fn generate_keypair() -> Result<RsaPrivateKey, CryptoError> {
    generate_keypair_with_bits(KEY_BITS)
}

/// Generate a private key with an explicit modulus size. Tests use smaller
/// keys to keep generation fast; production callers use [`generate_keypair`].
pub fn generate_keypair_with_bits(bits: usize) -> Result<RsaPrivateKey, CryptoError> {
    let mut rng = OsRng;
    RsaPrivateKey::new(&mut rng, bits).map_err(|e| CryptoError::KeyGeneration(e.to_string()))
}

/// Serialize a public key into its portable registry form.
pub fn public_key_record(key: &RsaPublicKey) -> PublicKeyRecord {
    PublicKeyRecord {
        n: key.n().to_string(),
        e: key.e().to_string(),
    }
}

/// Reconstruct a public key from its registry form.
pub fn public_key_from_record(record: &PublicKeyRecord) -> Result<RsaPublicKey, CryptoError> {
    let n = BigUint::parse_bytes(record.n.as_bytes(), 10)
        .ok_or_else(|| CryptoError::InvalidKey(format!("error parsing N value: {}", record.n)))?;
    let e = record
        .e
        .parse::<u32>()
        .map_err(|_| CryptoError::InvalidKey(format!("error parsing E value: {}", record.e)))?;
    RsaPublicKey::new(n, BigUint::from(e)).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Encrypt a private key under a password, returning the PEM text that is
/// written to the operator's key file.
pub fn encrypt_private_key_pem(
    key: &RsaPrivateKey,
    password: &str,
) -> Result<String, CryptoError> {
    let der = key
        .to_pkcs8_der()
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
    let info = PrivateKeyInfo::try_from(der.as_bytes())
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;

    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut salt);
    OsRng.fill_bytes(&mut iv);

    let params = pbes2::Parameters::pbkdf2_sha256_aes128cbc(PBKDF2_ITERATIONS, &salt, &iv)
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;

    let encrypted = info
        .encrypt_with_params(params, password.as_bytes())
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
    let pem = encrypted
        .to_pem(ENCRYPTED_PEM_LABEL, LineEnding::LF)
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
    Ok(pem.to_string())
}

/// Decrypt a private key PEM with a password. A wrong password surfaces as
/// [`CryptoError::KeyDecryption`]; callers re-prompt and retry.
pub fn decrypt_private_key_pem(pem: &str, password: &str) -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::from_pkcs8_encrypted_pem(pem, password.as_bytes())
        .map_err(|e| CryptoError::KeyDecryption(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_roundtrip() {
        let key = generate_keypair_with_bits(2048).unwrap();
        let public = RsaPublicKey::from(&key);

        let record = public_key_record(&public);
        assert!(record.n.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(record.e, "65537");

        let restored = public_key_from_record(&record).unwrap();
        assert_eq!(restored, public);
    }

    #[test]
    fn record_rejects_garbage_components() {
        let bad_n = PublicKeyRecord {
            n: "not a number".to_string(),
            e: "65537".to_string(),
        };
        assert!(public_key_from_record(&bad_n).is_err());

        let bad_e = PublicKeyRecord {
            n: "12345".to_string(),
            e: "sixty-five".to_string(),
        };
        assert!(public_key_from_record(&bad_e).is_err());
    }

    #[test]
    fn encrypted_pem_roundtrip() {
        let key = generate_keypair_with_bits(2048).unwrap();
        let pem = encrypt_private_key_pem(&key, "hunter2").unwrap();
        assert!(pem.contains("BEGIN ENCRYPTED PRIVATE KEY"));

        let restored = decrypt_private_key_pem(&pem, "hunter2").unwrap();
        assert_eq!(restored, key);
    }

    #[test]
    fn encrypted_pem_rejects_wrong_password() {
        let key = generate_keypair_with_bits(2048).unwrap();
        let pem = encrypt_private_key_pem(&key, "hunter2").unwrap();
        assert!(matches!(
            decrypt_private_key_pem(&pem, "hunter3"),
            Err(CryptoError::KeyDecryption(_))
        ));
    }
}
