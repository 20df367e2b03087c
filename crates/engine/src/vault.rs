// Path: crates/engine/src/vault.rs
//! The operator's local key vault.
//!
//! `$DEXTER_HOME` holds two files: `investigator.json`, the operator's own
//! public record, and `key.pem`, their password-encrypted private key. The
//! vault decrypts the key at most once per process and caches it; a wrong
//! password re-prompts through the caller-supplied password source until
//! decryption succeeds.

use std::path::PathBuf;
use std::sync::Mutex;

use dexter_crypto::{key_store, CryptoError, RsaPrivateKey, RsaPublicKey};
use dexter_types::{Config, Investigator};

use crate::error::EngineError;

/// Supplies passwords on demand, usually by prompting the operator.
pub type PasswordSource<'a> = &'a (dyn Fn() -> String + Send + Sync);

/// Access to the operator's local secrets.
pub struct KeyVault {
    key_path: PathBuf,
    investigator_path: PathBuf,
    cached: Mutex<Option<RsaPrivateKey>>,
}

impl KeyVault {
    /// A vault over the configured secrets directory.
    pub fn new(config: &Config) -> Self {
        Self {
            key_path: config.key_file(),
            investigator_path: config.investigator_file(),
            cached: Mutex::new(None),
        }
    }

    /// The investigator currently operating Dexter from this machine.
    pub fn local_investigator(&self) -> Result<Investigator, EngineError> {
        let data = std::fs::read(&self.investigator_path)?;
        Ok(Investigator::from_json(&data)?)
    }

    /// The local investigator's name.
    pub fn local_name(&self) -> Result<String, EngineError> {
        Ok(self.local_investigator()?.name)
    }

    /// Load and decrypt the local private key, caching it process-wide.
    ///
    /// An unreadable key file is fatal to the operation; a wrong password
    /// loops back through `password` until the key opens.
    pub fn load_key(&self, password: PasswordSource<'_>) -> Result<RsaPrivateKey, EngineError> {
        if let Ok(guard) = self.cached.lock() {
            if let Some(key) = guard.as_ref() {
                return Ok(key.clone());
            }
        }

        let pem = std::fs::read_to_string(&self.key_path)?;
        let key = loop {
            match key_store::decrypt_private_key_pem(&pem, &password()) {
                Ok(key) => break key,
                Err(CryptoError::KeyDecryption(e)) => {
                    tracing::error!(error = %e, "decryption error, try again");
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some(key.clone());
        }
        Ok(key)
    }

    /// Generate a brand-new investigator: a fresh keypair, the public
    /// record, and the password-encrypted private key PEM. Nothing is
    /// written or published here; the caller owns persistence.
    pub fn create_investigator(
        name: &str,
        password: &str,
    ) -> Result<(Investigator, String), EngineError> {
        let key = key_store::generate_keypair()?;
        let record = Investigator {
            name: name.to_string(),
            public_key: key_store::public_key_record(&RsaPublicKey::from(&key)),
        };
        let pem = key_store::encrypt_private_key_pem(&key, password)?;
        Ok((record, pem))
    }

    /// Write the investigator record and encrypted key under the secrets
    /// directory. Refuses to overwrite an existing key file.
    pub fn persist(&self, investigator: &Investigator, key_pem: &str) -> Result<(), EngineError> {
        if let Some(dir) = self.investigator_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.investigator_path, investigator.to_json()?)?;

        if self.key_path.exists() {
            return Err(EngineError::KeyFileExists(
                self.key_path.display().to_string(),
            ));
        }
        std::fs::write(&self.key_path, key_pem)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn vault_in(dir: &std::path::Path) -> KeyVault {
        KeyVault {
            key_path: dir.join("key.pem"),
            investigator_path: dir.join("investigator.json"),
            cached: Mutex::new(None),
        }
    }

    fn small_investigator(name: &str, password: &str) -> (Investigator, String) {
        let key = key_store::generate_keypair_with_bits(2048).unwrap();
        let record = Investigator {
            name: name.to_string(),
            public_key: key_store::public_key_record(&RsaPublicKey::from(&key)),
        };
        let pem = key_store::encrypt_private_key_pem(&key, password).unwrap();
        (record, pem)
    }

    #[test]
    fn persist_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(dir.path());
        let (record, pem) = small_investigator("alice", "password");

        vault.persist(&record, &pem).unwrap();
        assert_eq!(vault.local_name().unwrap(), "alice");
    }

    #[test]
    fn persist_refuses_to_clobber_key() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(dir.path());
        let (record, pem) = small_investigator("alice", "password");

        vault.persist(&record, &pem).unwrap();
        assert!(matches!(
            vault.persist(&record, &pem),
            Err(EngineError::KeyFileExists(_))
        ));
    }

    #[test]
    fn wrong_password_retries_until_correct() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(dir.path());
        let (record, pem) = small_investigator("alice", "right");
        vault.persist(&record, &pem).unwrap();

        let attempts = AtomicUsize::new(0);
        let password = move || {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                "wrong".to_string()
            } else {
                "right".to_string()
            }
        };
        let key = vault.load_key(&password).unwrap();
        assert_eq!(
            key_store::public_key_record(&RsaPublicKey::from(&key)),
            record.public_key
        );
    }

    #[test]
    fn key_is_cached_after_first_load() {
        let dir = tempfile::tempdir().unwrap();
        let vault = vault_in(dir.path());
        let (record, pem) = small_investigator("alice", "pw");
        vault.persist(&record, &pem).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let password = move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            "pw".to_string()
        };
        vault.load_key(&password).unwrap();
        vault.load_key(&password).unwrap();
        // Second load must not have prompted again.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn create_investigator_roundtrips_through_pem() {
        // 4096-bit generation is slow but this is the real operator path.
        let (record, pem) = KeyVault::create_investigator("carol", "pw").unwrap();
        assert_eq!(record.name, "carol");
        let key = key_store::decrypt_private_key_pem(&pem, "pw").unwrap();
        assert_eq!(
            key_store::public_key_record(&RsaPublicKey::from(&key)),
            record.public_key
        );
    }
}
