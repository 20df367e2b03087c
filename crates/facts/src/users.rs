// Path: crates/facts/src/users.rs
//! Local-user facts.
//!
//! `user-exists` is private: the operator never puts the user name on the
//! wire. Each argument arrives as `digest || salt`; the evaluator re-hashes
//! every local account name under the same salt and looks for a matching
//! digest.

use async_trait::async_trait;

use dexter_crypto::hash;
use dexter_host::{HostEnv, UNIX_LIKE};

use crate::{Fact, FactCheck, FactError};

struct UserExists;

#[async_trait]
impl FactCheck for UserExists {
    async fn evaluate(&self, host: &HostEnv, hashed_args: &[String]) -> Result<bool, FactError> {
        let names = host.local_users().await?;

        for name in &names {
            for hashed_arg in hashed_args {
                let Some((digest, salt)) = hash::split_digest_and_salt(hashed_arg) else {
                    continue;
                };
                if digest == hash::hash_value(name, salt)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Check if a named user exists on the system.
pub fn user_exists() -> Fact {
    Fact {
        name: "user-exists",
        description: "check if a named user exists on the system",
        private: true,
        minimum_arguments: 1,
        supported_platforms: UNIX_LIKE,
        // A broken passwd lookup must not silently exclude the host.
        default_state: true,
        check: Box::new(UserExists),
    }
}
