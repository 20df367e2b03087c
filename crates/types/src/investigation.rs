// Path: crates/types/src/investigation.rs
//! The signed investigation document.
//!
//! An investigation is an instruction for some Dexter daemons to run some
//! tasks. The task list defines the tasks and their arguments, while the
//! scope defines facts that must be true about a host for the investigation
//! to apply there. Once signed the document is immutable except for the
//! approver list, which accumulates countersignatures without disturbing
//! the digest.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::codec;

/// A signature consists of the name of the investigator who did the signing
/// and the signature bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Data", with = "codec::base64_bytes")]
    pub data: Vec<u8>,
}

impl Signature {
    /// An unsigned placeholder carrying only the signer's name.
    pub fn unsigned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Vec::new(),
        }
    }
}

/// Everything a recipient needs to open an encrypted report blob: the bulk
/// cipher nonce and the data-encryption key wrapped to their public key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecryptionPayload {
    #[serde(rename = "Nonce", with = "codec::base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(
        rename = "EncryptedDataEncryptionKey",
        with = "codec::base64_bytes"
    )]
    pub encrypted_data_encryption_key: Vec<u8>,
}

/// A signed instruction set executed by the daemon fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investigation {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TaskList")]
    pub task_list: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Scope")]
    pub scope: BTreeMap<String, Vec<String>>,
    #[serde(rename = "KillContainers")]
    pub kill_containers: bool,
    #[serde(rename = "KillHost")]
    pub kill_host: bool,
    #[serde(rename = "Issuer")]
    pub issuer: Signature,
    #[serde(rename = "Approvers")]
    pub approvers: Vec<Signature>,
    #[serde(rename = "RecipientNames")]
    pub recipient_names: Vec<String>,
}

impl Investigation {
    /// The canonical SHA-256 digest every signature covers.
    ///
    /// The blob contains all the data sent in an investigation that is not
    /// signature data, so all parties verify signatures over the same
    /// bytes. Approvers are deliberately excluded: countersigning must not
    /// invalidate the issuer's signature or any earlier approval.
    pub fn digest(&self) -> [u8; 32] {
        let mut blob = Vec::new();
        blob.extend_from_slice(self.id.as_bytes());
        blob.extend_from_slice(&codec::canonical_map_bytes(&self.task_list));
        blob.extend_from_slice(&codec::canonical_map_bytes(&self.scope));
        blob.push(if self.kill_containers { 0x01 } else { 0x00 });
        blob.push(if self.kill_host { 0x01 } else { 0x00 });
        blob.extend_from_slice(self.issuer.name.as_bytes());
        for recipient in &self.recipient_names {
            blob.extend_from_slice(recipient.as_bytes());
        }

        let mut hasher = Sha256::new();
        hasher.update(&blob);
        hasher.finalize().into()
    }

    /// Names of the investigators who have countersigned, in upload order.
    pub fn approver_names(&self) -> Vec<String> {
        self.approvers.iter().map(|sig| sig.name.clone()).collect()
    }

    /// Approvers filtered to one signature per distinct investigator,
    /// dropping any that claim to be the issuer. Signature validity is the
    /// caller's concern; this is pure set arithmetic.
    pub fn unique_approvers(&self) -> Vec<&Signature> {
        let mut seen: Vec<&str> = Vec::new();
        let mut set = Vec::new();
        for sig in &self.approvers {
            if sig.name == self.issuer.name {
                tracing::error!(name = %sig.name, "issuer cannot also be approver");
                continue;
            }
            if seen.contains(&sig.name.as_str()) {
                continue;
            }
            seen.push(sig.name.as_str());
            set.push(sig);
        }
        set
    }

    /// Local scratch directory report artifacts are written into while the
    /// investigation runs.
    pub fn report_directory(&self) -> PathBuf {
        std::env::temp_dir().join(format!("DexterReport-{}", self.id))
    }

    /// Local path of the zipped report built from [`report_directory`].
    ///
    /// [`report_directory`]: Investigation::report_directory
    pub fn report_zip(&self) -> PathBuf {
        std::env::temp_dir().join(format!("DexterReport-{}.zip", self.id))
    }

    /// Local path of the encrypted copy of [`report_zip`].
    ///
    /// [`report_zip`]: Investigation::report_zip
    pub fn report_zip_encrypted(&self) -> PathBuf {
        std::env::temp_dir().join(format!("DexterReport-{}.zip.enc", self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Investigation {
        let mut task_list = BTreeMap::new();
        task_list.insert("get-file".to_string(), vec!["/etc/hostname".to_string()]);
        let mut scope = BTreeMap::new();
        scope.insert("hostname-is".to_string(), vec!["h1".to_string()]);
        Investigation {
            id: "a1b2c3d4".to_string(),
            task_list,
            scope,
            kill_containers: false,
            kill_host: false,
            issuer: Signature {
                name: "alice".to_string(),
                data: vec![1, 2, 3],
            },
            approvers: vec![],
            recipient_names: vec!["alice".to_string(), "bob".to_string()],
        }
    }

    #[test]
    fn digest_ignores_approvers() {
        let inv = sample();
        let before = inv.digest();

        let mut enriched = inv.clone();
        enriched.approvers.push(Signature {
            name: "bob".to_string(),
            data: vec![9; 64],
        });
        assert_eq!(before, enriched.digest());

        enriched.approvers.push(Signature {
            name: "carol".to_string(),
            data: vec![7; 64],
        });
        assert_eq!(before, enriched.digest());
    }

    #[test]
    fn digest_ignores_signature_bytes() {
        let inv = sample();
        let before = inv.digest();

        let mut resigned = inv.clone();
        resigned.issuer.data = vec![0xFF; 64];
        assert_eq!(before, resigned.digest());
    }

    #[test]
    fn digest_covers_signed_fields() {
        let inv = sample();
        let before = inv.digest();

        let mut other = inv.clone();
        other.kill_containers = true;
        assert_ne!(before, other.digest());

        let mut other = inv.clone();
        other.recipient_names.push("mallory".to_string());
        assert_ne!(before, other.digest());

        let mut other = inv.clone();
        other.issuer.name = "mallory".to_string();
        assert_ne!(before, other.digest());

        let mut other = inv.clone();
        other
            .task_list
            .insert("osquery-collect".to_string(), vec![]);
        assert_ne!(before, other.digest());
    }

    #[test]
    fn unique_approvers_drops_issuer_and_duplicates() {
        let mut inv = sample();
        inv.approvers = vec![
            Signature {
                name: "alice".to_string(),
                data: vec![1],
            },
            Signature {
                name: "bob".to_string(),
                data: vec![2],
            },
            Signature {
                name: "bob".to_string(),
                data: vec![3],
            },
        ];

        let unique = inv.unique_approvers();
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].name, "bob");
        assert_eq!(unique[0].data, vec![2]);
    }

    #[test]
    fn wire_format_field_names() {
        let inv = sample();
        let json = serde_json::to_value(&inv).unwrap();
        for field in [
            "ID",
            "TaskList",
            "Scope",
            "KillContainers",
            "KillHost",
            "Issuer",
            "Approvers",
            "RecipientNames",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert!(json["Issuer"].get("Name").is_some());
        assert!(json["Issuer"].get("Data").is_some());
    }

    #[test]
    fn decryption_payload_wire_format() {
        let payload = DecryptionPayload {
            nonce: vec![0; 12],
            encrypted_data_encryption_key: vec![1; 16],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("Nonce").is_some());
        assert!(json.get("EncryptedDataEncryptionKey").is_some());
        assert!(json["Nonce"].is_string());
    }
}
