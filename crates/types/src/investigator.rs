// Path: crates/types/src/investigator.rs
//! Investigator records.
//!
//! An investigator is a human operator identified by a unique short display
//! name and an RSA public key. The key components travel as decimal ASCII
//! strings so records survive any JSON tooling without precision loss.

use serde::{Deserialize, Serialize};

/// RSA public key components, represented as strings for JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyRecord {
    /// Modulus, decimal.
    #[serde(rename = "N")]
    pub n: String,
    /// Public exponent, decimal.
    #[serde(rename = "E")]
    pub e: String,
}

/// An investigator is defined by their name and public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigator {
    #[serde(rename = "PublicKey")]
    pub public_key: PublicKeyRecord,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Investigator {
    /// Serialize the record the way it is published to the registry.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }

    /// Parse a registry record. Empty or unparseable blobs are revoked or
    /// corrupt records; callers treat the error as "no such investigator".
    pub fn from_json(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_roundtrip() {
        let record = Investigator {
            name: "alice".to_string(),
            public_key: PublicKeyRecord {
                n: "1234567890".to_string(),
                e: "65537".to_string(),
            },
        };
        let json = record.to_json().unwrap();
        let back = Investigator::from_json(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn wire_format_field_names() {
        let record = Investigator {
            name: "alice".to_string(),
            public_key: PublicKeyRecord {
                n: "5".to_string(),
                e: "65537".to_string(),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["Name"], "alice");
        assert_eq!(json["PublicKey"]["N"], "5");
        assert_eq!(json["PublicKey"]["E"], "65537");
    }

    #[test]
    fn empty_blob_is_not_a_record() {
        assert!(Investigator::from_json(b"").is_err());
    }
}
