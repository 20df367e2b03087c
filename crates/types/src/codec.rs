// Path: crates/types/src/codec.rs
//! Wire codec conventions shared by every Dexter blob.
//!
//! JSON is the only on-wire encoding. Byte fields travel as base64 strings,
//! and the signing digest consumes maps in sorted-key order so every party
//! hashes identical bytes regardless of how a map was populated.

use std::collections::BTreeMap;

/// Serde adapter for `Vec<u8>` fields encoded as base64 strings on the wire.
///
/// Usage: `#[serde(with = "codec::base64_bytes")]`.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// Flatten a `name -> arguments` map into the canonical byte form used by
/// the signing digest: keys in lexicographic order, each key's UTF-8 bytes
/// followed by each argument's bytes in declared order, with no delimiters.
///
/// `BTreeMap` iteration is already sorted; the explicit collect-and-sort
/// keeps the canonical form independent of the map type callers hand us.
pub fn canonical_map_bytes(map: &BTreeMap<String, Vec<String>>) -> Vec<u8> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut out = Vec::new();
    for key in keys {
        out.extend_from_slice(key.as_bytes());
        if let Some(args) = map.get(key) {
            for arg in args {
                out.extend_from_slice(arg.as_bytes());
            }
        }
    }
    out
}
