// Path: crates/types/src/id.rs
//! Short investigation identifiers.

/// Length of a Dexter identifier in hex characters.
pub const SHORT_ID_LEN: usize = 8;

/// Return a new randomly generated ID for a Dexter investigation: the first
/// eight hex characters of a v4 UUID.
pub fn new_short_id() -> String {
    uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SHORT_ID_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_shape() {
        let id = new_short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn ids_are_random() {
        let a = new_short_id();
        let b = new_short_id();
        assert_ne!(a, b);
    }
}
