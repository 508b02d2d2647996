//! ID generation utilities.

use ulid::Ulid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }
}

/// Whether `value` has the shape of an entity id.
///
/// Shape only; existence is the repositories' concern. Minted ids are
/// lowercase, and `Ulid::from_string` parses case-insensitively, so
/// uppercase input is rejected here rather than falling through to a
/// lookup that can never match.
#[must_use]
pub fn is_valid_id(value: &str) -> bool {
    !value.bytes().any(|b| b.is_ascii_uppercase()) && Ulid::from_string(value).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
        // Note: ULIDs generated rapidly within the same millisecond
        // may not be strictly ordered due to the random component
    }

    #[test]
    fn test_generated_ids_are_valid() {
        let id_gen = IdGenerator::new();
        assert!(is_valid_id(&id_gen.generate()));
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-an-id"));
        assert!(!is_valid_id("0123456789")); // too short
        assert!(!is_valid_id("01890a5d-ac96-774b-bcce-b302")); // wrong alphabet
    }

    #[test]
    fn test_uppercase_ids_are_rejected() {
        let id_gen = IdGenerator::new();
        let id = id_gen.generate();

        assert!(!is_valid_id(&id.to_uppercase()));

        // Mixed case fails too, even when only one character differs
        let mut mixed = id.into_bytes();
        let pos = mixed.iter().position(u8::is_ascii_lowercase).unwrap();
        mixed[pos] = mixed[pos].to_ascii_uppercase();
        assert!(!is_valid_id(&String::from_utf8(mixed).unwrap()));
    }
}
