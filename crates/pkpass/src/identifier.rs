//! Pass identifiers.
//!
//! An identifier is a random (v4) UUID rendered as 32 lowercase hex digits
//! without hyphens. It doubles as the pass serial number, the staging
//! directory name, and the archive file stem.

use uuid::Uuid;

/// Length of a pass identifier in characters.
pub const PASS_ID_LEN: usize = 32;

/// Generate a fresh pass identifier.
///
/// ```
/// let id = pkpass::generate_pass_id();
/// assert_eq!(id.len(), 32);
/// assert!(id.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
/// ```
pub fn generate_pass_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Whether `id` has the shape of a generated identifier.
pub fn is_pass_id(id: &str) -> bool {
    id.len() == PASS_ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_lowercase_hex_and_unique() {
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let id = generate_pass_id();
            assert!(is_pass_id(&id), "bad identifier {id}");
            assert!(seen.insert(id), "duplicate identifier");
        }
    }

    #[test]
    fn test_is_pass_id() {
        assert!(is_pass_id("0123456789abcdef0123456789abcdef"));
        assert!(!is_pass_id("0123456789ABCDEF0123456789ABCDEF"));
        assert!(!is_pass_id("01234567-89ab-cdef-0123-456789abcdef"));
        assert!(!is_pass_id("../etc"));
        assert!(!is_pass_id(""));
    }
}
