//! Domain name rules.
//!
//! A domain name doubles as its storage-engine table name, so it is
//! restricted to characters every engine accepts.

use crate::{Error, Result};

/// Longest accepted domain name.
pub const MAX_NAME_LEN: usize = 128;

/// Check whether `name` is a valid domain name.
pub fn is_valid_domain_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Validate a domain name, failing with `InvalidInput`.
pub fn validate_domain_name(name: &str) -> Result<()> {
    if is_valid_domain_name(name) {
        Ok(())
    } else {
        Err(Error::invalid_input(format!(
            "invalid domain name '{name}': use 1-{MAX_NAME_LEN} ASCII letters, digits, '_', '-' or '.', not starting with '.'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["notes", "my_notes", "notes-2024", "v1.2", "A"] {
            assert!(is_valid_domain_name(name), "{name}");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", ".hidden", "has space", "slash/name", "ünïcode", "semi;colon"] {
            assert!(!is_valid_domain_name(name), "{name}");
        }
    }

    #[test]
    fn test_name_length_limit() {
        assert!(is_valid_domain_name(&"a".repeat(MAX_NAME_LEN)));
        assert!(!is_valid_domain_name(&"a".repeat(MAX_NAME_LEN + 1)));
    }

    #[test]
    fn test_validate_error_kind() {
        let err = validate_domain_name("bad name").unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("bad name"));
    }
}
