//! Managed table naming convention.
//!
//! A managed table `cars` lives in the store as `_cars`. Tables without the
//! prefix belong to someone else and are never listed or touched.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::DbError;

/// Reserved prefix marking a storage table as managed.
pub const MANAGED_PREFIX: &str = "_";

static TABLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[0-9A-Za-z_]+\z").expect("table name pattern is valid"));

/// Checks that a user-facing table name only uses `[0-9A-Za-z_]`.
pub fn validate_table_name(name: &str) -> Result<(), DbError> {
    if TABLE_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(DbError::InvalidTableName(name.to_string()))
    }
}

/// Maps a user-facing name to its storage name.
pub fn encode(name: &str) -> String {
    format!("{}{}", MANAGED_PREFIX, name)
}

/// Maps a storage name back to its user-facing name.
///
/// Returns `None` for tables that aren't managed.
pub fn decode(storage_name: &str) -> Option<&str> {
    storage_name
        .strip_prefix(MANAGED_PREFIX)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_round_trip() {
        assert_eq!(encode("cars"), "_cars");
        assert_eq!(decode("_cars"), Some("cars"));
        assert_eq!(decode(&encode("_private")), Some("_private"));
        assert_eq!(decode("noncustom"), None);
    }

    #[test]
    fn test_validate_table_name() {
        assert!(validate_table_name("cars").is_ok());
        assert!(validate_table_name("Cars_2024").is_ok());
        assert!(validate_table_name("_").is_ok());

        for bad in ["", "cars; drop table", "naïve", "with space", "cars\n"] {
            assert_eq!(
                validate_table_name(bad),
                Err(DbError::InvalidTableName(bad.to_string())),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
