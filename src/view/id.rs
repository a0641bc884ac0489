//! Archive identifier derivation.

use super::ViewError;

/// Derive the storage-safe archive id from the archive name.
///
/// Transliterates to ASCII, keeps `[A-Za-z0-9._-]`, collapses every other
/// run of characters into a single `_` and trims `_` from both ends.
pub fn archive_id(name: &str) -> Result<String, ViewError> {
    let ascii = deunicode::deunicode(name);
    let mut id = String::with_capacity(ascii.len());
    let mut in_gap = false;
    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
            id.push(c);
            in_gap = false;
        } else if !in_gap {
            id.push('_');
            in_gap = true;
        }
    }
    let id = id.trim_matches('_');
    if id.is_empty() {
        return Err(ViewError::EmptyArchiveId(name.to_string()));
    }
    Ok(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_unchanged() {
        assert_eq!(archive_id("swiss").unwrap(), "swiss");
        assert_eq!(archive_id("osm-monaco_2024.01").unwrap(), "osm-monaco_2024.01");
    }

    #[test]
    fn test_transliteration_and_runs() {
        assert_eq!(archive_id("Zürich & Genève").unwrap(), "Zurich_Geneve");
        assert_eq!(archive_id("  spaced   out  ").unwrap(), "spaced_out");
        assert_eq!(archive_id("a/b\\c$d").unwrap(), "a_b_c_d");
    }

    #[test]
    fn test_pure_function_of_name() {
        assert_eq!(archive_id("Côte d'Azur").unwrap(), archive_id("Côte d'Azur").unwrap());
    }

    #[test]
    fn test_empty_result_is_error() {
        assert!(archive_id("").is_err());
        assert!(archive_id(" !!! ").is_err());
    }

    #[test]
    fn test_id_never_contains_storage_separator() {
        assert!(!archive_id("a$b").unwrap().contains('$'));
    }
}
