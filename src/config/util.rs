//! Configuration utility functions.

use std::path::{Path, PathBuf};

use crate::utils::fetch::{is_remote, resolve_local};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/maps/monaco/     ← start
/// /home/user/maps/zimmap.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}

/// Anchor a directory/file setting at `base`, expanding `~`.
pub fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    resolve_local(&path.to_string_lossy(), base)
}

/// Anchor a path-or-URL source at `base`; URLs pass through.
pub fn resolve_source(source: &str, base: &Path) -> String {
    if is_remote(source) {
        source.to_string()
    } else {
        resolve_local(source, base).to_string_lossy().into_owned()
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("zimmap.toml"), "").unwrap();

        let found = find_config_file(Path::new("zimmap.toml"), &nested).unwrap();
        assert_eq!(found, dir.path().join("zimmap.toml"));
        assert!(find_config_file(Path::new("other.toml"), &nested).is_none());
    }

    #[test]
    fn test_find_config_file_absolute() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        assert!(find_config_file(&path, dir.path()).is_none());
        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }

    #[test]
    fn test_resolve_source() {
        let base = Path::new("/project");
        assert_eq!(resolve_source("https://x/monaco.poly", base), "https://x/monaco.poly");
        assert_eq!(resolve_source("monaco.poly", base), "/project/monaco.poly");
        assert_eq!(resolve_source("/abs/monaco.poly", base), "/abs/monaco.poly");
        assert_eq!(resolve_path(Path::new("dist"), base), PathBuf::from("/project/dist"));
    }
}
