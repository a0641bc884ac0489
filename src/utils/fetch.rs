//! Source loading for build inputs that may live on disk or behind a URL.
//!
//! Polygon boundaries and illustrations are both given as either a local
//! path (with `~` expansion) or an `http(s)://` URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Timeout for a single download.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("request to `{0}` failed")]
    Http(String, #[source] reqwest::Error),

    #[error("`{url}` answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Whether the source string names a remote resource.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Resolve a local source against `base_dir`, expanding `~`.
pub fn resolve_local(source: &str, base_dir: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(source).into_owned();
    let path = PathBuf::from(expanded);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

/// Load the raw bytes of `source`.
pub fn fetch_bytes(source: &str, base_dir: &Path) -> Result<Vec<u8>, FetchError> {
    if is_remote(source) {
        crate::debug!("fetch"; "downloading {}", source);
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Http(source.to_string(), e))?;
        let response = client
            .get(source)
            .send()
            .map_err(|e| FetchError::Http(source.to_string(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: source.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .map_err(|e| FetchError::Http(source.to_string(), e))?;
        Ok(bytes.to_vec())
    } else {
        let path = resolve_local(source, base_dir);
        std::fs::read(&path).map_err(|e| FetchError::Io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("https://download.geofabrik.de/europe/monaco.poly"));
        assert!(is_remote("http://example.com/a.poly"));
        assert!(!is_remote("monaco.poly"));
        assert!(!is_remote("/abs/monaco.poly"));
    }

    #[test]
    fn test_resolve_local_relative_and_absolute() {
        let base = Path::new("/work");
        assert_eq!(resolve_local("a.poly", base), PathBuf::from("/work/a.poly"));
        assert_eq!(resolve_local("/b.poly", base), PathBuf::from("/b.poly"));
    }

    #[test]
    fn test_fetch_local_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("area.poly"), "x").unwrap();
        let bytes = fetch_bytes("area.poly", dir.path()).unwrap();
        assert_eq!(bytes, b"x");
    }

    #[test]
    fn test_fetch_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = fetch_bytes("missing.poly", dir.path()).unwrap_err();
        assert!(matches!(err, FetchError::Io(..)));
    }
}
