//! Read a generator output tree back into ordered assets.

use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rayon::prelude::*;

use super::{TileAsset, TileError};
use crate::utils::mime;

/// Walk `root` and return every file as a [`TileAsset`], sorted by path.
///
/// Paths are relative to `root`, optionally placed under `prefix`. Every
/// file must have a known MIME type; the first unknown one fails the walk
/// before any file is read.
pub fn collect_assets(root: &Path, prefix: Option<&str>) -> Result<Vec<TileAsset>, TileError> {
    let prefix = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty());

    let mut files: Vec<(String, PathBuf, &'static str)> = Vec::new();
    for entry in WalkDir::new(root).skip_hidden(false) {
        let entry = entry.map_err(|e| {
            let err = std::io::Error::other(e.to_string());
            TileError::Io(root.to_path_buf(), err)
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let relative = relative_path(root, &path)?;
        let mime_type = mime::from_path(&path).ok_or_else(|| TileError::Unsupported {
            path: relative.clone(),
        })?;
        let relative = match prefix {
            Some(prefix) => format!("{prefix}/{relative}"),
            None => relative,
        };
        files.push((relative, path, mime_type));
    }

    if files.is_empty() {
        return Err(TileError::NoOutput(root.to_path_buf()));
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));

    files
        .into_par_iter()
        .map(|(relative, path, mime_type)| {
            let bytes = std::fs::read(&path).map_err(|e| TileError::Io(path, e))?;
            TileAsset::new(relative, bytes, mime_type)
        })
        .collect()
}

/// Forward-slash path of `path` below `root`.
fn relative_path(root: &Path, path: &Path) -> Result<String, TileError> {
    let invalid = || TileError::InvalidPath(path.display().to_string());
    let rel = path.strip_prefix(root).map_err(|_| invalid())?;
    let segments = rel
        .components()
        .map(|c| c.as_os_str().to_str().ok_or_else(invalid))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collect_sorted_with_mime() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "tiles/1/1/0.pbf", b"b");
        write(dir.path(), "tiles/0/0/0.pbf", b"a");
        write(dir.path(), "style.json", b"{}");
        write(dir.path(), "sprites/sprite.png", b"png");

        let assets = collect_assets(dir.path(), None).unwrap();
        let paths: Vec<_> = assets.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["sprites/sprite.png", "style.json", "tiles/0/0/0.pbf", "tiles/1/1/0.pbf"]
        );
        assert_eq!(assets[2].mime_type, types::PROTOBUF);
        assert_eq!(assets[2].bytes, b"a");
    }

    #[test]
    fn test_collect_with_prefix() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "0/0/0.pbf", b"a");
        let assets = collect_assets(dir.path(), Some("/tiles/")).unwrap();
        assert_eq!(assets[0].relative_path, "tiles/0/0/0.pbf");
    }

    #[test]
    fn test_collect_unknown_extension_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "0/0/0.pbf", b"a");
        write(dir.path(), "notes.xyz", b"?");
        let err = collect_assets(dir.path(), None).unwrap_err();
        assert!(matches!(err, TileError::Unsupported { path } if path == "notes.xyz"));
    }

    #[test]
    fn test_collect_empty_output() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("empty")).unwrap();
        assert!(matches!(
            collect_assets(dir.path(), None),
            Err(TileError::NoOutput(_))
        ));
    }

    #[test]
    fn test_collect_is_deterministic() {
        let dir = TempDir::new().unwrap();
        for i in 0..20 {
            write(dir.path(), &format!("5/{i}/{}.pbf", i * 3), format!("{i}").as_bytes());
        }
        let a = collect_assets(dir.path(), None).unwrap();
        let b = collect_assets(dir.path(), None).unwrap();
        assert_eq!(a, b);
    }
}
