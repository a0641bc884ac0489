//! Pre-built viewer bundle.

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use jwalk::WalkDir;
use regex::Regex;

use super::AssemblyError;
use crate::tiles::is_safe_relative_path;
use crate::utils::mime;

/// Home entry of every archive.
pub const ENTRY_POINT: &str = "index.html";

#[derive(Debug, Clone, PartialEq)]
pub struct BundleFile {
    pub relative_path: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Static viewer files, entry point first, the rest sorted by path.
#[derive(Debug, Clone)]
pub struct ViewerBundle {
    files: Vec<BundleFile>,
}

impl ViewerBundle {
    /// Load `dir` and stamp `title` into the entry point's `<title>`.
    pub fn load(dir: &Path, title: &str) -> Result<Self, AssemblyError> {
        if !dir.is_dir() {
            return Err(AssemblyError::BundleNotFound(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir).skip_hidden(false) {
            let entry = entry.map_err(|e| {
                AssemblyError::Io(dir.to_path_buf(), std::io::Error::other(e.to_string()))
            })?;
            if entry.file_type().is_file() {
                paths.push(entry.path());
            }
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let relative = path
                .strip_prefix(dir)
                .ok()
                .and_then(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_str())
                        .collect::<Option<Vec<_>>>()
                })
                .map(|segments| segments.join("/"))
                .filter(|rel| is_safe_relative_path(rel))
                .ok_or_else(|| AssemblyError::InvalidPath(path.display().to_string()))?;
            let bytes = std::fs::read(&path).map_err(|e| AssemblyError::Io(path.clone(), e))?;
            files.push(BundleFile {
                mime_type: mime::from_path_or_octet(&path),
                relative_path: relative,
                bytes,
            });
        }

        Self::from_files(files, title).map_err(|err| match err {
            AssemblyError::MissingEntryPoint(_) => AssemblyError::MissingEntryPoint(dir.to_path_buf()),
            other => other,
        })
    }

    /// Order `files` and rewrite the entry point's title.
    pub fn from_files(mut files: Vec<BundleFile>, title: &str) -> Result<Self, AssemblyError> {
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        let index = files
            .iter()
            .position(|f| f.relative_path == ENTRY_POINT)
            .ok_or_else(|| AssemblyError::MissingEntryPoint(ENTRY_POINT.into()))?;

        let mut entry = files.remove(index);
        let html = String::from_utf8_lossy(&entry.bytes);
        entry.bytes = replace_title(&html, title).into_owned().into_bytes();
        files.insert(0, entry);
        Ok(Self { files })
    }

    pub fn files(&self) -> &[BundleFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Replace the first `<title>…</title>` with `title`, HTML-escaped.
pub fn replace_title<'a>(html: &'a str, title: &str) -> Cow<'a, str> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i-u:<title>)(?s:.*?)(?i-u:</title>)").expect("title pattern")
    });
    let replacement = format!("<title>{}</title>", escape_html(title));
    RE.replace(html, regex::NoExpand(&replacement))
}

pub(super) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;
    use std::fs;
    use tempfile::TempDir;

    const INDEX: &str = "<html><head><title>Vite App</title></head><body></body></html>";

    #[test]
    fn test_replace_title() {
        assert_eq!(
            replace_title(INDEX, "Monaco & Co"),
            "<html><head><title>Monaco &amp; Co</title></head><body></body></html>"
        );
        assert_eq!(replace_title("<p>no title</p>", "x"), "<p>no title</p>");
        assert_eq!(
            replace_title("<TITLE>\n old \n</TITLE>", "$1 new"),
            "<title>$1 new</title>"
        );
    }

    #[test]
    fn test_load_orders_entry_point_first() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets")).unwrap();
        fs::write(dir.path().join("assets/app.js"), "js").unwrap();
        fs::write(dir.path().join("assets/app.css"), "css").unwrap();
        fs::write(dir.path().join("index.html"), INDEX).unwrap();
        fs::write(dir.path().join("LICENSE"), "mit").unwrap();

        let bundle = ViewerBundle::load(dir.path(), "Monaco").unwrap();
        let paths: Vec<_> = bundle.files().iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["index.html", "LICENSE", "assets/app.css", "assets/app.js"]);

        let index = &bundle.files()[0];
        assert_eq!(index.mime_type, types::HTML);
        assert!(String::from_utf8_lossy(&index.bytes).contains("<title>Monaco</title>"));
        assert_eq!(bundle.files()[1].mime_type, types::OCTET_STREAM);
    }

    #[test]
    fn test_missing_entry_point() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "js").unwrap();
        let err = ViewerBundle::load(dir.path(), "t").unwrap_err();
        assert!(matches!(err, AssemblyError::MissingEntryPoint(_)));
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = ViewerBundle::load(&dir.path().join("dist"), "t").unwrap_err();
        assert!(matches!(err, AssemblyError::BundleNotFound(_)));
    }
}
