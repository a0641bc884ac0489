//! `[archive]` section configuration.
//!
//! Metadata written into the archive and the output file name.
//!
//! # Example
//!
//! ```toml
//! [archive]
//! name = "osm_monaco"
//! title = "Monaco"
//! description = "Offline map of Monaco"
//! illustration = "https://example.org/monaco.png"
//! tags = ["maps", "osm"]
//! language = "eng"                 # ISO 639-3
//! file_name = "{name}_{period}"    # .zip is appended
//! ```

use serde::Deserialize;

use crate::archive::MetadataFields;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub name: String,
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    pub creator: String,
    pub publisher: String,
    pub tags: Vec<String>,
    pub language: String,

    /// Path or URL of the source image; normalized to 48x48 PNG.
    pub illustration: Option<String>,

    /// Viewer accent color.
    pub secondary_color: String,

    /// Output name template, `{name}` and `{period}` (`YYYY-MM`) expanded.
    pub file_name: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            title: String::new(),
            description: String::new(),
            long_description: None,
            creator: "OpenStreetMap contributors".into(),
            publisher: "zimmap".into(),
            tags: Vec::new(),
            language: "eng".into(),
            illustration: None,
            secondary_color: "#FFFFFF".into(),
            file_name: "{name}_{period}".into(),
        }
    }
}

impl ArchiveConfig {
    pub const NAME: FieldPath = FieldPath::new("archive.name");
    pub const TITLE: FieldPath = FieldPath::new("archive.title");
    pub const DESCRIPTION: FieldPath = FieldPath::new("archive.description");
    pub const ILLUSTRATION: FieldPath = FieldPath::new("archive.illustration");
    pub const SECONDARY_COLOR: FieldPath = FieldPath::new("archive.secondary_color");
    pub const FILE_NAME: FieldPath = FieldPath::new("archive.file_name");

    /// Split a `a;b` tag list, dropping empty items.
    pub fn parse_tags(tags: &str) -> Vec<String> {
        tags.split(';')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn metadata_fields(&self) -> MetadataFields {
        MetadataFields {
            name: self.name.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            long_description: self.long_description.clone(),
            creator: self.creator.clone(),
            publisher: self.publisher.clone(),
            tags: self.tags.clone(),
            language: self.language.clone(),
        }
    }

    /// Required fields and formats. Length limits are checked with the
    /// metadata itself.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, value, flag) in [
            (Self::NAME, &self.name, "--name"),
            (Self::TITLE, &self.title, "--title"),
            (Self::DESCRIPTION, &self.description, "--description"),
        ] {
            if value.trim().is_empty() {
                diag.error_with_hint(field, "is required", format!("set {field} or pass {flag}"));
            }
        }

        if is_path_like(&self.name) {
            diag.error_with_hint(
                Self::NAME,
                format!("`{}` would leave the output directory", self.name),
                "use a plain name such as osm_monaco",
            );
        }

        if self.illustration.is_none() {
            diag.error_with_hint(
                Self::ILLUSTRATION,
                "is required",
                "point it at a PNG/JPEG/WebP file or URL, or pass --illustration",
            );
        }

        if !is_hex_color(&self.secondary_color) {
            diag.error_with_hint(
                Self::SECONDARY_COLOR,
                format!("`{}` is not a hex color", self.secondary_color),
                "use the form #RRGGBB",
            );
        }

        let file_name = self.file_name.trim();
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            diag.error(Self::FILE_NAME, "must be a plain file name without directories");
        }
    }
}

/// Whether `name` carries path syntax once substituted into the file name.
fn is_path_like(name: &str) -> bool {
    let name = name.trim();
    name.contains(['/', '\\']) || name == "." || name == ".."
}

fn is_hex_color(color: &str) -> bool {
    color
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_archive_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.archive.language, "eng");
        assert_eq!(config.archive.secondary_color, "#FFFFFF");
        assert_eq!(config.archive.file_name, "{name}_{period}");
        assert_eq!(config.archive.creator, "OpenStreetMap contributors");
    }

    #[test]
    fn test_archive_validation() {
        let mut archive = ArchiveConfig::default();
        let mut diag = ConfigDiagnostics::new();
        archive.validate(&mut diag);
        // name, title, description, illustration
        assert_eq!(diag.len(), 4);

        archive.name = "osm_monaco".into();
        archive.title = "Monaco".into();
        archive.description = "Offline map".into();
        archive.illustration = Some("logo.png".into());
        archive.secondary_color = "white".into();
        archive.file_name = "out/{name}".into();
        let mut diag = ConfigDiagnostics::new();
        archive.validate(&mut diag);
        assert_eq!(diag.len(), 2);
    }

    #[test]
    fn test_name_must_not_be_a_path() {
        for name in ["../x", "a/b", "..", "c:\\tmp"] {
            let archive = ArchiveConfig {
                name: name.into(),
                title: "t".into(),
                description: "d".into(),
                illustration: Some("logo.png".into()),
                ..Default::default()
            };
            let mut diag = ConfigDiagnostics::new();
            archive.validate(&mut diag);
            assert_eq!(diag.len(), 1, "{name}");
            assert_eq!(diag.errors()[0].field, ArchiveConfig::NAME);
        }
    }

    #[test]
    fn test_parse_tags() {
        assert_eq!(ArchiveConfig::parse_tags("maps; osm;;"), vec!["maps", "osm"]);
        assert!(ArchiveConfig::parse_tags("").is_empty());
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#FFFFFF"));
        assert!(is_hex_color("#0af"));
        assert!(!is_hex_color("FFFFFF"));
        assert!(!is_hex_color("#GGGGGG"));
    }
}
