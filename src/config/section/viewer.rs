//! `[viewer]` section configuration.
//!
//! ```toml
//! [viewer]
//! dist = "viewer/dist"          # pre-built viewer, must contain index.html
//! default_view = "43.73,7.42,11" # lat,lon,zoom; computed from the extent if unset
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::view::DefaultView;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub dist: PathBuf,
    pub default_view: Option<DefaultView>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dist: "viewer/dist".into(),
            default_view: None,
        }
    }
}

impl ViewerConfig {
    pub const DIST: FieldPath = FieldPath::new("viewer.dist");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.dist.is_dir() {
            diag.error_with_hint(
                Self::DIST,
                format!("viewer bundle `{}` not found", self.dist.display()),
                "build the viewer first or pass --viewer-dist",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_default_view_parsed() {
        let config = test_parse_config("[viewer]\ndefault_view = \"43.73, 7.42, 11\"");
        let view = config.viewer.default_view.unwrap();
        assert_eq!((view.lat, view.lon, view.zoom), (43.73, 7.42, 11.0));
    }

    #[test]
    fn test_bad_default_view_rejected() {
        let result: Result<crate::config::BuildConfig, _> =
            toml::from_str("[viewer]\ndefault_view = \"north\"");
        assert!(result.is_err());
    }
}
