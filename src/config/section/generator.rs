//! `[generator]` section configuration.
//!
//! The external program that turns an extent into a tile tree.
//!
//! # Example
//!
//! ```toml
//! [generator]
//! command = ["tilemaker", "--bbox", "{bbox}", "--output", "{output}/tiles"]
//! prefix = "tiles"             # entry namespace inside the archive
//! clip_tiles = true            # drop tiles outside the .poly ring
//! include_up_to_zoom = 5       # ...except at low zooms
//! ```
//!
//! Placeholders: `{bbox}`, `{min_lon}`, `{min_lat}`, `{max_lon}`, `{max_lat}`,
//! `{poly}`, `{output}`, `{workspace}`.

use serde::Deserialize;

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Program and arguments; the program must be on `PATH`.
    pub command: Vec<String>,

    /// Prefix prepended to every collected path.
    pub prefix: Option<String>,

    /// Filter `{z}/{x}/{y}` tiles against the clip polygon.
    pub clip_tiles: bool,

    /// Tiles at or below this zoom bypass the clip filter.
    pub include_up_to_zoom: Option<u8>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            prefix: None,
            clip_tiles: true,
            include_up_to_zoom: None,
        }
    }
}

impl GeneratorConfig {
    pub const COMMAND: FieldPath = FieldPath::new("generator.command");
    pub const PREFIX: FieldPath = FieldPath::new("generator.prefix");
    pub const INCLUDE_UP_TO_ZOOM: FieldPath = FieldPath::new("generator.include_up_to_zoom");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.command.first().is_none_or(|program| program.trim().is_empty()) {
            diag.error_with_hint(
                Self::COMMAND,
                "no generator command configured",
                "e.g. command = [\"tilemaker\", \"--bbox\", \"{bbox}\", \"--output\", \"{output}\"]",
            );
        }

        if let Some(prefix) = &self.prefix {
            let trimmed = prefix.trim_matches('/');
            if trimmed.is_empty() || trimmed.split('/').any(|s| s.is_empty() || s == "." || s == "..") {
                diag.error(Self::PREFIX, format!("`{prefix}` is not a relative path"));
            }
        }

        if let Some(zoom) = self.include_up_to_zoom
            && zoom > 24
        {
            diag.error(Self::INCLUDE_UP_TO_ZOOM, format!("zoom {zoom} is above 24"));
        }
        if self.include_up_to_zoom.is_some() && !self.clip_tiles {
            diag.warn(Self::INCLUDE_UP_TO_ZOOM, "has no effect while clip_tiles = false");
        }
    }
}
