//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! output = "output"
//! tmp = "/var/tmp/zimmap"    # workspaces and temp archives (default: system temp)
//! overwrite = false
//! stats_filename = "stats.json"
//! ```

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output: PathBuf,
    pub tmp: Option<PathBuf>,
    pub overwrite: bool,
    pub stats_filename: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output: "output".into(),
            tmp: None,
            overwrite: false,
            stats_filename: None,
        }
    }
}

impl OutputConfig {
    /// Directory for generator workspaces.
    pub fn tmp_dir(&self) -> PathBuf {
        self.tmp.clone().unwrap_or_else(std::env::temp_dir)
    }
}
