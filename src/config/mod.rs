//! Build configuration management for `zimmap.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── archive    # [archive]
//! │   ├── generator  # [generator]
//! │   ├── output     # [build]
//! │   ├── region     # [region], [areas.<name>]
//! │   └── viewer     # [viewer]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # BuildConfig (this file)
//! ```
//!
//! Precedence: CLI flag > `zimmap.toml` > built-in default. The config file is
//! optional; every required value can come from the command line.

pub mod section;
mod types;
mod util;

use util::{find_config_file, resolve_path, resolve_source};

pub use section::{
    AreaConfig, ArchiveConfig, GeneratorConfig, OutputConfig, RegionConfig, ViewerConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use std::{
    fs,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    cli::{BuildArgs, Cli},
    extent::AreaRegistry,
    log,
};

/// Config file looked up when `-C` is not given.
pub const DEFAULT_CONFIG: &str = "zimmap.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing zimmap.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Config file in use, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative config paths are anchored at (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    pub archive: ArchiveConfig,
    pub region: RegionConfig,
    pub areas: FxHashMap<String, AreaConfig>,
    pub generator: GeneratorConfig,
    pub viewer: ViewerConfig,
    pub build: OutputConfig,
}

impl BuildConfig {
    /// Load configuration for the current command.
    ///
    /// Searches upward from cwd for the config file; a missing default
    /// file is fine, a missing `-C` file is not.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|err| ConfigError::Io(PathBuf::from("."), err))?;
        Self::load_from(cli, &cwd)
    }

    fn load_from(cli: &Cli, cwd: &Path) -> Result<Self, ConfigError> {
        let mut config = match find_config_file(&cli.config, cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(DEFAULT_CONFIG) => {
                return Err(ConfigError::Io(
                    cli.config.clone(),
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
            None => Self {
                root: cwd.to_path_buf(),
                ..Self::default()
            },
        };

        let root = config.root.clone();
        config.normalize_paths(&root);
        config.apply_build_args(cli.build_args(), cwd);
        config.validate(!cli.is_check())?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    /// Named areas: built-ins plus `[areas.<name>]`.
    pub fn area_registry(&self) -> AreaRegistry {
        AreaRegistry::with_areas(self.areas.iter().map(|(name, area)| area.named(name)))
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply build arguments from CLI. Paths are anchored at `cwd`.
    ///
    /// Any region flag replaces the whole `[region]` table, so a CLI
    /// `--area` never combines with a `bbox` from the file.
    fn apply_build_args(&mut self, args: &BuildArgs, cwd: &Path) {
        if args.bbox.is_some() || args.poly.is_some() || args.area.is_some() {
            self.region = RegionConfig {
                bbox: args.bbox,
                poly: args.poly.as_deref().map(|p| resolve_source(p, cwd)),
                area: args.area.clone(),
            };
        }

        let archive = &mut self.archive;
        Self::update_option(&mut archive.name, args.name.as_ref());
        Self::update_option(&mut archive.title, args.title.as_ref());
        Self::update_option(&mut archive.description, args.description.as_ref());
        if let Some(long) = &args.long_description {
            archive.long_description = Some(long.clone());
        }
        Self::update_option(&mut archive.creator, args.creator.as_ref());
        Self::update_option(&mut archive.publisher, args.publisher.as_ref());
        if let Some(tags) = &args.tags {
            archive.tags = ArchiveConfig::parse_tags(tags);
        }
        Self::update_option(&mut archive.language, args.language.as_ref());
        if let Some(illustration) = &args.illustration {
            archive.illustration = Some(resolve_source(illustration, cwd));
        }
        Self::update_option(&mut archive.secondary_color, args.secondary_color.as_ref());
        Self::update_option(&mut archive.file_name, args.file_name.as_ref());

        if let Some(view) = args.default_view {
            self.viewer.default_view = Some(view);
        }
        if let Some(dist) = &args.viewer_dist {
            self.viewer.dist = resolve_path(dist, cwd);
        }

        if let Some(zoom) = args.include_up_to_zoom {
            self.generator.include_up_to_zoom = Some(zoom);
        }
        Self::update_option(&mut self.generator.clip_tiles, args.clip_tiles.as_ref());

        if let Some(output) = &args.output {
            self.build.output = resolve_path(output, cwd);
        }
        if let Some(tmp) = &args.tmp {
            self.build.tmp = Some(resolve_path(tmp, cwd));
        }
        if let Some(stats) = &args.stats_filename {
            self.build.stats_filename = Some(resolve_path(stats, cwd));
        }
        self.build.overwrite |= args.overwrite;
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Anchor file-relative paths and sources at the config directory.
    fn normalize_paths(&mut self, root: &Path) {
        self.viewer.dist = resolve_path(&self.viewer.dist, root);
        self.build.output = resolve_path(&self.build.output, root);
        if let Some(tmp) = self.build.tmp.take() {
            self.build.tmp = Some(resolve_path(&tmp, root));
        }
        if let Some(stats) = self.build.stats_filename.take() {
            self.build.stats_filename = Some(resolve_path(&stats, root));
        }
        if let Some(poly) = self.region.poly.take() {
            self.region.poly = Some(resolve_source(&poly, root));
        }
        if let Some(illustration) = self.archive.illustration.take() {
            self.archive.illustration = Some(resolve_source(&illustration, root));
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Collects all validation errors and returns them at once.
    ///
    /// `for_build` adds the checks only a full build needs (generator,
    /// viewer bundle).
    pub fn validate(&self, for_build: bool) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.archive.validate(&mut diag);
        if for_build {
            self.generator.validate(&mut diag);
            self.viewer.validate(&mut diag);
        }

        diag.print_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields to catch typos in tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BuildConfig {
    let (parsed, ignored) = BuildConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
