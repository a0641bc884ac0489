//! Command-line interface definitions.

use clap::{ArgAction, ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::extent::parse_bbox;
use crate::view::DefaultView;

/// Build offline map archives from a region description
#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about,
    long_about = None,
    arg_required_else_help = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Print version (`-V` is taken by --verbose)
    #[arg(long, action = ArgAction::Version)]
    version: Option<bool>,

    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: zimmap.toml, optional)
    #[arg(short = 'C', long, global = true, default_value = "zimmap.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate tiles and assemble the archive
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Resolve the extent and validate metadata without building
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        build_args: BuildArgs,
    },
}

/// Options shared by `build` and `check`; each overrides `zimmap.toml`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Bounding box `min_lon,min_lat,max_lon,max_lat`
    #[arg(long, value_parser = parse_bbox, allow_hyphen_values = true, help_heading = "Region")]
    pub bbox: Option<[f64; 4]>,

    /// Osmosis .poly boundary, local path or http(s) URL
    #[arg(long, help_heading = "Region")]
    pub poly: Option<String>,

    /// Named area (built-in or from [areas.<name>])
    #[arg(long, help_heading = "Region")]
    pub area: Option<String>,

    /// Archive name, also the source of the viewer's storage id
    #[arg(long, help_heading = "Metadata")]
    pub name: Option<String>,

    /// Archive title (max 30 characters)
    #[arg(long, help_heading = "Metadata")]
    pub title: Option<String>,

    /// Archive description (max 80 characters)
    #[arg(long, help_heading = "Metadata")]
    pub description: Option<String>,

    /// Archive long description (max 4000 characters)
    #[arg(long, help_heading = "Metadata")]
    pub long_description: Option<String>,

    #[arg(long, help_heading = "Metadata")]
    pub creator: Option<String>,

    #[arg(long, help_heading = "Metadata")]
    pub publisher: Option<String>,

    /// Semicolon separated tags, e.g. `maps;osm`
    #[arg(long, help_heading = "Metadata")]
    pub tags: Option<String>,

    /// ISO 639-3 language code
    #[arg(long, help_heading = "Metadata")]
    pub language: Option<String>,

    /// Illustration image, local path or http(s) URL
    #[arg(long, help_heading = "Metadata")]
    pub illustration: Option<String>,

    /// Initial view `lat,lon,zoom` instead of the computed one
    #[arg(long, allow_hyphen_values = true, help_heading = "Viewer")]
    pub default_view: Option<DefaultView>,

    /// Viewer accent color, e.g. `#FFFFFF`
    #[arg(long, help_heading = "Viewer")]
    pub secondary_color: Option<String>,

    /// Pre-built viewer directory (must contain index.html)
    #[arg(long, value_hint = clap::ValueHint::DirPath, help_heading = "Viewer")]
    pub viewer_dist: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_hint = clap::ValueHint::DirPath, help_heading = "Output")]
    pub output: Option<PathBuf>,

    /// Directory for temporary workspaces
    #[arg(long, value_hint = clap::ValueHint::DirPath, help_heading = "Output")]
    pub tmp: Option<PathBuf>,

    /// Archive file name template; `{name}` and `{period}` are expanded
    #[arg(long, help_heading = "Output")]
    pub file_name: Option<String>,

    /// Replace an existing archive
    #[arg(long, help_heading = "Output")]
    pub overwrite: bool,

    /// Write `{"done", "total"}` progress JSON to this file
    #[arg(long, value_hint = clap::ValueHint::FilePath, help_heading = "Output")]
    pub stats_filename: Option<PathBuf>,

    /// Keep every tile up to this zoom regardless of the clip polygon
    #[arg(long, help_heading = "Tiles")]
    pub include_up_to_zoom: Option<u8>,

    /// Drop tiles outside the clip polygon
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false, help_heading = "Tiles")]
    pub clip_tiles: Option<bool>,
}

impl Cli {
    pub fn build_args(&self) -> &BuildArgs {
        match &self.command {
            Commands::Build { build_args } | Commands::Check { build_args } => build_args,
        }
    }

    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_flags() {
        let cli = Cli::try_parse_from([
            "zimmap",
            "build",
            "--bbox",
            "-1.5,43.7,7.5,44",
            "--name",
            "osm_monaco",
            "--tags",
            "maps;osm",
            "--default-view",
            "43.73,7.42,11",
            "--overwrite",
        ])
        .unwrap();
        let args = cli.build_args();
        assert_eq!(args.bbox, Some([-1.5, 43.7, 7.5, 44.0]));
        assert_eq!(args.name.as_deref(), Some("osm_monaco"));
        assert_eq!(args.tags.as_deref(), Some("maps;osm"));
        let view = args.default_view.unwrap();
        assert_eq!((view.lat, view.lon, view.zoom), (43.73, 7.42, 11.0));
        assert!(args.overwrite);
        assert!(!cli.is_check());
    }

    #[test]
    fn test_check_and_global_flags() {
        let cli = Cli::try_parse_from(["zimmap", "check", "--area", "monaco", "-V", "-C", "x.toml"])
            .unwrap();
        assert!(cli.is_check());
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
        assert_eq!(cli.build_args().area.as_deref(), Some("monaco"));
    }

    #[test]
    fn test_command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_is_long_only() {
        let err = Cli::try_parse_from(["zimmap", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        let cli = Cli::try_parse_from(["zimmap", "-V", "check", "--area", "monaco"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Cli::try_parse_from(["zimmap", "build", "--bbox", "1,2,3"]).is_err());
        assert!(Cli::try_parse_from(["zimmap", "build", "--default-view", "1,2"]).is_err());
    }
}
