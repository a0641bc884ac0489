//! External generator invocation in a scoped workspace.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::{TileAsset, TileError, TileFilter, collect_assets};
use crate::config::GeneratorConfig;
use crate::extent::{Extent, poly};
use crate::utils::exec::{Cmd, FilterRule};
use crate::{debug, log};

/// Generator chatter that is never worth echoing.
const GENERATOR_NOISE: FilterRule = FilterRule::new(&["Reading ", "Writing "]);

/// Values substituted into the generator command line.
///
/// | placeholder   | value                                   |
/// |---------------|-----------------------------------------|
/// | `{bbox}`      | `min_lon,min_lat,max_lon,max_lat`       |
/// | `{min_lon}` … | single bound                            |
/// | `{poly}`      | path of `extent.poly` (empty if none)   |
/// | `{output}`    | directory the generator must fill       |
/// | `{workspace}` | scratch directory root                  |
///
/// An argument that expands to the empty string is dropped.
#[derive(Debug, Clone)]
pub struct Placeholders {
    pairs: Vec<(&'static str, String)>,
}

impl Placeholders {
    pub fn new(extent: &Extent, poly: Option<&Path>, output: &Path, workspace: &Path) -> Self {
        let path = |p: &Path| p.to_string_lossy().into_owned();
        let pairs = vec![
            ("{bbox}", extent.bbox_string()),
            ("{min_lon}", extent.min_lon().to_string()),
            ("{min_lat}", extent.min_lat().to_string()),
            ("{max_lon}", extent.max_lon().to_string()),
            ("{max_lat}", extent.max_lat().to_string()),
            ("{poly}", poly.map(path).unwrap_or_default()),
            ("{output}", path(output)),
            ("{workspace}", path(workspace)),
        ];
        Self { pairs }
    }

    pub fn expand(&self, arg: &str) -> String {
        self.pairs
            .iter()
            .fold(arg.to_string(), |acc, (key, value)| acc.replace(key, value))
    }
}

/// Runs the configured generator for one extent.
pub struct TileGenerator<'a> {
    config: &'a GeneratorConfig,
    tmp_dir: &'a Path,
}

impl<'a> TileGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig, tmp_dir: &'a Path) -> Self {
        Self { config, tmp_dir }
    }

    /// Generate, collect and (optionally) clip-filter the tile tree.
    ///
    /// The workspace lives only for the duration of this call.
    pub fn generate(&self, extent: &Extent) -> Result<Vec<TileAsset>, TileError> {
        let (program, args) = self
            .config
            .command
            .split_first()
            .ok_or(TileError::EmptyCommand)?;
        let program_path = which::which(program)
            .map_err(|_| TileError::ProgramNotFound(program.clone()))?;

        let workspace = self.create_workspace()?;
        let output = workspace.path().join("output");
        std::fs::create_dir_all(&output).map_err(|e| TileError::Io(output.clone(), e))?;

        let poly_path = match extent.clip() {
            Some(clip) => {
                let path = workspace.path().join("extent.poly");
                std::fs::write(&path, poly::write_poly("extent", clip))
                    .map_err(|e| TileError::Io(path.clone(), e))?;
                Some(path)
            }
            None => None,
        };

        let placeholders = Placeholders::new(extent, poly_path.as_deref(), &output, workspace.path());
        let args: Vec<String> = args.iter().map(|a| placeholders.expand(a)).collect();

        log!("tiles"; "running {} for {}", program, extent);
        debug!("tiles"; "{} {}", program_path.display(), args.join(" "));
        Cmd::new(&program_path)
            .args(&args)
            .cwd(workspace.path())
            .filter(&GENERATOR_NOISE)
            .run()?;

        let assets = collect_assets(&output, self.config.prefix.as_deref())?;
        debug!("tiles"; "collected {} files", assets.len());

        Ok(self.clip(extent, assets))
    }

    fn create_workspace(&self) -> Result<TempDir, TileError> {
        let dir: PathBuf = self.tmp_dir.to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| TileError::Workspace(dir.clone(), e))?;
        tempfile::Builder::new()
            .prefix("zimmap-")
            .tempdir_in(&dir)
            .map_err(|e| TileError::Workspace(dir, e))
    }

    fn clip(&self, extent: &Extent, assets: Vec<TileAsset>) -> Vec<TileAsset> {
        let Some(clip) = extent.clip().filter(|_| self.config.clip_tiles) else {
            return assets;
        };
        let filter = TileFilter::new(clip, self.config.include_up_to_zoom);
        let (kept, dropped) = filter.apply(assets);
        if dropped > 0 {
            log!("tiles"; "dropped {} tiles outside the clip polygon", dropped);
        }
        kept
    }
}
