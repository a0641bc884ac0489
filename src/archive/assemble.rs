//! Entry ordering, dedupe and atomic publish.

use std::path::{Path, PathBuf};

use rustc_hash::{FxHashMap, FxHashSet};

use super::{
    ABOUT_PATH, ArchiveMetadata, ArchiveWriter, AssemblyError, Entry, ViewerBundle,
    ZipArchiveWriter, render_about,
};
use crate::logger::ProgressLine;
use crate::tiles::{ContentHash, TileAsset, is_safe_relative_path};
use crate::utils::date::DateTimeUtc;
use crate::utils::mime;
use crate::debug;
use crate::view::{CONFIG_PATH, ViewConfig};

/// Favicon entry path.
pub const FAVICON_PATH: &str = "favicon.ico";

/// Everything that goes into one archive.
pub struct AssemblyInput<'a> {
    pub bundle: &'a ViewerBundle,
    pub tiles: Vec<TileAsset>,
    pub view: &'a ViewConfig,
    pub metadata: &'a ArchiveMetadata,
    /// Credit Geofabrik on the about page.
    pub credit_geofabrik: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Entries written with content.
    pub entries: usize,
    /// Tile paths written as aliases of an earlier identical tile.
    pub aliases: usize,
}

/// `{name}` and `{period}` (`YYYY-MM`) expanded, `.zip` appended.
///
/// Path separators coming from `name` become `_`, so the result is always a
/// single file name.
pub fn output_file_name(template: &str, name: &str, created: DateTimeUtc) -> String {
    let name = name.replace(['/', '\\'], "_");
    let stem = template
        .replace("{name}", &name)
        .replace("{period}", &created.period());
    format!("{stem}.zip")
}

/// Validate the merged entry set, then drive `writer` in archive order.
///
/// Every path is checked before the first write, so a collision never
/// produces a partially written container.
pub fn write_archive<W: ArchiveWriter>(
    mut writer: W,
    input: AssemblyInput<'_>,
    progress: Option<&ProgressLine>,
) -> Result<(W::Output, AssemblyReport), AssemblyError> {
    let AssemblyInput {
        bundle,
        tiles,
        view,
        metadata,
        credit_geofabrik,
    } = input;
    let config_json = view.to_json()?;
    let about_html = render_about(&metadata.fields, credit_geofabrik);

    let targets = plan(&writer, bundle, &tiles)?;
    let mut report = AssemblyReport::default();

    writer.set_metadata(metadata)?;

    for (i, file) in bundle.files().iter().enumerate() {
        writer.add_entry(Entry {
            path: &file.relative_path,
            bytes: &file.bytes,
            mime_type: file.mime_type,
            is_home: i == 0,
        })?;
        report.entries += 1;
        if let Some(p) = progress {
            p.inc("viewer");
        }
    }

    writer.add_entry(Entry {
        path: CONFIG_PATH,
        bytes: &config_json,
        mime_type: mime::types::JSON,
        is_home: false,
    })?;
    writer.add_entry(Entry {
        path: FAVICON_PATH,
        bytes: &metadata.favicon,
        mime_type: mime::types::ICO,
        is_home: false,
    })?;
    writer.add_entry(Entry {
        path: ABOUT_PATH,
        bytes: about_html.as_bytes(),
        mime_type: mime::types::HTML,
        is_home: false,
    })?;
    report.entries += 3;

    // Consume tiles so each payload is freed once written.
    for (tile, target) in tiles.into_iter().zip(targets) {
        match target {
            Some(target) => {
                writer.add_alias(&tile.relative_path, &target)?;
                report.aliases += 1;
            }
            None => {
                writer.add_entry(Entry {
                    path: &tile.relative_path,
                    bytes: &tile.bytes,
                    mime_type: tile.mime_type,
                    is_home: false,
                })?;
                report.entries += 1;
            }
        }
        if let Some(p) = progress {
            p.inc("tiles");
        }
    }

    let output = writer.finish()?;
    Ok((output, report))
}

/// Check for collisions and pick alias targets: `Some(path)` for a tile whose
/// content matches an earlier tile.
fn plan<W: ArchiveWriter>(
    writer: &W,
    bundle: &ViewerBundle,
    tiles: &[TileAsset],
) -> Result<Vec<Option<String>>, AssemblyError> {
    let mut seen: FxHashSet<&str> = writer.reserved_paths().iter().copied().collect();

    let fixed = bundle
        .files()
        .iter()
        .map(|f| f.relative_path.as_str())
        .chain([CONFIG_PATH, FAVICON_PATH, ABOUT_PATH]);
    for path in fixed {
        claim(&mut seen, path)?;
    }

    let mut first_by_hash: FxHashMap<ContentHash, &str> = FxHashMap::default();
    let mut targets = Vec::with_capacity(tiles.len());
    for tile in tiles {
        claim(&mut seen, &tile.relative_path)?;
        match first_by_hash.get(&tile.content_hash) {
            Some(first) => {
                debug!("archive"; "{} aliases {} ({})", tile.relative_path, first, tile.content_hash);
                targets.push(Some((*first).to_string()));
            }
            None => {
                first_by_hash.insert(tile.content_hash, &tile.relative_path);
                targets.push(None);
            }
        }
    }
    debug!("archive"; "planned {} entries, {} unique tiles", seen.len(), first_by_hash.len());
    Ok(targets)
}

fn claim<'a>(seen: &mut FxHashSet<&'a str>, path: &'a str) -> Result<(), AssemblyError> {
    if !is_safe_relative_path(path) {
        return Err(AssemblyError::InvalidPath(path.to_string()));
    }
    if !seen.insert(path) {
        return Err(AssemblyError::Collision(path.to_string()));
    }
    Ok(())
}

/// Writes the archive next to its destination and renames it into place.
pub struct Assembler {
    destination: PathBuf,
    overwrite: bool,
}

impl Assembler {
    pub fn new(destination: impl Into<PathBuf>, overwrite: bool) -> Self {
        Self {
            destination: destination.into(),
            overwrite,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Fail early when the destination exists and may not be replaced.
    pub fn check_destination(&self) -> Result<(), AssemblyError> {
        if self.destination.exists() && !self.overwrite {
            return Err(AssemblyError::DestinationExists(self.destination.clone()));
        }
        Ok(())
    }

    /// Assemble into a temp file in the destination directory, then publish.
    ///
    /// On any error the temp file is removed and the destination is untouched.
    pub fn assemble(
        &self,
        input: AssemblyInput<'_>,
        progress: Option<&ProgressLine>,
    ) -> Result<AssemblyReport, AssemblyError> {
        self.check_destination()?;

        let dir = match self.destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| AssemblyError::Io(dir.clone(), e))?;

        let temp = tempfile::Builder::new()
            .prefix(".zimmap-")
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(|e| AssemblyError::Io(dir.clone(), e))?;
        debug!("archive"; "writing {}", temp.path().display());

        let (temp, report) = write_archive(ZipArchiveWriter::new(temp), input, progress)?;
        temp.as_file()
            .sync_all()
            .map_err(|e| AssemblyError::Io(temp.path().to_path_buf(), e))?;

        let persisted = if self.overwrite {
            temp.persist(&self.destination)
        } else {
            temp.persist_noclobber(&self.destination)
        };
        persisted.map_err(|e| AssemblyError::Persist(self.destination.clone(), e.error))?;
        Ok(report)
    }
}
