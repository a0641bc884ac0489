//! Archive build orchestration.
//!
//! Build pipeline phases:
//! - **Extent** - Resolve bbox / .poly / named area into one extent
//! - **Metadata** - Load the illustration, validate archive metadata
//! - **View** - Derive `content/config.json`
//! - **Tiles** - Run the generator in a scoped workspace, collect assets
//! - **Archive** - Merge viewer bundle, config and tiles, publish atomically
//!
//! Cheap checks (destination, viewer bundle) run before generation so a
//! bad invocation never pays for a tile build.

use std::path::PathBuf;

use super::stats::StatsFile;
use crate::{
    archive::{
        ArchiveMetadata, Assembler, AssemblyInput, AssemblyReport, ViewerBundle,
        is_geofabrik_source, output_file_name,
    },
    config::BuildConfig,
    error::BuildError,
    extent::{Extent, ExtentResolver, SourceLoader},
    log,
    logger::ProgressLine,
    tiles::{TileError, TileGenerator},
    utils::{date::DateTimeUtc, fetch::fetch_bytes},
    view::ViewConfig,
};

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub path: PathBuf,
    pub report: AssemblyReport,
}

/// Validate inputs without generating anything.
pub fn check(config: &BuildConfig) -> Result<(), BuildError> {
    let created = DateTimeUtc::now();
    let extent = resolve_extent(config)?;
    let metadata = load_metadata(config, created)?;
    let view = build_view(config, &extent)?;
    log!("view"; "{} centered at {:?}, zoom {}", view.archive_id(), view.center(), view.zoom());
    log!(
        "done";
        "`{}` would be written as {}",
        metadata.fields.title,
        output_file_name(&config.archive.file_name, &config.archive.name, created)
    );
    Ok(())
}

/// Build the archive described by `config`.
///
/// Pipeline: extent -> metadata -> view -> tiles -> archive
pub fn build_archive(config: &BuildConfig) -> Result<BuildSummary, BuildError> {
    let created = DateTimeUtc::now();
    let stats = StatsFile::new(config.build.stats_filename.as_deref());
    stats.write();

    let extent = resolve_extent(config)?;
    let metadata = load_metadata(config, created)?;
    let view = build_view(config, &extent)?;

    let destination = config.build.output.join(output_file_name(
        &config.archive.file_name,
        &config.archive.name,
        created,
    ));
    let assembler = Assembler::new(&destination, config.build.overwrite);
    assembler.check_destination()?;
    let bundle = ViewerBundle::load(&config.viewer.dist, &config.archive.title)?;

    let tmp = config.build.tmp_dir();
    std::fs::create_dir_all(&tmp).map_err(|e| TileError::Workspace(tmp.clone(), e))?;
    let generator = TileGenerator::new(&config.generator, &tmp);
    let tiles = stats.refreshing(|| 0, || generator.generate(&extent))?;
    log!("tiles"; "collected {} assets", tiles.len());

    stats.add_total(bundle.len() + tiles.len());
    let progress = ProgressLine::new(&[("viewer", bundle.len()), ("tiles", tiles.len())]);
    let input = AssemblyInput {
        bundle: &bundle,
        tiles,
        view: &view,
        metadata: &metadata,
        credit_geofabrik: config.region.poly.as_deref().is_some_and(is_geofabrik_source),
    };
    let report = stats.refreshing(
        || progress.totals().0,
        || assembler.assemble(input, Some(&progress)),
    )?;
    stats.add_done(progress.totals().0 + 1);
    progress.finish();
    stats.write();

    log!(
        "done";
        "{} ({} entries, {} aliases)",
        destination.display(),
        report.entries,
        report.aliases
    );
    Ok(BuildSummary {
        path: destination,
        report,
    })
}

fn resolve_extent(config: &BuildConfig) -> Result<Extent, BuildError> {
    let resolver = ExtentResolver::new(config.area_registry(), SourceLoader::new(&config.root));
    let extent = resolver.resolve(&config.region.request())?;
    log!("extent"; "resolved {}", extent);
    Ok(extent)
}

fn load_metadata(config: &BuildConfig, created: DateTimeUtc) -> Result<ArchiveMetadata, BuildError> {
    let source = config.archive.illustration.as_deref().unwrap_or_default();
    let bytes =
        fetch_bytes(source, &config.root).map_err(|e| BuildError::Configuration(Box::new(e)))?;
    Ok(ArchiveMetadata::new(
        config.archive.metadata_fields(),
        &bytes,
        created,
    )?)
}

fn build_view(config: &BuildConfig, extent: &Extent) -> Result<ViewConfig, BuildError> {
    Ok(ViewConfig::build(
        extent,
        &config.archive.name,
        config.viewer.default_view,
        Some(config.archive.secondary_color.clone()),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use crate::extent::ExtentError;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
    use std::fs;
    use std::io::{Cursor, Read};
    use std::path::Path;
    use tempfile::TempDir;

    fn write_png(path: &Path) {
        let img = RgbaImage::from_pixel(64, 64, Rgba([0, 90, 160, 255]));
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        fs::write(path, out.into_inner()).unwrap();
    }

    /// Project with a viewer bundle, an illustration and an `sh` generator.
    fn project(generator: &str) -> (TempDir, BuildConfig) {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("dist/assets")).unwrap();
        fs::write(root.join("dist/index.html"), "<title>Viewer</title>").unwrap();
        fs::write(root.join("dist/assets/app.js"), "js").unwrap();
        write_png(&root.join("logo.png"));

        let mut config = test_parse_config(&format!(
            r#"
[archive]
name = "osm_monaco"
title = "Monaco"
description = "Offline map of Monaco"

[region]
area = "monaco"

[generator]
command = ["sh", "-c", "{generator}"]
"#
        ));
        config.root = root.to_path_buf();
        config.archive.illustration = Some(root.join("logo.png").to_string_lossy().into_owned());
        config.viewer.dist = root.join("dist");
        config.build.output = root.join("out");
        config.build.tmp = Some(root.join("tmp"));
        config.build.stats_filename = Some(root.join("stats.json"));
        (dir, config)
    }

    #[test]
    fn test_check_resolves_without_building() {
        let (dir, config) = project("exit 1");
        check(&config).unwrap();
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_unknown_area_fails_extent_stage() {
        let (_dir, mut config) = project("exit 1");
        config.region.area = Some("atlantis".into());
        let err = check(&config).unwrap_err();
        assert!(matches!(
            err,
            BuildError::ExtentResolution(ExtentError::UnknownArea(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_build_end_to_end() {
        let (dir, config) = project(
            "mkdir -p {output}/14/8529 && printf a > {output}/14/8529/5974.pbf && printf a > {output}/14/8529/5975.pbf",
        );
        let summary = build_archive(&config).unwrap();
        assert!(summary.path.starts_with(dir.path().join("out")));
        assert!(summary.path.to_string_lossy().ends_with(".zip"));
        assert_eq!(summary.report.aliases, 1);

        let mut archive = zip::ZipArchive::new(fs::File::open(&summary.path).unwrap()).unwrap();
        let expected = [
            "index.html",
            "assets/app.js",
            "content/config.json",
            "favicon.ico",
            "content/about.html",
            "14/8529/5974.pbf",
        ];
        for name in expected {
            assert!(archive.by_name(name).is_ok(), "missing {name}");
        }
        let mut index = String::new();
        archive.by_name("index.html").unwrap().read_to_string(&mut index).unwrap();
        assert_eq!(index, "<title>Monaco</title>");
        let mut about = String::new();
        archive.by_name("content/about.html").unwrap().read_to_string(&mut about).unwrap();
        assert!(about.contains("OpenStreetMap"));

        let mut config_json = String::new();
        archive
            .by_name("content/config.json")
            .unwrap()
            .read_to_string(&mut config_json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&config_json).unwrap();
        assert_eq!(value["zimName"], "osm_monaco");
        assert_eq!(value["zoom"], 14.0);

        let stats: serde_json::Value =
            serde_json::from_slice(&fs::read(dir.path().join("stats.json")).unwrap()).unwrap();
        // 2 viewer files + 2 tiles + the publish step
        assert_eq!(stats["done"], stats["total"]);
        assert_eq!(stats["total"], 5);

        // workspaces are gone
        assert_eq!(fs::read_dir(dir.path().join("tmp")).unwrap().count(), 0);

        // same period, same name: refused without --overwrite
        let err = build_archive(&config).unwrap_err();
        assert_eq!(err.stage(), "configuration");
    }

    #[cfg(unix)]
    #[test]
    fn test_generator_failure_publishes_nothing() {
        let (dir, config) = project("echo boom >&2; exit 3");
        let err = build_archive(&config).unwrap_err();
        assert!(matches!(err, BuildError::Generation(_)));
        assert!(!dir.path().join("out").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unknown_tile_type_is_reported() {
        let (_dir, config) = project("mkdir -p {output}/0/0 && printf x > {output}/0/0/0.xyz");
        let err = build_archive(&config).unwrap_err();
        assert!(matches!(err, BuildError::UnsupportedAsset(path) if path.ends_with("0.xyz")));
    }
}
