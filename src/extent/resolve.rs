//! Descriptor precedence and polygon loading.

use std::path::PathBuf;

use super::{AreaRegistry, ClipPolygon, Extent, ExtentError, poly};
use crate::utils::fetch;

/// Region descriptors as supplied by CLI and config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionRequest {
    pub bbox: Option<[f64; 4]>,
    /// Path or `http(s)://` URL of a `.poly` file.
    pub polygon: Option<String>,
    pub area: Option<String>,
}

/// Parse `min_lon,min_lat,max_lon,max_lat`.
pub fn parse_bbox(text: &str) -> Result<[f64; 4], ExtentError> {
    let invalid = || ExtentError::InvalidBbox(text.to_string());
    let values = text
        .split(',')
        .map(|part| part.trim().parse::<f64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    <[f64; 4]>::try_from(values).map_err(|_| invalid())
}

/// Source of polygon text.
pub trait PolygonLoader {
    fn load(&self, source: &str) -> Result<String, ExtentError>;
}

/// Loads from disk (relative to `base_dir`) or over HTTP.
pub struct SourceLoader {
    base_dir: PathBuf,
}

impl SourceLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }
}

impl PolygonLoader for SourceLoader {
    fn load(&self, source: &str) -> Result<String, ExtentError> {
        let bytes = fetch::fetch_bytes(source, &self.base_dir)?;
        String::from_utf8(bytes).map_err(|_| ExtentError::malformed(source, "not valid UTF-8"))
    }
}

/// Turns a [`RegionRequest`] into exactly one [`Extent`].
///
/// | supplied         | result                                         |
/// |------------------|------------------------------------------------|
/// | polygon          | polygon envelope, clipped by polygon           |
/// | bbox             | bbox                                           |
/// | area             | registry bbox                                  |
/// | polygon + bbox   | bbox, clipped by polygon (must be contained)   |
/// | area + other     | rejected as ambiguous                          |
pub struct ExtentResolver<L> {
    areas: AreaRegistry,
    loader: L,
}

impl<L: PolygonLoader> ExtentResolver<L> {
    pub fn new(areas: AreaRegistry, loader: L) -> Self {
        Self { areas, loader }
    }

    pub fn resolve(&self, request: &RegionRequest) -> Result<Extent, ExtentError> {
        let RegionRequest {
            bbox,
            polygon,
            area,
        } = request;

        if let Some(area) = area {
            if bbox.is_some() || polygon.is_some() {
                return Err(ExtentError::Ambiguous(format!(
                    "area `{area}` cannot be combined with a bounding box or polygon"
                )));
            }
            return self.areas.lookup(area);
        }

        let clip = polygon
            .as_deref()
            .map(|source| self.load_polygon(source))
            .transpose()?;

        match (bbox, clip) {
            (Some(bbox), Some(clip)) => Extent::from_array(*bbox)?.with_clip(clip),
            (Some(bbox), None) => Extent::from_array(*bbox),
            (None, Some(clip)) => Extent::from_polygon(clip),
            (None, None) => Err(ExtentError::NoDescriptor),
        }
    }

    fn load_polygon(&self, source: &str) -> Result<ClipPolygon, ExtentError> {
        crate::debug!("extent"; "loading polygon {}", source);
        let text = self.loader.load(source)?;
        poly::parse_poly(&text, source)
    }
}
