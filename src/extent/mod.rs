//! Region resolution.
//!
//! Turns the region descriptors of a build (bounding box, `.poly` boundary,
//! named area) into exactly one [`Extent`]:
//!
//! ```text
//! --bbox 7.40,43.72,7.44,43.76 ─┐
//! --poly monaco.poly ───────────┼─▶ ExtentResolver ─▶ Extent { bounds, clip? }
//! --area monaco ────────────────┘
//! ```
//!
//! An `Extent` can only be built through validating constructors, so any
//! value that exists satisfies `min < max` on both axes and, when a clip
//! polygon is attached, contains the polygon's envelope.

mod area;
mod error;
pub mod poly;
mod resolve;

pub use area::{AreaRegistry, NamedArea};
pub use error::ExtentError;
pub use resolve::{ExtentResolver, PolygonLoader, RegionRequest, SourceLoader, parse_bbox};

use std::fmt;

use geo::line_intersection::{LineIntersection, line_intersection};
use geo::{Area, BoundingRect, Coord, Line, LineString, MultiPolygon, Polygon};

/// Latitude limit of the Web Mercator projection.
pub const MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Axis-aligned geographic rectangle targeted by one build.
#[derive(Debug, Clone, PartialEq)]
pub struct Extent {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
    clip: Option<ClipPolygon>,
}

impl Extent {
    /// Build an extent from raw bounds.
    pub fn from_bounds(
        min_lon: f64,
        min_lat: f64,
        max_lon: f64,
        max_lat: f64,
    ) -> Result<Self, ExtentError> {
        for lon in [min_lon, max_lon] {
            check_lon(lon)?;
        }
        for lat in [min_lat, max_lat] {
            check_lat(lat)?;
        }
        if min_lon >= max_lon || min_lat >= max_lat {
            return Err(ExtentError::Degenerate(format_bounds(
                min_lon, min_lat, max_lon, max_lat,
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
            clip: None,
        })
    }

    /// Build an extent from `[min_lon, min_lat, max_lon, max_lat]`.
    pub fn from_array(bbox: [f64; 4]) -> Result<Self, ExtentError> {
        Self::from_bounds(bbox[0], bbox[1], bbox[2], bbox[3])
    }

    /// Extent covering exactly the polygon's envelope, clipped by it.
    pub fn from_polygon(clip: ClipPolygon) -> Result<Self, ExtentError> {
        let [min_lon, min_lat, max_lon, max_lat] = clip.envelope();
        let mut extent = Self::from_bounds(min_lon, min_lat, max_lon, max_lat)?;
        extent.clip = Some(clip);
        Ok(extent)
    }

    /// Attach a clip polygon whose envelope must lie inside this extent.
    pub fn with_clip(mut self, clip: ClipPolygon) -> Result<Self, ExtentError> {
        let [min_lon, min_lat, max_lon, max_lat] = clip.envelope();
        let inside = min_lon >= self.min_lon
            && min_lat >= self.min_lat
            && max_lon <= self.max_lon
            && max_lat <= self.max_lat;
        if !inside {
            return Err(ExtentError::ClipOutsideExtent {
                clip: format_bounds(min_lon, min_lat, max_lon, max_lat),
                extent: self.to_string(),
            });
        }
        self.clip = Some(clip);
        Ok(self)
    }

    pub fn min_lon(&self) -> f64 {
        self.min_lon
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lon(&self) -> f64 {
        self.max_lon
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn clip(&self) -> Option<&ClipPolygon> {
        self.clip.as_ref()
    }

    /// `[min_lon, min_lat, max_lon, max_lat]`
    pub fn bounds(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }

    /// Comma-separated bounds, the form external tools accept.
    pub fn bbox_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            format_bounds(self.min_lon, self.min_lat, self.max_lon, self.max_lat)
        )?;
        if let Some(clip) = &self.clip {
            write!(
                f,
                " clipped by {} vertices in {} ring(s)",
                clip.vertex_count(),
                clip.ring_count()
            )?;
        }
        Ok(())
    }
}

fn format_bounds(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> String {
    format!("[{min_lon}, {min_lat}, {max_lon}, {max_lat}]")
}

fn check_lon(lon: f64) -> Result<(), ExtentError> {
    if lon.is_finite() && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(ExtentError::OutOfRange(format!("longitude {lon}")))
    }
}

fn check_lat(lat: f64) -> Result<(), ExtentError> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(ExtentError::OutOfRange(format!("latitude {lat}")))
    }
}

// ============================================================================
// Clip polygon
// ============================================================================

/// One or more closed, simple rings restricting generated content inside an
/// extent. Several rings (islands, exclaves) act as their union.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPolygon {
    rings: MultiPolygon<f64>,
}

impl ClipPolygon {
    /// Validate a single ring given as `(lon, lat)` vertices.
    ///
    /// The ring may or may not repeat its first vertex at the end; winding
    /// order is irrelevant.
    pub fn new(vertices: Vec<(f64, f64)>) -> Result<Self, ExtentError> {
        Self::from_rings(vec![vertices])
    }

    /// Validate every ring; the clip covers their union.
    pub fn from_rings(rings: Vec<Vec<(f64, f64)>>) -> Result<Self, ExtentError> {
        let polygons = rings
            .into_iter()
            .map(validate_ring)
            .collect::<Result<Vec<_>, _>>()?;
        if polygons.is_empty() {
            return Err(ExtentError::TooFewVertices(0));
        }
        Ok(Self {
            rings: MultiPolygon::new(polygons),
        })
    }

    pub fn geometry(&self) -> &MultiPolygon<f64> {
        &self.rings
    }

    pub fn ring_count(&self) -> usize {
        self.rings.0.len()
    }

    /// Number of distinct vertices over all rings (closing vertices not counted).
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(distinct_len).sum()
    }

    /// Distinct vertices of each ring as `(lon, lat)`, closing vertex excluded.
    pub fn rings(&self) -> impl Iterator<Item = Vec<(f64, f64)>> + '_ {
        self.rings.iter().map(|polygon| {
            polygon
                .exterior()
                .0
                .iter()
                .take(distinct_len(polygon))
                .map(|c| (c.x, c.y))
                .collect()
        })
    }

    /// `[min_lon, min_lat, max_lon, max_lat]` of all rings together.
    pub fn envelope(&self) -> [f64; 4] {
        // A validated clip always has at least one non-empty ring.
        match self.rings.bounding_rect() {
            Some(rect) => [rect.min().x, rect.min().y, rect.max().x, rect.max().y],
            None => [0.0; 4],
        }
    }
}

fn distinct_len(polygon: &Polygon<f64>) -> usize {
    polygon.exterior().0.len().saturating_sub(1)
}

fn validate_ring(vertices: Vec<(f64, f64)>) -> Result<Polygon<f64>, ExtentError> {
    for &(lon, lat) in &vertices {
        check_lon(lon)?;
        check_lat(lat)?;
    }

    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(vertices.len());
    for (x, y) in vertices {
        let c = Coord { x, y };
        // Consecutive duplicates carry no geometry.
        if coords.last() != Some(&c) {
            coords.push(c);
        }
    }
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return Err(ExtentError::TooFewVertices(coords.len()));
    }

    // LineString -> Polygon closes the ring.
    let polygon = Polygon::new(LineString::from(coords), vec![]);
    if polygon.unsigned_area() <= 0.0 {
        return Err(ExtentError::ZeroArea);
    }
    if is_self_intersecting(polygon.exterior()) {
        return Err(ExtentError::SelfIntersecting);
    }
    Ok(polygon)
}

/// Check edges pairwise: adjacent edges may only share their common vertex,
/// other edges must not meet at all.
fn is_self_intersecting(ring: &LineString<f64>) -> bool {
    let lines: Vec<Line<f64>> = ring.lines().collect();
    let n = lines.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(lines[i], lines[j]) {
                None => {}
                Some(LineIntersection::Collinear { .. }) => return true,
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::SinglePoint { .. }) => return true,
            }
        }
    }
    false
}
