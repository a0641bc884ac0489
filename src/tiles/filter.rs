//! Drop `{z}/{x}/{y}` tiles that fall outside the clip polygon.

use std::f64::consts::PI;
use std::sync::LazyLock;

use geo::{Intersects, MultiPolygon, Rect, coord};
use regex::Regex;

use super::TileAsset;
use crate::extent::ClipPolygon;

/// Deepest zoom accepted when parsing tile paths.
const MAX_TILE_ZOOM: u8 = 24;

/// Keeps tiles whose Web Mercator footprint touches the clip polygon.
pub struct TileFilter<'a> {
    clip: &'a MultiPolygon<f64>,
    include_up_to_zoom: Option<u8>,
}

impl<'a> TileFilter<'a> {
    /// Tiles at `z <= include_up_to_zoom` are always kept.
    pub fn new(clip: &'a ClipPolygon, include_up_to_zoom: Option<u8>) -> Self {
        Self {
            clip: clip.geometry(),
            include_up_to_zoom,
        }
    }

    /// Whether the asset at `path` belongs in the archive. Non-tile paths
    /// (styles, fonts, sprites) always do.
    pub fn keeps(&self, path: &str) -> bool {
        let Some((z, x, y)) = tile_coords(path) else {
            return true;
        };
        if self.include_up_to_zoom.is_some_and(|max| z <= max) {
            return true;
        }
        tile_bbox(z, x, y).to_polygon().intersects(self.clip)
    }

    /// Filter `assets`, returning the survivors and the number dropped.
    pub fn apply(&self, assets: Vec<TileAsset>) -> (Vec<TileAsset>, usize) {
        let before = assets.len();
        let kept: Vec<_> = assets
            .into_iter()
            .filter(|asset| self.keeps(&asset.relative_path))
            .collect();
        let dropped = before - kept.len();
        (kept, dropped)
    }
}

/// Parse a trailing `{z}/{x}/{y}.{ext}` out of an asset path.
pub fn tile_coords(path: &str) -> Option<(u8, u32, u32)> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?:^|/)([0-9]{1,2})/([0-9]+)/([0-9]+)\.[A-Za-z0-9.]+$")
            .expect("tile path pattern")
    });
    let caps = RE.captures(path)?;
    let z: u8 = caps[1].parse().ok()?;
    let x: u32 = caps[2].parse().ok()?;
    let y: u32 = caps[3].parse().ok()?;
    if z > MAX_TILE_ZOOM {
        return None;
    }
    let n = 1u64 << z;
    (u64::from(x) < n && u64::from(y) < n).then_some((z, x, y))
}

/// Geographic footprint of a Web Mercator (XYZ, origin top-left) tile.
pub fn tile_bbox(z: u8, x: u32, y: u32) -> Rect<f64> {
    let n = f64::from(1u32 << z);
    let lon = |x: f64| x / n * 360.0 - 180.0;
    let lat = |y: f64| (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees();
    let (x, y) = (f64::from(x), f64::from(y));
    Rect::new(
        coord! { x: lon(x), y: lat(y + 1.0) },
        coord! { x: lon(x + 1.0), y: lat(y) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::mime::types;

    fn monaco() -> ClipPolygon {
        ClipPolygon::new(vec![
            (7.4090, 43.7247),
            (7.4398, 43.7247),
            (7.4398, 43.7519),
            (7.4090, 43.7519),
        ])
        .unwrap()
    }

    #[test]
    fn test_tile_coords() {
        assert_eq!(tile_coords("tiles/14/8562/5956.pbf"), Some((14, 8562, 5956)));
        assert_eq!(tile_coords("0/0/0.png"), Some((0, 0, 0)));
        assert_eq!(tile_coords("style.json"), None);
        assert_eq!(tile_coords("fonts/Noto Sans/0-255.pbf"), None);
        // x out of range at z=1
        assert_eq!(tile_coords("1/2/0.pbf"), None);
    }

    #[test]
    fn test_tile_bbox_world() {
        let rect = tile_bbox(0, 0, 0);
        assert!((rect.min().x + 180.0).abs() < 1e-9);
        assert!((rect.max().x - 180.0).abs() < 1e-9);
        assert!((rect.max().y - 85.051_128_779_806_59).abs() < 1e-6);
        assert!((rect.min().y + 85.051_128_779_806_59).abs() < 1e-6);
    }

    #[test]
    fn test_tile_bbox_quadrant() {
        let rect = tile_bbox(1, 1, 0);
        assert!((rect.min().x - 0.0).abs() < 1e-9);
        assert!((rect.min().y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_intersecting_drops_distant() {
        let clip = monaco();
        let filter = TileFilter::new(&clip, None);
        // z14 tile containing Monaco
        assert!(filter.keeps("14/8529/5974.pbf"));
        // z14 tile far away
        assert!(!filter.keeps("14/0/0.pbf"));
        // non-tile resources always kept
        assert!(filter.keeps("style.json"));
    }

    #[test]
    fn test_keeps_tiles_touching_any_ring() {
        // Monaco plus a far away islet near Corsica.
        let clip = ClipPolygon::from_rings(vec![
            vec![(7.4090, 43.7247), (7.4398, 43.7247), (7.4398, 43.7519), (7.4090, 43.7519)],
            vec![(9.40, 42.00), (9.42, 42.00), (9.42, 42.02)],
        ])
        .unwrap();
        let filter = TileFilter::new(&clip, None);
        assert!(filter.keeps("14/8529/5974.pbf"));
        // z10 tile over the islet
        let (x, y) = (
            ((9.41 + 180.0) / 360.0 * 1024.0) as u32,
            ((1.0 - (42.01f64.to_radians().tan() + 1.0 / 42.01f64.to_radians().cos()).ln() / PI) / 2.0 * 1024.0) as u32,
        );
        assert!(filter.keeps(&format!("10/{x}/{y}.pbf")));
        assert!(!filter.keeps("10/0/0.pbf"));
    }

    #[test]
    fn test_include_up_to_zoom_bypass() {
        let clip = monaco();
        let filter = TileFilter::new(&clip, Some(5));
        assert!(filter.keeps("5/0/0.pbf"));
        assert!(!filter.keeps("6/0/0.pbf"));
    }

    #[test]
    fn test_apply_counts_dropped() {
        let clip = monaco();
        let filter = TileFilter::new(&clip, None);
        let assets = vec![
            TileAsset::new("0/0/0.pbf", vec![1], types::PROTOBUF).unwrap(),
            TileAsset::new("14/0/0.pbf", vec![2], types::PROTOBUF).unwrap(),
        ];
        let (kept, dropped) = filter.apply(assets);
        assert_eq!(kept.len(), 1);
        assert_eq!(dropped, 1);
        assert_eq!(kept[0].relative_path, "0/0/0.pbf");
    }
}
