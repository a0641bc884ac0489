//! Default center and zoom from an extent.

use std::f64::consts::PI;

use crate::extent::{Extent, MERCATOR_MAX_LAT};

/// Deepest zoom the computed default may pick.
pub const MAX_FIT_ZOOM: u8 = 18;

/// Deepest zoom an explicit default view may request.
pub const MAX_VIEW_ZOOM: f64 = 22.0;

const TILE_SIZE: f64 = 256.0;
const VIEWPORT: (f64, f64) = (1024.0, 768.0);

/// Normalized Web Mercator x in `[0, 1]`.
fn mercator_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalized Web Mercator y in `[0, 1]`, 0 at the top.
///
/// Latitudes beyond the projection limit are clamped.
fn mercator_y(lat: f64) -> f64 {
    let rad = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
    (1.0 - (rad.tan() + 1.0 / rad.cos()).ln() / PI) / 2.0
}

fn mercator_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// `[lon, lat]`: bbox midpoint in longitude, Mercator midpoint in latitude.
pub fn mercator_center(extent: &Extent) -> [f64; 2] {
    let lon = (extent.min_lon() + extent.max_lon()) / 2.0;
    let y = (mercator_y(extent.min_lat()) + mercator_y(extent.max_lat())) / 2.0;
    [lon, mercator_lat(y)]
}

/// Largest zoom in `0..=18` at which the extent fits a 1024x768 viewport.
pub fn fit_zoom(extent: &Extent) -> u8 {
    let width = mercator_x(extent.max_lon()) - mercator_x(extent.min_lon());
    let height = mercator_y(extent.min_lat()) - mercator_y(extent.max_lat());

    (0..=MAX_FIT_ZOOM)
        .rev()
        .find(|&z| {
            let scale = TILE_SIZE * f64::from(1u32 << z);
            width * scale <= VIEWPORT.0 && height * scale <= VIEWPORT.1
        })
        .unwrap_or(0)
}
