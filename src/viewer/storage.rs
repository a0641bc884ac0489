//! Per-archive saved view in page-local storage.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extent::MERCATOR_MAX_LAT;
use crate::view::MAX_VIEW_ZOOM;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage unavailable: {0}")]
pub struct StorageError(pub String);

/// Key/value storage shared by every archive opened in the same origin.
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory storage, for hosts without persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Fold any finite longitude into `[-180, 180]`; in-range values are kept as is.
pub fn wrap_lon(lon: f64) -> f64 {
    if !lon.is_finite() || (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

pub fn storage_key(archive_id: &str) -> String {
    format!("openzim${archive_id}$default_view")
}

/// Last user view; `center` is `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedView {
    pub center: [f64; 2],
    pub zoom: f64,
}

impl SavedView {
    /// View at `center`/`zoom` with the longitude wrapped into `[-180, 180]`.
    ///
    /// Map engines keep counting past the antimeridian while the user pans.
    pub fn new(center: [f64; 2], zoom: f64) -> Self {
        let [lon, lat] = center;
        Self {
            center: [wrap_lon(lon), lat],
            zoom,
        }
    }

    /// Parse a stored value, rejecting anything a map could not display.
    pub fn parse(raw: &str) -> Option<Self> {
        let stored: Self = serde_json::from_str(raw).ok()?;
        let view = Self::new(stored.center, stored.zoom);
        view.is_valid().then_some(view)
    }

    pub fn is_valid(&self) -> bool {
        let [lon, lat] = self.center;
        lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-MERCATOR_MAX_LAT..=MERCATOR_MAX_LAT).contains(&lat)
            && (0.0..=MAX_VIEW_ZOOM).contains(&self.zoom)
    }

    pub fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(7.5), 7.5);
        assert_eq!(wrap_lon(180.0), 180.0);
        assert_eq!(wrap_lon(-180.0), -180.0);
        assert!((wrap_lon(181.5) + 178.5).abs() < 1e-9);
        assert!((wrap_lon(-190.0) - 170.0).abs() < 1e-9);
        assert!((wrap_lon(721.0) - 1.0).abs() < 1e-9);
        assert!(wrap_lon(f64::NAN).is_nan());
    }

    #[test]
    fn test_unwrapped_longitude_is_folded_on_load() {
        let view = SavedView::parse(r#"{"center":[200,10],"zoom":3}"#).unwrap();
        assert!((view.center[0] + 160.0).abs() < 1e-9);
        assert_eq!(view.center[1], 10.0);
    }

    #[test]
    fn test_key_format() {
        assert_eq!(storage_key("swiss"), "openzim$swiss$default_view");
    }

    #[test]
    fn test_parse_saved_view() {
        let view = SavedView::parse(r#"{"center":[7.42,43.73],"zoom":11}"#).unwrap();
        assert_eq!(view, SavedView { center: [7.42, 43.73], zoom: 11.0 });
        assert_eq!(SavedView::parse(&view.to_json()), Some(view));

        assert!(SavedView::parse("garbage").is_none());
        assert!(SavedView::parse(r#"{"center":[7.42],"zoom":11}"#).is_none());
        assert!(SavedView::parse(r#"{"center":[0,90],"zoom":1}"#).is_none());
        assert!(SavedView::parse(r#"{"center":[0,0],"zoom":-1}"#).is_none());
    }
}
