//! Viewer configuration: default view and archive identifier.
//!
//! Serialized once into `content/config.json`:
//!
//! ```json
//! { "zimName": "monaco", "center": [7.4244, 43.7383], "zoom": 14 }
//! ```

mod id;
mod zoom;

pub use id::archive_id;
pub use zoom::{MAX_VIEW_ZOOM, fit_zoom, mercator_center};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extent::Extent;

/// Well-known entry path of the serialized config.
pub const CONFIG_PATH: &str = "content/config.json";

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("archive name `{0}` has no characters usable in an identifier")]
    EmptyArchiveId(String),

    #[error("invalid default view `{0}`: expected lat,lon,zoom")]
    InvalidDefaultView(String),

    #[error("failed to serialize view config")]
    Serialize(#[from] serde_json::Error),
}

/// Explicit `lat,lon,zoom` override of the computed default.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct DefaultView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

impl FromStr for DefaultView {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ViewError::InvalidDefaultView(s.to_string());
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;
        let Ok([lat, lon, zoom]) = <[f64; 3]>::try_from(parts) else {
            return Err(invalid());
        };
        let in_range = (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon)
            && (0.0..=MAX_VIEW_ZOOM).contains(&zoom);
        if !in_range {
            return Err(invalid());
        }
        Ok(Self { lat, lon, zoom })
    }
}

impl TryFrom<String> for DefaultView {
    type Error = ViewError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Wire form of `content/config.json`.
///
/// Every field is optional for readers: a missing `zimName` disables view
/// persistence, missing `center`/`zoom` leave the viewer on its fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zim_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<[f64; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
}

/// Immutable per-build view configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewConfig {
    archive_id: String,
    center: [f64; 2],
    zoom: f64,
    secondary_color: Option<String>,
}

impl ViewConfig {
    /// Derive the config from the extent unless `view` overrides it.
    pub fn build(
        extent: &Extent,
        name: &str,
        view: Option<DefaultView>,
        secondary_color: Option<String>,
    ) -> Result<Self, ViewError> {
        let archive_id = archive_id(name)?;
        let (center, zoom) = match view {
            Some(v) => ([v.lon, v.lat], v.zoom),
            None => (mercator_center(extent), f64::from(fit_zoom(extent))),
        };
        Ok(Self {
            archive_id,
            center,
            zoom,
            secondary_color,
        })
    }

    pub fn archive_id(&self) -> &str {
        &self.archive_id
    }

    /// `[lon, lat]`
    pub fn center(&self) -> [f64; 2] {
        self.center
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn document(&self) -> ConfigDocument {
        ConfigDocument {
            zim_name: Some(self.archive_id.clone()),
            center: Some(self.center),
            zoom: Some(self.zoom),
            secondary_color: self.secondary_color.clone(),
        }
    }

    /// Bytes of `content/config.json`.
    pub fn to_json(&self) -> Result<Vec<u8>, ViewError> {
        Ok(serde_json::to_vec(&self.document())?)
    }
}
