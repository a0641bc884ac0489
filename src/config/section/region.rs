//! `[region]` and `[areas.<name>]` configuration.
//!
//! # Example
//!
//! ```toml
//! [region]
//! bbox = [7.4090, 43.7247, 7.4398, 43.7519]
//! poly = "monaco.poly"             # path or http(s) URL, clips within bbox
//! # area = "alps"                  # exclusive with bbox/poly
//!
//! [areas.alps]
//! bbox = [5.0, 43.5, 16.5, 48.5]
//! ```

use serde::Deserialize;

use crate::extent::{NamedArea, RegionRequest};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    pub bbox: Option<[f64; 4]>,
    pub poly: Option<String>,
    pub area: Option<String>,
}

impl RegionConfig {
    pub fn request(&self) -> RegionRequest {
        RegionRequest {
            bbox: self.bbox,
            polygon: self.poly.clone(),
            area: self.area.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AreaConfig {
    pub bbox: [f64; 4],
}

impl AreaConfig {
    pub fn named(&self, name: &str) -> NamedArea {
        NamedArea {
            name: name.to_string(),
            bbox: self.bbox,
        }
    }
}
