//! Named-area registry.

use rustc_hash::FxHashMap;

use super::{Extent, ExtentError, MERCATOR_MAX_LAT};

/// A named bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArea {
    pub name: String,
    pub bbox: [f64; 4],
}

/// Built-ins: the whole Web Mercator world and the Monaco test area.
const BUILTIN: &[(&str, [f64; 4])] = &[
    ("planet", [-180.0, -MERCATOR_MAX_LAT, 180.0, MERCATOR_MAX_LAT]),
    ("monaco", [7.4090, 43.7247, 7.4398, 43.7519]),
];

/// Lookup table from lower-cased area names to bounding boxes.
#[derive(Debug, Clone)]
pub struct AreaRegistry {
    areas: FxHashMap<String, [f64; 4]>,
}

impl Default for AreaRegistry {
    fn default() -> Self {
        let areas = BUILTIN
            .iter()
            .map(|(name, bbox)| ((*name).to_string(), *bbox))
            .collect();
        Self { areas }
    }
}

impl AreaRegistry {
    /// Built-in areas extended (or overridden) by user-defined ones.
    pub fn with_areas(custom: impl IntoIterator<Item = NamedArea>) -> Self {
        let mut registry = Self::default();
        for area in custom {
            registry.areas.insert(area.name.to_ascii_lowercase(), area.bbox);
        }
        registry
    }

    /// Resolve an area name into a validated extent. Case-insensitive.
    pub fn lookup(&self, name: &str) -> Result<Extent, ExtentError> {
        let key = name.trim().to_ascii_lowercase();
        let bbox = self
            .areas
            .get(&key)
            .ok_or_else(|| ExtentError::UnknownArea(name.to_string()))?;
        Extent::from_array(*bbox)
    }

    /// Sorted area names, for error hints.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.areas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup_case_insensitive() {
        let registry = AreaRegistry::default();
        let a = registry.lookup("monaco").unwrap();
        let b = registry.lookup(" Monaco ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.bounds(), [7.4090, 43.7247, 7.4398, 43.7519]);
    }

    #[test]
    fn test_planet_is_valid() {
        let extent = AreaRegistry::default().lookup("planet").unwrap();
        assert_eq!(extent.min_lon(), -180.0);
        assert_eq!(extent.max_lon(), 180.0);
    }

    #[test]
    fn test_unknown_area() {
        let err = AreaRegistry::default().lookup("atlantis").unwrap_err();
        assert!(matches!(err, ExtentError::UnknownArea(name) if name == "atlantis"));
    }

    #[test]
    fn test_custom_area_and_override() {
        let registry = AreaRegistry::with_areas([
            NamedArea {
                name: "Geneva".into(),
                bbox: [6.0, 46.1, 6.3, 46.3],
            },
            NamedArea {
                name: "monaco".into(),
                bbox: [7.0, 43.0, 8.0, 44.0],
            },
        ]);
        assert_eq!(
            registry.lookup("geneva").unwrap().bounds(),
            [6.0, 46.1, 6.3, 46.3]
        );
        assert_eq!(
            registry.lookup("monaco").unwrap().bounds(),
            [7.0, 43.0, 8.0, 44.0]
        );
        assert_eq!(registry.names(), vec!["geneva", "monaco", "planet"]);
    }

    #[test]
    fn test_custom_degenerate_area_fails_on_lookup() {
        let registry = AreaRegistry::with_areas([NamedArea {
            name: "flat".into(),
            bbox: [1.0, 1.0, 1.0, 2.0],
        }]);
        assert!(matches!(
            registry.lookup("flat"),
            Err(ExtentError::Degenerate(_))
        ));
    }
}
