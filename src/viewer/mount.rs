//! Asset URL resolution against the archive's mount path.
//!
//! Archives are served under arbitrary, non-root prefixes, so every reference
//! the style or request machinery would resolve against the page origin goes
//! through [`MountPath::to_absolute`].

use url::Url;

use super::ViewerError;

/// Origin plus directory segments the archive content is served under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountPath {
    origin: String,
    segments: Vec<String>,
}

impl MountPath {
    /// `mount` is a directory URL; its whole path is the mount directory.
    pub fn new(mount: &str) -> Result<Self, ViewerError> {
        let url = Url::parse(mount).map_err(|_| ViewerError::InvalidMount(mount.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(ViewerError::InvalidMount(mount.to_string()));
        }
        let origin = url.origin().ascii_serialization();
        let segments = url
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default();
        Ok(Self { origin, segments })
    }

    /// Mount of the page at `page_url`: its last path segment is the document.
    pub fn from_page(page_url: &str) -> Result<Self, ViewerError> {
        let mut mount = Self::new(page_url)?;
        let is_dir = Url::parse(page_url)
            .map(|u| u.path().ends_with('/'))
            .unwrap_or(false);
        if !is_dir {
            mount.segments.pop();
        }
        Ok(mount)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Mount directory URL without trailing slash.
    pub fn directory(&self) -> String {
        join(&self.origin, &self.segments, "")
    }

    /// Resolve an asset reference.
    ///
    /// Plain string surgery, not `Url::join`: templated references such as
    /// `{z}/{x}/{y}.pbf` must come out unencoded.
    pub fn to_absolute(&self, reference: &str) -> String {
        if reference.contains("://") {
            return reference.to_string();
        }
        if let Some(rest) = reference.strip_prefix("./") {
            return join(&self.origin, &self.segments, rest);
        }
        if reference.starts_with("../") {
            let mut rest = reference;
            let mut up = 0;
            while let Some(stripped) = rest.strip_prefix("../") {
                rest = stripped;
                up += 1;
            }
            let keep = self.segments.len().saturating_sub(up);
            return join(&self.origin, &self.segments[..keep], rest);
        }
        if reference.starts_with('/') {
            return format!("{}{reference}", self.origin);
        }
        join(&self.origin, &self.segments, reference)
    }
}

fn join(origin: &str, segments: &[String], rest: &str) -> String {
    let mut out = String::from(origin);
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    if !rest.is_empty() {
        out.push('/');
        out.push_str(rest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mount() -> MountPath {
        MountPath::new("https://h/a/b").unwrap()
    }

    #[test]
    fn test_to_absolute_cases() {
        let m = mount();
        assert_eq!(m.to_absolute("./styles/liberty"), "https://h/a/b/styles/liberty");
        assert_eq!(m.to_absolute("../x"), "https://h/a/x");
        assert_eq!(m.to_absolute("https://y/z"), "https://y/z");
        assert_eq!(m.to_absolute("/z"), "https://h/z");
        assert_eq!(m.to_absolute("tiles/0/0/0.pbf"), "https://h/a/b/tiles/0/0/0.pbf");
    }

    #[test]
    fn test_parent_walk_saturates() {
        let m = mount();
        assert_eq!(m.to_absolute("../../x"), "https://h/x");
        assert_eq!(m.to_absolute("../../../../x"), "https://h/x");
    }

    #[test]
    fn test_templates_are_not_encoded() {
        assert_eq!(
            mount().to_absolute("./fonts/{fontstack}/{range}.pbf"),
            "https://h/a/b/fonts/{fontstack}/{range}.pbf"
        );
    }

    #[test]
    fn test_from_page_drops_document() {
        let m = MountPath::from_page("https://h/content/osm_monaco/index.html").unwrap();
        assert_eq!(m.directory(), "https://h/content/osm_monaco");
        let m = MountPath::from_page("http://localhost:8080/viewer/").unwrap();
        assert_eq!(m.directory(), "http://localhost:8080/viewer");
        assert_eq!(m.origin(), "http://localhost:8080");
    }

    #[test]
    fn test_invalid_mount() {
        assert!(MountPath::new("not a url").is_err());
        assert!(MountPath::new("mailto:x@y").is_err());
    }
}
