//! Extent resolution errors.

use thiserror::Error;

use crate::utils::fetch::FetchError;

#[derive(Debug, Error)]
pub enum ExtentError {
    #[error("no region given: pass a bounding box, a polygon or a named area")]
    NoDescriptor,

    #[error("ambiguous region: {0}")]
    Ambiguous(String),

    #[error("clip polygon envelope {clip} is not contained in the extent {extent}")]
    ClipOutsideExtent { clip: String, extent: String },

    #[error("degenerate extent {0}: min must be strictly below max on both axes")]
    Degenerate(String),

    #[error("coordinate out of range: {0}")]
    OutOfRange(String),

    #[error("invalid bounding box `{0}`: expected min_lon,min_lat,max_lon,max_lat")]
    InvalidBbox(String),

    #[error("malformed polygon `{source_name}`: {reason}")]
    Malformed { source_name: String, reason: String },

    #[error("polygon has {0} distinct vertices, at least 3 are required")]
    TooFewVertices(usize),

    #[error("polygon has zero area")]
    ZeroArea,

    #[error("polygon ring intersects itself")]
    SelfIntersecting,

    #[error("unknown area `{0}`")]
    UnknownArea(String),

    #[error("failed to load polygon")]
    Fetch(#[from] FetchError),
}

impl ExtentError {
    /// Errors caused by how descriptors were combined rather than by their content.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Ambiguous(_) | Self::ClipOutsideExtent { .. })
    }

    pub(crate) fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }
}
