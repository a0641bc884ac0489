//! Build failure taxonomy.
//!
//! Stage-local errors convert into [`BuildError`], whose variant names the
//! stage that failed. Every variant is fatal for the build.

use thiserror::Error;

use crate::archive::{AssemblyError, MetadataError};
use crate::config::ConfigError;
use crate::extent::ExtentError;
use crate::tiles::TileError;
use crate::view::ViewError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum BuildError {
    /// Bad, ambiguous or missing input; the user must change it.
    #[error("configuration error")]
    Configuration(#[source] BoxError),

    #[error("extent resolution failed")]
    ExtentResolution(#[source] ExtentError),

    /// The external generator failed. Not retried.
    #[error("tile generation failed")]
    Generation(#[source] TileError),

    #[error("unsupported asset `{0}` in generator output (no known MIME type)")]
    UnsupportedAsset(String),

    /// No partial archive was published.
    #[error("archive assembly failed")]
    Assembly(#[source] AssemblyError),
}

impl BuildError {
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::ExtentResolution(_) => "extent",
            Self::Generation(_) | Self::UnsupportedAsset(_) => "generation",
            Self::Assembly(_) => "assembly",
        }
    }
}

impl From<ExtentError> for BuildError {
    fn from(err: ExtentError) -> Self {
        if err.is_configuration() {
            Self::Configuration(Box::new(err))
        } else {
            Self::ExtentResolution(err)
        }
    }
}

impl From<TileError> for BuildError {
    fn from(err: TileError) -> Self {
        match err {
            TileError::Unsupported { path } => Self::UnsupportedAsset(path),
            other => Self::Generation(other),
        }
    }
}

impl From<AssemblyError> for BuildError {
    fn from(err: AssemblyError) -> Self {
        if err.is_configuration() {
            Self::Configuration(Box::new(err))
        } else {
            Self::Assembly(err)
        }
    }
}

impl From<MetadataError> for BuildError {
    fn from(err: MetadataError) -> Self {
        Self::Configuration(Box::new(err))
    }
}

impl From<ViewError> for BuildError {
    fn from(err: ViewError) -> Self {
        Self::Configuration(Box::new(err))
    }
}

impl From<ConfigError> for BuildError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(Box::new(err))
    }
}
