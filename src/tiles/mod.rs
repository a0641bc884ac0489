//! Tile pipeline adapter.
//!
//! Runs the external generator for an [`Extent`](crate::extent::Extent) in a
//! scoped workspace and reads its output tree back as [`TileAsset`]s:
//!
//! ```text
//! Extent ─▶ workspace/{extent.poly, output/} ─▶ generator ─▶ walk + classify + hash ─▶ Vec<TileAsset>
//! ```

mod collect;
mod filter;
mod generator;
mod hash;

pub use collect::collect_assets;
pub use filter::{TileFilter, tile_bbox, tile_coords};
pub use generator::{Placeholders, TileGenerator};
pub use hash::ContentHash;

use std::path::PathBuf;

use thiserror::Error;

use crate::utils::exec::CmdError;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("generator command is empty")]
    EmptyCommand,

    #[error("generator program `{0}` not found on PATH")]
    ProgramNotFound(String),

    #[error("failed to create generator workspace in `{0}`")]
    Workspace(PathBuf, #[source] std::io::Error),

    #[error("tile generation failed")]
    Failed(#[from] CmdError),

    #[error("generator produced no files in `{0}`")]
    NoOutput(PathBuf),

    #[error("failed to read generated file `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("unsupported asset `{path}`: extension has no known MIME type")]
    Unsupported { path: String },

    #[error("invalid asset path `{0}`")]
    InvalidPath(String),
}

/// One generated file destined for the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct TileAsset {
    /// Forward-slash separated, relative, no `..` segments.
    pub relative_path: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    pub content_hash: ContentHash,
}

impl TileAsset {
    pub fn new(
        relative_path: impl Into<String>,
        bytes: Vec<u8>,
        mime_type: &'static str,
    ) -> Result<Self, TileError> {
        let relative_path = relative_path.into();
        if !is_safe_relative_path(&relative_path) {
            return Err(TileError::InvalidPath(relative_path));
        }
        let content_hash = ContentHash::of(&bytes);
        Ok(Self {
            relative_path,
            bytes,
            mime_type,
            content_hash,
        })
    }
}

/// Whether `path` can name an archive entry.
pub fn is_safe_relative_path(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
