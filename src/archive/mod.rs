//! Archive assembly.
//!
//! Merges the viewer bundle, view config, favicon and tile assets into one
//! container and publishes it atomically:
//!
//! ```text
//! index.html ─ bundle… ─ content/config.json ─ favicon.ico ─ content/about.html ─ tiles… (dupes → aliases)
//!      │
//!      └─▶ ZipArchiveWriter(.zimmap-XXXX.part) ─ finish ─ rename ─▶ {name}_{period}.zip
//! ```

mod about;
mod assemble;
mod bundle;
mod metadata;
mod writer;

pub use about::{ABOUT_PATH, is_geofabrik_source, render_about};
pub use assemble::{
    Assembler, AssemblyInput, AssemblyReport, FAVICON_PATH, output_file_name, write_archive,
};
pub use bundle::{BundleFile, ENTRY_POINT, ViewerBundle, replace_title};
pub use metadata::{ArchiveMetadata, MetadataError, MetadataFields};
pub use writer::{ArchiveWriter, Entry, ILLUSTRATION_PATH, MANIFEST_PATH, ZipArchiveWriter};

use std::path::PathBuf;

use thiserror::Error;

use crate::view::ViewError;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("viewer bundle directory `{0}` not found")]
    BundleNotFound(PathBuf),

    #[error("viewer bundle `{0}` has no index.html entry point")]
    MissingEntryPoint(PathBuf),

    #[error("invalid entry path `{0}`")]
    InvalidPath(String),

    #[error("entry path `{0}` is produced more than once")]
    Collision(String),

    #[error("`{0}` already exists (pass --overwrite to replace it)")]
    DestinationExists(PathBuf),

    #[error("I/O error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("container write failed")]
    Container(#[from] zip::result::ZipError),

    #[error("failed to serialize manifest")]
    Manifest(#[from] serde_json::Error),

    #[error(transparent)]
    ViewConfig(#[from] ViewError),

    #[error("failed to publish archive to `{0}`")]
    Persist(PathBuf, #[source] std::io::Error),
}

impl AssemblyError {
    /// Errors the user fixes by changing input rather than retrying.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::DestinationExists(_))
    }
}
