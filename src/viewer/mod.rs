//! In-archive viewer runtime.
//!
//! The viewer runs inside whatever host renders the archive. Everything it
//! touches is injected as a capability so the state machine can be driven
//! with fakes:
//!
//! ```text
//! start ─▶ ConfigSource::request ─▶ config_loaded ─▶ MapEngine::init ─▶ Ready
//!                                         │                    └─ err ─▶ Error
//!                                         └─ fetch/parse failure: fallback view
//! ```

mod controller;
mod debounce;
mod mount;
mod storage;
mod style;

pub use controller::{
    Camera, ClickTarget, ConfigSource, FALLBACK_VIEW, MapEngine, RESET_DURATION, STYLE_PATH,
    ViewerController, ViewerState, ViewerUi,
};
pub use debounce::{CoalescingTimer, VIEW_CHANGE_WINDOW};
pub use mount::MountPath;
pub use storage::{MemoryStorage, SavedView, Storage, StorageError, storage_key};
pub use style::rewrite_style;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewerError {
    #[error("invalid mount url `{0}`")]
    InvalidMount(String),

    #[error("map engine failed to initialize: {0}")]
    MapInit(String),
}
