//! Configuration section definitions.
//!
//! Each module corresponds to a section in `zimmap.toml`:
//!
//! | Module      | TOML Section      | Purpose                              |
//! |-------------|-------------------|--------------------------------------|
//! | `archive`   | `[archive]`       | Archive metadata and file name       |
//! | `region`    | `[region]`        | Region descriptor                    |
//! | `region`    | `[areas.<name>]`  | User-defined named areas             |
//! | `generator` | `[generator]`     | External tile generator              |
//! | `viewer`    | `[viewer]`        | Viewer bundle and initial view       |
//! | `output`    | `[build]`         | Output, temp dir, progress stats     |

mod archive;
mod generator;
mod output;
mod region;
mod viewer;

pub use archive::ArchiveConfig;
pub use generator::GeneratorConfig;
pub use output::OutputConfig;
pub use region::{AreaConfig, RegionConfig};
pub use viewer::ViewerConfig;
