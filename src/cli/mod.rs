//! Command-line interface module.

mod args;
pub mod build;
mod stats;

pub use args::{BuildArgs, Cli, Commands};
