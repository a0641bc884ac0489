//! Shared helpers for the build pipeline.

pub mod date;
pub mod exec;
pub mod fetch;
pub mod mime;
