//! Filesystem and process access for relocation runs.

pub mod config;
pub mod locator;
pub mod materialize;
pub mod process;
pub mod walk;
