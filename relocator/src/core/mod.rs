//! Deterministic rewriting logic.
//!
//! Core modules are free of I/O side effects. They take bytes and module
//! paths and return bytes, so every rule can be tested in isolation.

pub mod edit;
pub mod go_syntax;
pub mod kind;
pub mod manifest;
pub mod module_path;
pub mod rewrite;
