//! Template module relocator.
//!
//! Copies a Go template module into a fresh directory under a new module
//! path, rewriting package clauses, intra-module imports and the `go.mod`
//! module statement so the copy builds on its own. The crate keeps a strict
//! separation:
//!
//! - **[`core`]**: Pure rewriting logic over byte buffers (scanner, edit
//!   buffer, source and manifest rewriters). No I/O.
//! - **[`io`]**: Side-effecting operations (module resolution, tree walk,
//!   file writes, configuration).
//!
//! [`instantiate`] ties the two together for one run.

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod instantiate;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
