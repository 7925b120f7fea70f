//! Orchestration for one relocation run.
//!
//! Checks the destination, resolves the template, then materializes the
//! rewritten tree. Each step fails fast; nothing is retried or rolled back.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::core::module_path::ModulePath;
use crate::core::rewrite::Relocation;
use crate::error::{RelocateError, Result};
use crate::io::locator::SourceLocator;
use crate::io::materialize::{Destination, FileOutcome, check_destination, materialize};

/// Inputs for `instantiate`.
#[derive(Debug, Clone)]
pub struct InstantiateRequest {
    pub src: ModulePath,
    pub dst: ModulePath,
    /// Version qualifier handed to the locator (e.g. `latest`).
    pub version: String,
    pub dest_dir: PathBuf,
}

impl InstantiateRequest {
    /// Request that writes into `<cwd>/<base name of dst>`.
    pub fn in_dir(cwd: &Path, src: ModulePath, dst: ModulePath, version: impl Into<String>) -> Self {
        let dest_dir = destination_dir(cwd, &dst);
        Self {
            src,
            dst,
            version: version.into(),
            dest_dir,
        }
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct InstantiateReport {
    pub src: ModulePath,
    pub dst: ModulePath,
    pub source_dir: PathBuf,
    pub dest_dir: PathBuf,
    pub files: Vec<FileOutcome>,
}

impl InstantiateReport {
    pub fn changed_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|file| file.changed)
    }
}

/// Directory a new module is written to: its base name under `cwd`.
pub fn destination_dir(cwd: &Path, dst: &ModulePath) -> PathBuf {
    cwd.join(dst.base_name())
}

/// Instantiate `request.src` as `request.dst` in `request.dest_dir`.
///
/// The destination must be missing or empty; that is checked before the
/// locator runs or any file is read.
#[instrument(skip_all, fields(src = %request.src, dst = %request.dst))]
pub fn instantiate(
    request: &InstantiateRequest,
    locator: &dyn SourceLocator,
) -> Result<InstantiateReport> {
    let destination = check_destination(&request.dest_dir)?;
    debug!(dir = %request.dest_dir.display(), ?destination, "destination ok");

    let source_dir = locator.resolve(&request.src, &request.version)?;

    if destination == Destination::Missing {
        fs::create_dir_all(&request.dest_dir).map_err(RelocateError::io(&request.dest_dir))?;
    }

    let relocation = Relocation::new(request.src.clone(), request.dst.clone());
    let files = materialize(&source_dir, &request.dest_dir, &relocation)?;

    let report = InstantiateReport {
        src: request.src.clone(),
        dst: request.dst.clone(),
        source_dir,
        dest_dir: request.dest_dir.clone(),
        files,
    };
    info!(
        files = report.files.len(),
        changed = report.changed_files().count(),
        "instantiated template"
    );
    Ok(report)
}
