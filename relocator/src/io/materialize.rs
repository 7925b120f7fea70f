//! Copy the template tree into the destination, rewriting as it goes.
//!
//! Writes go straight into the destination without staging. A failure stops
//! the walk immediately and leaves whatever was already written in place;
//! the empty-destination precondition makes that safe to delete and retry.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use super::walk::walk_tree;
use crate::core::kind::{FileKind, is_root_file};
use crate::core::manifest::rewrite_manifest;
use crate::core::rewrite::{Relocation, rewrite_source};
use crate::error::{RelocateError, Result};

/// What happened to one file of the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    /// Path relative to the tree root.
    pub path: PathBuf,
    pub kind: FileKind,
    /// True if the written bytes differ from the template's.
    pub changed: bool,
}

/// State of the destination directory before a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Missing,
    Empty,
}

/// Check that `dir` does not exist or is an empty directory.
pub fn check_destination(dir: &Path) -> Result<Destination> {
    if !dir.exists() {
        return Ok(Destination::Missing);
    }
    if !dir.is_dir() {
        return Err(RelocateError::Precondition {
            dir: dir.to_path_buf(),
        });
    }
    let mut entries = fs::read_dir(dir).map_err(RelocateError::io(dir))?;
    if entries.next().is_some() {
        return Err(RelocateError::Precondition {
            dir: dir.to_path_buf(),
        });
    }
    Ok(Destination::Empty)
}

/// Recreate `src_root` under `dst_root` with every reference retargeted.
#[instrument(skip_all, fields(src = %src_root.display(), dst = %dst_root.display()))]
pub fn materialize(
    src_root: &Path,
    dst_root: &Path,
    relocation: &Relocation,
) -> Result<Vec<FileOutcome>> {
    fs::create_dir_all(dst_root).map_err(RelocateError::io(dst_root))?;
    let mut outcomes = Vec::new();
    for entry in walk_tree(src_root) {
        let entry = entry?;
        let target = dst_root.join(&entry.rel);
        if entry.is_dir {
            fs::create_dir_all(&target).map_err(RelocateError::io(&target))?;
            continue;
        }
        outcomes.push(copy_file(&entry.path, &entry.rel, &target, relocation)?);
    }
    Ok(outcomes)
}

fn copy_file(src: &Path, rel: &Path, target: &Path, relocation: &Relocation) -> Result<FileOutcome> {
    let data = fs::read(src).map_err(RelocateError::io(src))?;
    let kind = FileKind::classify(rel);
    let output = match kind {
        FileKind::Manifest => rewrite_manifest(&data, rel, &relocation.dst)?,
        FileKind::Source => rewrite_source(&data, rel, relocation, is_root_file(rel))?,
        FileKind::Passthrough => data.clone(),
    };
    let changed = output != data;
    debug!(file = %rel.display(), ?kind, changed, "write");
    fs::write(target, &output).map_err(RelocateError::io(target))?;
    Ok(FileOutcome {
        path: rel.to_path_buf(),
        kind,
        changed,
    })
}
