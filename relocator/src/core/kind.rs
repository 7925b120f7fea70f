//! Classify template files by relative path.

use std::path::{Component, Path};

use super::manifest::MANIFEST_FILE;

/// How a file is carried into the destination tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// The module manifest at the tree root.
    Manifest,
    /// Go source with a package clause and imports.
    Source,
    /// Copied byte for byte.
    Passthrough,
}

impl FileKind {
    /// Classify `rel`, a path relative to the template root.
    pub fn classify(rel: &Path) -> Self {
        if rel == Path::new(MANIFEST_FILE) {
            return Self::Manifest;
        }
        match rel.extension() {
            Some(ext) if ext == "go" => Self::Source,
            _ => Self::Passthrough,
        }
    }
}

/// True if `rel` sits directly under the tree root.
pub fn is_root_file(rel: &Path) -> bool {
    rel.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count()
        == 1
}
