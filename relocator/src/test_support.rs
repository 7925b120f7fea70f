//! Test-only helpers for building template trees on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::module_path::ModulePath;
use crate::io::walk::walk_tree;

/// Parse a module path, panicking on invalid input.
pub fn module(raw: &str) -> ModulePath {
    ModulePath::parse(raw).expect("valid module path")
}

/// A throwaway template module in a temp directory.
pub struct TemplateDir {
    temp: TempDir,
}

impl TemplateDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create template tempdir")?;
        Ok(Self { temp })
    }

    /// Create a template with `files` given as `(relative path, contents)`.
    pub fn with_files(files: &[(&str, &str)]) -> Result<Self> {
        let template = Self::new()?;
        for (rel, contents) in files {
            template.write(rel, contents)?;
        }
        Ok(template)
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn write(&self, rel: &str, contents: &str) -> Result<()> {
        let path = self.temp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }
}

/// Read every file under `root` into a map keyed by `/`-separated relative path.
pub fn read_tree(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut files = BTreeMap::new();
    for entry in walk_tree(root) {
        let entry = entry?;
        if entry.is_dir {
            continue;
        }
        let contents = fs::read_to_string(&entry.path)
            .with_context(|| format!("read {}", entry.path.display()))?;
        let key = entry.rel.to_string_lossy().replace('\\', "/");
        files.insert(key, contents);
    }
    Ok(files)
}
