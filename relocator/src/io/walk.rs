//! Depth-first enumeration of the template tree.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{RelocateError, Result};

/// One filesystem entry below the walk root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Absolute (or root-joined) path of the entry.
    pub path: PathBuf,
    /// Path relative to the walk root.
    pub rel: PathBuf,
    pub is_dir: bool,
}

/// Walk everything under `root`, excluding `root` itself.
///
/// Entries come in sorted pre-order: a directory is always yielded before
/// anything inside it, and siblings are ordered by file name.
pub fn walk_tree(root: &Path) -> impl Iterator<Item = Result<TreeEntry>> + '_ {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .map(move |entry| {
            let entry = entry.map_err(|err| {
                let path = err
                    .path()
                    .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
                RelocateError::Io {
                    path,
                    source: io::Error::from(err),
                }
            })?;
            let rel = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| RelocateError::Io {
                    path: entry.path().to_path_buf(),
                    source: io::Error::other("entry escaped walk root"),
                })?
                .to_path_buf();
            Ok(TreeEntry {
                path: entry.path().to_path_buf(),
                rel,
                is_dir: entry.file_type().is_dir(),
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn directories_precede_their_children() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        fs::create_dir_all(root.join("b/inner")).expect("mkdir");
        fs::write(root.join("b/inner/z.go"), "package inner\n").expect("write");
        fs::write(root.join("a.go"), "package foo\n").expect("write");
        fs::write(root.join("c.txt"), "c").expect("write");

        let entries: Vec<TreeEntry> = walk_tree(root)
            .collect::<Result<_>>()
            .expect("walk");
        let rels: Vec<(String, bool)> = entries
            .iter()
            .map(|e| (e.rel.to_string_lossy().replace('\\', "/"), e.is_dir))
            .collect();
        assert_eq!(
            rels,
            vec![
                ("a.go".to_string(), false),
                ("b".to_string(), true),
                ("b/inner".to_string(), true),
                ("b/inner/z.go".to_string(), false),
                ("c.txt".to_string(), false),
            ]
        );
        assert_eq!(entries[0].path, root.join("a.go"));
    }

    #[test]
    fn missing_root_is_an_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("missing");
        let first = walk_tree(&missing).next().expect("one error");
        assert!(matches!(first, Err(RelocateError::Io { .. })));
    }
}
