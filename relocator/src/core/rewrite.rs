//! Retarget a Go source file from one module path to another.

use std::path::Path;

use tracing::{debug, trace};

use super::edit::EditBuffer;
use super::go_syntax::{is_identifier, parse_header, quote};
use super::module_path::ModulePath;
use crate::error::{RelocateError, Result};

/// Package name suffix used by external test packages.
pub const TEST_PACKAGE_SUFFIX: &str = "_test";

/// Module paths for one relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub src: ModulePath,
    pub dst: ModulePath,
}

impl Relocation {
    pub fn new(src: ModulePath, dst: ModulePath) -> Self {
        Self { src, dst }
    }

    fn renames_package(&self) -> bool {
        self.src.base_name() != self.dst.base_name()
    }
}

/// Rewrite one Go file so that it refers to `relocation.dst`.
///
/// `is_root` marks files directly under the module root; only those have
/// their package clause renamed. Bytes outside the package name and import
/// literals are copied unchanged, and a file with nothing to rewrite comes
/// back identical.
pub fn rewrite_source(
    data: &[u8],
    file: &Path,
    relocation: &Relocation,
    is_root: bool,
) -> Result<Vec<u8>> {
    let header =
        parse_header(data).map_err(|err| RelocateError::parse(file, err.to_string()))?;

    let src_name = relocation.src.base_name();
    let dst_name = relocation.dst.base_name();
    let mut buf = EditBuffer::new(data);

    if is_root {
        let name = header.package.name.as_str();
        if let Some(suffix) = package_suffix(name, src_name) {
            let renamed = format!("{dst_name}{suffix}");
            if !is_identifier(&renamed) {
                return Err(RelocateError::Identifier {
                    file: file.to_path_buf(),
                    from: name.to_string(),
                    to: renamed,
                });
            }
            debug!(file = %file.display(), from = name, to = %renamed, "rename package");
            let span = header.package.span;
            buf.replace(span.start, span.end, renamed);
        }
    }

    for import in &header.imports {
        let Some(path) = import.path() else {
            trace!(file = %file.display(), literal = %import.literal, "skip unparsable import");
            continue;
        };
        let Some(retargeted) = relocation.src.retarget(&path, &relocation.dst) else {
            continue;
        };
        let span = import.span;
        if path == relocation.src.as_str() && relocation.renames_package() && import.alias.is_none()
        {
            // Keep the old identifier valid for every use in this file.
            buf.insert(span.start, format!("{src_name} "));
        }
        debug!(file = %file.display(), from = %path, to = %retargeted, "retarget import");
        buf.replace(span.start, span.end, quote(&retargeted));
    }

    if buf.is_empty() {
        return Ok(data.to_vec());
    }
    buf.apply()
        .map_err(|err| RelocateError::parse(file, err.to_string()))
}

/// Suffix after `base` if `name` is the module's package or its test package.
fn package_suffix<'a>(name: &'a str, base: &str) -> Option<&'a str> {
    let suffix = name.strip_prefix(base)?;
    if suffix.is_empty() || suffix == TEST_PACKAGE_SUFFIX {
        Some(suffix)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relocation(src: &str, dst: &str) -> Relocation {
        Relocation::new(
            ModulePath::parse(src).expect("src path"),
            ModulePath::parse(dst).expect("dst path"),
        )
    }

    fn rewrite(src: &str, rel: &Relocation, is_root: bool) -> String {
        let out = rewrite_source(src.as_bytes(), Path::new("file.go"), rel, is_root)
            .expect("rewrite");
        String::from_utf8(out).expect("utf8 output")
    }

    #[test]
    fn unrelated_file_is_byte_identical() {
        let src = "// header\n\npackage util\n\nimport (\n\t\"fmt\" // keep\n\t\"x/y/foobar\"\n)\n\nfunc F() {}\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(rewrite(src, &rel, true), src);
        assert_eq!(rewrite(src, &rel, false), src);
    }

    #[test]
    fn renames_root_package_and_subpackage_import() {
        let src = "package foo\n\nimport \"x/y/foo/sub\"\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(
            rewrite(src, &rel, true),
            "package bar\n\nimport \"a/b/bar/sub\"\n"
        );
    }

    #[test]
    fn preserves_test_package_suffix() {
        let src = "package foo_test\n\nimport \"testing\"\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(rewrite(src, &rel, true), "package bar_test\n\nimport \"testing\"\n");
    }

    #[test]
    fn other_suffixes_are_left_alone() {
        let src = "package foo_internal\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(rewrite(src, &rel, true), src);
    }

    #[test]
    fn subdirectory_package_keeps_its_name() {
        let src = "package foo\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(rewrite(src, &rel, false), src);
    }

    #[test]
    fn root_import_gets_alias_when_base_name_changes() {
        let src = "package handler\n\nimport (\n\t\"context\"\n\t\"x/y/foo\"\n)\n\nvar _ = foo.New\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(
            rewrite(src, &rel, false),
            "package handler\n\nimport (\n\t\"context\"\n\tfoo \"a/b/bar\"\n)\n\nvar _ = foo.New\n"
        );
    }

    #[test]
    fn root_import_keeps_existing_alias() {
        let src = "package handler\n\nimport f \"x/y/foo\"\nimport _ \"x/y/foo\"\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(
            rewrite(src, &rel, false),
            "package handler\n\nimport f \"a/b/bar\"\nimport _ \"a/b/bar\"\n"
        );
    }

    #[test]
    fn same_base_name_needs_no_alias() {
        let src = "package main\n\nimport \"x/y/foo\"\n";
        let rel = relocation("x/y/foo", "a/b/foo");
        assert_eq!(rewrite(src, &rel, true), "package main\n\nimport \"a/b/foo\"\n");
    }

    #[test]
    fn raw_and_escaped_literals_are_requoted() {
        let src = "package main\n\nimport (\n\t`x/y/foo/raw`\n\t\"x/y/foo\\x2fesc\"\n)\n";
        let rel = relocation("x/y/foo", "a/b/foo");
        assert_eq!(
            rewrite(src, &rel, true),
            "package main\n\nimport (\n\t\"a/b/foo/raw\"\n\t\"a/b/foo/esc\"\n)\n"
        );
    }

    #[test]
    fn comments_around_imports_survive() {
        let src = "package foo // root\n\nimport (\n\t// the sub package\n\t\"x/y/foo/sub\" /* why */\n\n\t\"os\"\n)\n";
        let rel = relocation("x/y/foo", "a/b/bar");
        assert_eq!(
            rewrite(src, &rel, true),
            "package bar // root\n\nimport (\n\t// the sub package\n\t\"a/b/bar/sub\" /* why */\n\n\t\"os\"\n)\n"
        );
    }

    #[test]
    fn invalid_destination_identifier_fails() {
        let rel = relocation("x/y/foo", "a/b/my-app");
        let err = rewrite_source(b"package foo\n", Path::new("foo.go"), &rel, true).unwrap_err();
        assert!(matches!(
            err,
            RelocateError::Identifier { ref from, ref to, .. } if from == "foo" && to == "my-app"
        ));
    }

    #[test]
    fn invalid_identifier_only_matters_for_renamed_files() {
        let rel = relocation("x/y/foo", "a/b/my-app");
        let src = "package other\n\nimport \"x/y/foo/sub\"\n";
        assert_eq!(rewrite(src, &rel, true), "package other\n\nimport \"a/b/my-app/sub\"\n");
    }

    #[test]
    fn parse_failure_names_the_file() {
        let rel = relocation("x/y/foo", "a/b/bar");
        let err = rewrite_source(b"func main() {}\n", Path::new("cmd/main.go"), &rel, false)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("cmd/main.go"), "{msg}");
        assert!(msg.contains("expected 'package'"), "{msg}");
    }

    #[test]
    fn import_path_on_line_after_keyword_is_retargeted() {
        let rel = relocation("x/y/foo", "a/b/bar");
        let out = rewrite("package main\n\nimport\n\t\"x/y/foo/sub\"\n", &rel, false);
        assert_eq!(out, "package main\n\nimport\n\t\"a/b/bar/sub\"\n");
    }

    #[test]
    fn package_name_after_multi_line_comment_is_renamed() {
        let rel = relocation("x/y/foo", "a/b/bar");
        let out = rewrite("package /*\n*/ foo\n", &rel, true);
        assert_eq!(out, "package /*\n*/ bar\n");
    }
}
