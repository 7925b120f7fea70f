//! CLI tests for `relocator`.
//!
//! Spawns the binary with `--from-dir` so no Go toolchain or network is
//! needed, and checks exit codes plus the written tree.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use relocator::exit_codes;
use relocator::test_support::{TemplateDir, read_tree};

fn run_relocator(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_relocator"))
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run relocator")
}

fn foo_template() -> TemplateDir {
    TemplateDir::with_files(&[
        ("go.mod", "module x/y/foo\n\ngo 1.22\n"),
        (
            "root.go",
            "package foo\n\nimport (\n\t\"fmt\"\n\n\t\"x/y/foo/sub\"\n)\n\nfunc Hello() { fmt.Println(sub.Name) }\n",
        ),
        ("sub/sub.go", "package sub\n\nconst Name = \"foo\"\n"),
        (
            "cmd/main.go",
            "package main\n\nimport \"x/y/foo\"\n\nfunc main() { foo.Hello() }\n",
        ),
    ])
    .expect("template")
}

/// Renaming `x/y/foo` to `a/b/bar` rewrites package, imports and go.mod.
#[test]
fn instantiates_under_new_base_name() {
    let template = foo_template();
    let work = tempfile::tempdir().expect("workdir");

    let output = run_relocator(
        work.path(),
        &[
            "--source",
            "x/y/foo",
            "--from-dir",
            template.path().to_str().expect("utf8 path"),
            "a/b/bar",
        ],
    );
    assert_eq!(
        output.status.code(),
        Some(exit_codes::OK),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("initialized a/b/bar in ./bar"), "{stdout}");

    let tree = read_tree(&work.path().join("bar")).expect("read tree");
    assert_eq!(tree["go.mod"], "module a/b/bar\n\ngo 1.22\n");
    assert_eq!(
        tree["root.go"],
        "package bar\n\nimport (\n\t\"fmt\"\n\n\t\"a/b/bar/sub\"\n)\n\nfunc Hello() { fmt.Println(sub.Name) }\n"
    );
    assert_eq!(tree["sub/sub.go"], "package sub\n\nconst Name = \"foo\"\n");
    assert_eq!(
        tree["cmd/main.go"],
        "package main\n\nimport foo \"a/b/bar\"\n\nfunc main() { foo.Hello() }\n"
    );
}

/// Same base name: the root import is retargeted without an alias.
#[test]
fn same_base_name_adds_no_alias() {
    let template = foo_template();
    let work = tempfile::tempdir().expect("workdir");

    let output = run_relocator(
        work.path(),
        &[
            "--source",
            "x/y/foo",
            "--from-dir",
            template.path().to_str().expect("utf8 path"),
            "a/b/foo",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let tree = read_tree(&work.path().join("foo")).expect("read tree");
    assert_eq!(
        tree["cmd/main.go"],
        "package main\n\nimport \"a/b/foo\"\n\nfunc main() { foo.Hello() }\n"
    );
    assert!(tree["root.go"].starts_with("package foo\n"));
}

/// A non-empty destination aborts before anything is read or written.
#[test]
fn non_empty_destination_is_refused() {
    let template = foo_template();
    let work = tempfile::tempdir().expect("workdir");
    let dest = work.path().join("bar");
    fs::create_dir(&dest).expect("mkdir");
    fs::write(dest.join("existing.txt"), "keep me").expect("write");

    let output = run_relocator(
        work.path(),
        &[
            "--source",
            "x/y/foo",
            "--from-dir",
            template.path().to_str().expect("utf8 path"),
            "a/b/bar",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("exists and is non-empty"), "{stderr}");

    let tree = read_tree(&dest).expect("read tree");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree["existing.txt"], "keep me");
}

#[test]
fn missing_destination_argument_is_usage_error() {
    let work = tempfile::tempdir().expect("workdir");
    let output = run_relocator(work.path(), &[]);
    assert_eq!(output.status.code(), Some(exit_codes::USAGE));
}

#[test]
fn too_many_arguments_is_usage_error() {
    let work = tempfile::tempdir().expect("workdir");
    let output = run_relocator(work.path(), &["a/b/bar", "dir", "extra"]);
    assert_eq!(output.status.code(), Some(exit_codes::USAGE));
}

#[test]
fn malformed_destination_path_is_usage_error() {
    let work = tempfile::tempdir().expect("workdir");
    let output = run_relocator(work.path(), &["a//bar"]);
    assert_eq!(output.status.code(), Some(exit_codes::USAGE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid module path"), "{stderr}");
}

/// A destination base name that is not an identifier fails on the root package.
#[test]
fn invalid_package_name_fails() {
    let template = foo_template();
    let work = tempfile::tempdir().expect("workdir");

    let output = run_relocator(
        work.path(),
        &[
            "--source",
            "x/y/foo",
            "--from-dir",
            template.path().to_str().expect("utf8 path"),
            "a/b/my-app",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("cannot rename package foo to package my-app"),
        "{stderr}"
    );
}

#[test]
fn missing_template_dir_is_resolution_failure() {
    let work = tempfile::tempdir().expect("workdir");
    let missing = work.path().join("no-template");
    let output = run_relocator(
        work.path(),
        &[
            "--source",
            "x/y/foo",
            "--from-dir",
            missing.to_str().expect("utf8 path"),
            "a/b/bar",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::FAILURE));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resolve x/y/foo@latest"), "{stderr}");
    assert!(!work.path().join("bar").exists());
}

#[test]
fn config_file_supplies_source_module() {
    let template = foo_template();
    let work = tempfile::tempdir().expect("workdir");
    let config = work.path().join("relocator.toml");
    fs::write(&config, "source_module = \"x/y/foo\"\n").expect("write config");

    let output = run_relocator(
        work.path(),
        &[
            "--config",
            config.to_str().expect("utf8 path"),
            "--from-dir",
            template.path().to_str().expect("utf8 path"),
            "a/b/bar",
        ],
    );
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let tree = read_tree(&work.path().join("bar")).expect("read tree");
    assert_eq!(tree["go.mod"], "module a/b/bar\n\ngo 1.22\n");
}
