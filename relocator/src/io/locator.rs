//! Locate the template module's files on disk.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::config::RelocatorConfig;
use super::process::run_captured;
use crate::core::module_path::ModulePath;
use crate::error::{RelocateError, Result};

/// Resolves a module path and version to a local directory.
///
/// Resolution is deterministic for a given module cache, so failures are
/// reported once and never retried.
pub trait SourceLocator {
    fn resolve(&self, module: &ModulePath, version: &str) -> Result<PathBuf>;
}

/// Queries the Go module cache with `go mod download -json`.
#[derive(Debug, Clone)]
pub struct GoModDownload {
    go_binary: String,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl GoModDownload {
    pub fn new(go_binary: impl Into<String>, timeout: Duration, output_limit_bytes: usize) -> Self {
        Self {
            go_binary: go_binary.into(),
            timeout,
            output_limit_bytes,
        }
    }

    pub fn from_config(cfg: &RelocatorConfig) -> Self {
        Self::new(
            cfg.go_binary.clone(),
            cfg.resolve_timeout(),
            cfg.resolve_output_limit_bytes,
        )
    }
}

/// Subset of the `go mod download -json` record we rely on.
#[derive(Debug, Deserialize)]
struct DownloadInfo {
    #[serde(rename = "Dir", default)]
    dir: Option<String>,
    #[serde(rename = "Error", default)]
    error: Option<String>,
}

impl SourceLocator for GoModDownload {
    #[instrument(skip_all, fields(module = %module, version))]
    fn resolve(&self, module: &ModulePath, version: &str) -> Result<PathBuf> {
        let query = format!("{module}@{version}");
        let label = format!("{} mod download -json {query}", self.go_binary);
        let mut cmd = Command::new(&self.go_binary);
        cmd.args(["mod", "download", "-json", &query]);

        debug!(command = %label, "resolving template module");
        let output = run_captured(cmd, self.timeout, self.output_limit_bytes)
            .map_err(|err| RelocateError::resolution(&query, format!("{label}: {err:#}")))?;

        if output.timed_out {
            return Err(RelocateError::resolution(
                &query,
                format!("{label}: timed out after {}s", self.timeout.as_secs()),
            ));
        }
        let parsed = parse_download_info(&output.stdout);
        if !output.success() {
            let detail = match parsed {
                Ok(DownloadInfo {
                    error: Some(error), ..
                }) => error,
                _ => output.transcript(),
            };
            return Err(RelocateError::resolution(
                &query,
                format!("{label}: {}\n{detail}", output.status),
            ));
        }

        let info = parsed.map_err(|err| {
            RelocateError::resolution(
                &query,
                format!("{label}: invalid JSON output: {err}\n{}", output.transcript()),
            )
        })?;
        let dir = download_dir(&query, &label, info)?;
        info!(dir = %dir.display(), "resolved template module");
        Ok(dir)
    }
}

fn parse_download_info(stdout: &[u8]) -> serde_json::Result<DownloadInfo> {
    serde_json::from_slice(stdout)
}

fn download_dir(query: &str, label: &str, info: DownloadInfo) -> Result<PathBuf> {
    if let Some(error) = info.error {
        return Err(RelocateError::resolution(query, format!("{label}: {error}")));
    }
    let dir = match info.dir {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => {
            return Err(RelocateError::resolution(
                query,
                format!("{label}: no Dir in output"),
            ));
        }
    };
    ensure_dir(query, &dir)?;
    Ok(dir)
}

/// A fixed, already-present directory. Used for `--from-dir`.
#[derive(Debug, Clone)]
pub struct LocalDir {
    dir: PathBuf,
}

impl LocalDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SourceLocator for LocalDir {
    fn resolve(&self, module: &ModulePath, version: &str) -> Result<PathBuf> {
        let query = format!("{module}@{version}");
        ensure_dir(&query, &self.dir)?;
        debug!(dir = %self.dir.display(), "using local template directory");
        Ok(self.dir.clone())
    }
}

fn ensure_dir(query: &str, dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    Err(RelocateError::resolution(
        query,
        format!("{} is not a directory", dir.display()),
    ))
}
