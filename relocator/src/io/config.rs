//! Relocator configuration loaded from an optional TOML file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::module_path::ModulePath;

/// Template module instantiated when nothing else is configured.
pub const DEFAULT_SOURCE_MODULE: &str = "github.com/t-0-network/provider-starter-go";

/// Version qualifier passed to the resolver by default.
pub const DEFAULT_VERSION: &str = "latest";

/// Relocator configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults
/// below and command-line flags override whatever the file says.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelocatorConfig {
    /// Module path of the template to copy.
    pub source_module: String,

    /// Version qualifier appended as `<module>@<version>` when resolving.
    pub version: String,

    /// Go toolchain binary used to query the module cache.
    pub go_binary: String,

    /// Wall-clock limit for one `go mod download` call.
    pub resolve_timeout_secs: u64,

    /// Keep at most this many bytes of resolver stdout/stderr.
    pub resolve_output_limit_bytes: usize,
}

impl Default for RelocatorConfig {
    fn default() -> Self {
        Self {
            source_module: DEFAULT_SOURCE_MODULE.to_string(),
            version: DEFAULT_VERSION.to_string(),
            go_binary: "go".to_string(),
            resolve_timeout_secs: 10 * 60,
            resolve_output_limit_bytes: 1_000_000,
        }
    }
}

impl RelocatorConfig {
    pub fn validate(&self) -> Result<()> {
        ModulePath::parse(&self.source_module).context("source_module")?;
        if self.version.trim().is_empty() {
            return Err(anyhow!("version must not be empty"));
        }
        if self.go_binary.trim().is_empty() {
            return Err(anyhow!("go_binary must not be empty"));
        }
        if self.resolve_timeout_secs == 0 {
            return Err(anyhow!("resolve_timeout_secs must be > 0"));
        }
        if self.resolve_output_limit_bytes == 0 {
            return Err(anyhow!("resolve_output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn source_module(&self) -> Result<ModulePath> {
        Ok(ModulePath::parse(&self.source_module)?)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_secs(self.resolve_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If `path` is `None`, returns `RelocatorConfig::default()`.
pub fn load_config(path: Option<&Path>) -> Result<RelocatorConfig> {
    let Some(path) = path else {
        let cfg = RelocatorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    };
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RelocatorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
