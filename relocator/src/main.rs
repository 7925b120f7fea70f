//! Start a new Go module by copying a template module.
//!
//! Usage:
//!
//! ```text
//! relocator example.com/acme/payouts
//! ```
//!
//! The template is fetched through the Go module cache and written to
//! `./<base name>` with every reference to the template's module path
//! rewritten to the new one.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use relocator::core::module_path::ModulePath;
use relocator::error::RelocateError;
use relocator::exit_codes;
use relocator::instantiate::{InstantiateRequest, instantiate};
use relocator::io::config::load_config;
use relocator::io::locator::{GoModDownload, LocalDir};
use relocator::logging;

#[derive(Parser, Debug)]
#[command(
    name = "relocator",
    version,
    about = "Start a new Go module by copying a template module"
)]
struct Cli {
    /// Module path of the new module; its base name names the new directory.
    dst_module: String,

    /// Accepted for compatibility and ignored.
    #[arg(hide = true)]
    extra: Option<String>,

    /// Template module to copy (overrides the config file).
    #[arg(long, value_name = "MODULE")]
    source: Option<String>,

    /// Version of the template module to resolve (overrides the config file).
    #[arg(long, value_name = "VERSION")]
    at: Option<String>,

    /// Copy from this directory instead of resolving through the module cache.
    #[arg(long, value_name = "PATH")]
    from_dir: Option<PathBuf>,

    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };
    logging::init();

    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("relocator: {err:#}");
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    let dst = ModulePath::parse(&cli.dst_module)?;
    if let Some(extra) = &cli.extra {
        debug!(extra = %extra, "ignoring extra argument");
    }

    let mut cfg = load_config(cli.config.as_deref()).context("load config")?;
    if let Some(source) = cli.source {
        cfg.source_module = source;
    }
    if let Some(version) = cli.at {
        cfg.version = version;
    }
    cfg.validate()?;
    let src = cfg.source_module()?;

    let cwd = std::env::current_dir().context("read current directory")?;
    let request = InstantiateRequest::in_dir(&cwd, src, dst, cfg.version.clone());
    let report = match &cli.from_dir {
        Some(dir) => instantiate(&request, &LocalDir::new(dir)),
        None => instantiate(&request, &GoModDownload::from_config(&cfg)),
    }?;

    let shown = Path::new(".").join(report.dst.base_name());
    info!(
        src = %report.src,
        source_dir = %report.source_dir.display(),
        files = report.files.len(),
        "initialized"
    );
    println!("initialized {} in {}", report.dst, shown.display());
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<RelocateError>() {
        Some(inner) if inner.is_usage() => exit_codes::USAGE,
        _ => exit_codes::FAILURE,
    }
}
