//! assetbake - builds the static assets of a page project.
//!
//! Copies markup and resources, minifies scripts, compiles less stylesheets
//! and bundles handlebars templates into `output/`.

mod build;
mod cli;
mod config;
mod error;
mod toolchain;
mod utils;

use anyhow::{Context, Result, bail};
use build::{Builder, clean_output};
use clap::Parser;
use cli::{Cli, Commands};
use config::{PathSet, ProjectConfig};
use std::path::Path;
use toolchain::{NodeToolchain, check_toolchain};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let paths = config.paths();

    match &cli.command {
        Commands::Build { .. } => build_all(&config, &paths),
        Commands::Clean => {
            clean_output(&paths.output).context("Failed to clean output directory")?;
            log!("done"; "clean");
            Ok(())
        }
        Commands::Check => check_toolchain(&config, &paths),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &Cli) -> Result<ProjectConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    if !root.is_dir() {
        bail!("Project root `{}` is not a directory", root.display());
    }

    let mut config = ProjectConfig::load(root, &cli.config)
        .with_context(|| format!("Failed to load `{}`", cli.config.display()))?;
    config.update_with_cli(cli);
    config.validate()?;

    if config.config_path.is_file() {
        log!("config"; "using {}", config.config_path.display());
    }

    Ok(config)
}

/// Run the whole pipeline with the node toolchain.
///
/// Exits non-zero after finishing every stage if any file failed.
fn build_all(config: &ProjectConfig, paths: &PathSet) -> Result<()> {
    let tools = NodeToolchain::new(config, paths);
    let report = Builder::new(config, paths, &tools).run()?;

    report.log_summary();
    if report.has_failures() {
        bail!("Build finished with {} failed item(s)", report.failures.len());
    }
    Ok(())
}
