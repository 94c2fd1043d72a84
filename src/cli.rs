//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use crate::config::Mode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// assetbake asset build CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Output directory path (relative to project root)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Config file name (default: assetbake.toml)
    #[arg(short = 'C', long, default_value = "assetbake.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Build mode selection.
///
/// `--release` and `--debug` win over `--mode` / `ASSETBAKE_MODE`.
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Minify scripts and templates
    #[arg(long, conflicts_with = "debug")]
    pub release: bool,

    /// Copy scripts verbatim and bundle templates unminified
    #[arg(long)]
    pub debug: bool,

    /// Build mode
    #[arg(long, value_enum, env = "ASSETBAKE_MODE")]
    pub mode: Option<Mode>,
}

impl BuildArgs {
    /// The mode requested on the command line, if any.
    pub fn mode(&self) -> Option<Mode> {
        match (self.release, self.debug) {
            (true, _) => Some(Mode::Release),
            (_, true) => Some(Mode::Debug),
            _ => self.mode,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Deletes the output directory and rebuilds all assets
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Deletes the output directory
    Clean,

    /// Reports which tool binaries are installed, without installing anything
    Check,
}

#[allow(unused)]
impl Cli {
    pub const fn is_build(&self) -> bool {
        matches!(self.command, Commands::Build { .. })
    }
    pub const fn is_clean(&self) -> bool {
        matches!(self.command, Commands::Clean)
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("assetbake").chain(args.iter().copied()))
    }

    fn build_mode(cli: &Cli) -> Option<Mode> {
        match &cli.command {
            Commands::Build { build_args } => build_args.mode(),
            _ => None,
        }
    }

    #[test]
    fn test_build_release_flag() {
        let cli = parse(&["build", "--release"]).unwrap();
        assert!(cli.is_build());
        assert_eq!(build_mode(&cli), Some(Mode::Release));
    }

    #[test]
    fn test_build_debug_flag() {
        let cli = parse(&["build", "--debug"]).unwrap();
        assert_eq!(build_mode(&cli), Some(Mode::Debug));
    }

    #[test]
    fn test_build_mode_value() {
        let cli = parse(&["build", "--mode", "release"]).unwrap();
        assert_eq!(build_mode(&cli), Some(Mode::Release));
        assert!(parse(&["build", "--mode", "fast"]).is_err());
    }

    #[test]
    fn test_flag_wins_over_mode() {
        let cli = parse(&["build", "--mode", "release", "--debug"]).unwrap();
        assert_eq!(build_mode(&cli), Some(Mode::Debug));
    }

    #[test]
    fn test_release_conflicts_with_debug() {
        assert!(parse(&["build", "--release", "--debug"]).is_err());
    }

    #[test]
    fn test_global_options() {
        let cli = parse(&["--root", "site", "-o", "dist", "-C", "build.toml", "check"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("site")));
        assert_eq!(cli.output, Some(PathBuf::from("dist")));
        assert_eq!(cli.config, PathBuf::from("build.toml"));
        assert!(cli.is_check());
    }

    #[test]
    fn test_clean_subcommand() {
        let cli = parse(&["clean"]).unwrap();
        assert!(cli.is_clean());
        assert_eq!(cli.config, PathBuf::from("assetbake.toml"));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(parse(&[]).is_err());
    }
}
