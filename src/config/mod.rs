//! Project configuration management for `assetbake.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[build]`   | Build mode, source and output directories        |
//! | `[tools]`   | Tool binary names, bin directory, package manager |
//!
//! The file is optional: a project without one builds with the defaults,
//! which match the conventional `js/`, `css/`, `res/` layout.
//!
//! # Example
//!
//! ```toml
//! [build]
//! mode = "release"
//! output = "dist"
//!
//! [tools]
//! package_manager = ["npm", "--no-audit"]
//! ```

mod build;
pub mod defaults;
mod error;
mod paths;
mod tools;

pub use build::{BuildConfig, Mode};
pub use error::ConfigError;
pub use paths::PathSet;
pub use tools::ToolsConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing assetbake.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Absolute project root (set after loading)
    #[serde(skip)]
    #[educe(Default = defaults::root())]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Toolchain settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl ProjectConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load `config_name` from `root`, falling back to defaults if it doesn't exist.
    ///
    /// The root is normalized to an absolute path so every derived path is absolute.
    pub fn load(root: &Path, config_name: &Path) -> Result<Self, ConfigError> {
        let root = Self::normalize_path(root);
        let config_path = Self::normalize_path(&root.join(config_name));

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.root = root;
        config.config_path = config_path;
        Ok(config)
    }

    /// Resolve every path used by the pipeline.
    pub fn paths(&self) -> PathSet {
        PathSet::resolve(self)
    }

    /// Update configuration with CLI arguments.
    ///
    /// CLI values win over the config file, which wins over defaults.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Commands::Build { build_args } = &cli.command {
            Self::update_option(&mut self.build.mode, build_args.mode().as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before anything is deleted.
    ///
    /// The output directory is removed on every build, so it must not
    /// contain the project root or any source directory.
    pub fn validate(&self) -> Result<()> {
        if self.tools.package_manager.is_empty() {
            bail!(ConfigError::Validation(
                "[tools.package_manager] must have at least one element".into()
            ));
        }

        for (field, name) in [
            ("[tools.minifier]", &self.tools.minifier),
            ("[tools.style_compiler]", &self.tools.style_compiler),
            ("[tools.template_compiler]", &self.tools.template_compiler),
            ("[build.markup_ext]", &self.build.markup_ext),
        ] {
            if name.trim().is_empty() {
                bail!(ConfigError::Validation(format!("{field} must not be empty")));
            }
        }

        let paths = self.paths();
        if paths.output == paths.root || !paths.output.starts_with(&paths.root) {
            bail!(ConfigError::Validation(format!(
                "[build.output] `{}` must be a sub-directory of the project root",
                paths.output.display()
            )));
        }

        for (field, source) in [
            ("[build.scripts]", &paths.scripts),
            ("[build.styles]", &paths.styles),
            ("[build.resources]", &paths.resources),
        ] {
            if source.starts_with(&paths.output) {
                bail!(ConfigError::Validation(format!(
                    "{field} `{}` lies inside the output directory, which is deleted on every build",
                    source.display()
                )));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
