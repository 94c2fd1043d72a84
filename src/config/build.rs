//! `[build]` section configuration.
//!
//! Source and output directory names plus the build mode.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// Build variant controlling minification of scripts and templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Copy scripts verbatim, bundle templates unminified (default).
    #[default]
    Debug,
    /// Minify scripts and templates.
    Release,
}

impl Mode {
    #[inline]
    pub const fn is_release(self) -> bool {
        matches!(self, Self::Release)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Release => "release",
        })
    }
}

/// `[build]` section in assetbake.toml.
///
/// All directories are relative to the project root, except `templates`
/// which is relative to `scripts`.
///
/// # Example
/// ```toml
/// [build]
/// mode = "release"
/// output = "dist"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Debug copies scripts verbatim; release minifies them.
    #[serde(default = "defaults::build::mode")]
    #[educe(Default = defaults::build::mode())]
    pub mode: Mode,

    /// Build output directory. Deleted and recreated on every build.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Script sources (`*.js`).
    #[serde(default = "defaults::build::scripts")]
    #[educe(Default = defaults::build::scripts())]
    pub scripts: PathBuf,

    /// Stylesheet sources (`*.less`).
    #[serde(default = "defaults::build::styles")]
    #[educe(Default = defaults::build::styles())]
    pub styles: PathBuf,

    /// Resource files, copied as-is.
    #[serde(default = "defaults::build::resources")]
    #[educe(Default = defaults::build::resources())]
    pub resources: PathBuf,

    /// Template sources, bundled into `templates.js`.
    #[serde(default = "defaults::build::templates")]
    #[educe(Default = defaults::build::templates())]
    pub templates: PathBuf,

    /// Extension of the markup pages at the project root.
    #[serde(default = "defaults::build::markup_ext")]
    #[educe(Default = defaults::build::markup_ext())]
    pub markup_ext: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.mode, Mode::Debug);
        assert_eq!(config.output, PathBuf::from("output"));
        assert_eq!(config.scripts, PathBuf::from("js"));
        assert_eq!(config.styles, PathBuf::from("css"));
        assert_eq!(config.resources, PathBuf::from("res"));
        assert_eq!(config.templates, PathBuf::from("templates"));
        assert_eq!(config.markup_ext, "html");
    }

    #[test]
    fn test_mode_parse() {
        let config: BuildConfig = toml::from_str(r#"mode = "release""#).unwrap();
        assert_eq!(config.mode, Mode::Release);
        assert!(config.mode.is_release());

        let result: Result<BuildConfig, _> = toml::from_str(r#"mode = "production""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: BuildConfig = toml::from_str(r#"output = "dist""#).unwrap();
        assert_eq!(config.output, PathBuf::from("dist"));
        assert_eq!(config.scripts, PathBuf::from("js"));
        assert_eq!(config.mode, Mode::Debug);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<BuildConfig, _> = toml::from_str(r#"watch = true"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::Debug.to_string(), "debug");
        assert_eq!(Mode::Release.to_string(), "release");
    }
}
