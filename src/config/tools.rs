//! `[tools]` section configuration.
//!
//! Where the node toolchain lives and how to refresh it.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[tools]` section in assetbake.toml.
///
/// # Example
/// ```toml
/// [tools]
/// bin_dir = "~/.npm-global/bin"
/// package_manager = ["pnpm"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Directory holding the tool binaries. Relative to the project root; `~` is expanded.
    #[serde(default = "defaults::tools::bin_dir")]
    #[educe(Default = defaults::tools::bin_dir())]
    pub bin_dir: PathBuf,

    /// Package manager command, run with `update` when a binary is missing.
    #[serde(default = "defaults::tools::package_manager")]
    #[educe(Default = defaults::tools::package_manager())]
    pub package_manager: Vec<String>,

    /// Script minifier binary name.
    #[serde(default = "defaults::tools::minifier")]
    #[educe(Default = defaults::tools::minifier())]
    pub minifier: String,

    /// Stylesheet compiler binary name.
    #[serde(default = "defaults::tools::style_compiler")]
    #[educe(Default = defaults::tools::style_compiler())]
    pub style_compiler: String,

    /// Template compiler binary name.
    #[serde(default = "defaults::tools::template_compiler")]
    #[educe(Default = defaults::tools::template_compiler())]
    pub template_compiler: String,
}

impl ToolsConfig {
    /// The package manager command as one display string, e.g. `npm`.
    pub fn package_manager_display(&self) -> String {
        self.package_manager.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_config_defaults() {
        let config = ToolsConfig::default();
        assert_eq!(config.bin_dir, PathBuf::from("node_modules").join(".bin"));
        assert_eq!(config.minifier, "uglifyjs");
        assert_eq!(config.style_compiler, "lessc");
        assert_eq!(config.template_compiler, "handlebars");
        assert_eq!(config.package_manager.len(), 1);
    }

    #[test]
    fn test_package_manager_command_vector() {
        let config: ToolsConfig =
            toml::from_str(r#"package_manager = ["yarn", "--silent"]"#).unwrap();
        assert_eq!(config.package_manager, vec!["yarn", "--silent"]);
        assert_eq!(config.package_manager_display(), "yarn --silent");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ToolsConfig, _> = toml::from_str(r#"node = "18""#);
        assert!(result.is_err());
    }
}
