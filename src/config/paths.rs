//! Resolved absolute paths for a build.
//!
//! ```text
//! ProjectConfig
//!     │
//!     └── paths() → PathSet
//!                     │
//!                     ├── sources:  root, scripts, styles, resources, templates
//!                     ├── outputs:  output, out_scripts, out_styles, out_resources
//!                     └── tools:    minifier, style_compiler, template_compiler
//! ```
//!
//! Computed once at startup and never modified during the run.

use super::ProjectConfig;
use std::path::{Component, Path, PathBuf};

/// Name of the bundled template script inside the output script directory.
pub const TEMPLATES_BUNDLE: &str = "templates.js";

/// Every path the pipeline touches, resolved against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    pub root: PathBuf,
    pub scripts: PathBuf,
    pub styles: PathBuf,
    pub resources: PathBuf,
    pub templates: PathBuf,

    pub output: PathBuf,
    pub out_scripts: PathBuf,
    pub out_styles: PathBuf,
    pub out_resources: PathBuf,
    pub templates_bundle: PathBuf,

    pub minifier: PathBuf,
    pub style_compiler: PathBuf,
    pub template_compiler: PathBuf,
}

impl PathSet {
    /// Resolve all paths from a loaded configuration.
    ///
    /// Output sub-directories mirror the source directory names, so
    /// `js/` lands in `output/js/` and so on. Source and output paths have
    /// `.` and `..` folded away.
    pub fn resolve(config: &ProjectConfig) -> Self {
        let root = config.root.clone();
        let build = &config.build;
        let tools = &config.tools;

        let scripts = lexical_join(&root, &build.scripts);
        let styles = lexical_join(&root, &build.styles);
        let resources = lexical_join(&root, &build.resources);
        let templates = lexical_join(&scripts, &build.templates);
        let output = lexical_join(&root, &build.output);
        let out_scripts = output.join(dir_name(&scripts));
        let templates_bundle = out_scripts.join(TEMPLATES_BUNDLE);

        let bin_dir = expand_bin_dir(&root, &tools.bin_dir);

        Self {
            out_styles: output.join(dir_name(&styles)),
            out_resources: output.join(dir_name(&resources)),
            styles,
            resources,
            minifier: tool_binary(&bin_dir, &tools.minifier),
            style_compiler: tool_binary(&bin_dir, &tools.style_compiler),
            template_compiler: tool_binary(&bin_dir, &tools.template_compiler),
            root,
            scripts,
            templates,
            output,
            out_scripts,
            templates_bundle,
        }
    }

    /// Output directories created by the scaffold stage, parent first.
    pub fn output_dirs(&self) -> [&Path; 4] {
        [
            self.output.as_path(),
            self.out_scripts.as_path(),
            self.out_styles.as_path(),
            self.out_resources.as_path(),
        ]
    }

    /// Required tool binaries, labelled by role.
    pub fn tool_binaries(&self) -> [(&'static str, &Path); 3] {
        [
            ("style compiler", self.style_compiler.as_path()),
            ("template compiler", self.template_compiler.as_path()),
            ("script minifier", self.minifier.as_path()),
        ]
    }

    /// Tool binaries that are not present on disk.
    pub fn missing_tools(&self) -> Vec<(&'static str, &Path)> {
        self.tool_binaries()
            .into_iter()
            .filter(|(_, path)| !path.is_file())
            .collect()
    }
}

/// Last component of a resolved directory, e.g. `/site/assets/js` → `js`.
fn dir_name(path: &Path) -> &Path {
    path.file_name().map_or(Path::new(""), Path::new)
}

/// Join `rel` onto `base`, resolving `.` and `..` without touching the disk.
///
/// `..` never climbs above the filesystem root.
fn lexical_join(base: &Path, rel: &Path) -> PathBuf {
    let mut path = PathBuf::new();
    for component in base.join(rel).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if path.file_name().is_some() {
                    path.pop();
                }
            }
            other => path.push(other),
        }
    }
    path
}

/// Expand `~` and anchor relative directories at the root.
fn expand_bin_dir(root: &Path, bin_dir: &Path) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(&bin_dir.to_string_lossy()).into_owned());
    if expanded.is_relative() {
        root.join(expanded)
    } else {
        expanded
    }
}

/// Path of a tool binary inside the bin directory.
///
/// npm installs `.cmd` shims on Windows.
fn tool_binary(bin_dir: &Path, name: &str) -> PathBuf {
    let path = bin_dir.join(name);
    if cfg!(windows) && path.extension().is_none() {
        path.with_extension("cmd")
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_at(root: &Path) -> ProjectConfig {
        let mut config = ProjectConfig::default();
        config.root = root.to_path_buf();
        config
    }

    #[test]
    fn test_resolve_default_layout() {
        let paths = PathSet::resolve(&config_at(Path::new("/site")));

        assert_eq!(paths.scripts, Path::new("/site/js"));
        assert_eq!(paths.styles, Path::new("/site/css"));
        assert_eq!(paths.resources, Path::new("/site/res"));
        assert_eq!(paths.templates, Path::new("/site/js/templates"));
        assert_eq!(paths.output, Path::new("/site/output"));
        assert_eq!(paths.out_scripts, Path::new("/site/output/js"));
        assert_eq!(paths.out_styles, Path::new("/site/output/css"));
        assert_eq!(paths.out_resources, Path::new("/site/output/res"));
        assert_eq!(paths.templates_bundle, Path::new("/site/output/js/templates.js"));
        assert!(paths.style_compiler.starts_with("/site/node_modules/.bin"));
    }

    #[test]
    fn test_nested_source_dirs_flatten_in_output() {
        let mut config = config_at(Path::new("/site"));
        config.build.scripts = PathBuf::from("assets/js");
        let paths = PathSet::resolve(&config);

        assert_eq!(paths.scripts, Path::new("/site/assets/js"));
        assert_eq!(paths.out_scripts, Path::new("/site/output/js"));
        assert_eq!(paths.templates, Path::new("/site/assets/js/templates"));
    }

    #[test]
    fn test_parent_components_folded() {
        let mut config = config_at(Path::new("/site"));
        config.build.output = PathBuf::from("output/..");
        config.build.styles = PathBuf::from("./assets/../css");
        let paths = PathSet::resolve(&config);

        assert_eq!(paths.output, Path::new("/site"));
        assert_eq!(paths.styles, Path::new("/site/css"));
        assert_eq!(paths.out_styles, Path::new("/site/css"));

        config.build.output = PathBuf::from("a/../..");
        assert_eq!(PathSet::resolve(&config).output, Path::new("/"));
    }

    #[test]
    fn test_lexical_join_stops_at_filesystem_root() {
        assert_eq!(lexical_join(Path::new("/site"), Path::new("../../..")), Path::new("/"));
        assert_eq!(lexical_join(Path::new("/site"), Path::new("js/.")), Path::new("/site/js"));
    }

    #[test]
    fn test_absolute_bin_dir_kept() {
        let mut config = config_at(Path::new("/site"));
        config.tools.bin_dir = PathBuf::from("/opt/node/bin");
        let paths = PathSet::resolve(&config);
        assert!(paths.minifier.starts_with("/opt/node/bin"));
    }

    #[cfg(unix)]
    #[test]
    fn test_tool_binary_name_unix() {
        assert_eq!(
            tool_binary(Path::new("/bin"), "lessc"),
            PathBuf::from("/bin/lessc")
        );
    }

    #[test]
    fn test_output_dirs_parent_first() {
        let paths = PathSet::resolve(&config_at(Path::new("/site")));
        let dirs = paths.output_dirs();
        assert_eq!(dirs[0], paths.output);
        assert!(dirs[1..].iter().all(|d| d.starts_with(&paths.output)));
    }

    #[test]
    fn test_missing_tools() {
        let dir = TempDir::new().unwrap();
        let paths = PathSet::resolve(&config_at(dir.path()));
        assert_eq!(paths.missing_tools().len(), 3);

        let bin = paths.style_compiler.parent().unwrap();
        fs::create_dir_all(bin).unwrap();
        fs::write(&paths.style_compiler, "").unwrap();

        let missing = paths.missing_tools();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|(role, _)| *role != "style compiler"));
    }
}
