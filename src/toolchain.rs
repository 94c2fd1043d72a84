//! External build tools.
//!
//! Each tool is a narrow trait with one method per invocation shape, so the
//! pipeline can be driven by mocks in tests:
//!
//! | Trait              | Invocation                                   |
//! |--------------------|----------------------------------------------|
//! | `PackageManager`   | `<pm> update`                                |
//! | `Minifier`         | `<tool> <input> -o <output>`                 |
//! | `StyleCompiler`    | `<tool> -x <input> <output>`                 |
//! | `TemplateCompiler` | `<tool> [-m] <templates-dir> -f <output>`    |
//!
//! `NodeToolchain` runs the binaries installed under `node_modules/.bin`.

use crate::{
    config::{PathSet, ProjectConfig},
    error::ToolInvocationError,
    exec, log,
    utils::exec::NPM_FILTER,
};
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Installs or refreshes the tool binaries.
pub trait PackageManager {
    fn update(&self) -> Result<(), ToolInvocationError>;
}

/// Minifies one script file.
pub trait Minifier {
    fn minify(&self, input: &Path, output: &Path) -> Result<(), ToolInvocationError>;
}

/// Compiles one stylesheet source to CSS.
pub trait StyleCompiler {
    fn compile_stylesheet(&self, input: &Path, output: &Path) -> Result<(), ToolInvocationError>;
}

/// Bundles a directory of templates into one script.
pub trait TemplateCompiler {
    fn bundle_templates(
        &self,
        templates: &Path,
        output: &Path,
        minify: bool,
    ) -> Result<(), ToolInvocationError>;
}

/// Everything the pipeline needs from the outside world.
pub trait Toolchain: PackageManager + Minifier + StyleCompiler + TemplateCompiler {}

impl<T> Toolchain for T where T: PackageManager + Minifier + StyleCompiler + TemplateCompiler {}

/// Tools installed by a node package manager.
#[derive(Debug, Clone)]
pub struct NodeToolchain {
    root: PathBuf,
    package_manager: Vec<String>,
    minifier: PathBuf,
    style_compiler: PathBuf,
    template_compiler: PathBuf,
}

impl NodeToolchain {
    pub fn new(config: &ProjectConfig, paths: &PathSet) -> Self {
        Self {
            root: paths.root.clone(),
            package_manager: config.tools.package_manager.clone(),
            minifier: paths.minifier.clone(),
            style_compiler: paths.style_compiler.clone(),
            template_compiler: paths.template_compiler.clone(),
        }
    }
}

impl PackageManager for NodeToolchain {
    /// Runs in the project root so the update sees its `package.json`.
    fn update(&self) -> Result<(), ToolInvocationError> {
        let program = self.package_manager.first().map(String::as_str).unwrap_or_default();
        which::which(program).map_err(|source| ToolInvocationError::NotFound {
            tool: program.to_owned(),
            source,
        })?;

        exec!(filter=&NPM_FILTER; self.root.as_path(); &self.package_manager; "update")?;
        Ok(())
    }
}

impl Minifier for NodeToolchain {
    fn minify(&self, input: &Path, output: &Path) -> Result<(), ToolInvocationError> {
        exec!(self.root.as_path(); self.minifier.as_path(); input, "-o", output)?;
        Ok(())
    }
}

impl StyleCompiler for NodeToolchain {
    fn compile_stylesheet(&self, input: &Path, output: &Path) -> Result<(), ToolInvocationError> {
        exec!(self.root.as_path(); self.style_compiler.as_path(); "-x", input, output)?;
        Ok(())
    }
}

impl TemplateCompiler for NodeToolchain {
    fn bundle_templates(
        &self,
        templates: &Path,
        output: &Path,
        minify: bool,
    ) -> Result<(), ToolInvocationError> {
        exec!(
            self.root.as_path();
            self.template_compiler.as_path();
            if minify { "-m" } else { "" },
            templates, "-f", output
        )?;
        Ok(())
    }
}

/// Report which tool binaries are present, installing nothing.
///
/// # Errors
/// Fails listing the missing binaries if any is absent.
pub fn check_toolchain(config: &ProjectConfig, paths: &PathSet) -> Result<()> {
    for (role, path) in paths.tool_binaries() {
        let state = if path.is_file() { "found" } else { "missing" };
        log!("toolchain"; "{role}: {state} at {}", path.display());
    }

    let program = config.tools.package_manager.first().map(String::as_str).unwrap_or_default();
    match which::which(program) {
        Ok(found) => log!("toolchain"; "package manager: {}", found.display()),
        Err(_) => log!("warn"; "package manager `{program}` not found on PATH"),
    }

    let missing = paths.missing_tools();
    if !missing.is_empty() {
        let names = missing.iter().map(|(role, _)| *role).collect::<Vec<_>>();
        bail!(
            "missing {}; run `{} update` in `{}`",
            names.join(", "),
            config.tools.package_manager_display(),
            paths.root.display()
        );
    }

    log!("done"; "toolchain ready");
    Ok(())
}
