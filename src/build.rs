//! Asset build orchestration.
//!
//! Runs a fixed, ordered list of stages:
//!
//! ```text
//! Builder::run()
//!     │
//!     ├── clean        ──► remove output/                    (fatal)
//!     ├── scaffold     ──► mkdir output/{js,css,res}         (fatal)
//!     ├── toolchain    ──► missing binary? `<pm> update`     (fatal)
//!     │
//!     ├── markup       ──► *.html         → output/
//!     ├── resources    ──► res/*          → output/res/
//!     ├── scripts      ──► js/*.js        → output/js/       (copy or minify)
//!     ├── stylesheets  ──► css/*.less     → output/css/*.css
//!     └── templates    ──► js/templates/  → output/js/templates.js
//! ```
//!
//! The first three stages abort the run on error. The rest record per-file
//! failures in the `BuildReport` and keep going.

use crate::{
    config::{Mode, PathSet, ProjectConfig},
    error::BuildError,
    log,
    toolchain::Toolchain,
    utils::fs::{copy_into, display_name, list_files, remove_dir_if_exists},
};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Suffix of scripts that are shipped already minified.
const MINIFIED_SUFFIX: &str = ".min.js";
/// Suffix of script sources.
const SCRIPT_SUFFIX: &str = ".js";
/// Suffix of stylesheet sources.
const STYLESHEET_SUFFIX: &str = ".less";
/// Extension of compiled stylesheets.
const COMPILED_STYLESHEET_EXT: &str = "css";

// ============================================================================
// Stages
// ============================================================================

/// A named step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Scaffold,
    Toolchain,
    Markup,
    Resources,
    Scripts,
    Stylesheets,
    Templates,
}

impl Stage {
    /// Execution order.
    pub const ALL: [Self; 8] = [
        Self::Clean,
        Self::Scaffold,
        Self::Toolchain,
        Self::Markup,
        Self::Resources,
        Self::Scripts,
        Self::Stylesheets,
        Self::Templates,
    ];

    /// Name used for the log prefix and in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Clean => "clean",
            Self::Scaffold => "scaffold",
            Self::Toolchain => "toolchain",
            Self::Markup => "markup",
            Self::Resources => "res",
            Self::Scripts => "js",
            Self::Stylesheets => "css",
            Self::Templates => "templates",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage that could not complete, ending the run.
#[derive(Debug, Error)]
#[error("build aborted at stage `{stage}`")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: BuildError,
}

// ============================================================================
// Report
// ============================================================================

/// A file (or directory) that failed without aborting the run.
#[derive(Debug)]
pub struct Failure {
    pub stage: Stage,
    pub path: PathBuf,
    pub error: BuildError,
}

/// Outcome of a completed run.
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Files written per stage, in stage order.
    pub written: Vec<(Stage, usize)>,
    /// Recoverable failures, in the order they happened.
    pub failures: Vec<Failure>,
    /// Whether the package manager had to be run.
    pub updated_packages: bool,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of files a stage wrote.
    pub fn written_by(&self, stage: Stage) -> usize {
        self.written
            .iter()
            .find(|(s, _)| *s == stage)
            .map_or(0, |(_, n)| *n)
    }

    fn record_failure(&mut self, stage: Stage, path: &Path, error: BuildError) {
        log!("error"; "{}: {}", display_name(path), error);
        self.failures.push(Failure {
            stage,
            path: path.to_path_buf(),
            error,
        });
    }

    /// Per-stage file counts, e.g. `markup 2, res 3, js 4`.
    fn counts(&self) -> String {
        Stage::ALL
            .iter()
            .filter(|stage| self.written.iter().any(|(s, _)| s == *stage))
            .map(|stage| format!("{stage} {}", self.written_by(*stage)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Print the failure list, or a done line when there is none.
    pub fn log_summary(&self) {
        if self.updated_packages {
            log!("toolchain"; "packages were updated during this build");
        }

        if self.failures.is_empty() {
            log!("done"; "{}", self.counts());
            return;
        }

        log!("error"; "{} item(s) failed:", self.failures.len());
        for failure in &self.failures {
            log!(
                "error";
                "[{}] {}\n{}",
                failure.stage,
                failure.path.display(),
                error_chain(&failure.error)
            );
        }
    }
}

/// An error and its sources, joined with `: `.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

// ============================================================================
// Builder
// ============================================================================

/// Runs the pipeline for one project with one toolchain.
pub struct Builder<'a, T: Toolchain> {
    config: &'a ProjectConfig,
    paths: &'a PathSet,
    tools: &'a T,
}

impl<'a, T: Toolchain> Builder<'a, T> {
    pub const fn new(config: &'a ProjectConfig, paths: &'a PathSet, tools: &'a T) -> Self {
        Self {
            config,
            paths,
            tools,
        }
    }

    pub const fn mode(&self) -> Mode {
        self.config.build.mode
    }

    /// Run every stage in order.
    ///
    /// # Errors
    /// Returns the first fatal stage error; per-file failures are in the report.
    pub fn run(&self) -> Result<BuildReport, StageError> {
        log!("build"; "{} build of `{}`", self.mode(), self.paths.root.display());

        let mut report = BuildReport::default();
        for stage in Stage::ALL {
            self.run_stage(stage, &mut report)
                .map_err(|source| StageError { stage, source })?;
        }
        Ok(report)
    }

    fn run_stage(&self, stage: Stage, report: &mut BuildReport) -> Result<(), BuildError> {
        let written = match stage {
            Stage::Clean => return self.clean(),
            Stage::Scaffold => return self.scaffold(),
            Stage::Toolchain => return self.ensure_toolchain(report),
            Stage::Markup => self.copy_markup(report),
            Stage::Resources => self.copy_resources(report),
            Stage::Scripts => self.process_scripts(report),
            Stage::Stylesheets => self.compile_stylesheets(report),
            Stage::Templates => self.compile_templates(report),
        };
        report.written.push((stage, written));
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Fatal stages
    // ------------------------------------------------------------------------

    fn clean(&self) -> Result<(), BuildError> {
        clean_output(&self.paths.output)
    }

    fn scaffold(&self) -> Result<(), BuildError> {
        log!("scaffold"; "creating {}", self.paths.output.display());
        for dir in self.paths.output_dirs() {
            fs::create_dir_all(dir).map_err(|err| BuildError::fs(dir, err))?;
        }
        Ok(())
    }

    /// Run the package manager once if any binary is missing, then re-check.
    fn ensure_toolchain(&self, report: &mut BuildReport) -> Result<(), BuildError> {
        let missing = self.paths.missing_tools();
        if missing.is_empty() {
            return Ok(());
        }

        for (role, path) in &missing {
            log!("toolchain"; "{role} missing at {}", path.display());
        }
        log!("toolchain"; "updating packages");
        self.tools
            .update()
            .inspect_err(|err| log!("error"; "`{}` could not update packages", err.tool()))?;
        report.updated_packages = true;

        match self.paths.missing_tools().first() {
            Some((role, path)) => Err(BuildError::ToolchainMissing {
                tool: *role,
                path: path.to_path_buf(),
                package_manager: self.config.tools.package_manager_display(),
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------------
    // Per-file stages
    // ------------------------------------------------------------------------

    fn copy_markup(&self, report: &mut BuildReport) -> usize {
        let suffix = format!(".{}", self.config.build.markup_ext.trim_start_matches('.'));
        let accept = |name: &str| name.ends_with(&suffix);
        let Some(files) = self.sources(Stage::Markup, &self.paths.root, accept, report) else {
            return 0;
        };

        self.copy_each(Stage::Markup, &files, &self.paths.output, report)
    }

    fn copy_resources(&self, report: &mut BuildReport) -> usize {
        let dir = &self.paths.resources;
        let Some(files) = self.sources(Stage::Resources, dir, |_| true, report) else {
            return 0;
        };

        self.copy_each(Stage::Resources, &files, &self.paths.out_resources, report)
    }

    /// Pre-minified scripts are always copied; others are minified in release mode only.
    fn process_scripts(&self, report: &mut BuildReport) -> usize {
        let stage = Stage::Scripts;
        let accept = |name: &str| name.ends_with(SCRIPT_SUFFIX);
        let Some(files) = self.sources(stage, &self.paths.scripts, accept, report) else {
            return 0;
        };

        let mut written = 0;
        for path in &files {
            let name = display_name(path);
            let result = if name.ends_with(MINIFIED_SUFFIX) || !self.mode().is_release() {
                log!(stage.name(); "copying {name}");
                copy_into(path, &self.paths.out_scripts).map(|_| ())
            } else {
                log!(stage.name(); "minifying {name}");
                let dest = self.paths.out_scripts.join(path.file_name().unwrap_or_default());
                self.tools.minify(path, &dest).map_err(BuildError::from)
            };

            match result {
                Ok(()) => written += 1,
                Err(err) => report.record_failure(stage, path, err),
            }
        }
        written
    }

    fn compile_stylesheets(&self, report: &mut BuildReport) -> usize {
        let stage = Stage::Stylesheets;
        let accept = |name: &str| name.ends_with(STYLESHEET_SUFFIX);
        let Some(files) = self.sources(stage, &self.paths.styles, accept, report) else {
            return 0;
        };

        let mut written = 0;
        for path in &files {
            let name = display_name(path);
            log!(stage.name(); "compiling {name}");
            let dest = self.paths.out_styles.join(compiled_stylesheet_name(&name));
            match self.tools.compile_stylesheet(path, &dest) {
                Ok(()) => written += 1,
                Err(err) => report.record_failure(stage, path, err.into()),
            }
        }
        written
    }

    /// One compiler invocation over the whole templates directory.
    fn compile_templates(&self, report: &mut BuildReport) -> usize {
        let stage = Stage::Templates;
        let templates = &self.paths.templates;
        if !templates.is_dir() {
            log!("warn"; "no templates directory at {}, skipping", templates.display());
            return 0;
        }

        log!(stage.name(); "compiling {}", display_name(&self.paths.templates_bundle));
        let minify = self.mode().is_release();
        match self.tools.bundle_templates(templates, &self.paths.templates_bundle, minify) {
            Ok(()) => 1,
            Err(err) => {
                report.record_failure(stage, templates, err.into());
                0
            }
        }
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    /// List a stage's input files.
    ///
    /// A missing directory is skipped with a warning; an unreadable one is recorded.
    fn sources(
        &self,
        stage: Stage,
        dir: &Path,
        accept: impl Fn(&str) -> bool,
        report: &mut BuildReport,
    ) -> Option<Vec<PathBuf>> {
        if !dir.is_dir() {
            log!("warn"; "{} not found, skipping {stage}", dir.display());
            return None;
        }

        match list_files(dir, accept) {
            Ok(files) => Some(files),
            Err(err) => {
                report.record_failure(stage, dir, err);
                None
            }
        }
    }

    fn copy_each(
        &self,
        stage: Stage,
        files: &[PathBuf],
        dest: &Path,
        report: &mut BuildReport,
    ) -> usize {
        let mut written = 0;
        for path in files {
            log!(stage.name(); "copying {}", display_name(path));
            match copy_into(path, dest) {
                Ok(_) => written += 1,
                Err(err) => report.record_failure(stage, path, err),
            }
        }
        written
    }
}

/// Remove the output directory, logging only when there was one.
///
/// # Errors
/// `FileSystem` if the directory exists but can't be removed.
pub fn clean_output(output: &Path) -> Result<(), BuildError> {
    if output.exists() {
        log!("clean"; "removing {}", output.display());
    }
    remove_dir_if_exists(output).map(|_| ())
}

/// `name.less` → `name.css`.
fn compiled_stylesheet_name(name: &str) -> String {
    let stem = name.strip_suffix(STYLESHEET_SUFFIX).unwrap_or(name);
    format!("{stem}.{COMPILED_STYLESHEET_EXT}")
}

// ============================================================================
// Tests
// ============================================================================
