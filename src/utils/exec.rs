//! External command execution utilities.
//!
//! Provides the `exec!` macro and the `exec` function for running build
//! tools with captured output and structured error reporting.

use crate::{error::ToolInvocationError, log};
use regex::Regex;
use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Output},
    sync::OnceLock,
};

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments.
///
/// Empty arguments are dropped, so optional flags can be written inline.
///
/// # Examples
/// ```ignore
/// // Without working directory
/// exec!(["npm"]; "update")?;
///
/// // With working directory
/// exec!(root; lessc_path; "-x", input, output)?;
///
/// // With custom filter
/// const MY_FILTER: FilterRule = FilterRule::new(&["npm WARN"]);
/// exec!(filter=&MY_FILTER; root; ["npm"]; "update")?;
/// ```
#[macro_export]
macro_rules! exec {
    ($($tt:tt)*) => {
        $crate::exec_internal!(@parse_filter $($tt)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! exec_internal {
    // Parse filter argument
    (@parse_filter filter=$filter:expr; $($rest:tt)*) => {
        $crate::exec_internal!(@parse_root $filter; $($rest)*)
    };
    (@parse_filter $($rest:tt)*) => {
        $crate::exec_internal!(@parse_root &$crate::utils::exec::EMPTY_FILTER; $($rest)*)
    };

    // Parse root and command (with root)
    (@parse_root $filter:expr; $root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $filter,
        )
    };
    // Parse command (without root)
    (@parse_root $filter:expr; $cmd:expr; $($arg:expr),* $(,)?) => {
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::internal::to_cmd_vec($cmd),
            &$crate::utils::exec::internal::filter_args(&[$($crate::utils::exec::internal::to_os($arg)),*]),
            $filter,
        )
    };
}

// ============================================================================
// Argument Conversion
// ============================================================================

#[doc(hidden)]
#[allow(clippy::wildcard_imports)] // Needed for macro internal module
pub mod internal {
    use super::*;

    /// Convert to `OsString`.
    #[inline]
    pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
        s.into()
    }

    /// Trait for converting to command vector.
    pub trait ToCmd {
        fn to_cmd(self) -> Vec<OsString>;
    }

    impl<const N: usize> ToCmd for [&str; N] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.into_iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &[String] {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    impl ToCmd for &Vec<String> {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            self.iter().map(OsString::from).collect()
        }
    }

    /// A tool binary addressed by its full path.
    impl ToCmd for &Path {
        #[inline]
        fn to_cmd(self) -> Vec<OsString> {
            vec![self.as_os_str().to_owned()]
        }
    }

    /// Convert command to Vec<OsString>.
    #[inline]
    pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
        cmd.to_cmd()
    }

    /// Filter out empty args.
    #[inline]
    pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
        args.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command, wait for it, and capture its output.
///
/// On success, stderr is echoed through `filter` under the tool's name.
///
/// # Errors
/// `Spawn` if the process can't be started, `Failed` on a non-zero exit.
pub fn exec(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
    filter: &'static FilterRule,
) -> Result<Output, ToolInvocationError> {
    let (name, mut command) = prepare(root, cmd, args)?;
    let display_args = cmd[1..]
        .iter()
        .chain(args)
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>();

    let output = command
        .output()
        .map_err(|source| ToolInvocationError::Spawn {
            tool: name.clone(),
            args: display_args.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(failure(name, display_args, &output, filter));
    }

    // On success, only log stderr (warnings) to reduce noise
    let stderr = String::from_utf8_lossy(&output.stderr);
    filter.log(&name, stderr.trim());

    Ok(output)
}

/// Prepare a Command from components.
///
/// The returned name is the file stem of the program, so tools addressed by
/// a full `node_modules/.bin/lessc.cmd` path log under `lessc`.
fn prepare(
    root: Option<&Path>,
    cmd: &[OsString],
    args: &[OsString],
) -> Result<(String, Command), ToolInvocationError> {
    let Some(program) = cmd.first() else {
        return Err(ToolInvocationError::Spawn {
            tool: String::new(),
            args: Vec::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    let name = Path::new(program)
        .file_stem()
        .unwrap_or(program.as_os_str())
        .to_string_lossy()
        .into_owned();

    let mut command = Command::new(program);
    command.args(&cmd[1..]).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

/// Build the error for a non-zero exit, filtering known noise from stderr.
fn failure(
    tool: String,
    args: Vec<String>,
    output: &Output,
    filter: &'static FilterRule,
) -> ToolInvocationError {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let stderr = filter.filter_lines(&stderr).join("\n");

    let stdout = stdout.trim();
    let stdout = if STDOUT_FILTER.should_skip(stdout) {
        ""
    } else {
        stdout
    };

    ToolInvocationError::Failed {
        tool,
        args,
        status: output.status,
        stderr,
        stdout: strip_ansi(stdout).into_owned(),
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Filter rule for skipping specific output prefixes.
///
/// Used to reduce noise in command output logging by ignoring known warnings
/// or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to match at the start of output lines.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule with the given prefixes.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Returns true if output is empty or starts with any of the skip prefixes.
    fn should_skip(&self, output: &str) -> bool {
        output.is_empty() || self.skip_prefixes.iter().any(|p| output.starts_with(p))
    }

    /// Keep the lines that survive the filter, ANSI codes removed.
    fn filter_lines(&self, output: &str) -> Vec<String> {
        output
            .lines()
            .map(strip_ansi)
            .filter(|line| !self.should_skip(line.trim()))
            .map(std::borrow::Cow::into_owned)
            .collect()
    }

    /// Log the surviving lines under the tool name.
    fn log(&self, name: &str, output: &str) {
        let lines = self.filter_lines(output);
        if !lines.is_empty() {
            log!(name; "{}", lines.join("\n"));
        }
    }
}

/// Stdout filter: skip bundled script output echoed to the terminal.
const STDOUT_FILTER: FilterRule = FilterRule::new(&["(function", "!function"]);

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

/// Package manager filter: skip advisory chatter.
pub const NPM_FILTER: FilterRule =
    FilterRule::new(&["npm WARN", "npm notice", "npm warn", "up to date", "found 0"]);

// ============================================================================
// Tests
// ============================================================================
