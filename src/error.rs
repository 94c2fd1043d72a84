//! Build error types.
//!
//! | Error                 | Raised when                                  | Policy            |
//! |-----------------------|----------------------------------------------|-------------------|
//! | `FileSystem`          | delete / create / copy / list fails          | fatal in clean and scaffold, per-file otherwise |
//! | `ToolInvocation`      | a tool can't be spawned or exits non-zero    | per-file, fatal for the package manager |
//! | `ToolchainMissing`    | a binary is still absent after an update     | fatal             |

use std::{io, path::PathBuf, process::ExitStatus};
use thiserror::Error;

/// Errors produced by pipeline stages.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("file system error at `{}`", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    ToolInvocation(#[from] ToolInvocationError),

    #[error(
        "{tool} not found at `{}` after `{package_manager} update`; run `{package_manager} install` in the project root and check its output",
        .path.display()
    )]
    ToolchainMissing {
        tool: &'static str,
        path: PathBuf,
        package_manager: String,
    },
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on.
    pub fn fs(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileSystem {
            path: path.into(),
            source,
        }
    }
}

/// An external tool could not be run, or reported failure.
#[derive(Debug, Error)]
pub enum ToolInvocationError {
    #[error("`{tool}` not found on PATH")]
    NotFound {
        tool: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to execute `{tool} {}`", .args.join(" "))]
    Spawn {
        tool: String,
        args: Vec<String>,
        #[source]
        source: io::Error,
    },

    #[error("{}", describe_failure(.tool, .args, .status, .stderr, .stdout))]
    Failed {
        tool: String,
        args: Vec<String>,
        status: ExitStatus,
        stderr: String,
        stdout: String,
    },
}

impl ToolInvocationError {
    /// Short tool name, as used for the log prefix.
    pub fn tool(&self) -> &str {
        match self {
            Self::NotFound { tool, .. } | Self::Spawn { tool, .. } | Self::Failed { tool, .. } => {
                tool
            }
        }
    }
}

/// Format a non-zero exit with whatever output the tool left behind.
fn describe_failure(
    tool: &str,
    args: &[String],
    status: &ExitStatus,
    stderr: &str,
    stdout: &str,
) -> String {
    let mut msg = format!("command `{tool} {}` failed with {status}", args.join(" "));
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}
