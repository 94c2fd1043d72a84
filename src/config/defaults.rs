//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

use std::path::PathBuf;

pub fn root() -> PathBuf {
    "./".into()
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use crate::config::Mode;
    use std::path::PathBuf;

    /// The original pages were always built for debugging unless told otherwise.
    pub fn mode() -> Mode {
        Mode::Debug
    }

    pub fn output() -> PathBuf {
        "output".into()
    }

    pub fn scripts() -> PathBuf {
        "js".into()
    }

    pub fn styles() -> PathBuf {
        "css".into()
    }

    pub fn resources() -> PathBuf {
        "res".into()
    }

    pub fn templates() -> PathBuf {
        "templates".into()
    }

    pub fn markup_ext() -> String {
        "html".into()
    }
}

// ============================================================================
// [tools] Section Defaults
// ============================================================================

pub mod tools {
    use std::path::PathBuf;

    pub fn bin_dir() -> PathBuf {
        PathBuf::from("node_modules").join(".bin")
    }

    /// npm ships as a `.cmd` shim on Windows, which `Command` won't resolve alone.
    pub fn package_manager() -> Vec<String> {
        if cfg!(windows) {
            vec!["npm.cmd".into()]
        } else {
            vec!["npm".into()]
        }
    }

    pub fn minifier() -> String {
        "uglifyjs".into()
    }

    pub fn style_compiler() -> String {
        "lessc".into()
    }

    pub fn template_compiler() -> String {
        "handlebars".into()
    }
}
