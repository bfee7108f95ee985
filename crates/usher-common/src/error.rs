//! Unified error types for the Usher workspace.
//!
//! Every failure in the provisioning pipeline is fatal: the entrypoint
//! aborts container start with a descriptive message rather than retrying.
//! Each variant maps to a distinct process exit code so orchestrators can
//! tell failure classes apart.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum UsherError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An identity is already bound to something other than what was requested.
    #[error("identity conflict for {resource}: expected {expected}, found {actual}")]
    Conflict {
        /// Identity that is already bound (e.g. `uid 1000`, `group name user`).
        resource: String,
        /// Binding the request asked for.
        expected: String,
        /// Binding already present in the identity database.
        actual: String,
    },

    /// A user, group, or home directory could not be created.
    #[error("provisioning failed: {message}")]
    Provisioning {
        /// Description of the failed mutation.
        message: String,
    },

    /// The process could not assume the target identity.
    #[error("privilege drop failed: {message}")]
    PrivilegeDrop {
        /// Description of the denied transition.
        message: String,
    },

    /// The target command could not replace the process image.
    #[error("cannot exec {command}: {message}")]
    Exec {
        /// Command that failed to execute.
        command: String,
        /// Description of the failure.
        message: String,
        /// Whether the command was missing rather than not executable.
        not_found: bool,
    },

    /// An I/O operation on the identity database failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl UsherError {
    /// Process exit code for this failure class.
    ///
    /// Follows sysexits for the provisioning stages and shell convention
    /// for exec failures (127 missing, 126 not executable).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 64,
            Self::Conflict { .. } => 65,
            Self::Provisioning { .. } | Self::Io { .. } => 66,
            Self::PrivilegeDrop { .. } => 67,
            Self::Exec { not_found, .. } => {
                if *not_found { 127 } else { 126 }
            }
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, UsherError>;
