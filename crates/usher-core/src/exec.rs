//! Process replacement.
//!
//! The workload takes over this process image, keeping its PID, stdio, and
//! signal disposition. No wrapper process remains to relay signals or exit
//! codes, which is the point of exec-ing instead of spawning a child.

use std::convert::Infallible;
use std::ffi::CString;

use nix::errno::Errno;
use nix::unistd::execvp;

use usher_common::error::{Result, UsherError};

/// Replaces the current process image with `command`.
///
/// The command is PATH-resolved and passed through verbatim; Usher never
/// parses or rewrites it. The `Infallible` success type means code after a
/// successful call is unreachable.
///
/// # Errors
///
/// Returns [`UsherError::Config`] for an empty command and
/// [`UsherError::Exec`] when the kernel refuses the exec — with the
/// missing-command case distinguished from the not-executable case.
pub fn exec_command(command: &[String]) -> Result<Infallible> {
    let Some(program) = command.first() else {
        return Err(UsherError::Config {
            message: "no command to exec".into(),
        });
    };

    let argv = command
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| UsherError::Config {
            message: format!("command argument contains a NUL byte: {command:?}"),
        })?;

    tracing::info!(cmd = ?command, "transferring control to workload");
    match execvp(&argv[0], &argv) {
        Ok(infallible) => match infallible {},
        Err(errno) => Err(UsherError::Exec {
            command: program.clone(),
            message: errno.desc().to_string(),
            not_found: matches!(errno, Errno::ENOENT | Errno::ENOTDIR),
        }),
    }
}
