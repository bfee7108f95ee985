//! The container-start pipeline.
//!
//! One linear pass per container start:
//! parse environment → resolve identity → drop privileges → exec.
//! Every stage failure propagates out for the caller to abort with; there
//! is no retry and no partial recovery.

use std::convert::Infallible;

use usher_common::error::Result;

use crate::store::IdentityStore;
use crate::{env, exec, privilege, provision};

/// Runs the full provisioning pipeline and transfers control to `command`.
///
/// On success this function does not return — the process image has been
/// replaced by the workload.
///
/// # Errors
///
/// Propagates the failing stage's error: configuration, conflict,
/// provisioning, privilege-drop, or exec.
pub fn run<S, I>(store: &mut S, vars: I, command: &[String]) -> Result<Infallible>
where
    S: IdentityStore,
    I: IntoIterator<Item = (String, String)>,
{
    let request = env::parse_environment(vars)?;
    tracing::debug!(
        uid = request.uid(),
        gid = request.gid(),
        user = %request.user_name,
        "identity request"
    );

    let identity = provision::resolve_or_create_identity(store, &request)?;
    tracing::info!(identity = %identity, "identity resolved");

    privilege::drop_privileges(&identity)?;
    exec::exec_command(command)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use usher_common::error::UsherError;

    use super::*;
    use crate::store::MemoryStore;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn bad_environment_aborts_before_any_mutation() {
        let mut store = MemoryStore::new();
        let err = run(&mut store, env(&[("LOCAL_USER_ID", "nope")]), &["id".into()])
            .expect_err("should abort");

        assert!(matches!(err, UsherError::Config { .. }));
        assert!(store.users().is_empty());
        assert!(store.groups().is_empty());
    }

    #[test]
    fn conflict_aborts_before_exec() {
        let mut store = MemoryStore::new().with_user(crate::store::PasswdEntry {
            name: "postgres".into(),
            uid: 1000,
            gid: 1000,
            gecos: String::new(),
            home: "/var/lib/postgresql".into(),
            shell: "/bin/sh".into(),
        });
        let err = run(&mut store, env(&[("LOCAL_USER_ID", "1000")]), &["id".into()])
            .expect_err("should abort");

        assert!(matches!(err, UsherError::Conflict { .. }));
    }
}
