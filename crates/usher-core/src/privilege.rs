//! Irreversible transition to the target identity.
//!
//! Ordering matters: supplementary groups first (only root may call
//! `setgroups`), then the GID, then the UID that gives up the right to do
//! any of the above. All three of real/effective/saved IDs are set, so the
//! workload cannot switch back.

use usher_common::error::{Result, UsherError};
use usher_common::types::ResolvedIdentity;

/// Drops root privileges, assuming `identity` for the rest of the process
/// lifetime, and points `HOME`/`USER`/`LOGNAME` at the resolved user.
///
/// # Errors
///
/// Returns [`UsherError::PrivilegeDrop`] if any of the transitions is
/// denied; the caller must abort before exec.
#[cfg(target_os = "linux")]
pub fn drop_privileges(identity: &ResolvedIdentity) -> Result<()> {
    use nix::unistd::{Gid, Uid, setgroups, setresgid, setresuid};

    let uid = Uid::from_raw(identity.uid);
    let gid = Gid::from_raw(identity.gid);

    setgroups(&[gid]).map_err(|e| UsherError::PrivilegeDrop {
        message: format!("setgroups([{gid}]): {e}"),
    })?;
    setresgid(gid, gid, gid).map_err(|e| UsherError::PrivilegeDrop {
        message: format!("setresgid({gid}): {e}"),
    })?;
    setresuid(uid, uid, uid).map_err(|e| UsherError::PrivilegeDrop {
        message: format!("setresuid({uid}): {e}"),
    })?;

    export_identity_env(identity);
    tracing::debug!(identity = %identity, "privileges dropped");
    Ok(())
}

/// Stub for non-Linux platforms.
///
/// # Errors
///
/// Always returns an error — privilege transitions require Linux.
#[cfg(not(target_os = "linux"))]
pub fn drop_privileges(_identity: &ResolvedIdentity) -> Result<()> {
    Err(UsherError::Config {
        message: "Linux required for privilege transitions".into(),
    })
}

/// Rewrites the identity-derived environment the workload inherits.
#[cfg(target_os = "linux")]
fn export_identity_env(identity: &ResolvedIdentity) {
    // SAFETY: the provisioner is single-threaded; nothing reads the
    // environment concurrently with these writes.
    unsafe {
        std::env::set_var("HOME", &identity.home);
        std::env::set_var("USER", &identity.user_name);
        std::env::set_var("LOGNAME", &identity.user_name);
    }
}
