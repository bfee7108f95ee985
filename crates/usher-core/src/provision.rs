//! Idempotent lookup-or-create resolution of the requested identity.
//!
//! Existing entries are never mutated: a UID that already resolves to the
//! requested username is reused as-is, and any other collision is a
//! conflict that aborts container start.

use usher_common::constants;
use usher_common::error::{Result, UsherError};
use usher_common::types::{IdentityRequest, ResolvedIdentity};

use crate::store::{GroupEntry, IdentityStore, PasswdEntry};

/// Ensures the requested user and group exist, creating them if absent.
///
/// Returns the identity the workload will run as. Repeated invocations with
/// the same request are idempotent: the second run finds the entries the
/// first one created and touches nothing.
///
/// # Errors
///
/// - [`UsherError::Conflict`] when the UID, GID, username, or group name is
///   already bound to a different identity than requested.
/// - [`UsherError::Provisioning`] when an entry or the home directory
///   cannot be created.
pub fn resolve_or_create_identity<S: IdentityStore>(
    store: &mut S,
    request: &IdentityRequest,
) -> Result<ResolvedIdentity> {
    let uid = request.uid();
    let gid = request.gid();

    if let Some(existing) = store.lookup_user_by_uid(uid)? {
        if existing.name != request.user_name {
            return Err(UsherError::Conflict {
                resource: format!("uid {uid}"),
                expected: request.user_name.clone(),
                actual: existing.name,
            });
        }
        if existing.gid != gid {
            return Err(UsherError::Conflict {
                resource: format!("uid {uid}"),
                expected: format!("gid {gid}"),
                actual: format!("gid {}", existing.gid),
            });
        }
        tracing::debug!(identity = %existing.name, uid, "reusing existing user entry");
        return Ok(resolved_from(&existing));
    }

    // UID is free; the requested username must be free as well.
    if let Some(existing) = store.lookup_user_by_name(&request.user_name)? {
        return Err(UsherError::Conflict {
            resource: format!("user name {}", request.user_name),
            expected: format!("uid {uid}"),
            actual: format!("uid {}", existing.uid),
        });
    }

    ensure_group(store, gid, &request.group_name)?;

    let entry = PasswdEntry {
        name: request.user_name.clone(),
        uid,
        gid,
        gecos: String::new(),
        home: request.home.clone(),
        shell: constants::DEFAULT_SHELL.into(),
    };
    store.create_user(&entry)?;
    store.provision_home(&entry)?;

    tracing::info!(user = %entry.name, uid, gid, "provisioned new identity");
    Ok(resolved_from(&entry))
}

/// Looks up or creates the group entry for `gid`.
fn ensure_group<S: IdentityStore>(store: &mut S, gid: u32, name: &str) -> Result<()> {
    if let Some(existing) = store.lookup_group_by_gid(gid)? {
        if existing.name != name {
            return Err(UsherError::Conflict {
                resource: format!("gid {gid}"),
                expected: name.to_string(),
                actual: existing.name,
            });
        }
        tracing::debug!(group = %existing.name, gid, "reusing existing group entry");
        return Ok(());
    }

    if let Some(existing) = store.lookup_group_by_name(name)? {
        return Err(UsherError::Conflict {
            resource: format!("group name {name}"),
            expected: format!("gid {gid}"),
            actual: format!("gid {}", existing.gid),
        });
    }

    store.create_group(&GroupEntry {
        name: name.to_string(),
        gid,
        members: Vec::new(),
    })
}

fn resolved_from(entry: &PasswdEntry) -> ResolvedIdentity {
    ResolvedIdentity {
        uid: entry.uid,
        gid: entry.gid,
        user_name: entry.name.clone(),
        home: entry.home.clone(),
        shell: entry.shell.clone(),
    }
}
