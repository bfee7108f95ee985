//! Domain primitive types used across the Usher workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants;

/// Caller's description of the identity the workload should run as.
///
/// Built once per container start from the environment. Numeric IDs stay
/// optional here; the fallback rules live in [`IdentityRequest::uid`] and
/// [`IdentityRequest::gid`] so every consumer resolves them identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    /// Desired numeric UID, if the caller supplied one.
    pub uid: Option<u32>,
    /// Desired numeric GID, if the caller supplied one.
    pub gid: Option<u32>,
    /// Username to look up or create.
    pub user_name: String,
    /// Group name to look up or create.
    pub group_name: String,
    /// Home directory for a newly created user.
    pub home: PathBuf,
}

impl IdentityRequest {
    /// Creates a request, filling in the name and home-directory defaults.
    ///
    /// An omitted group name mirrors the username, and the home directory
    /// is placed under [`constants::HOME_BASE`].
    #[must_use]
    pub fn new(
        uid: Option<u32>,
        gid: Option<u32>,
        user_name: Option<String>,
        group_name: Option<String>,
    ) -> Self {
        let user_name = user_name.unwrap_or_else(|| constants::DEFAULT_USER_NAME.to_string());
        let group_name = group_name.unwrap_or_else(|| user_name.clone());
        let home = Path::new(constants::HOME_BASE).join(&user_name);
        Self {
            uid,
            gid,
            user_name,
            group_name,
            home,
        }
    }

    /// Effective UID: the caller's value or [`constants::DEFAULT_UID`].
    #[must_use]
    pub const fn uid(&self) -> u32 {
        match self.uid {
            Some(uid) => uid,
            None => constants::DEFAULT_UID,
        }
    }

    /// Effective GID: the caller's value, or a mirror of the effective UID.
    #[must_use]
    pub const fn gid(&self) -> u32 {
        match self.gid {
            Some(gid) => gid,
            None => self.uid(),
        }
    }
}

impl Default for IdentityRequest {
    fn default() -> Self {
        Self::new(None, None, None, None)
    }
}

/// Identity the workload will actually run as.
///
/// Produced by querying (or mutating) the identity store; discarded once the
/// process image is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    /// Numeric UID present in the store.
    pub uid: u32,
    /// Numeric GID present in the store.
    pub gid: u32,
    /// Username bound to the UID.
    pub user_name: String,
    /// Home directory recorded for the user.
    pub home: PathBuf,
    /// Login shell recorded for the user.
    pub shell: PathBuf,
}

impl fmt::Display for ResolvedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}):{}", self.user_name, self.uid, self.gid)
    }
}
