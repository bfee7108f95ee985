//! System-wide constants and default identity values.

/// Fallback UID when `LOCAL_USER_ID` is not supplied.
///
/// Deliberately outside the range any base image allocates by default, so a
/// forgotten override never collides with a packaged system account.
pub const DEFAULT_UID: u32 = 9001;

/// Default username for provisioned identities.
pub const DEFAULT_USER_NAME: &str = "user";

/// Login shell written into created passwd entries.
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Base directory under which home directories are created.
pub const HOME_BASE: &str = "/home";

/// Environment variable carrying the desired numeric UID.
pub const ENV_USER_ID: &str = "LOCAL_USER_ID";

/// Environment variable carrying the desired numeric GID.
pub const ENV_GROUP_ID: &str = "LOCAL_GROUP_ID";

/// Environment variable overriding the provisioned username.
pub const ENV_USER_NAME: &str = "LOCAL_USER_NAME";

/// Environment variable overriding the provisioned group name.
pub const ENV_GROUP_NAME: &str = "LOCAL_GROUP_NAME";

/// User database, relative to the identity store root.
pub const PASSWD_FILE: &str = "etc/passwd";

/// Group database, relative to the identity store root.
pub const GROUP_FILE: &str = "etc/group";

/// Mutation lock, relative to the identity store root.
pub const LOCK_FILE: &str = "etc/.usher.lock";

/// Application name used in logs and error output.
pub const APP_NAME: &str = "usher";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "ushr";
