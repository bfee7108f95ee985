//! Identity database access.
//!
//! The OS user/group database is ambient shared state; it is modeled here as
//! an injected repository so the provisioning logic can run against an
//! in-memory fake in tests instead of a real `/etc`.

mod etc;
mod memory;

pub use etc::EtcStore;
pub use memory::MemoryStore;

use std::path::PathBuf;

use usher_common::error::Result;

/// A single `passwd(5)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswdEntry {
    /// Login name.
    pub name: String,
    /// Numeric user ID.
    pub uid: u32,
    /// Numeric primary group ID.
    pub gid: u32,
    /// Comment field.
    pub gecos: String,
    /// Home directory.
    pub home: PathBuf,
    /// Login shell.
    pub shell: PathBuf,
}

impl PasswdEntry {
    /// Parses one `name:x:uid:gid:gecos:home:shell` line.
    ///
    /// Returns `None` for comments, blank lines, and malformed entries; the
    /// store skips those rather than refusing the whole database.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\n');
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 7 {
            return None;
        }
        Some(Self {
            name: fields[0].to_string(),
            uid: fields[2].parse().ok()?,
            gid: fields[3].parse().ok()?,
            gecos: fields[4].to_string(),
            home: PathBuf::from(fields[5]),
            shell: PathBuf::from(fields[6]),
        })
    }

    /// Renders the entry as a `passwd(5)` line, without a trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{}:x:{}:{}:{}:{}:{}",
            self.name,
            self.uid,
            self.gid,
            self.gecos,
            self.home.display(),
            self.shell.display()
        )
    }
}

/// A single `group(5)` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupEntry {
    /// Group name.
    pub name: String,
    /// Numeric group ID.
    pub gid: u32,
    /// Supplementary member login names.
    pub members: Vec<String>,
}

impl GroupEntry {
    /// Parses one `name:x:gid:members` line.
    ///
    /// Returns `None` for comments, blank lines, and malformed entries.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches('\n');
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 4 {
            return None;
        }
        let members = if fields[3].is_empty() {
            Vec::new()
        } else {
            fields[3].split(',').map(str::to_string).collect()
        };
        Some(Self {
            name: fields[0].to_string(),
            gid: fields[2].parse().ok()?,
            members,
        })
    }

    /// Renders the entry as a `group(5)` line, without a trailing newline.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!("{}:x:{}:{}", self.name, self.gid, self.members.join(","))
    }
}

/// Repository abstraction over the container's identity database.
///
/// Lookups never mutate. Creation appends exactly one entry; callers are
/// responsible for the lookup-before-create discipline that keeps the
/// database free of duplicates.
pub trait IdentityStore {
    /// Finds the user entry bound to `uid`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying database cannot be read.
    fn lookup_user_by_uid(&self, uid: u32) -> Result<Option<PasswdEntry>>;

    /// Finds the user entry bound to `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying database cannot be read.
    fn lookup_user_by_name(&self, name: &str) -> Result<Option<PasswdEntry>>;

    /// Finds the group entry bound to `gid`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying database cannot be read.
    fn lookup_group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>>;

    /// Finds the group entry bound to `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying database cannot be read.
    fn lookup_group_by_name(&self, name: &str) -> Result<Option<GroupEntry>>;

    /// Appends a new user entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is locked by another provisioner or
    /// cannot be written.
    fn create_user(&mut self, entry: &PasswdEntry) -> Result<()>;

    /// Appends a new group entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is locked by another provisioner or
    /// cannot be written.
    fn create_group(&mut self, entry: &GroupEntry) -> Result<()>;

    /// Creates the home directory for a freshly created user and hands it
    /// over to the user's UID/GID.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or chowned.
    fn provision_home(&mut self, entry: &PasswdEntry) -> Result<()>;
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn passwd_line_roundtrip() {
        let line = "user:x:1000:1000::/home/user:/bin/sh";
        let entry = PasswdEntry::parse_line(line).expect("should parse");
        assert_eq!(entry.name, "user");
        assert_eq!(entry.uid, 1000);
        assert_eq!(entry.gid, 1000);
        assert_eq!(entry.home, PathBuf::from("/home/user"));
        assert_eq!(entry.to_line(), line);
    }

    #[test]
    fn passwd_malformed_lines_are_skipped() {
        assert!(PasswdEntry::parse_line("").is_none());
        assert!(PasswdEntry::parse_line("# nobody here").is_none());
        assert!(PasswdEntry::parse_line("user:x:1000").is_none());
        assert!(PasswdEntry::parse_line("user:x:notanumber:1000::/h:/bin/sh").is_none());
    }

    #[test]
    fn group_line_roundtrip_with_members() {
        let line = "wheel:x:10:alice,bob";
        let entry = GroupEntry::parse_line(line).expect("should parse");
        assert_eq!(entry.name, "wheel");
        assert_eq!(entry.gid, 10);
        assert_eq!(entry.members, vec!["alice", "bob"]);
        assert_eq!(entry.to_line(), line);
    }

    #[test]
    fn group_line_roundtrip_without_members() {
        let line = "user:x:1000:";
        let entry = GroupEntry::parse_line(line).expect("should parse");
        assert!(entry.members.is_empty());
        assert_eq!(entry.to_line(), line);
    }
}
