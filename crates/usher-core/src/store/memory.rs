//! In-memory identity store.
//!
//! Substitutes for [`super::EtcStore`] in tests; no filesystem is touched.

use std::path::PathBuf;

use usher_common::error::Result;

use super::{GroupEntry, IdentityStore, PasswdEntry};

/// Identity store holding its entries in plain vectors.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: Vec<PasswdEntry>,
    groups: Vec<GroupEntry>,
    homes: Vec<PathBuf>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an existing user entry.
    #[must_use]
    pub fn with_user(mut self, entry: PasswdEntry) -> Self {
        self.users.push(entry);
        self
    }

    /// Seeds the store with an existing group entry.
    #[must_use]
    pub fn with_group(mut self, entry: GroupEntry) -> Self {
        self.groups.push(entry);
        self
    }

    /// All user entries, in creation order.
    #[must_use]
    pub fn users(&self) -> &[PasswdEntry] {
        &self.users
    }

    /// All group entries, in creation order.
    #[must_use]
    pub fn groups(&self) -> &[GroupEntry] {
        &self.groups
    }

    /// Home directories provisioned through this store.
    #[must_use]
    pub fn homes(&self) -> &[PathBuf] {
        &self.homes
    }
}

impl IdentityStore for MemoryStore {
    fn lookup_user_by_uid(&self, uid: u32) -> Result<Option<PasswdEntry>> {
        Ok(self.users.iter().find(|e| e.uid == uid).cloned())
    }

    fn lookup_user_by_name(&self, name: &str) -> Result<Option<PasswdEntry>> {
        Ok(self.users.iter().find(|e| e.name == name).cloned())
    }

    fn lookup_group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>> {
        Ok(self.groups.iter().find(|e| e.gid == gid).cloned())
    }

    fn lookup_group_by_name(&self, name: &str) -> Result<Option<GroupEntry>> {
        Ok(self.groups.iter().find(|e| e.name == name).cloned())
    }

    fn create_user(&mut self, entry: &PasswdEntry) -> Result<()> {
        self.users.push(entry.clone());
        Ok(())
    }

    fn create_group(&mut self, entry: &GroupEntry) -> Result<()> {
        self.groups.push(entry.clone());
        Ok(())
    }

    fn provision_home(&mut self, entry: &PasswdEntry) -> Result<()> {
        self.homes.push(entry.home.clone());
        Ok(())
    }
}
