//! File-backed identity store over `etc/passwd` and `etc/group`.
//!
//! The store root is injectable so tests can point it at a scratch
//! directory; production use roots it at `/`. Mutations are guarded by a
//! lock file and land via rename, so a second provisioner racing in the
//! same filesystem fails clearly instead of interleaving writes.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use usher_common::constants;
use usher_common::error::{Result, UsherError};

use super::{GroupEntry, IdentityStore, PasswdEntry};

/// Identity store backed by passwd/group files under a root directory.
#[derive(Debug, Clone)]
pub struct EtcStore {
    root: PathBuf,
}

impl EtcStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a store over the container's own `/etc`.
    #[must_use]
    pub fn system() -> Self {
        Self::new("/")
    }

    fn passwd_path(&self) -> PathBuf {
        self.root.join(constants::PASSWD_FILE)
    }

    fn group_path(&self) -> PathBuf {
        self.root.join(constants::GROUP_FILE)
    }

    /// Reads a database file, treating a missing file as empty.
    fn read_lines(path: &Path) -> Result<Vec<String>> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(UsherError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn passwd_entries(&self) -> Result<Vec<PasswdEntry>> {
        Ok(Self::read_lines(&self.passwd_path())?
            .iter()
            .filter_map(|line| PasswdEntry::parse_line(line))
            .collect())
    }

    fn group_entries(&self) -> Result<Vec<GroupEntry>> {
        Ok(Self::read_lines(&self.group_path())?
            .iter()
            .filter_map(|line| GroupEntry::parse_line(line))
            .collect())
    }

    /// Appends one line to a database file under the mutation lock.
    ///
    /// The updated contents are written to a sibling temp file and renamed
    /// into place, so a crash mid-write leaves the original intact.
    fn append_line(&self, path: &Path, line: &str) -> Result<()> {
        let _lock = MutationLock::acquire(&self.root)?;

        let mut contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(UsherError::Io {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };
        if !contents.is_empty() && !contents.ends_with('\n') {
            contents.push('\n');
        }
        contents.push_str(line);
        contents.push('\n');

        let tmp = path.with_extension("usher");
        fs::write(&tmp, &contents).map_err(|e| UsherError::Io {
            path: tmp.clone(),
            source: e,
        })?;
        fs::rename(&tmp, path).map_err(|e| UsherError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Maps an absolute in-container path to a path under the store root.
    fn rooted(&self, path: &Path) -> PathBuf {
        let relative = path.strip_prefix("/").unwrap_or(path);
        self.root.join(relative)
    }
}

impl IdentityStore for EtcStore {
    fn lookup_user_by_uid(&self, uid: u32) -> Result<Option<PasswdEntry>> {
        Ok(self.passwd_entries()?.into_iter().find(|e| e.uid == uid))
    }

    fn lookup_user_by_name(&self, name: &str) -> Result<Option<PasswdEntry>> {
        Ok(self.passwd_entries()?.into_iter().find(|e| e.name == name))
    }

    fn lookup_group_by_gid(&self, gid: u32) -> Result<Option<GroupEntry>> {
        Ok(self.group_entries()?.into_iter().find(|e| e.gid == gid))
    }

    fn lookup_group_by_name(&self, name: &str) -> Result<Option<GroupEntry>> {
        Ok(self.group_entries()?.into_iter().find(|e| e.name == name))
    }

    fn create_user(&mut self, entry: &PasswdEntry) -> Result<()> {
        tracing::debug!(user = %entry.name, uid = entry.uid, "appending passwd entry");
        self.append_line(&self.passwd_path(), &entry.to_line())
    }

    fn create_group(&mut self, entry: &GroupEntry) -> Result<()> {
        tracing::debug!(group = %entry.name, gid = entry.gid, "appending group entry");
        self.append_line(&self.group_path(), &entry.to_line())
    }

    fn provision_home(&mut self, entry: &PasswdEntry) -> Result<()> {
        let home = self.rooted(&entry.home);
        fs::create_dir_all(&home).map_err(|e| UsherError::Provisioning {
            message: format!("cannot create home directory {}: {e}", home.display()),
        })?;

        if nix::unistd::Uid::effective().is_root() {
            nix::unistd::chown(
                &home,
                Some(nix::unistd::Uid::from_raw(entry.uid)),
                Some(nix::unistd::Gid::from_raw(entry.gid)),
            )
            .map_err(|e| UsherError::Provisioning {
                message: format!("cannot chown {} to {}:{}: {e}", home.display(), entry.uid, entry.gid),
            })?;
        } else {
            tracing::debug!(home = %home.display(), "not root, leaving home ownership unchanged");
        }

        tracing::debug!(home = %home.display(), uid = entry.uid, "home directory ready");
        Ok(())
    }
}

/// Exclusive lock over identity database mutations.
///
/// Created `O_CREAT|O_EXCL`; a pre-existing lock file means another
/// provisioner is mid-mutation and this invocation must fail rather than
/// risk interleaved writes. Removed on drop.
struct MutationLock {
    path: PathBuf,
}

impl MutationLock {
    fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(constants::LOCK_FILE);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| UsherError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                drop(file);
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(UsherError::Provisioning {
                message: format!(
                    "identity store is locked by another provisioner ({})",
                    path.display()
                ),
            }),
            Err(e) => Err(UsherError::Io { path, source: e }),
        }
    }
}

impl Drop for MutationLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    fn scratch_store() -> (tempfile::TempDir, EtcStore) {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let store = EtcStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn lookup_on_missing_files_finds_nothing() {
        let (_dir, store) = scratch_store();
        assert!(store.lookup_user_by_uid(1000).expect("should read").is_none());
        assert!(store.lookup_group_by_gid(1000).expect("should read").is_none());
    }

    #[test]
    fn created_user_is_found_by_uid_and_name() {
        let (_dir, mut store) = scratch_store();
        let entry = PasswdEntry {
            name: "user".into(),
            uid: 1000,
            gid: 1000,
            gecos: String::new(),
            home: "/home/user".into(),
            shell: "/bin/sh".into(),
        };
        store.create_user(&entry).expect("should create");

        let by_uid = store
            .lookup_user_by_uid(1000)
            .expect("should read")
            .expect("should exist");
        assert_eq!(by_uid, entry);
        let by_name = store
            .lookup_user_by_name("user")
            .expect("should read")
            .expect("should exist");
        assert_eq!(by_name, entry);
    }

    #[test]
    fn append_preserves_existing_entries() {
        let (dir, mut store) = scratch_store();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(
            dir.path().join("etc/passwd"),
            "root:x:0:0:root:/root:/bin/sh\n",
        )
        .unwrap();

        let entry = PasswdEntry {
            name: "user".into(),
            uid: 1000,
            gid: 1000,
            gecos: String::new(),
            home: "/home/user".into(),
            shell: "/bin/sh".into(),
        };
        store.create_user(&entry).expect("should create");

        let root = store
            .lookup_user_by_uid(0)
            .expect("should read")
            .expect("root should survive the append");
        assert_eq!(root.name, "root");
        assert!(store.lookup_user_by_uid(1000).expect("should read").is_some());
    }

    #[test]
    fn append_tolerates_missing_trailing_newline() {
        let (dir, mut store) = scratch_store();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/group"), "root:x:0:").unwrap();

        let entry = GroupEntry {
            name: "user".into(),
            gid: 1000,
            members: Vec::new(),
        };
        store.create_group(&entry).expect("should create");

        let contents = fs::read_to_string(dir.path().join("etc/group")).unwrap();
        assert_eq!(contents, "root:x:0:\nuser:x:1000:\n");
    }

    #[test]
    fn held_lock_fails_mutation_clearly() {
        let (dir, mut store) = scratch_store();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(dir.path().join("etc/.usher.lock"), "").unwrap();

        let entry = GroupEntry {
            name: "user".into(),
            gid: 1000,
            members: Vec::new(),
        };
        let err = store.create_group(&entry).expect_err("lock should block");
        assert!(matches!(err, UsherError::Provisioning { .. }));
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn lock_is_released_after_mutation() {
        let (dir, mut store) = scratch_store();
        let entry = GroupEntry {
            name: "user".into(),
            gid: 1000,
            members: Vec::new(),
        };
        store.create_group(&entry).expect("first mutation");
        assert!(!dir.path().join("etc/.usher.lock").exists());
        let second = GroupEntry {
            name: "extra".into(),
            gid: 1001,
            members: Vec::new(),
        };
        store.create_group(&second).expect("second mutation");
    }

    #[test]
    fn provision_home_creates_directory_under_root() {
        let (dir, mut store) = scratch_store();
        let entry = PasswdEntry {
            name: "user".into(),
            uid: 1000,
            gid: 1000,
            gecos: String::new(),
            home: "/home/user".into(),
            shell: "/bin/sh".into(),
        };
        store.provision_home(&entry).expect("should create home");
        assert!(dir.path().join("home/user").is_dir());
    }
}
