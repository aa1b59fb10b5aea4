//! Data store: the directory the bootstrap reads from
//!
//! The protocol only talks to the [`DataStore`] trait. [`FsStore`] is the
//! directory-backed implementation; tests plug in their own stores to
//! simulate refused access. Access checks go through `access(2)`, so they
//! answer for the calling user rather than for the mode bits.

use persona_core::{Access, BootError, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Read access to a flat store of named files.
pub trait DataStore {
    /// Human-readable location, used in error messages.
    fn location(&self) -> String;

    /// Fails with `PermissionDenied(Read)` if the store cannot be listed.
    fn check_readable(&self) -> Result<()>;

    /// Fails with `PermissionDenied(Write)` if the store is not writable.
    /// Must not create or modify anything.
    fn check_writable(&self) -> Result<()>;

    fn exists(&self, name: &str) -> bool;

    /// Whole file as UTF-8 text. A missing file is `MissingFile`.
    fn read_text(&self, name: &str) -> Result<String>;

    /// Whole file as bytes. A missing file is `MissingFile`.
    fn read_bytes(&self, name: &str) -> Result<Vec<u8>>;

    /// Names of the regular files directly inside the store, in
    /// whatever order the store yields them.
    fn file_names(&self) -> Result<Vec<String>>;
}

/// A data store backed by one directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Ask the kernel whether this process may read or write the root,
    /// without opening or creating anything in it.
    #[cfg(unix)]
    fn access(&self, access: Access) -> io::Result<()> {
        use rustix::fs::Access as Mode;
        let mode = match access {
            Access::Read => Mode::READ_OK,
            Access::Write => Mode::WRITE_OK,
        };
        rustix::fs::access(self.root.as_path(), mode).map_err(io::Error::from)
    }

    #[cfg(not(unix))]
    fn access(&self, access: Access) -> io::Result<()> {
        match access {
            Access::Read => fs::read_dir(&self.root).map(|_| ()),
            Access::Write => {
                if fs::metadata(&self.root)?.permissions().readonly() {
                    return Err(io::ErrorKind::PermissionDenied.into());
                }
                Ok(())
            }
        }
    }

    fn access_error(&self, access: Access, err: &io::Error) -> BootError {
        match err.kind() {
            io::ErrorKind::NotFound => BootError::missing_file(self.location()),
            _ => BootError::permission_denied(access, self.location()),
        }
    }
}

impl DataStore for FsStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    fn check_readable(&self) -> Result<()> {
        self.access(Access::Read)
            .map_err(|e| self.access_error(Access::Read, &e))
    }

    fn check_writable(&self) -> Result<()> {
        self.access(Access::Write)
            .map_err(|e| self.access_error(Access::Write, &e))
    }

    fn exists(&self, name: &str) -> bool {
        self.path_of(name).is_file()
    }

    fn read_text(&self, name: &str) -> Result<String> {
        let bytes = self.read_bytes(name)?;
        String::from_utf8(bytes).map_err(|e| BootError::malformed(name, e))
    }

    fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_of(name);
        // The handle is dropped at the end of this scope on every path.
        let mut file = fs::File::open(&path).map_err(|e| BootError::from_io(name, &e))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|e| BootError::from_io(name, &e))?;
        debug!("read {} ({} bytes)", path.display(), buf.len());
        Ok(buf)
    }

    fn file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| BootError::Io {
                path: self.location(),
                message: e.to_string(),
            })?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_text_and_bytes() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("IDENTITY.txt"), "NAME: Ada\n").unwrap();
        let store = FsStore::new(tmp.path());

        assert!(store.exists("IDENTITY.txt"));
        assert_eq!(store.read_text("IDENTITY.txt").unwrap(), "NAME: Ada\n");
        assert_eq!(store.read_bytes("IDENTITY.txt").unwrap(), b"NAME: Ada\n");
    }

    #[test]
    fn missing_file_is_reported_by_name() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FsStore::new(tmp.path());
        assert!(!store.exists("MEMORY_MASTER.txt"));
        assert_eq!(
            store.read_text("MEMORY_MASTER.txt").unwrap_err(),
            BootError::missing_file("MEMORY_MASTER.txt")
        );
    }

    #[test]
    fn invalid_utf8_text_is_malformed() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.txt"), [0xffu8, 0xfe, 0x00]).unwrap();
        let store = FsStore::new(tmp.path());
        assert!(matches!(
            store.read_text("bad.txt"),
            Err(BootError::MalformedData { .. })
        ));
    }

    #[test]
    fn directories_are_not_files() {
        let tmp = tempfile::TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("nested.txt")).unwrap();
        fs::write(tmp.path().join("nested.txt").join("inner.txt"), "x").unwrap();
        fs::write(tmp.path().join("top.txt"), "x").unwrap();
        let store = FsStore::new(tmp.path());

        assert!(!store.exists("nested.txt"));
        assert_eq!(store.file_names().unwrap(), vec!["top.txt".to_string()]);
    }

    #[test]
    fn missing_directory_is_not_readable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FsStore::new(tmp.path().join("absent"));
        assert!(store.check_readable().is_err());
        assert!(store.check_writable().is_err());
    }

    #[cfg(unix)]
    #[test]
    fn write_check_matches_what_the_caller_can_do() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("locked");
        fs::create_dir(&dir).unwrap();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

        // root may write into a 0555 directory, everyone else may not
        let touched = dir.join("touch");
        let can_write = fs::write(&touched, "x").is_ok();
        let _ = fs::remove_file(&touched);

        let store = FsStore::new(&dir);
        let verdict = store.check_writable();
        let readable = store.check_readable();
        fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

        readable.unwrap();
        match verdict {
            Ok(()) => assert!(can_write, "reported writable but the write was refused"),
            Err(e) => {
                assert!(!can_write, "reported read-only but the write went through");
                assert_eq!(e, BootError::permission_denied(Access::Write, store.location()));
            }
        }
        assert!(!touched.exists());
    }

    #[test]
    fn missing_directory_is_a_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FsStore::new(tmp.path().join("absent"));
        assert_eq!(
            store.check_writable().unwrap_err(),
            BootError::missing_file(store.location())
        );
    }

    #[test]
    fn fresh_directory_is_readable_and_writable() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FsStore::new(tmp.path());
        store.check_readable().unwrap();
        store.check_writable().unwrap();
    }
}
