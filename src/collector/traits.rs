//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the sampling engine to work with both the
//! real `/proc` filesystem on Linux and mock implementations for testing.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction for the filesystem operations the sampler needs.
///
/// Covers reading a process's counter file, listing the process table,
/// resolving file ownership for user filtering, and resolving the
/// executable symlink for reporting.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Lists entries in a directory.
    ///
    /// # Arguments
    /// * `path` - Path to the directory
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Returns the uid owning the given path.
    fn owner_uid(&self, path: &Path) -> io::Result<u32>;

    /// Resolves a symbolic link.
    fn read_link(&self, path: &Path) -> io::Result<PathBuf>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    fn owner_uid(&self, path: &Path) -> io::Result<u32> {
        use std::os::unix::fs::MetadataExt;
        Ok(std::fs::metadata(path)?.uid())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::read_link(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("io");
        fs::write(&file, "read_bytes: 42\n").unwrap();

        let content = RealFs::new().read_to_string(&file).unwrap();
        assert_eq!(content, "read_bytes: 42\n");
    }

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("100")).unwrap();
        fs::write(dir.path().join("uptime"), "1.0 1.0\n").unwrap();

        let entries = RealFs::new().read_dir(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_real_fs_read_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = RealFs::new().read_dir(&dir.path().join("nonexistent"));
        assert!(result.is_err());
    }

    #[test]
    fn test_real_fs_owner_uid() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("io");
        fs::write(&file, "").unwrap();

        // Files we just created belong to our own effective uid.
        let uid = RealFs::new().owner_uid(&file).unwrap();
        assert_eq!(uid, nix::unistd::geteuid().as_raw());
    }

    #[test]
    fn test_real_fs_read_link() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("exe");
        std::os::unix::fs::symlink("/usr/bin/cat", &link).unwrap();

        let target = RealFs::new().read_link(&link).unwrap();
        assert_eq!(target, PathBuf::from("/usr/bin/cat"));
    }
}
