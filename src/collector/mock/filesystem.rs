//! In-memory mock filesystem for testing the sampler without real `/proc`.
//!
//! `MockFs` simulates a filesystem in memory, letting tests stage process
//! tables, change counters between sampling passes, and make processes
//! appear or vanish mid-cycle.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files, directories, per-path owners, and symlinks in memory,
/// allowing tests to simulate various `/proc` states without Linux access.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Owning uid per path. Paths without an entry read as uid 0.
    owners: HashMap<PathBuf, u32>,
    /// Symlink targets (for read_link support).
    links: HashMap<PathBuf, PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();

        // Add parent directories
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.directories.insert(path.clone());

        // Add parent directories
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Records the owning uid for a path.
    pub fn set_owner(&mut self, path: impl AsRef<Path>, uid: u32) {
        self.owners.insert(path.as_ref().to_path_buf(), uid);
    }

    /// Adds a symbolic link with a fixed target.
    pub fn add_link(&mut self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        self.links.insert(path.as_ref().to_path_buf(), target.into());
    }

    /// Removes a file, if present.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Adds a process directory with a realistic `/proc/[pid]/io` file.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `read_bytes` - Cumulative bytes read from storage
    /// * `write_bytes` - Cumulative bytes written to storage
    pub fn add_io_process(&mut self, pid: u32, read_bytes: u64, write_bytes: u64) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("io"), io_content(read_bytes, write_bytes));
    }

    /// Overwrites a process's counters, simulating I/O between passes.
    pub fn set_io_counters(&mut self, pid: u32, read_bytes: u64, write_bytes: u64) {
        self.add_file(
            format!("/proc/{}/io", pid),
            io_content(read_bytes, write_bytes),
        );
    }

    /// Removes a process directory and everything under it, simulating exit.
    pub fn remove_process(&mut self, pid: u32) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.files.retain(|p, _| !p.starts_with(&base));
        self.directories.retain(|p| !p.starts_with(&base));
        self.owners.retain(|p, _| !p.starts_with(&base));
        self.links.retain(|p, _| !p.starts_with(&base));
    }
}

/// Renders `/proc/[pid]/io` content with the full field set the kernel emits.
fn io_content(read_bytes: u64, write_bytes: u64) -> String {
    format!(
        "rchar: {}\nwchar: {}\nsyscr: 100\nsyscw: 50\nread_bytes: {}\nwrite_bytes: {}\ncancelled_write_bytes: 0\n",
        read_bytes.saturating_mul(2),
        write_bytes.saturating_mul(2),
        read_bytes,
        write_bytes
    )
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("file not found: {:?}", path),
            )
        })
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries = HashSet::new();

        // Find all files and directories that are direct children
        for file_path in self.files.keys() {
            if file_path.parent().is_some_and(|parent| parent == path) {
                entries.insert(file_path.clone());
            }
        }

        for dir_path in &self.directories {
            if dir_path.parent().is_some_and(|parent| parent == path) && dir_path != path {
                entries.insert(dir_path.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn owner_uid(&self, path: &Path) -> io::Result<u32> {
        if let Some(uid) = self.owners.get(path) {
            return Ok(*uid);
        }
        if self.files.contains_key(path) || self.directories.contains(path) {
            Ok(0)
        } else {
            Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("path not found: {:?}", path),
            ))
        }
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("link not found: {:?}", path),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1/io", "read_bytes: 1\n");

        let content = fs.read_to_string(Path::new("/proc/1/io")).unwrap();
        assert_eq!(content, "read_bytes: 1\n");
        // Parent directories were created along the way.
        assert!(fs.read_dir(Path::new("/proc")).is_ok());
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/1/io", "x");
        fs.add_file("/proc/1/stat", "y");
        fs.add_file("/proc/2/io", "z");

        let proc_entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(proc_entries.len(), 2); // /proc/1 and /proc/2

        let proc1_entries = fs.read_dir(Path::new("/proc/1")).unwrap();
        assert_eq!(proc1_entries.len(), 2); // io and stat
    }

    #[test]
    fn test_mock_fs_add_io_process() {
        let mut fs = MockFs::new();
        fs.add_io_process(1234, 4096, 2048);

        let content = fs.read_to_string(Path::new("/proc/1234/io")).unwrap();
        assert!(content.contains("read_bytes: 4096"));
        assert!(content.contains("write_bytes: 2048"));
    }

    #[test]
    fn test_mock_fs_remove_process() {
        let mut fs = MockFs::new();
        fs.add_io_process(1234, 1, 1);
        fs.add_io_process(5678, 1, 1);
        fs.remove_process(1234);

        assert!(fs.read_to_string(Path::new("/proc/1234/io")).is_err());
        let entries = fs.read_dir(Path::new("/proc")).unwrap();
        assert_eq!(entries, vec![PathBuf::from("/proc/5678")]);
    }

    #[test]
    fn test_mock_fs_owner_uid() {
        let mut fs = MockFs::new();
        fs.add_io_process(1, 0, 0);
        fs.add_io_process(1000, 0, 0);
        fs.set_owner("/proc/1000/io", 1000);

        assert_eq!(fs.owner_uid(Path::new("/proc/1/io")).unwrap(), 0);
        assert_eq!(fs.owner_uid(Path::new("/proc/1000/io")).unwrap(), 1000);
        assert!(fs.owner_uid(Path::new("/proc/9/io")).is_err());
    }

    #[test]
    fn test_mock_fs_read_link() {
        let mut fs = MockFs::new();
        fs.add_link("/proc/1/exe", "/sbin/init");

        let target = fs.read_link(Path::new("/proc/1/exe")).unwrap();
        assert_eq!(target, PathBuf::from("/sbin/init"));
        assert!(fs.read_link(Path::new("/proc/2/exe")).is_err());
    }

    #[test]
    fn test_mock_fs_not_found() {
        let fs = MockFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent"));
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
