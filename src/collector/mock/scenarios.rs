//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` states for exercising the
//! sampling cycle under various conditions.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a small system with a few processes.
    ///
    /// Includes: init (pid 1), two user-owned processes doing I/O (pids
    /// 1000 and 1001, uid 1000), and a process whose `io` file is not
    /// readable (pid 4000).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_io_process(1, 4096, 1024);
        fs.add_link("/proc/1/exe", "/sbin/init");

        fs.add_io_process(1000, 1_000_000, 500_000);
        fs.set_owner("/proc/1000/io", 1000);
        fs.add_link("/proc/1000/exe", "/bin/bash");

        fs.add_io_process(1001, 250_000, 0);
        fs.set_owner("/proc/1001/io", 1000);
        fs.add_link("/proc/1001/exe", "/usr/bin/rsync");

        // Directory present, io file missing: what an unprivileged reader
        // sees for another user's hardened process.
        fs.add_dir("/proc/4000");

        // Non-process entries that a real /proc carries.
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");

        fs
    }
}
