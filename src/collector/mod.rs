//! Filesystem access and `/proc` parsing.
//!
//! The `FileSystem` trait is the seam between the sampling engine and the
//! operating system: the real implementation reads `/proc`, the mock serves
//! staged process tables for tests.

pub mod mock;
pub mod procfs;
pub mod traits;

pub use traits::{FileSystem, RealFs};
