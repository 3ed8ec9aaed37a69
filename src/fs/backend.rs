//! Filesystem backend abstraction for slot mutations.
//!
//! Every change the changer makes to a slot goes through [`LinkBackend`], so
//! the platform's symlink call lives in one place and tests can inject
//! failures on specific paths.

use crate::error::Result;
use std::io;
use std::path::Path;

/// Trait for the filesystem steps used to convert and switch slots.
///
/// Methods return plain `io::Result`; callers attach the slot and step.
pub trait LinkBackend: Send + Sync {
    /// Create a symlink at `link` whose text is exactly `target`.
    ///
    /// The text is written verbatim; it is not resolved against `link`.
    fn create_link(&self, target: &str, link: &Path) -> io::Result<()>;

    /// Remove a file or symlink (never follows the link).
    fn remove_entry(&self, path: &Path) -> io::Result<()>;

    /// Move an entry within the same filesystem.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and any missing parents.
    fn create_dir(&self, path: &Path) -> io::Result<()>;

    /// Get the name of this backend (for logging).
    fn name(&self) -> &'static str;
}

/// Backend using the host operating system's filesystem calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsLinkBackend;

impl OsLinkBackend {
    pub fn new() -> Self {
        Self
    }
}

impl LinkBackend for OsLinkBackend {
    #[cfg(unix)]
    fn create_link(&self, target: &str, link: &Path) -> io::Result<()> {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    fn create_link(&self, target: &str, link: &Path) -> io::Result<()> {
        std::os::windows::fs::symlink_file(target, link)
    }

    #[cfg(not(any(unix, windows)))]
    fn create_link(&self, _target: &str, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "symlinks are not supported on this platform",
        ))
    }

    fn remove_entry(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn name(&self) -> &'static str {
        "os"
    }
}

/// Create the backend for the current platform.
#[cfg(any(unix, windows))]
pub fn create_backend() -> Result<Box<dyn LinkBackend>> {
    Ok(Box::new(OsLinkBackend::new()))
}

#[cfg(not(any(unix, windows)))]
pub fn create_backend() -> Result<Box<dyn LinkBackend>> {
    Err(crate::error::Error::Unsupported(
        "Symlinks are not supported on this platform".to_string(),
    ))
}
