//! Advisory lock file for the library root.

use crate::config::LOCK_FILENAME;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Held while slots in a library root are being changed.
///
/// The lock file is created exclusively and removed on drop. A crash leaves
/// it behind; [`Error::Locked`] names the file so it can be removed by hand.
#[derive(Debug)]
pub struct RootLock {
    path: PathBuf,
}

impl RootLock {
    /// Take the lock for `root`.
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILENAME);
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Err(Error::Locked(path)),
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;
        debug!("Acquired lock {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RootLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!("Failed to release lock {}: {}", self.path.display(), e);
        }
    }
}
