//! Error types for the tape changer.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tape changer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Filesystem step that was being applied to a slot when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOperation {
    /// Removing the existing slot entry.
    Remove,
    /// Creating the slot symlink.
    Link,
    /// Moving a plain slot file into a tape or backup folder.
    Move,
    /// Putting a slot back the way it was during rollback.
    Restore,
}

impl fmt::Display for SlotOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SlotOperation::Remove => "remove",
            SlotOperation::Link => "link",
            SlotOperation::Move => "move",
            SlotOperation::Restore => "restore",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while inspecting or changing tapes.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error outside of any particular slot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Library root does not exist or is not a directory.
    #[error("Library root not found: {0}")]
    RootNotFound(PathBuf),

    /// Library root exists but cannot be listed.
    #[error("Library root not readable: {path}: {source}")]
    RootNotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Library root is read-only.
    #[error("Library root not writable: {0}")]
    RootNotWritable(PathBuf),

    /// No tape folder with this name exists under the root.
    #[error("Tape not found: {0}")]
    TapeNotFound(String),

    /// Tape folder exists but lacks some slot files.
    #[error("Tape '{tape}' is missing slot files: {}", missing.join(", "))]
    IncompleteTape { tape: String, missing: Vec<String> },

    /// Name cannot be used as a tape folder.
    #[error("Invalid tape name: {0}")]
    InvalidTapeName(String),

    /// Slot entry is neither a plain file nor a symlink.
    #[error("Slot {slot} is corrupted: {reason}")]
    SlotCorrupted { slot: String, reason: String },

    /// Link text does not follow the `<tape><separator><slot>` form.
    #[error("Malformed link target: {0}")]
    MalformedLink(String),

    /// A filesystem step on a single slot failed.
    #[error("Slot {slot}: {operation} failed: {source}")]
    SlotOperationFailed {
        slot: String,
        operation: SlotOperation,
        #[source]
        source: std::io::Error,
    },

    /// Slots disagree on which tape is loaded.
    #[error("Slots point at different tapes: {}", tapes.join(", "))]
    AmbiguousActiveTape { tapes: Vec<String> },

    /// Operation needs every slot to be a symlink.
    #[error("Library root is not configured: {0}")]
    NotConfigured(PathBuf),

    /// Conversion requested on a root that is already managed.
    #[error("Library root is already configured: {0}")]
    AlreadyConfigured(PathBuf),

    /// Another process holds the root lock.
    #[error("Library root is locked by another process (remove {0} if stale)")]
    Locked(PathBuf),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Symlinks are not available on this platform.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Wrap an I/O error with the slot and step it belongs to.
    pub fn slot(slot: &str, operation: SlotOperation, source: std::io::Error) -> Self {
        Error::SlotOperationFailed {
            slot: slot.to_string(),
            operation,
            source,
        }
    }

    /// Name of the slot this error concerns, if any.
    pub fn slot_name(&self) -> Option<&str> {
        match self {
            Error::SlotCorrupted { slot, .. } | Error::SlotOperationFailed { slot, .. } => {
                Some(slot)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
