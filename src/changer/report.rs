//! Results reported by inspection, conversion and switching.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The tape all slots agree on, recomputed from disk on every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveTape {
    /// Every slot links into this tape.
    Loaded(String),
    /// Slots disagree, or some link could not be decoded.
    /// `candidates` lists the distinct tapes seen, sorted.
    Undetermined { candidates: Vec<String> },
}

impl ActiveTape {
    /// Name of the loaded tape, if there is exactly one.
    pub fn name(&self) -> Option<&str> {
        match self {
            ActiveTape::Loaded(name) => Some(name),
            ActiveTape::Undetermined { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ActiveTape::Loaded(_))
    }

    /// Turn an undetermined tape into [`Error::AmbiguousActiveTape`].
    pub fn into_result(self) -> Result<String> {
        match self {
            ActiveTape::Loaded(name) => Ok(name),
            ActiveTape::Undetermined { candidates } => {
                Err(Error::AmbiguousActiveTape { tapes: candidates })
            }
        }
    }
}

impl fmt::Display for ActiveTape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveTape::Loaded(name) => f.write_str(name),
            ActiveTape::Undetermined { .. } => f.write_str("(undetermined)"),
        }
    }
}

/// Kind of entry found at a slot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Absent,
    File,
    Link,
    MalformedLink,
    Corrupted,
}

/// Status of a single slot.
#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub slot: String,
    pub kind: SlotKind,
    /// Raw link text, for symlinks.
    pub target: Option<String>,
    /// Decoded tape, for well-formed links.
    pub tape: Option<String>,
    /// The link points at a file that does not exist.
    pub dangling: bool,
}

/// Full status of a library root.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub root: PathBuf,
    pub configured: bool,
    /// `None` when unconfigured or undetermined.
    pub active_tape: Option<String>,
    pub slots: Vec<SlotStatus>,
    pub tapes: Vec<String>,
}

impl StatusReport {
    /// Slots whose links point at missing files.
    pub fn dangling_slots(&self) -> impl Iterator<Item = &SlotStatus> {
        self.slots.iter().filter(|s| s.dangling)
    }
}

/// Outcome of converting an unmanaged root.
#[derive(Debug)]
pub struct ConversionReport {
    /// Tape the plain files were moved into.
    pub tape: String,
    /// Slots moved into the tape and linked.
    pub converted: Vec<String>,
    /// Slots left alone because they were already links or absent.
    pub skipped: Vec<String>,
    /// Per-slot failures.
    pub failures: Vec<Error>,
}

impl ConversionReport {
    pub(crate) fn new(tape: &str) -> Self {
        Self {
            tape: tape.to_string(),
            converted: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Outcome of switching to a tape.
#[derive(Debug)]
pub struct SwitchReport {
    /// Tape that was requested.
    pub tape: String,
    /// Number of slots in the set.
    pub total: usize,
    /// Slots linked to the new tape, in order.
    pub switched: Vec<String>,
    /// Per-slot failures.
    pub failures: Vec<Error>,
    /// All applied slots were put back after a failure.
    pub rolled_back: bool,
    /// Slots that could not be put back.
    pub rollback_failures: Vec<Error>,
    /// Plain slot files moved aside to make room for links.
    pub backups: Vec<PathBuf>,
}

impl SwitchReport {
    pub(crate) fn new(tape: &str, total: usize) -> Self {
        Self {
            tape: tape.to_string(),
            total,
            switched: Vec::new(),
            failures: Vec::new(),
            rolled_back: false,
            rollback_failures: Vec::new(),
            backups: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.switched.len() == self.total
    }

    /// Tape to display after this switch. Any failure makes it undetermined.
    pub fn active_tape(&self) -> ActiveTape {
        if self.is_complete() {
            ActiveTape::Loaded(self.tape.clone())
        } else {
            ActiveTape::Undetermined {
                candidates: Vec::new(),
            }
        }
    }

    /// One-line summary such as `7 of 10 slots switched to B (rolled back)`.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} of {} slots switched to {}",
            self.switched.len(),
            self.total,
            self.tape
        );
        if self.rolled_back {
            line.push_str(" (rolled back)");
        } else if !self.rollback_failures.is_empty() {
            line.push_str(" (rollback incomplete)");
        }
        line
    }
}
