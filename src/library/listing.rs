//! Display rows for a tape picker.
//!
//! Rows carry only display text; the row index maps back to the tape folder
//! through [`TapeListing::tape_at`].

use crate::changer::ActiveTape;
use crate::library::tapes::{TapeFolder, TapeLibrary};

/// Prefix marking the loaded tape.
pub const ACTIVE_MARKER: &str = "* ";

/// Prefix for every other tape.
pub const INACTIVE_MARKER: &str = "  ";

/// One row in the tape picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapeRow {
    /// Text shown for the row.
    pub label: String,
    /// Whether this tape is currently loaded.
    pub active: bool,
}

/// Tape picker rows built from a library scan and the active tape.
#[derive(Debug, Clone)]
pub struct TapeListing {
    rows: Vec<TapeRow>,
    tapes: Vec<TapeFolder>,
}

impl TapeListing {
    pub fn new(library: &TapeLibrary, active: &ActiveTape) -> Self {
        let loaded = active.name();
        let tapes = library.tapes().to_vec();
        let rows = tapes
            .iter()
            .map(|tape| {
                let is_active = loaded == Some(tape.name.as_str());
                let marker = if is_active { ACTIVE_MARKER } else { INACTIVE_MARKER };
                TapeRow {
                    label: format!("{}{}", marker, tape.name),
                    active: is_active,
                }
            })
            .collect();

        Self { rows, tapes }
    }

    pub fn rows(&self) -> &[TapeRow] {
        &self.rows
    }

    /// Tape folder shown at `index`.
    pub fn tape_at(&self, index: usize) -> Option<&TapeFolder> {
        self.tapes.get(index)
    }

    /// Row index of the loaded tape, if one is loaded and listed.
    pub fn active_index(&self) -> Option<usize> {
        self.rows.iter().position(|r| r.active)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
