//! Tape library: the tape folders under a library root.

mod listing;
mod tapes;

pub use listing::{TapeListing, TapeRow, ACTIVE_MARKER, INACTIVE_MARKER};
pub use tapes::{TapeFolder, TapeLibrary};
