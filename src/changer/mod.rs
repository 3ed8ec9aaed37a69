//! The slot/tape state machine.
//!
//! Everything is recomputed from the library root on each call, so the
//! root is the only source of truth about which tape is loaded.

mod converter;
mod inspector;
mod operations;
mod report;
mod switcher;

pub use operations::TapeChanger;
pub use report::{ActiveTape, ConversionReport, SlotKind, SlotStatus, StatusReport, SwitchReport};
