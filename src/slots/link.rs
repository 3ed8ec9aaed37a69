//! Link text encoding.
//!
//! A slot symlink points at `<tape><separator><slot>`. The separator is a
//! compatibility detail of the game reading the links, so all formatting and
//! parsing of link text goes through [`LinkCodec`].

use crate::config::LINK_SEPARATOR;
use crate::error::{Error, Result};
use serde::Serialize;

/// Decoded slot link target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkTarget {
    /// Tape folder the link points into.
    pub tape: String,
    /// Slot file name inside the tape folder.
    pub slot: String,
}

impl LinkTarget {
    pub fn new(tape: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            tape: tape.into(),
            slot: slot.into(),
        }
    }
}

/// Encoder/decoder for slot link text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkCodec {
    separator: char,
}

impl Default for LinkCodec {
    fn default() -> Self {
        Self::new(LINK_SEPARATOR)
    }
}

impl LinkCodec {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Build the link text for `slot` inside `tape`.
    pub fn encode(&self, tape: &str, slot: &str) -> String {
        format!("{}{}{}", tape, self.separator, slot)
    }

    /// Split link text back into tape and slot.
    ///
    /// Exactly one separator with a non-empty name on each side is accepted.
    pub fn decode(&self, text: &str) -> Result<LinkTarget> {
        let mut parts = text.split(self.separator);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(tape), Some(slot), None) if !tape.is_empty() && !slot.is_empty() => {
                Ok(LinkTarget::new(tape, slot))
            }
            _ => Err(Error::MalformedLink(text.to_string())),
        }
    }
}
