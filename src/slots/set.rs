//! The fixed set of slots and per-slot inspection.

use crate::config::default_slot_names;
use crate::error::{Error, Result};
use crate::slots::link::{LinkCodec, LinkTarget};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What currently sits at a slot position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// Nothing at the slot path.
    Absent,
    /// A plain file (unmanaged).
    File,
    /// A symlink with well-formed link text.
    Link(LinkTarget),
    /// A symlink whose text does not decode.
    MalformedLink(String),
    /// Something else, e.g. a directory or a link with non UTF-8 text.
    Corrupted,
}

impl SlotState {
    /// Whether any entry exists at the slot path.
    pub fn exists(&self) -> bool {
        !matches!(self, SlotState::Absent)
    }

    /// Whether the entry is a symlink, well-formed or not.
    pub fn is_link(&self) -> bool {
        matches!(self, SlotState::Link(_) | SlotState::MalformedLink(_))
    }

    /// Decoded target, for well-formed links only.
    pub fn link_target(&self) -> Option<&LinkTarget> {
        match self {
            SlotState::Link(target) => Some(target),
            _ => None,
        }
    }
}

/// Ordered slot names shared by every tape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSet {
    names: Vec<String>,
}

impl Default for SlotSet {
    fn default() -> Self {
        Self {
            names: default_slot_names(),
        }
    }
}

impl SlotSet {
    /// Create a slot set. Names must be non-empty and unique.
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Config("Slot set is empty".to_string()));
        }
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() || names[..i].contains(name) {
                return Err(Error::Config(format!("Invalid or duplicate slot: {:?}", name)));
            }
        }
        Ok(Self { names })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Path of a slot entry inside the library root.
    pub fn slot_path(&self, root: &Path, slot: &str) -> PathBuf {
        root.join(slot)
    }

    /// Inspect the entry at `root/<slot>` without following symlinks.
    pub fn inspect(&self, root: &Path, slot: &str, codec: &LinkCodec) -> Result<SlotState> {
        let path = self.slot_path(root, slot);
        let metadata = match std::fs::symlink_metadata(&path) {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SlotState::Absent),
            Err(e) => return Err(e.into()),
        };

        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            let target = std::fs::read_link(&path)?;
            // Link text that is not UTF-8 cannot be recreated from a String.
            let Some(text) = target.to_str() else {
                return Ok(SlotState::Corrupted);
            };
            Ok(match codec.decode(text) {
                Ok(decoded) => SlotState::Link(decoded),
                Err(_) => SlotState::MalformedLink(text.to_string()),
            })
        } else if file_type.is_file() {
            Ok(SlotState::File)
        } else {
            Ok(SlotState::Corrupted)
        }
    }
}
