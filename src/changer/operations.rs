//! The tape changer - the main interface.
//!
//! Inspection, conversion and switching live in sibling modules as further
//! `impl TapeChanger` blocks.

use crate::changer::report::ActiveTape;
use crate::config::ChangerConfig;
use crate::error::{Error, Result};
use crate::fs::{create_backend, LinkBackend, RootLock};
use crate::library::{TapeLibrary, TapeListing};
use crate::slots::{LinkCodec, SlotSet};
use std::path::{Path, PathBuf};

/// Hidden prefix of the scratch file used to check the root is writable.
const WRITE_CHECK_PREFIX: &str = ".tapechanger-write";

/// Map a failed write in the root to a root-level error.
pub(super) fn write_error(root: &Path, e: std::io::Error) -> Error {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => Error::RootNotWritable(root.to_path_buf()),
        _ => Error::Io(e),
    }
}

/// Manages the slot links of one library root.
///
/// Holds no cached slot state: every query reads the root again.
pub struct TapeChanger {
    /// Library root holding the slots and tape folders.
    pub(super) root: PathBuf,
    pub(super) config: ChangerConfig,
    pub(super) slots: SlotSet,
    pub(super) codec: LinkCodec,
    pub(super) backend: Box<dyn LinkBackend>,
}

impl std::fmt::Debug for TapeChanger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapeChanger")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl TapeChanger {
    /// Open a library root with the platform filesystem backend.
    pub fn open(root: &Path, config: ChangerConfig) -> Result<Self> {
        Self::with_backend(root, config, create_backend()?)
    }

    /// Open a library root with a custom backend.
    pub fn with_backend(
        root: &Path,
        config: ChangerConfig,
        backend: Box<dyn LinkBackend>,
    ) -> Result<Self> {
        config.validate().map_err(Error::Config)?;

        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }

        let slots = SlotSet::new(config.slot_names.clone())?;
        let codec = LinkCodec::new(config.link_separator);

        Ok(Self {
            root: root.to_path_buf(),
            config,
            slots,
            codec,
            backend,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ChangerConfig {
        &self.config
    }

    pub fn slots(&self) -> &SlotSet {
        &self.slots
    }

    pub fn codec(&self) -> &LinkCodec {
        &self.codec
    }

    /// Scan the tape folders under the root.
    pub fn library(&self) -> Result<TapeLibrary> {
        TapeLibrary::scan(&self.root, &self.slots, self.codec.separator())
    }

    /// Build tape picker rows, marking the loaded tape if there is one.
    pub fn listing(&self) -> Result<TapeListing> {
        let library = self.library()?;
        let active = if self.is_configured()? {
            self.active_tape()?
        } else {
            ActiveTape::Undetermined {
                candidates: Vec::new(),
            }
        };
        Ok(TapeListing::new(&library, &active))
    }

    pub(super) fn slot_path(&self, slot: &str) -> PathBuf {
        self.slots.slot_path(&self.root, slot)
    }

    /// Fail before touching any slot if the root is gone or this process
    /// cannot create entries in it.
    pub(super) fn check_root_writable(&self) -> Result<()> {
        let metadata = match std::fs::metadata(&self.root) {
            Ok(m) if m.is_dir() => m,
            _ => return Err(Error::RootNotFound(self.root.clone())),
        };
        if metadata.permissions().readonly() {
            return Err(Error::RootNotWritable(self.root.clone()));
        }

        // Mode bits say nothing about ownership; try an actual write.
        tempfile::Builder::new()
            .prefix(WRITE_CHECK_PREFIX)
            .tempfile_in(&self.root)
            .map(drop)
            .map_err(|e| write_error(&self.root, e))
    }

    pub(super) fn lock(&self) -> Result<Option<RootLock>> {
        if self.config.lock_root {
            RootLock::acquire(&self.root).map(Some)
        } else {
            Ok(None)
        }
    }
}
