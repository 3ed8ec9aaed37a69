//! Switching every slot to another tape.
//!
//! A switch runs in three steps:
//! 1. Validate: the tape exists and holds a file for every slot, and no slot
//!    is corrupted. Nothing is touched if this fails.
//! 2. Apply: per slot, remove the old entry and link the new target, while
//!    journaling what was there before.
//! 3. On failure, replay the journal backwards so every slot is put back the
//!    way it was (unless `rollback_on_failure` is off).

use crate::changer::operations::TapeChanger;
use crate::changer::report::SwitchReport;
use crate::config::BACKUP_DIRNAME;
use crate::error::{Error, Result, SlotOperation};
use crate::slots::{validate_tape_name, SlotState};
use log::{debug, info, warn};
use std::path::PathBuf;

/// What a slot held before the switch touched it.
#[derive(Debug)]
enum Previous {
    Absent,
    /// Raw link text.
    Link(String),
    /// Plain file, moved to this backup path.
    File(PathBuf),
}

#[derive(Debug)]
struct JournalEntry {
    slot: String,
    previous: Previous,
    /// The new link was created.
    linked: bool,
}

impl TapeChanger {
    /// Point every slot at `tape`.
    ///
    /// Root and tape problems fail before any slot is changed. Slot failures
    /// are returned in the [`SwitchReport`]; check
    /// [`SwitchReport::is_complete`].
    pub fn switch_to(&self, tape: &str) -> Result<SwitchReport> {
        validate_tape_name(tape, self.slots.names(), self.codec.separator())?;
        self.check_root_writable()?;

        let library = self.library()?;
        let folder = library.folder_for(tape)?;
        let missing = folder.missing_slots(&self.slots);
        if !missing.is_empty() {
            return Err(Error::IncompleteTape {
                tape: tape.to_string(),
                missing,
            });
        }

        let _lock = self.lock()?;

        let states = self.slot_states()?;
        if let Some((slot, _)) = states.iter().find(|(_, s)| *s == SlotState::Corrupted) {
            return Err(Error::SlotCorrupted {
                slot: slot.clone(),
                reason: "not a file or UTF-8 symlink".to_string(),
            });
        }

        let mut report = SwitchReport::new(tape, self.slots.len());
        let mut journal = Vec::with_capacity(states.len());

        for (slot, state) in states {
            let (entry, outcome) = self.apply_slot(tape, &slot, state, &mut report);
            if let Some(entry) = entry {
                journal.push(entry);
            }
            match outcome {
                Ok(()) => {
                    info!("Replaced {} with {}", slot, self.codec.encode(tape, &slot));
                    report.switched.push(slot);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(e);
                    if self.config.rollback_on_failure {
                        break;
                    }
                }
            }
        }

        if report.failures.is_empty() {
            info!("Loaded tape {}", tape);
        } else if self.config.rollback_on_failure {
            self.rollback(journal, &mut report);
            warn!("{}", report.summary());
        } else {
            warn!("{}", report.summary());
        }

        Ok(report)
    }

    /// Replace one slot. The journal entry is returned even on failure so
    /// whatever was already changed can be undone.
    fn apply_slot(
        &self,
        tape: &str,
        slot: &str,
        state: SlotState,
        report: &mut SwitchReport,
    ) -> (Option<JournalEntry>, Result<()>) {
        let slot_path = self.slot_path(slot);

        let previous = match state {
            SlotState::Absent => Previous::Absent,
            SlotState::Link(target) => {
                if let Err(e) = self.backend.remove_entry(&slot_path) {
                    return (None, Err(Error::slot(slot, SlotOperation::Remove, e)));
                }
                Previous::Link(self.codec.encode(&target.tape, &target.slot))
            }
            SlotState::MalformedLink(text) => {
                if let Err(e) = self.backend.remove_entry(&slot_path) {
                    return (None, Err(Error::slot(slot, SlotOperation::Remove, e)));
                }
                Previous::Link(text)
            }
            SlotState::File => match self.back_up(slot) {
                Ok(backup) => {
                    info!("Moved plain file {} to {}", slot, backup.display());
                    report.backups.push(backup.clone());
                    Previous::File(backup)
                }
                Err(e) => return (None, Err(e)),
            },
            SlotState::Corrupted => {
                let e = Error::SlotCorrupted {
                    slot: slot.to_string(),
                    reason: "not a file or UTF-8 symlink".to_string(),
                };
                return (None, Err(e));
            }
        };

        let mut entry = JournalEntry {
            slot: slot.to_string(),
            previous,
            linked: false,
        };

        let text = self.codec.encode(tape, slot);
        match self.backend.create_link(&text, &slot_path) {
            Ok(()) => {
                entry.linked = true;
                (Some(entry), Ok(()))
            }
            Err(e) => (Some(entry), Err(Error::slot(slot, SlotOperation::Link, e))),
        }
    }

    /// Move a plain slot file into the backup folder under a free name.
    fn back_up(&self, slot: &str) -> Result<PathBuf> {
        let backup_dir = self.root.join(BACKUP_DIRNAME);
        self.backend
            .create_dir(&backup_dir)
            .map_err(|e| Error::slot(slot, SlotOperation::Move, e))?;

        let mut backup = backup_dir.join(slot);
        let mut n = 1;
        while std::fs::symlink_metadata(&backup).is_ok() {
            backup = backup_dir.join(format!("{}.{}", slot, n));
            n += 1;
        }

        self.backend
            .rename(&self.slot_path(slot), &backup)
            .map_err(|e| Error::slot(slot, SlotOperation::Move, e))?;
        Ok(backup)
    }

    fn rollback(&self, journal: Vec<JournalEntry>, report: &mut SwitchReport) {
        let had_backups = journal
            .iter()
            .any(|e| matches!(e.previous, Previous::File(_)));

        for entry in journal.into_iter().rev() {
            let slot_path = self.slot_path(&entry.slot);

            if entry.linked {
                if let Err(e) = self.backend.remove_entry(&slot_path) {
                    report
                        .rollback_failures
                        .push(Error::slot(&entry.slot, SlotOperation::Restore, e));
                    continue;
                }
            }

            let restored = match &entry.previous {
                Previous::Absent => Ok(()),
                Previous::Link(text) => self.backend.create_link(text, &slot_path),
                Previous::File(backup) => {
                    let moved = self.backend.rename(backup, &slot_path);
                    if moved.is_ok() {
                        report.backups.retain(|b| b != backup);
                    }
                    moved
                }
            };

            match restored {
                Ok(()) => info!("Restored {}", entry.slot),
                Err(e) => {
                    let e = Error::slot(&entry.slot, SlotOperation::Restore, e);
                    warn!("{}", e);
                    report.rollback_failures.push(e);
                }
            }
        }

        report.rolled_back = report.rollback_failures.is_empty();

        if report.rolled_back && had_backups {
            let backup_dir = self.root.join(BACKUP_DIRNAME);
            // Only succeeds when empty; older backups keep the folder.
            match std::fs::remove_dir(&backup_dir) {
                Ok(()) => info!("Removed empty {}", backup_dir.display()),
                Err(e) => debug!("Keeping {}: {}", backup_dir.display(), e),
            }
        }
    }
}
