//! Conversion of an unmanaged root into tape form.

use crate::changer::operations::TapeChanger;
use crate::changer::report::ConversionReport;
use crate::error::{Error, Result, SlotOperation};
use crate::slots::{validate_tape_name, SlotState};
use log::{info, warn};
use std::io::{self, ErrorKind};
use std::path::Path;

impl TapeChanger {
    /// Convert into the configured default tape.
    pub fn convert_to_default(&self) -> Result<ConversionReport> {
        let tape = self.config.default_tape.clone();
        self.convert_to(&tape)
    }

    /// Move every plain slot file into `tape` and link the slot back to it.
    ///
    /// Slots that are already links, or absent, are left alone. Slot failures
    /// are collected and the remaining slots still get converted. A file is
    /// only ever moved into the tape folder, and is moved back if its link
    /// cannot be created.
    pub fn convert_to(&self, tape: &str) -> Result<ConversionReport> {
        validate_tape_name(tape, self.slots.names(), self.codec.separator())?;
        self.check_root_writable()?;
        let _lock = self.lock()?;

        if self.is_configured()? {
            return Err(Error::AlreadyConfigured(self.root.clone()));
        }

        let tape_dir = self.root.join(tape);
        match std::fs::symlink_metadata(&tape_dir) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => {
                return Err(Error::InvalidTapeName(format!(
                    "{} (exists and is not a folder)",
                    tape
                )))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Creating tape folder {}", tape_dir.display());
                self.backend.create_dir(&tape_dir)?;
            }
            Err(e) => return Err(e.into()),
        }

        let mut report = ConversionReport::new(tape);

        for (slot, state) in self.slot_states()? {
            match state {
                SlotState::File => match self.convert_slot(tape, &tape_dir, &slot) {
                    Ok(()) => {
                        info!("Moved {} into {} and linked it", slot, tape);
                        report.converted.push(slot);
                    }
                    Err(errors) => {
                        for e in &errors {
                            warn!("{}", e);
                        }
                        report.failures.extend(errors);
                    }
                },
                SlotState::Corrupted => {
                    let e = Error::SlotCorrupted {
                        slot,
                        reason: "not a file or UTF-8 symlink".to_string(),
                    };
                    warn!("{}", e);
                    report.failures.push(e);
                }
                SlotState::Absent | SlotState::Link(_) | SlotState::MalformedLink(_) => {
                    info!("Leaving {} as it is ({:?})", slot, state);
                    report.skipped.push(slot);
                }
            }
        }

        if report.is_complete() {
            info!(
                "Converted {} slots into {}, skipped {}",
                report.converted.len(),
                tape,
                report.skipped.len()
            );
        } else {
            warn!(
                "Conversion into {} finished with {} failed slots",
                tape,
                report.failures.len()
            );
        }

        Ok(report)
    }

    fn convert_slot(
        &self,
        tape: &str,
        tape_dir: &Path,
        slot: &str,
    ) -> std::result::Result<(), Vec<Error>> {
        let slot_path = self.slot_path(slot);
        let dest = tape_dir.join(slot);

        if std::fs::symlink_metadata(&dest).is_ok() {
            let e = io::Error::new(
                ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            );
            return Err(vec![Error::slot(slot, SlotOperation::Move, e)]);
        }

        self.backend
            .rename(&slot_path, &dest)
            .map_err(|e| vec![Error::slot(slot, SlotOperation::Move, e)])?;

        let text = self.codec.encode(tape, slot);
        if let Err(link_err) = self.backend.create_link(&text, &slot_path) {
            let mut errors = vec![Error::slot(slot, SlotOperation::Link, link_err)];
            if let Err(e) = self.backend.rename(&dest, &slot_path) {
                errors.push(Error::slot(slot, SlotOperation::Restore, e));
            }
            return Err(errors);
        }

        Ok(())
    }
}
