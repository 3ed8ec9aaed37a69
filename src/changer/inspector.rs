//! Configuration detection and active tape inference.

use crate::changer::operations::TapeChanger;
use crate::changer::report::{ActiveTape, SlotKind, SlotStatus, StatusReport};
use crate::error::{Error, Result};
use crate::slots::SlotState;
use log::{debug, warn};
use std::collections::BTreeSet;

impl TapeChanger {
    /// Read the state of every slot, in slot order.
    pub fn slot_states(&self) -> Result<Vec<(String, SlotState)>> {
        let mut states = Vec::with_capacity(self.slots.len());
        for slot in self.slots.iter() {
            let state = self.slots.inspect(&self.root, slot, &self.codec)?;
            debug!("{}: {:?}", slot, state);
            states.push((slot.to_string(), state));
        }
        Ok(states)
    }

    /// True when every slot is a symlink. Link targets are not checked.
    pub fn is_configured(&self) -> Result<bool> {
        Ok(self.slot_states()?.iter().all(|(_, s)| s.is_link()))
    }

    /// Work out which tape all slots point into.
    ///
    /// Fails with [`Error::NotConfigured`] unless every slot is a symlink.
    /// Mixed or undecodable links give [`ActiveTape::Undetermined`].
    pub fn active_tape(&self) -> Result<ActiveTape> {
        let states = self.slot_states()?;
        if !states.iter().all(|(_, s)| s.is_link()) {
            return Err(Error::NotConfigured(self.root.clone()));
        }
        Ok(resolve_active(&states))
    }

    /// Collect per-slot status, the active tape and the available tapes.
    pub fn status(&self) -> Result<StatusReport> {
        let states = self.slot_states()?;
        let configured = states.iter().all(|(_, s)| s.is_link());
        let active_tape = if configured {
            resolve_active(&states).name().map(str::to_string)
        } else {
            None
        };

        let slots = states
            .iter()
            .map(|(slot, state)| self.slot_status(slot, state))
            .collect();

        let tapes = self
            .library()?
            .tapes()
            .iter()
            .map(|t| t.name.clone())
            .collect();

        Ok(StatusReport {
            root: self.root.clone(),
            configured,
            active_tape,
            slots,
            tapes,
        })
    }

    fn slot_status(&self, slot: &str, state: &SlotState) -> SlotStatus {
        let (kind, target, tape, dangling) = match state {
            SlotState::Absent => (SlotKind::Absent, None, None, false),
            SlotState::File => (SlotKind::File, None, None, false),
            SlotState::Corrupted => (SlotKind::Corrupted, None, None, false),
            SlotState::Link(link) => {
                let text = self.codec.encode(&link.tape, &link.slot);
                let dangling = !self.root.join(&link.tape).join(&link.slot).is_file();
                (SlotKind::Link, Some(text), Some(link.tape.clone()), dangling)
            }
            SlotState::MalformedLink(text) => {
                let dangling = !self.slot_path(slot).exists();
                (SlotKind::MalformedLink, Some(text.clone()), None, dangling)
            }
        };

        SlotStatus {
            slot: slot.to_string(),
            kind,
            target,
            tape,
            dangling,
        }
    }
}

/// Reduce slot states to a single tape, or Undetermined.
///
/// Never picks between candidates: a malformed link, a link naming another
/// slot, or more than one tape all collapse to Undetermined.
pub(super) fn resolve_active(states: &[(String, SlotState)]) -> ActiveTape {
    let mut tapes = BTreeSet::new();
    let mut consistent = true;

    for (slot, state) in states {
        match state.link_target() {
            Some(target) => {
                if target.slot != *slot {
                    warn!("{} links to another slot ({})", slot, target.slot);
                    consistent = false;
                }
                tapes.insert(target.tape.clone());
            }
            None => consistent = false,
        }
    }

    let candidates: Vec<String> = tapes.into_iter().collect();
    match candidates.as_slice() {
        [only] if consistent => ActiveTape::Loaded(only.clone()),
        _ => {
            if candidates.len() > 1 {
                warn!("Slots point at different tapes: {}", candidates.join(", "));
            }
            ActiveTape::Undetermined { candidates }
        }
    }
}
