//! Slots: the fixed file positions the game reads.
//!
//! This module handles:
//! - The ordered set of slot names
//! - Inspecting what sits at each slot position
//! - Encoding and decoding slot link text

mod link;
mod set;

pub use link::{LinkCodec, LinkTarget};
pub use set::{SlotSet, SlotState};

use crate::error::{Error, Result};

/// Check that `name` can be used as a tape folder next to the slots.
pub fn validate_tape_name<S: AsRef<str>>(name: &str, slots: &[S], separator: char) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.starts_with('.')
        || name.contains(['/', '\\', separator]);
    if invalid {
        return Err(Error::InvalidTapeName(name.to_string()));
    }
    if slots.iter().any(|s| s.as_ref() == name) {
        return Err(Error::InvalidTapeName(format!(
            "{} (collides with a slot name)",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_tape_name() {
        let slots = ["Song1.ogg"];
        assert!(validate_tape_name("Default", &slots, '\\').is_ok());
        assert!(validate_tape_name("80s Hits", &slots, '\\').is_ok());

        for bad in ["", ".", "..", ".hidden", "a/b", "a\\b", "Song1.ogg"] {
            assert!(
                matches!(validate_tape_name(bad, &slots, '\\'), Err(Error::InvalidTapeName(_))),
                "{:?} should be rejected",
                bad
            );
        }
        assert!(validate_tape_name("a|b", &slots, '|').is_err());
    }
}
