//! Configuration constants and types for the tape changer.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Number of song slots the walkman plays.
pub const SLOT_COUNT: usize = 10;

/// Tape folder that plain slot files are moved into on conversion.
pub const DEFAULT_TAPE_NAME: &str = "Default";

/// Separator between tape and slot in link text.
///
/// The game reads the links on Windows, so the text uses a backslash.
pub const LINK_SEPARATOR: char = '\\';

/// Walkman folder relative to a DCS install directory.
pub const WALKMAN_SUBDIR: &str = "Mods/aircraft/F14/Sounds/Walkman";

/// Default log file name.
pub const LOG_FILENAME: &str = "TapeChanger.log";

/// Lock file taken inside the library root while slots are changed.
pub const LOCK_FILENAME: &str = ".tapechanger.lock";

/// Folder inside the library root where plain slot files are kept when a
/// switch replaces them.
pub const BACKUP_DIRNAME: &str = ".tapechanger-backup";

/// Slot names used by the F-14 walkman: `Song1.ogg` through `Song10.ogg`.
pub fn default_slot_names() -> Vec<String> {
    (1..=SLOT_COUNT).map(|n| format!("Song{}.ogg", n)).collect()
}

/// Resolve the walkman library root inside a DCS install directory.
pub fn walkman_dir(dcs_dir: &Path) -> PathBuf {
    WALKMAN_SUBDIR
        .split('/')
        .fold(dcs_dir.to_path_buf(), |path, part| path.join(part))
}

/// Runtime configuration for a [`TapeChanger`](crate::TapeChanger).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangerConfig {
    /// Ordered slot file names.
    pub slot_names: Vec<String>,

    /// Tape created when converting an unmanaged root.
    pub default_tape: String,

    /// Separator written between tape and slot in link text.
    pub link_separator: char,

    /// Restore the previous slot states when a switch fails part way.
    /// When false, the switch keeps going and reports every failed slot.
    pub rollback_on_failure: bool,

    /// Take a lock file in the root during convert and switch.
    pub lock_root: bool,
}

impl Default for ChangerConfig {
    fn default() -> Self {
        Self {
            slot_names: default_slot_names(),
            default_tape: DEFAULT_TAPE_NAME.to_string(),
            link_separator: LINK_SEPARATOR,
            rollback_on_failure: true,
            lock_root: true,
        }
    }
}

impl ChangerConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.slot_names.is_empty() {
            return Err("At least one slot name is required".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.slot_names {
            if name.is_empty() || name.starts_with('.') {
                return Err(format!("Invalid slot name: {:?}", name));
            }
            if name.contains(['/', '\\', self.link_separator]) {
                return Err(format!("Slot name contains a separator: {}", name));
            }
            if !seen.insert(name.as_str()) {
                return Err(format!("Duplicate slot name: {}", name));
            }
        }

        if matches!(self.link_separator, '.' | '\0') || self.link_separator.is_alphanumeric() {
            return Err(format!(
                "Unusable link separator: {:?}",
                self.link_separator
            ));
        }

        crate::slots::validate_tape_name(
            &self.default_tape,
            &self.slot_names[..],
            self.link_separator,
        )
        .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_slots() {
        let names = default_slot_names();
        assert_eq!(names.len(), 10);
        assert_eq!(names[0], "Song1.ogg");
        assert_eq!(names[9], "Song10.ogg");
        assert!(ChangerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_walkman_dir() {
        let dir = walkman_dir(Path::new("/games/DCS"));
        assert!(dir.ends_with("Mods/aircraft/F14/Sounds/Walkman"));
        assert!(dir.starts_with("/games/DCS"));
    }

    #[test]
    fn test_rejects_duplicate_slots() {
        let config = ChangerConfig {
            slot_names: vec!["a.ogg".to_string(), "a.ogg".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_default_tape_named_like_slot() {
        let config = ChangerConfig {
            default_tape: "Song3.ogg".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "default_tape": "Stock", "rollback_on_failure": false }"#)
            .unwrap();

        let config = ChangerConfig::load(&path).unwrap();
        assert_eq!(config.default_tape, "Stock");
        assert!(!config.rollback_on_failure);
        assert_eq!(config.slot_names, default_slot_names());
        assert_eq!(config.link_separator, '\\');
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            ChangerConfig::load(&path),
            Err(Error::Serialization(_))
        ));
    }
}
