//! Tape folder discovery.

use crate::error::{Error, Result};
use crate::slots::{validate_tape_name, SlotSet};
use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A tape: a directory directly under the library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapeFolder {
    /// Folder name, used as the tape identifier.
    pub name: String,
    /// Full path to the folder.
    pub path: PathBuf,
}

impl TapeFolder {
    /// Path of a slot file inside this tape.
    pub fn slot_path(&self, slot: &str) -> PathBuf {
        self.path.join(slot)
    }

    /// Slots with no file inside this tape, in slot order.
    pub fn missing_slots(&self, slots: &SlotSet) -> Vec<String> {
        slots
            .iter()
            .filter(|slot| !self.slot_path(slot).is_file())
            .map(|slot| slot.to_string())
            .collect()
    }
}

/// The tapes available under a library root, sorted by name.
#[derive(Debug, Clone)]
pub struct TapeLibrary {
    root: PathBuf,
    tapes: Vec<TapeFolder>,
}

impl TapeLibrary {
    /// Scan the library root for tape folders.
    ///
    /// Skips plain files, symlinks (even to directories), hidden entries and
    /// any folder whose name could not be loaded as a tape (a slot name, or a
    /// name containing `separator` or a path separator). An empty library is
    /// not an error.
    pub fn scan(root: &Path, slots: &SlotSet, separator: char) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::RootNotFound(root.to_path_buf()));
        }

        let mut tapes = Vec::new();

        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                    return Err(Error::RootNotReadable {
                        path: root.to_path_buf(),
                        source,
                    });
                }
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => {
                    warn!("Skipping non UTF-8 folder: {}", entry.path().display());
                    continue;
                }
            };

            if name.starts_with('.') {
                continue;
            }
            if let Err(e) = validate_tape_name(&name, slots.names(), separator) {
                warn!("Skipping folder {}: {}", entry.path().display(), e);
                continue;
            }

            debug!("Found tape {}", name);
            tapes.push(TapeFolder {
                name,
                path: entry.into_path(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            tapes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tapes(&self) -> &[TapeFolder] {
        &self.tapes
    }

    pub fn len(&self) -> usize {
        self.tapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tapes.is_empty()
    }

    /// Find a tape by name.
    pub fn find(&self, name: &str) -> Option<&TapeFolder> {
        self.tapes.iter().find(|t| t.name == name)
    }

    /// Find a tape by name or fail with [`Error::TapeNotFound`].
    pub fn folder_for(&self, name: &str) -> Result<&TapeFolder> {
        self.find(name)
            .ok_or_else(|| Error::TapeNotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["Zeppelin", "Abba", "Mixtape", ".tapechanger-backup", "Song1.ogg"] {
            std::fs::create_dir(root.join(name)).unwrap();
        }
        std::fs::write(root.join("Song2.ogg"), b"x").unwrap();
        std::fs::write(root.join("notes.txt"), b"x").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(root.join("Abba"), root.join("AbbaLink")).unwrap();

        let library = TapeLibrary::scan(root, &SlotSet::default(), '\\').unwrap();
        let names: Vec<&str> = library.tapes().iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["Abba", "Mixtape", "Zeppelin"]);
        assert_eq!(library.root(), root);
    }

    #[test]
    fn test_scan_skips_unloadable_names() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        for name in ["Rock", "Back\\Slash", "Pipe|Tape"] {
            std::fs::create_dir(root.join(name)).unwrap();
        }

        let default_sep = TapeLibrary::scan(root, &SlotSet::default(), '\\').unwrap();
        let names: Vec<&str> = default_sep.tapes().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Pipe|Tape", "Rock"]);

        let pipe_sep = TapeLibrary::scan(root, &SlotSet::default(), '|').unwrap();
        let names: Vec<&str> = pipe_sep.tapes().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Rock"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_unreadable_root() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let root = dir.path().join("walkman");
        std::fs::create_dir(&root).unwrap();
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o311)).unwrap();

        let listable = std::fs::read_dir(&root).is_ok();
        let result = TapeLibrary::scan(&root, &SlotSet::default(), '\\');
        std::fs::set_permissions(&root, std::fs::Permissions::from_mode(0o755)).unwrap();

        // Privileged users can list the folder regardless of its mode.
        if listable {
            assert!(result.is_ok());
        } else {
            assert!(matches!(result, Err(Error::RootNotReadable { .. })));
        }
    }

    #[test]
    fn test_scan_empty_library() {
        let dir = TempDir::new().unwrap();
        let library = TapeLibrary::scan(dir.path(), &SlotSet::default(), '\\').unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            TapeLibrary::scan(&missing, &SlotSet::default(), '\\'),
            Err(Error::RootNotFound(_))
        ));
    }

    #[test]
    fn test_folder_for_and_missing_slots() {
        let dir = TempDir::new().unwrap();
        let tape_dir = dir.path().join("Rock");
        std::fs::create_dir(&tape_dir).unwrap();
        let slots = SlotSet::new(vec!["a.ogg".into(), "b.ogg".into()]).unwrap();
        std::fs::write(tape_dir.join("a.ogg"), b"a").unwrap();

        let library = TapeLibrary::scan(dir.path(), &slots, '\\').unwrap();
        let tape = library.folder_for("Rock").unwrap();
        assert_eq!(tape.missing_slots(&slots), vec!["b.ogg".to_string()]);

        assert!(matches!(library.folder_for("Jazz"), Err(Error::TapeNotFound(_))));
    }
}
