//! Resilience tests - inject slot failures and verify reporting and rollback.

use std::fs;
use std::io;
use std::path::Path;
use tape_changer::changer::ActiveTape;
use tape_changer::config::{default_slot_names, ChangerConfig, BACKUP_DIRNAME};
use tape_changer::error::SlotOperation;
use tape_changer::fs::{LinkBackend, OsLinkBackend};
use tape_changer::{Error, TapeChanger};
use tempfile::TempDir;

/// Which backend call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailOn {
    Link,
    Remove,
}

/// Backend that fails one kind of call on one slot and passes everything
/// else through to the real filesystem.
struct FailingBackend {
    inner: OsLinkBackend,
    slot: &'static str,
    fail_on: FailOn,
    /// Only fail links whose text starts with this tape name.
    tape: Option<&'static str>,
}

impl FailingBackend {
    fn new(slot: &'static str, fail_on: FailOn) -> Self {
        Self {
            inner: OsLinkBackend::new(),
            slot,
            fail_on,
            tape: None,
        }
    }

    fn for_tape(mut self, tape: &'static str) -> Self {
        self.tape = Some(tape);
        self
    }

    fn hits(&self, path: &Path) -> bool {
        path.file_name().and_then(|n| n.to_str()) == Some(self.slot)
    }

    fn injected() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "injected failure")
    }
}

impl LinkBackend for FailingBackend {
    fn create_link(&self, target: &str, link: &Path) -> io::Result<()> {
        let tape_matches = self.tape.map_or(true, |t| target.starts_with(t));
        if self.fail_on == FailOn::Link && tape_matches && self.hits(link) {
            return Err(Self::injected());
        }
        self.inner.create_link(target, link)
    }

    fn remove_entry(&self, path: &Path) -> io::Result<()> {
        if self.fail_on == FailOn::Remove && self.hits(path) {
            return Err(Self::injected());
        }
        self.inner.remove_entry(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.inner.rename(from, to)
    }

    fn create_dir(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir(path)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn create_tape(root: &Path, name: &str) {
    let dir = root.join(name);
    fs::create_dir(&dir).expect("Failed to create tape");
    for slot in default_slot_names() {
        fs::write(dir.join(&slot), name).expect("Failed to write song");
    }
}

fn links(root: &Path) -> Vec<String> {
    default_slot_names()
        .iter()
        .map(|slot| {
            fs::read_link(root.join(slot))
                .map(|t| t.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}

/// Two tapes with every slot pointing at "A".
fn setup_loaded() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_tape(temp_dir.path(), "A");
    create_tape(temp_dir.path(), "B");
    TapeChanger::open(temp_dir.path(), ChangerConfig::default())
        .unwrap()
        .switch_to("A")
        .expect("Failed to load A");
    temp_dir
}

fn failing(root: &Path, backend: FailingBackend, config: ChangerConfig) -> TapeChanger {
    TapeChanger::with_backend(root, config, Box::new(backend)).expect("Failed to open root")
}

#[test]
fn test_link_failure_rolls_back() {
    let temp_dir = setup_loaded();
    let root = temp_dir.path();
    let before = links(root);
    let backend = FailingBackend::new("Song5.ogg", FailOn::Link).for_tape("B");
    let changer = failing(root, backend, ChangerConfig::default());

    let report = changer.switch_to("B").unwrap();

    assert!(!report.is_complete());
    assert!(report.rolled_back);
    assert!(report.rollback_failures.is_empty());
    assert_eq!(report.switched.len(), 4);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        Error::SlotOperationFailed { slot, operation: SlotOperation::Link, .. } if slot == "Song5.ogg"
    ));
    assert_eq!(report.summary(), "4 of 10 slots switched to B (rolled back)");
    assert!(!report.active_tape().is_loaded());

    assert_eq!(links(root), before);
    assert_eq!(
        changer.active_tape().unwrap(),
        ActiveTape::Loaded("A".to_string())
    );
}

#[test]
fn test_remove_failure_rolls_back() {
    let temp_dir = setup_loaded();
    let root = temp_dir.path();
    let before = links(root);
    let changer = failing(
        root,
        FailingBackend::new("Song3.ogg", FailOn::Remove),
        ChangerConfig::default(),
    );

    let report = changer.switch_to("B").unwrap();

    assert!(report.rolled_back);
    assert_eq!(report.switched, vec!["Song1.ogg".to_string(), "Song2.ogg".to_string()]);
    assert!(matches!(
        &report.failures[0],
        Error::SlotOperationFailed { operation: SlotOperation::Remove, .. }
    ));
    assert_eq!(links(root), before);
}

#[test]
fn test_best_effort_reports_every_failure() {
    let temp_dir = setup_loaded();
    let root = temp_dir.path();
    let config = ChangerConfig {
        rollback_on_failure: false,
        ..Default::default()
    };
    let changer = failing(root, FailingBackend::new("Song5.ogg", FailOn::Link), config);

    let report = changer.switch_to("B").unwrap();

    assert!(!report.rolled_back);
    assert_eq!(report.switched.len(), 9);
    assert_eq!(report.summary(), "9 of 10 slots switched to B");
    assert_eq!(report.failures[0].slot_name(), Some("Song5.ogg"));

    // The failed slot was removed but not relinked.
    assert!(fs::symlink_metadata(root.join("Song5.ogg")).is_err());
    assert!(!changer.is_configured().unwrap());
    assert!(matches!(changer.active_tape(), Err(Error::NotConfigured(_))));
    assert_eq!(changer.listing().unwrap().active_index(), None);

    // A later successful switch repairs the mixed state.
    let changer = TapeChanger::open(root, ChangerConfig::default()).unwrap();
    assert!(changer.switch_to("B").unwrap().is_complete());
    assert_eq!(changer.active_tape().unwrap().name(), Some("B"));
}

#[test]
fn test_rollback_restores_plain_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_tape(root, "B");
    for slot in default_slot_names() {
        fs::write(root.join(&slot), format!("plain {}", slot)).unwrap();
    }
    let changer = failing(
        root,
        FailingBackend::new("Song7.ogg", FailOn::Link),
        ChangerConfig::default(),
    );

    let report = changer.switch_to("B").unwrap();

    assert!(report.rolled_back);
    assert!(report.backups.is_empty());
    for slot in default_slot_names() {
        let meta = fs::symlink_metadata(root.join(&slot)).unwrap();
        assert!(meta.is_file(), "{} should be a plain file again", slot);
        assert_eq!(
            fs::read_to_string(root.join(&slot)).unwrap(),
            format!("plain {}", slot)
        );
    }
    assert!(!root.join(BACKUP_DIRNAME).exists());
}

#[test]
fn test_rollback_keeps_older_backups() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    create_tape(root, "B");
    fs::create_dir(root.join(BACKUP_DIRNAME)).unwrap();
    fs::write(root.join(BACKUP_DIRNAME).join("Song1.ogg"), b"older").unwrap();
    fs::write(root.join("Song1.ogg"), b"plain").unwrap();
    let changer = failing(
        root,
        FailingBackend::new("Song3.ogg", FailOn::Link),
        ChangerConfig::default(),
    );

    let report = changer.switch_to("B").unwrap();

    assert!(report.rolled_back);
    assert_eq!(fs::read(root.join("Song1.ogg")).unwrap(), b"plain");
    let older = root.join(BACKUP_DIRNAME).join("Song1.ogg");
    assert_eq!(fs::read(&older).unwrap(), b"older");
    assert_eq!(fs::read_dir(root.join(BACKUP_DIRNAME)).unwrap().count(), 1);
}

#[test]
fn test_conversion_link_failure_keeps_file_in_place() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for slot in default_slot_names() {
        fs::write(root.join(&slot), slot.as_bytes()).unwrap();
    }
    let changer = failing(
        root,
        FailingBackend::new("Song4.ogg", FailOn::Link),
        ChangerConfig::default(),
    );

    let report = changer.convert_to_default().unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.converted.len(), 9);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].slot_name(), Some("Song4.ogg"));

    let meta = fs::symlink_metadata(root.join("Song4.ogg")).unwrap();
    assert!(meta.is_file());
    assert_eq!(fs::read(root.join("Song4.ogg")).unwrap(), b"Song4.ogg");
    assert!(!root.join("Default").join("Song4.ogg").exists());
    assert!(!changer.is_configured().unwrap());

    // Retrying with a working backend finishes the job.
    let changer = TapeChanger::open(root, ChangerConfig::default()).unwrap();
    let report = changer.convert_to_default().unwrap();
    assert_eq!(report.converted, vec!["Song4.ogg".to_string()]);
    assert_eq!(report.skipped.len(), 9);
    assert_eq!(changer.active_tape().unwrap().name(), Some("Default"));
}
