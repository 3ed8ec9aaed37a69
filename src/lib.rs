//! Tape Changer
//!
//! Manages the walkman song slots of a game mod folder. Each slot file in the
//! library root is a symlink into one "tape" folder; loading another tape
//! repoints every slot at once.
//!
//! # Layout
//!
//! ```text
//! Walkman/
//! ├── Song1.ogg  -> Default\Song1.ogg
//! ├── ...
//! ├── Song10.ogg -> Default\Song10.ogg
//! ├── Default/   (tape)
//! └── Mixtape/   (tape)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use tape_changer::{ChangerConfig, TapeChanger};
//! use std::path::Path;
//!
//! let changer = TapeChanger::open(Path::new("./Walkman"), ChangerConfig::default()).unwrap();
//!
//! // Move the plain song files into the default tape first
//! if !changer.is_configured().unwrap() {
//!     changer.convert_to_default().unwrap();
//! }
//!
//! let report = changer.switch_to("Mixtape").unwrap();
//! assert!(report.is_complete());
//! ```

pub mod changer;
pub mod config;
pub mod error;
pub mod fs;
pub mod library;
pub mod logging;
pub mod slots;

pub use changer::{ActiveTape, TapeChanger};
pub use config::ChangerConfig;
pub use error::{Error, Result};
