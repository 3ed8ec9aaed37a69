//! Log setup for the command line tool.
//!
//! Library code only uses the `log` macros; the binary decides where the
//! records go. By default they are appended to `TapeChanger.log`.

use crate::error::{Error, Result};
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Where log records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Append to a file.
    File(&'a Path),
    /// Write to stderr.
    Stderr,
}

/// Install the global logger. `RUST_LOG` overrides `level`.
pub fn init(target: LogTarget<'_>, level: LevelFilter) -> Result<()> {
    let mut builder = Builder::new();
    builder.filter_level(level).parse_default_env();

    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .format(|buf, record| {
                    writeln!(
                        buf,
                        "[{} {:<5} {}] {}",
                        buf.timestamp_millis(),
                        record.level(),
                        record.target(),
                        record.args()
                    )
                });
        }
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
    }

    builder
        .try_init()
        .map_err(|e| Error::Config(format!("Logger already initialised: {}", e)))?;

    log::info!("=== Tape Changer v{} started ===", env!("CARGO_PKG_VERSION"));
    Ok(())
}
