//! Tape Changer - swap the songs on the F-14 walkman.
//!
//! Every song slot in the walkman folder is a symlink into a tape folder;
//! loading a tape repoints all of them.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tape_changer::changer::{ActiveTape, SlotKind, SlotStatus};
use tape_changer::config::{walkman_dir, LOG_FILENAME};
use tape_changer::logging::{self, LogTarget};
use tape_changer::{ChangerConfig, TapeChanger};

#[derive(Parser)]
#[command(name = "tape-changer")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Swap walkman tapes by repointing song slot symlinks",
    long_about = "Manages the Song1.ogg..Song10.ogg slots of the F-14 walkman folder. Each slot links into a tape folder; loading a tape repoints every slot."
)]
struct Cli {
    /// Treat DIR as the DCS install folder and use its walkman folder
    #[arg(long, global = true)]
    dcs: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file (default: TapeChanger.log)
    #[arg(long, global = true, conflicts_with = "log_stderr")]
    log_file: Option<PathBuf>,

    /// Log to stderr instead of a file
    #[arg(long, global = true)]
    log_stderr: bool,

    /// More log output (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show slot states, the loaded tape and the available tapes
    Status {
        /// Walkman folder
        dir: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tapes, marking the loaded one with '*'
    List {
        /// Walkman folder
        dir: PathBuf,
    },

    /// Print the loaded tape; fails if the slots disagree
    Current {
        /// Walkman folder
        dir: PathBuf,
    },

    /// Move plain song files into a tape folder and link them
    Convert {
        /// Walkman folder
        dir: PathBuf,

        /// Tape to create (default from config: Default)
        #[arg(long)]
        tape: Option<String>,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Load a tape by pointing every slot at it
    Load {
        /// Walkman folder
        dir: PathBuf,

        /// Tape folder name
        tape: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(cli: &Cli) -> tape_changer::Result<()> {
    let (target, base) = if cli.log_stderr {
        (LogTarget::Stderr, LevelFilter::Warn)
    } else {
        let path = cli.log_file.as_deref().unwrap_or(Path::new(LOG_FILENAME));
        (LogTarget::File(path), LevelFilter::Debug)
    };
    let level = match cli.verbose {
        0 => base,
        1 => base.max(LevelFilter::Info),
        _ => LevelFilter::Trace,
    };
    logging::init(target, level)
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => ChangerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ChangerConfig::default(),
    };

    match cli.command {
        Commands::Status { dir, json } => cmd_status(&open(&dir, cli.dcs, config)?, json),
        Commands::List { dir } => cmd_list(&open(&dir, cli.dcs, config)?),
        Commands::Current { dir } => cmd_current(&open(&dir, cli.dcs, config)?),
        Commands::Convert { dir, tape, yes } => {
            cmd_convert(&open(&dir, cli.dcs, config)?, tape, yes)
        }
        Commands::Load { dir, tape } => cmd_load(&open(&dir, cli.dcs, config)?, &tape),
    }
}

fn open(dir: &Path, dcs: bool, config: ChangerConfig) -> anyhow::Result<TapeChanger> {
    let root = if dcs { walkman_dir(dir) } else { dir.to_path_buf() };
    log::info!("Using walkman folder {}", root.display());
    TapeChanger::open(&root, config)
        .with_context(|| format!("opening walkman folder {}", root.display()))
}

fn describe_slot(slot: &SlotStatus) -> String {
    let mut text = match slot.kind {
        SlotKind::Absent => "missing".to_string(),
        SlotKind::File => "plain file (not managed)".to_string(),
        SlotKind::Corrupted => "corrupted (not a file or UTF-8 link)".to_string(),
        SlotKind::Link => format!("-> {}", slot.tape.as_deref().unwrap_or_default()),
        SlotKind::MalformedLink => format!(
            "malformed link {:?}",
            slot.target.as_deref().unwrap_or_default()
        ),
    };
    if slot.dangling {
        text.push_str(" (target missing)");
    }
    text
}

fn cmd_status(changer: &TapeChanger, json: bool) -> anyhow::Result<()> {
    let report = changer.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let active = match (&report.active_tape, report.configured) {
        (Some(name), _) => name.clone(),
        (None, true) => "(undetermined)".to_string(),
        (None, false) => "(not configured)".to_string(),
    };

    println!("Tape Changer Status");
    println!("===================");
    println!("Walkman folder:   {}", report.root.display());
    println!("Configured:       {}", if report.configured { "yes" } else { "no" });
    println!("Loaded tape:      {}", active);
    println!();
    println!("Slots:");
    for slot in &report.slots {
        println!("  {:<12} {}", slot.slot, describe_slot(slot));
    }
    println!();
    println!("Tapes:");
    if report.tapes.is_empty() {
        println!("  (none)");
    }
    for tape in &report.tapes {
        println!("  {}", tape);
    }

    Ok(())
}

fn cmd_list(changer: &TapeChanger) -> anyhow::Result<()> {
    let listing = changer.listing()?;

    if listing.is_empty() {
        println!("(no tapes)");
    }
    for row in listing.rows() {
        println!("{}", row.label);
    }

    Ok(())
}

fn cmd_current(changer: &TapeChanger) -> anyhow::Result<()> {
    let tape = changer.active_tape()?.into_result()?;
    println!("{}", tape);
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    eprint!("{} [y/N] ", prompt);
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn cmd_convert(changer: &TapeChanger, tape: Option<String>, yes: bool) -> anyhow::Result<()> {
    if changer.is_configured()? {
        println!("Walkman folder is already set up for tapes");
        return Ok(());
    }

    let tape = tape.unwrap_or_else(|| changer.config().default_tape.clone());

    if !yes {
        let prompt = format!(
            "The walkman folder is not set up for tapes. Move its songs into tape '{}'?",
            tape
        );
        if !confirm(&prompt)? {
            println!("Aborted");
            return Ok(());
        }
    }

    let report = changer.convert_to(&tape)?;

    println!(
        "Converted {} slots into '{}' ({} left as they were)",
        report.converted.len(),
        report.tape,
        report.skipped.len()
    );
    for failure in &report.failures {
        eprintln!("  {}", failure);
    }
    if !report.is_complete() {
        bail!("{} slots could not be converted", report.failures.len());
    }

    match changer.active_tape() {
        Ok(ActiveTape::Loaded(name)) => println!("Loaded tape: {}", name),
        Ok(ActiveTape::Undetermined { candidates }) => {
            println!("Slots point at different tapes: {}", candidates.join(", "))
        }
        Err(e) => println!("{}", e),
    }

    Ok(())
}

fn cmd_load(changer: &TapeChanger, tape: &str) -> anyhow::Result<()> {
    let report = changer.switch_to(tape)?;

    for failure in report.failures.iter().chain(&report.rollback_failures) {
        eprintln!("  {}", failure);
    }
    for backup in &report.backups {
        println!("Kept plain file as {}", backup.display());
    }

    if !report.is_complete() {
        println!("Loaded tape: {}", report.active_tape());
        bail!("{}", report.summary());
    }

    println!("Loaded tape: {}", report.active_tape());
    Ok(())
}
