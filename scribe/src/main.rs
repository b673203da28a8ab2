//! `scribe`: publish one curriculum post per invocation.
//!
//! Meant to be run by an external scheduler (cron, systemd timer). Each
//! `scribe run` selects the next topic, drafts and revises an article with
//! the configured agent, validates it, and commits it to the site repo.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use scribe::core::validator::validate;
use scribe::exit_codes;
use scribe::io::config::{CONFIG_FILE, load_config};
use scribe::io::definitions::load_constraints;
use scribe::io::init::{InitOptions, init_site};
use scribe::logging;
use scribe::pipeline::{load_site, run_site};
use scribe::publish::{GitPublisher, sync_pending};
use scribe::status::{StatusReport, status_from_root};

#[derive(Parser)]
#[command(
    name = "scribe",
    version,
    about = "Curriculum-driven autonomous publishing pipeline"
)]
struct Cli {
    /// Site root.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish the next topic (one post at most).
    Run {
        /// Exit non-zero unless a post was published.
        #[arg(long)]
        strict: bool,
        /// Publication date (YYYY-MM-DD); defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show the cursor and the next topic.
    Status,
    /// Validate an article file against the site constraints.
    Check {
        file: PathBuf,
    },
    /// Commit and push pending changes without moving the cursor.
    Sync,
    /// Scaffold site files that are missing.
    Init {
        /// Overwrite existing files (resets the cursor).
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.root);
    match dispatch(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(exit_codes::FAILED);
        }
    }
}

/// Install tracing, appending to the configured log file when the site
/// config names one.
fn init_logging(root: &Path) {
    let file = load_config(&root.join(CONFIG_FILE))
        .ok()
        .and_then(|config| config.logging.file)
        .map(|file| root.join(file));
    if let Err(err) = logging::init(file.as_deref()) {
        eprintln!("{err:#}");
    }
}

fn dispatch(cli: Cli) -> Result<i32> {
    let root = cli.root;
    match cli.command {
        Command::Run { strict, date } => Ok(cmd_run(&root, strict, date)),
        Command::Status => cmd_status(&root),
        Command::Check { file } => cmd_check(&root, &file),
        Command::Sync => cmd_sync(&root),
        Command::Init { force } => cmd_init(&root, force),
    }
}

fn cmd_run(root: &Path, strict: bool, date: Option<NaiveDate>) -> i32 {
    let today = date.unwrap_or_else(|| Local::now().date_naive());
    let outcome = run_site(root, today);
    println!("{}", outcome.label());
    outcome.exit_code(strict)
}

fn cmd_status(root: &Path) -> Result<i32> {
    let report = status_from_root(root)?;
    println!("{report}");
    Ok(match report {
        StatusReport::Complete { .. } => exit_codes::COMPLETE,
        StatusReport::Next(_) => exit_codes::OK,
    })
}

fn cmd_check(root: &Path, file: &Path) -> Result<i32> {
    let (_, paths) = load_site(root)?;
    let constraints = load_constraints(&paths.constraints_path)?;
    let article = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let verdict = validate(&article, &constraints);
    println!("{}", verdict.reason());
    Ok(if verdict.is_pass() {
        exit_codes::OK
    } else {
        exit_codes::REJECTED
    })
}

fn cmd_sync(root: &Path) -> Result<i32> {
    let (config, paths) = load_site(root)?;
    let publisher = GitPublisher::new(root, &config.publish);
    let receipt = sync_pending(&paths, &config.publish, &publisher)?;
    println!("committed: {}, pushed: {}", receipt.committed, receipt.pushed);
    Ok(exit_codes::OK)
}

fn cmd_init(root: &Path, force: bool) -> Result<i32> {
    let paths = init_site(root, &InitOptions { force })?;
    println!("initialized {}", paths.root.display());
    Ok(exit_codes::OK)
}
