//! Interactive shell over a MiniDB storage directory.
//!
//! ```bash
//! # Start the REPL on ./data
//! minidb
//!
//! # Run one statement and exit
//! minidb --data-dir /tmp/db -c "SELECT * FROM users WHERE id > 2"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{Config, Editor};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use minidb::api::Database;
use minidb::config::DbConfig;

const PROMPT: &str = "minidb> ";

/// MiniDB command-line shell
#[derive(Parser, Debug)]
#[command(name = "minidb", version, about = "Interactive shell for MiniDB tables")]
struct Args {
    /// Directory holding table and index documents
    #[arg(short = 'd', long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Index order (maximum keys per node)
    #[arg(long)]
    order: Option<usize>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Execute a single statement and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let mut db = Database::open(config.clone()).context("failed to open database")?;

    match &args.command {
        Some(sql) => {
            let result = db.query(sql)?;
            println!("{result}");
            Ok(())
        }
        None => repl(&mut db, config.history_file.as_ref()),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("minidb=debug")
        } else {
            EnvFilter::new("minidb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<DbConfig> {
    let mut config = match &args.config {
        Some(path) => DbConfig::from_file(path)?,
        None => DbConfig::default(),
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(order) = args.order {
        config.index_order = order;
    }

    config.validate()?;
    Ok(config)
}

fn repl(db: &mut Database, history: Option<&PathBuf>) -> Result<()> {
    let rl_config = Config::builder()
        .history_ignore_space(true)
        .max_history_size(1000)?
        .build();
    let mut editor: Editor<(), DefaultHistory> = Editor::with_config(rl_config)?;

    if let Some(path) = history
        && path.exists()
        && let Err(e) = editor.load_history(path)
    {
        warn!("failed to load history from {}: {e}", path.display());
    }

    println!("Welcome to MiniDB v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' to quit.\n");

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                    break;
                }

                let _ = editor.add_history_entry(line);

                match db.query(line) {
                    Ok(result) => println!("{result}"),
                    Err(e) => println!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = history
        && let Err(e) = editor.save_history(path)
    {
        debug!("failed to save history: {e}");
    }

    println!("Goodbye!");
    Ok(())
}
