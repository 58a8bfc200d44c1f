//! Blink Replay - Main Entry Point

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use blink_detector::{BlinkEngine, EngineConfig};
use clap::Parser;
use replay::{init_logging, replay};
use tracing::info;

/// Replay recorded eye-ratio frames through the blink engine
#[derive(Parser, Debug)]
#[command(name = "blink-replay", version, about)]
struct Args {
    /// Newline-delimited JSON frames, `-` for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Engine configuration file (TOML, JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the session JSON here instead of stdout
    #[arg(short, long)]
    session_out: Option<PathBuf>,

    /// Session id, random if omitted
    #[arg(short, long)]
    user_id: Option<String>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON log lines
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.log_json)?;

    info!("=== Blink Replay v{} ===", env!("CARGO_PKG_VERSION"));

    let config = EngineConfig::load(args.config.as_deref()).context("invalid engine configuration")?;
    let mut engine = BlinkEngine::new(config)?;

    let outcome = if args.input == "-" {
        replay(io::stdin().lock(), &mut engine, args.user_id.as_deref())?
    } else {
        let file = File::open(&args.input).with_context(|| format!("cannot open {}", args.input))?;
        replay(BufReader::new(file), &mut engine, args.user_id.as_deref())?
    };

    let Some(session) = outcome.session else {
        info!("No frames read, nothing to write");
        return Ok(());
    };

    info!(
        blinks = session.events.len(),
        blinks_per_minute = session.blinks_per_minute(),
        "Session summary"
    );

    match args.session_out {
        Some(path) => {
            let file = File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
            session.write_to(file)?;
            info!("Session written to {}", path.display());
        }
        None => session.write_to(io::stdout().lock())?,
    }

    Ok(())
}
