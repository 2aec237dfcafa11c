//! `gsmat-replay`: replay a captured modem transcript through the parser.

use std::io::Read;
use std::path::Path;
use std::process;

use clap::Parser;
use gsmat_replay::report::{render_json, render_text};
use gsmat_replay::{replay, Args, RecordingQueue, ReplayError};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(err) = run(&args) {
        error!(%err, "replay failed");
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), ReplayError> {
    let memories = args.load_memory_map()?;
    let active = args.active_command(&memories)?;
    let transcript = read_transcript(&args.transcript)?;
    debug!(bytes = transcript.len(), ?active, "transcript loaded");

    let outcome = replay(&transcript, memories, active, RecordingQueue::default());
    if args.json {
        println!("{}", render_json(&outcome)?);
    } else {
        print!("{}", render_text(&outcome));
    }
    Ok(())
}

fn read_transcript(path: &Path) -> Result<Vec<u8>, ReplayError> {
    if path == Path::new("-") {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        Ok(std::fs::read(path)?)
    }
}
