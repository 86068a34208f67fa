// ssheet-cli/src/main.rs
// Command-line interface for ssheet: an interactive REPL over a single
// in-memory sheet, or a one-shot script of commands read from a file.

mod config;
mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ssheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a script of `set`/`get`/`print` commands, one per line, then exit.
    Run {
        /// Path to the script file.
        script: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cfg = config::Config::load()?;
    log::debug!("loaded config: {cfg:?}");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run { script }) => {
            let text = std::fs::read_to_string(&script)?;
            let mut sheet = ssheet_core::Sheet::new();
            for line in text.lines() {
                if let Err(e) = repl::run_line(&mut sheet, line) {
                    eprintln!("{e}");
                }
            }
        }
        None => repl::interactive(&cfg)?,
    }
    Ok(())
}
