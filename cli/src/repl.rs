// ssheet-cli/src/repl.rs
// Line-oriented command interpreter shared by the interactive editor and
// the one-shot script runner.

use colorize::AnsiColor;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use ssheet_core::{Position, Sheet};

use crate::config::Config;

#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    #[error("unrecognised command: {0:?}")]
    UnknownCommand(String),
    #[error("expected a cell reference, got {0:?}")]
    BadPosition(String),
    #[error(transparent)]
    Engine(#[from] ssheet_core::EngineError),
}

/// Run one line of input against `sheet`. Blank lines and `#`-prefixed
/// comments are ignored.
pub fn run_line(sheet: &mut Sheet, line: &str) -> Result<(), ReplError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }
    let mut parts = line.splitn(2, char::is_whitespace);
    let command = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim();

    match command {
        "set" => {
            let mut args = rest.splitn(2, char::is_whitespace);
            let pos_text = args.next().unwrap_or("");
            let body = args.next().unwrap_or("");
            let pos = parse_pos(pos_text)?;
            sheet.set(pos, body)?;
            Ok(())
        }
        "get" => {
            let pos = parse_pos(rest)?;
            println!("{}", sheet.get(pos).value());
            Ok(())
        }
        "print" => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            if rest == "texts" {
                sheet.print_texts(&mut lock).expect("writing to stdout");
            } else {
                sheet.print_values(&mut lock).expect("writing to stdout");
            }
            Ok(())
        }
        other => Err(ReplError::UnknownCommand(other.to_string())),
    }
}

fn parse_pos(text: &str) -> Result<Position, ReplError> {
    Position::parse(text).ok_or_else(|| ReplError::BadPosition(text.to_string()))
}

pub fn interactive(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut sheet = Sheet::new();
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline(&cfg.prompt) {
            Ok(line) => {
                editor.add_history_entry(line.as_str()).ok();
                if line.trim() == "quit" || line.trim() == "exit" {
                    break;
                }
                if let Err(e) = run_line(&mut sheet, &line) {
                    let message = format!("error: {e}");
                    eprintln!("{}", if cfg.color { message.red() } else { message });
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
