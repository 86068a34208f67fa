//! examples/minimal.rs
//! A minimal example exercising the core sheet API directly.

use ssheet_core::{Position, Sheet};

fn main() {
    println!("Creating a minimal sheet...");

    let mut sheet = Sheet::new();
    sheet.set(Position::new(0, 0), "Hello").unwrap();
    sheet.set(Position::new(0, 1), "World").unwrap();
    sheet.set(Position::new(1, 0), "42").unwrap();
    sheet.set(Position::new(2, 0), "=A2+10").unwrap();

    let stdout = std::io::stdout();
    sheet.print_values(&mut stdout.lock()).unwrap();
}
