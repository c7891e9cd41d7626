//! Command implementations

pub mod available;
pub mod check;
pub mod clear;
pub mod completions;
pub mod install;
pub mod list;
pub mod remove;
pub mod run;
pub mod r#use;

use std::io::Write;

use anyhow::Result;
use crossterm::style::Stylize;

/// Ask a y/N question on stdin. Anything but `y` declines.
pub(crate) fn confirm(question: &str) -> Result<bool> {
    println!();
    print!("  {} {question} (y/N) ", "WARNING:".bold().red());
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}
