//! Terminal reporter.
//!
//! Status lines go to stdout; the download progress line is redrawn in
//! place on stderr, and only when stderr is a terminal.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use crossterm::style::Stylize;
use fluffbox_core::Reporter;
use fluffbox_schema::RuntimeKind;

use super::theme::{Icons, format_download_progress, percent};

/// Handle commands print through. Also the [`Reporter`] handed to the manager.
#[derive(Debug)]
pub struct Output {
    quiet: bool,
    icons: Icons,
    progress: Option<Mutex<ProgressLine>>,
}

#[derive(Debug, Default)]
struct ProgressLine {
    active: bool,
    last_pct: Option<u64>,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        let progress = (!quiet && std::io::stderr().is_terminal())
            .then(|| Mutex::new(ProgressLine::default()));
        Self {
            quiet,
            icons: Icons::default(),
            progress,
        }
    }

    /// Prints a success message.
    pub fn success(&self, msg: &str) {
        self.end_progress();
        println!("  {} {}", self.icons.success.green(), msg);
    }

    /// Prints an error message to stderr.
    pub fn error(&self, msg: &str) {
        self.end_progress();
        eprintln!("  {} {}", self.icons.error.red(), msg);
    }

    /// Prints a secondary detail line (suppressed by `--quiet`).
    pub fn detail(&self, msg: &str) {
        if !self.quiet {
            println!("    {}", msg.dark_grey());
        }
    }

    pub fn icons(&self) -> Icons {
        self.icons
    }

    fn end_progress(&self) {
        if let Some(progress) = &self.progress {
            if let Ok(mut line) = progress.lock() {
                if line.active {
                    eprintln!();
                    line.active = false;
                    line.last_pct = None;
                }
            }
        }
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        if self.quiet {
            return;
        }
        self.end_progress();
        println!();
        println!("{} {}", title.bold(), "─".repeat(40).dark_grey());
    }

    fn downloading(&self, kind: RuntimeKind, version: &str, current: u64, total: Option<u64>) {
        let Some(progress) = &self.progress else {
            return;
        };
        let Ok(mut line) = progress.lock() else {
            return;
        };

        // Redraw only when the visible percentage moves.
        let pct = total.map(|_| percent(current, total));
        if line.active && pct.is_some() && line.last_pct == pct {
            return;
        }
        line.active = true;
        line.last_pct = pct;

        let mut stderr = std::io::stderr();
        let _ = write!(
            stderr,
            "\r  {} {} {}  {}",
            "↓".cyan(),
            kind.display_name(),
            version,
            format_download_progress(current, total)
        );
        let _ = stderr.flush();
    }

    fn extracting(&self, kind: RuntimeKind, version: &str) {
        self.end_progress();
        if !self.quiet {
            println!("  {} Unpacking {} {}", self.icons.info, kind.display_name(), version);
        }
    }

    fn done(&self, kind: RuntimeKind, version: &str, detail: &str) {
        self.end_progress();
        if !self.quiet {
            println!(
                "  {} {} {} {}",
                self.icons.success.green(),
                kind.display_name(),
                version.cyan(),
                detail.dark_grey()
            );
        }
    }

    fn failed(&self, kind: RuntimeKind, version: &str, reason: &str) {
        self.end_progress();
        eprintln!(
            "  {} {} {} {}",
            self.icons.error.red(),
            kind.display_name(),
            version,
            reason.red()
        );
    }

    fn info(&self, msg: &str) {
        if self.quiet {
            return;
        }
        self.end_progress();
        println!("  {} {}", self.icons.info, msg);
    }

    fn warning(&self, msg: &str) {
        self.end_progress();
        eprintln!("  {} {}", self.icons.warning.yellow(), msg);
    }
}
