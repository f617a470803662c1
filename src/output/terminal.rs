//! Terminal status line.
//!
//! The latest measurement is redrawn in place instead of scrolling. While
//! only incomplete notifications arrive a `Waiting...` status is shown.

use std::io::{self, Write};

const ERASE_LINE: &str = "\x1b[2K\r";
const CURSOR_UP: &str = "\x1b[A";

/// Writes measurements and the waiting status, or nothing when quiet.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusLine {
    quiet: bool,
}

impl StatusLine {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Replace the current line with the waiting status.
    pub fn waiting(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        write!(out, "{ERASE_LINE}Waiting...")?;
        out.flush()
    }

    /// Replace the previous measurement with `text`.
    pub fn measurement(&self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        write!(out, "{ERASE_LINE}{CURSOR_UP}{ERASE_LINE}")?;
        writeln!(out, "{text}")?;
        out.flush()
    }

    /// Plain informational line, e.g. the command that was started.
    pub fn message(&self, out: &mut dyn Write, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln!(out, "{text}")
    }
}
