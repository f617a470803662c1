//! Timestamped append log.
//!
//! Each decoded measurement becomes one line of the form
//! `[17/10/2026:14:03:59 +1100] 1.234 V`.

use chrono::{DateTime, FixedOffset, Local};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// One log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: DateTime<FixedOffset>,
    pub text: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().fixed_offset(),
            text: text.into(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}",
            self.timestamp.format("%d/%m/%Y:%H:%M:%S %z"),
            self.text
        )
    }
}

/// Log file opened in append mode.
#[derive(Debug)]
pub struct AppendLog<W: Write = File> {
    writer: W,
}

impl AppendLog<File> {
    /// Open (or create) `path` for appending.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> AppendLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Append one entry and flush it.
    pub fn append(&mut self, entry: &LogEntry) -> io::Result<()> {
        writeln!(self.writer, "{entry}")?;
        self.writer.flush()
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(text: &str) -> LogEntry {
        let offset = FixedOffset::east_opt(11 * 3600).unwrap();
        LogEntry {
            timestamp: offset.with_ymd_and_hms(2026, 10, 7, 9, 5, 3).unwrap(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_log_entry_format() {
        assert_eq!(
            entry("-12.345 V").to_string(),
            "[07/10/2026:09:05:03 +1100] -12.345 V"
        );
    }

    #[test]
    fn test_log_entry_negative_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let e = LogEntry {
            timestamp: offset.with_ymd_and_hms(2026, 1, 31, 23, 59, 59).unwrap(),
            text: "OL MΩ".to_string(),
        };
        assert_eq!(e.to_string(), "[31/01/2026:23:59:59 -0500] OL MΩ");
    }

    #[test]
    fn test_append_log_writes_lines() {
        let mut log = AppendLog::new(Vec::<u8>::new());
        log.append(&entry("1.000 V")).unwrap();
        log.append(&entry("2.000 V")).unwrap();
        let out = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 2);
        assert!(out.ends_with("2.000 V\n"));
    }

    #[test]
    fn test_append_log_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("owon.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let mut log = AppendLog::open(&path).unwrap();
        log.append(&entry("0.5 A")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("earlier\n"));
        assert!(content.ends_with("] 0.5 A\n"));
    }
}
