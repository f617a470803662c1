//! Core application runner for `owon-listener`.
//!
//! This module is decoupled from process setup (logging, signals, exit codes)
//! so the loop can be tested deterministically with an injected line source
//! and an in-memory output.

use crate::address::DeviceAddress;
use crate::decoder::Decoder;
use crate::frame::{LineScan, scan_line};
use crate::output::OutputFormatter;
use crate::output::display::DisplayFormatter;
use crate::output::log::{AppendLog, LogEntry};
use crate::output::terminal::StatusLine;
use crate::source::{LineStream, Source, SourceError};
use clap::Parser;
use std::future::Future;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use thiserror::Error;
use tracing::{debug, warn};

/// Default file for the current reading.
pub const DEFAULT_SNAPSHOT_FILE: &str = "owon.txt";

/// Configuration for the core run loop.
#[derive(Parser, Debug, Clone)]
#[command(author, about, version)]
pub struct Options {
    /// Bluetooth address of the B41T meter, e.g. 98:84:E3:CD:C0:E5
    #[arg(short = 'a', long)]
    pub address: Option<DeviceAddress>,

    /// Keep a text file with the current reading
    #[arg(short = 't', long = "text")]
    pub text: bool,

    /// File holding the current reading (used with -t)
    #[arg(short = 'o', long = "output", default_value = DEFAULT_SNAPSHOT_FILE)]
    pub output: PathBuf,

    /// Append every reading with a timestamp to this file
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Debug output: raw notification lines and frame bytes
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Quiet output, nothing is written to the terminal
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Where notification text is read from
    #[arg(long, default_value_t, value_enum)]
    pub source: Source,
}

/// Errors returned by the core run loop.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Line source abstraction to enable deterministic unit tests without a meter.
pub trait LineSource: Send + Sync {
    fn start(
        &self,
        source: Source,
        address: Option<DeviceAddress>,
    ) -> Pin<Box<dyn Future<Output = Result<LineStream, SourceError>> + Send + '_>>;
}

/// Real source implementation that delegates to the compiled-in sources.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSource;

impl LineSource for RealSource {
    fn start(
        &self,
        source: Source,
        address: Option<DeviceAddress>,
    ) -> Pin<Box<dyn Future<Output = Result<LineStream, SourceError>> + Send + '_>> {
        Box::pin(async move { crate::source::start(source, address).await })
    }
}

/// Single-reading text file, rewritten on every measurement.
#[derive(Debug)]
struct Snapshot {
    path: PathBuf,
}

impl Snapshot {
    fn create(path: &Path) -> io::Result<Self> {
        std::fs::write(path, "")?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    fn write(&self, text: &str) -> io::Result<()> {
        std::fs::write(&self.path, format!("{text}\n"))
    }
}

/// File destinations of formatted readings. A destination that fails is
/// dropped with a warning; the terminal output keeps going.
#[derive(Debug, Default)]
struct FileSinks {
    snapshot: Option<Snapshot>,
    log: Option<AppendLog>,
}

impl FileSinks {
    fn open(options: &Options) -> Self {
        let snapshot = if options.text {
            Snapshot::create(&options.output)
                .inspect_err(|e| {
                    warn!(path = %options.output.display(), error = %e,
                        "couldn't open file to write, not saving to file")
                })
                .ok()
        } else {
            None
        };

        let log = options.log.as_deref().and_then(|path| {
            AppendLog::open(path)
                .inspect_err(|e| {
                    warn!(path = %path.display(), error = %e,
                        "couldn't open file to write/append, no logging")
                })
                .ok()
        });

        Self { snapshot, log }
    }

    fn record(&mut self, text: &str) {
        if let Some(snapshot) = self.snapshot.take() {
            match snapshot.write(text) {
                Ok(()) => self.snapshot = Some(snapshot),
                Err(e) => warn!(error = %e, "writing current reading failed, not saving to file"),
            }
        }

        if let Some(mut log) = self.log.take() {
            match log.append(&LogEntry::now(text)) {
                Ok(()) => self.log = Some(log),
                Err(e) => warn!(error = %e, "appending to log failed, no logging"),
            }
        }
    }
}

/// Run the core processing loop, writing the terminal status to `out`.
///
/// Lines are handled in arrival order: lines without a frame are skipped,
/// incomplete frames show the waiting status, complete frames are decoded and
/// written to the terminal, the snapshot file and the log. Returns when the
/// source ends.
pub async fn run_with_io(
    options: Options,
    source: &dyn LineSource,
    out: &mut dyn Write,
) -> Result<(), RunError> {
    let decoder = Decoder::new();
    let formatter = DisplayFormatter::new(options.debug);
    let status = StatusLine::new(options.quiet);
    let mut sinks = FileSinks::open(&options);

    let mut stream = source.start(options.source, options.address).await?;
    status.message(out, &format!("Success ({})", stream.description))?;

    while let Some(line) = stream.lines.recv().await {
        debug!(line = line.trim_end(), "notification");

        let frame = match scan_line(&line) {
            LineScan::NotAFrame => continue,
            LineScan::Incomplete => {
                status.waiting(out)?;
                continue;
            }
            LineScan::Frame(frame) => frame,
        };
        debug!(%frame, "frame");

        let measurement = decoder.decode(&frame);
        status.measurement(out, &formatter.format(&frame, &measurement))?;
        sinks.record(&measurement.to_string());
    }

    Ok(())
}
