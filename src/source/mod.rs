//! Sources of gatttool notification text.
//!
//! A source produces raw text lines, terminator included, over a channel. The
//! `gatttool` source spawns the tool and reads its stdout; the `stdin` source
//! reads the same text from standard input, e.g. a captured session piped
//! back in.

#[cfg(feature = "gatttool")]
pub mod gatttool;

pub mod stdin;

use crate::address::DeviceAddress;
use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Channel buffer size for notification lines.
pub const LINE_CHANNEL_BUFFER_SIZE: usize = 100;

/// Error type for source operations.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source needs a device address and none was given
    #[error("B41T bluetooth address required, try 'sudo hcitool lescan' to get the address")]
    MissingAddress,
    /// The external command could not be started
    #[error("Error executing '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Available line sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Source {
    /// Spawn `gatttool --listen` for the meter's address
    #[cfg(feature = "gatttool")]
    Gatttool,
    /// Read notification text from standard input
    Stdin,
}

impl Default for Source {
    fn default() -> Self {
        #[cfg(feature = "gatttool")]
        return Source::Gatttool;
        #[cfg(not(feature = "gatttool"))]
        return Source::Stdin;
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "gatttool")]
            Source::Gatttool => write!(f, "gatttool"),
            Source::Stdin => write!(f, "stdin"),
        }
    }
}

impl std::str::FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            #[cfg(feature = "gatttool")]
            "gatttool" | "gatt" => Ok(Source::Gatttool),
            "stdin" | "-" => Ok(Source::Stdin),
            _ => Err(format!("Unknown source: {}", s)),
        }
    }
}

/// A started source: what is running, and the lines it produces.
#[derive(Debug)]
pub struct LineStream {
    /// Human readable description, e.g. the command line that was spawned.
    pub description: String,
    pub lines: mpsc::Receiver<String>,
}

/// Start reading lines from the given source.
///
/// # Errors
/// Returns `SourceError::MissingAddress` when gatttool is selected without an
/// address, and `SourceError::Spawn` when the command cannot be started.
pub async fn start(
    source: Source,
    address: Option<DeviceAddress>,
) -> Result<LineStream, SourceError> {
    match source {
        #[cfg(feature = "gatttool")]
        Source::Gatttool => {
            let address = address.ok_or(SourceError::MissingAddress)?;
            gatttool::start(address)
        }
        Source::Stdin => {
            let _ = address;
            Ok(stdin::start())
        }
    }
}

/// Forward every line of `reader` to `tx`, keeping line terminators.
///
/// Stops at end of input or as soon as the receiver is gone, even while the
/// reader is still waiting for input. Returns the number of lines forwarded.
pub async fn forward_lines<R>(mut reader: R, tx: mpsc::Sender<String>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut count = 0;
    loop {
        let mut line = String::new();
        let read = tokio::select! {
            read = reader.read_line(&mut line) => read?,
            _ = tx.closed() => return Ok(count),
        };
        if read == 0 {
            return Ok(count);
        }
        if tx.send(line).await.is_err() {
            return Ok(count);
        }
        count += 1;
    }
}
