//! Standard input source, for piping gatttool output or replaying captures.

use super::{LINE_CHANNEL_BUFFER_SIZE, LineStream, forward_lines};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Stream lines from standard input until end of file.
pub fn start() -> LineStream {
    let (tx, rx) = mpsc::channel(LINE_CHANNEL_BUFFER_SIZE);

    tokio::spawn(async move {
        match forward_lines(BufReader::new(tokio::io::stdin()), tx).await {
            Ok(count) => debug!(lines = count, "standard input ended"),
            Err(e) => warn!(error = %e, "reading standard input failed"),
        }
    });

    LineStream {
        description: "stdin".to_string(),
        lines: rx,
    }
}
