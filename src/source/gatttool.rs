//! gatttool child process source.
//!
//! Runs `gatttool -b <address> --char-read --handle 0x2d --listen`, which
//! enables notifications on the meter and prints each one on stdout.

use super::{LINE_CHANNEL_BUFFER_SIZE, LineStream, SourceError, forward_lines};
use crate::address::DeviceAddress;
use std::io;
use std::process::{ExitStatus, Stdio};
use tokio::io::BufReader;
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

const GATTTOOL: &str = "gatttool";

/// Characteristic handle that switches on measurement notifications.
pub const NOTIFY_HANDLE: &str = "0x2d";

/// Arguments passed to gatttool for `address`.
pub fn arguments(address: DeviceAddress) -> Vec<String> {
    vec![
        "-b".to_string(),
        address.to_string(),
        "--char-read".to_string(),
        "--handle".to_string(),
        NOTIFY_HANDLE.to_string(),
        "--listen".to_string(),
    ]
}

/// Full command line, as shown to the user.
pub fn command_line(address: DeviceAddress) -> String {
    std::iter::once(GATTTOOL.to_string())
        .chain(arguments(address))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Spawn gatttool and stream its stdout lines.
///
/// gatttool is killed as soon as the returned stream is dropped, or with the
/// runtime. A failing exit status is reported once its output ends.
pub fn start(address: DeviceAddress) -> Result<LineStream, SourceError> {
    let description = command_line(address);

    let mut child = Command::new(GATTTOOL)
        .args(arguments(address))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| SourceError::Spawn {
            command: description.clone(),
            source,
        })?;

    let stdout = child.stdout.take().ok_or_else(|| SourceError::Spawn {
        command: description.clone(),
        source: io::Error::other("stdout not captured"),
    })?;

    let (tx, rx) = mpsc::channel(LINE_CHANNEL_BUFFER_SIZE);

    // The task owns the child so it lives as long as lines are being read
    tokio::spawn(async move {
        let result = supervise(child, stdout, tx).await;
        report_exit(&result);
    });

    Ok(LineStream {
        description,
        lines: rx,
    })
}

/// Forward `stdout` of `child` to `tx` until either side goes away.
///
/// Returns the exit status, or `None` when the child was killed because the
/// receiver was dropped.
async fn supervise(
    mut child: Child,
    stdout: ChildStdout,
    tx: mpsc::Sender<String>,
) -> io::Result<Option<ExitStatus>> {
    let receiver = tx.clone();
    match forward_lines(BufReader::new(stdout), tx).await {
        Ok(count) => debug!(lines = count, "gatttool output ended"),
        Err(e) => warn!(error = %e, "reading gatttool output failed"),
    }

    let abandoned = receiver.is_closed();
    drop(receiver);
    if abandoned {
        debug!("nothing reads gatttool output, stopping it");
        child.kill().await?;
        return Ok(None);
    }
    child.wait().await.map(Some)
}

/// Log a gatttool exit that is not a clean one. Shown even in quiet mode.
fn report_exit(result: &io::Result<Option<ExitStatus>>) {
    match result {
        Ok(None) => {}
        Ok(Some(status)) if status.success() => {}
        Ok(Some(status)) => error!(%status, "Command not found, or exited with error"),
        Err(e) => error!(error = %e, "Command not found, or exited with error"),
    }
}
