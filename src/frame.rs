//! Frame extraction from gatttool notification text.
//!
//! gatttool prints every notification of the meter's characteristic as a line
//! such as `Notification handle = 0x002e value: 2b 3f 30 3a 3f 30 `. The
//! extractor finds the payload after the marker and turns it into a
//! [`RawFrame`]. Anything that does not look like a complete frame is skipped
//! without an error.

use std::fmt;

/// Number of bytes in one meter frame.
pub const FRAME_LEN: usize = 6;

/// One frame as sent by the meter: digit segment bytes followed by flag bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawFrame(pub [u8; FRAME_LEN]);

impl RawFrame {
    pub fn bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }
}

impl From<[u8; FRAME_LEN]> for RawFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Where the payload sits in a notification line and how long it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    /// Text immediately preceding the payload.
    pub marker: &'static str,
    /// Payload width in characters, counting the line terminator.
    pub width: usize,
}

impl FrameFormat {
    /// Notifications on handle 0x002e of the OWON B41T.
    pub const B41T: FrameFormat = FrameFormat {
        marker: "2e value: ",
        width: 19,
    };
}

impl Default for FrameFormat {
    fn default() -> Self {
        Self::B41T
    }
}

/// Outcome of looking at one line of notification text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineScan {
    /// The line carries no payload marker.
    NotAFrame,
    /// The marker is present but the payload is not a complete frame yet.
    Incomplete,
    /// A complete frame.
    Frame(RawFrame),
}

impl LineScan {
    pub fn frame(self) -> Option<RawFrame> {
        match self {
            LineScan::Frame(frame) => Some(frame),
            _ => None,
        }
    }
}

impl FrameFormat {
    /// Classify one line of notification text.
    ///
    /// The line may or may not keep its terminator; a missing terminator is
    /// counted as one character so both forms measure the same width.
    pub fn scan_line(&self, line: &str) -> LineScan {
        let Some(start) = line.find(self.marker) else {
            return LineScan::NotAFrame;
        };
        let payload = &line[start + self.marker.len()..];
        let body = payload.trim_end_matches(['\r', '\n']);
        // "\r\n" counts as two characters, just like a raw read would.
        let terminator = (payload.len() - body.len()).max(1);
        if body.len() + terminator != self.width {
            return LineScan::Incomplete;
        }

        match parse_hex_bytes(body) {
            Some(bytes) => LineScan::Frame(RawFrame(bytes)),
            None => LineScan::Incomplete,
        }
    }

    /// Extract a frame from a line, or nothing.
    pub fn extract_frame(&self, line: &str) -> Option<RawFrame> {
        self.scan_line(line).frame()
    }
}

/// Parse the first [`FRAME_LEN`] bytes from space separated hex text.
///
/// Tokens may hold several byte groups (`2b3f`). Parsing stops at the first
/// group that is not hex; a short result is discarded, extra bytes are ignored.
fn parse_hex_bytes(body: &str) -> Option<[u8; FRAME_LEN]> {
    let mut bytes = [0u8; FRAME_LEN];
    let mut count = 0;

    'tokens: for token in body.split_whitespace() {
        let mut rest = token;
        while !rest.is_empty() && count < FRAME_LEN {
            let Some(group) = rest.get(..2).filter(|g| g.bytes().all(|b| b.is_ascii_hexdigit()))
            else {
                break 'tokens;
            };
            match u8::from_str_radix(group, 16) {
                Ok(byte) => bytes[count] = byte,
                Err(_) => break 'tokens,
            }
            count += 1;
            rest = &rest[2..];
        }
        if count == FRAME_LEN {
            break;
        }
    }

    (count == FRAME_LEN).then_some(bytes)
}

/// Classify a line using the B41T frame format.
pub fn scan_line(line: &str) -> LineScan {
    FrameFormat::B41T.scan_line(line)
}

/// Extract a frame from a line using the B41T frame format.
pub fn extract_frame(line: &str) -> Option<RawFrame> {
    FrameFormat::B41T.extract_frame(line)
}

/// Lazily turn a sequence of lines into the frames they contain.
pub fn frames<I, S>(lines: I) -> impl Iterator<Item = RawFrame>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| extract_frame(line.as_ref()))
}
