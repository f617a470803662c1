//! Human-readable measurement formatter.

use crate::frame::RawFrame;
use crate::measurement::Measurement;
use crate::output::OutputFormatter;

/// Formats measurements with their canonical display string.
///
/// With `raw` enabled the frame bytes are prepended, which is handy when
/// checking the flag table against a real meter.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayFormatter {
    raw: bool,
}

impl DisplayFormatter {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }
}

impl OutputFormatter for DisplayFormatter {
    fn format(&self, frame: &RawFrame, measurement: &Measurement) -> String {
        if self.raw {
            format!("[ {frame} ] {measurement}")
        } else {
            measurement.to_string()
        }
    }
}
