//! Output of decoded measurements.
//!
//! [`OutputFormatter`] turns a decoded frame into the line shown to the user.
//! The other modules write that line to its destinations: the redrawn
//! terminal status line and the timestamped append log.

pub mod display;
pub mod log;
pub mod terminal;

use crate::frame::RawFrame;
use crate::measurement::Measurement;

/// Trait for formatting measurements into output strings.
pub trait OutputFormatter: Send + Sync {
    /// Format a measurement decoded from `frame`.
    fn format(&self, frame: &RawFrame, measurement: &Measurement) -> String;
}
