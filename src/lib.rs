//! `owon-listener` library.
//!
//! The binary (`src/main.rs`) is responsible for logging setup, signals and
//! process exit codes. Frame extraction ([`crate::frame`]) and decoding
//! ([`crate::decoder`]) are pure functions; the run loop in [`crate::app`]
//! wires them to an injected line source and output.

pub mod address;
pub mod app;
pub mod decoder;
pub mod frame;
pub mod measurement;
pub mod output;
pub mod source;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types at the crate root
pub use address::{AddressError, DeviceAddress};
pub use decoder::{Decoder, Flag, FlagBit, FlagTable, FlagTableError, decode_frame};
pub use frame::{FrameFormat, LineScan, RawFrame, extract_frame, frames, scan_line};
pub use measurement::{
    BaseUnit, Digit, Measurement, MeasurementError, Mode, Modes, Prefix, Sign, Unit,
};
pub use output::OutputFormatter;
pub use output::display::DisplayFormatter;
pub use source::{LineStream, Source, SourceError};
