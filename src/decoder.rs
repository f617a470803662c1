//! Decoding of B41T frames into [`Measurement`]s.
//!
//! Frame layout:
//!
//! | Byte | Bits 0-6                     | Bit 7                          |
//! |------|------------------------------|--------------------------------|
//! | 0    | segments, most significant   | negative sign                  |
//! | 1-3  | segments                     | decimal point before the digit |
//! | 4-5  | unit, prefix and mode flags (see [`FlagTable::b41t`])         |
//!
//! Segment bits are `a=0x01 b=0x02 c=0x04 d=0x08 e=0x10 f=0x20 g=0x40`.
//! Decoding never fails: unknown segment patterns become [`Digit::Blank`] and
//! missing unit flags become [`Unit::Unknown`].

use crate::frame::RawFrame;
use crate::measurement::{BaseUnit, Digit, Measurement, Mode, Modes, Prefix, Sign, Unit};
use thiserror::Error;

/// Number of digit positions in a frame.
pub const DIGIT_COUNT: usize = 4;

/// Bit 7 of a digit byte: sign on the first position, decimal point elsewhere.
const HIGH_BIT: u8 = 0x80;
const SEGMENT_MASK: u8 = 0x7f;

/// Segment patterns that mean "open line" rather than a digit.
///
/// `0x2b` leads the frame the meter sends with open test leads
/// (`2b 3f 30 3a 3f 30`); the other two draw "L" and "o".
pub const OVERLOAD_MASKS: [u8; 3] = [
    0x2b, // open line
    0x38, // L
    0x5c, // o
];

/// Segment pattern for each digit 0-9.
pub const DIGIT_SEGMENTS: [u8; 10] = [0x3f, 0x06, 0x5b, 0x4f, 0x66, 0x6d, 0x7d, 0x07, 0x7f, 0x6f];

const DASH_SEGMENTS: u8 = 0x40;

const fn build_segment_table() -> [Digit; 128] {
    let mut table = [Digit::Blank; 128];
    let mut i = 0;
    while i < DIGIT_SEGMENTS.len() {
        table[DIGIT_SEGMENTS[i] as usize] = Digit::Value(i as u8);
        i += 1;
    }
    table[DASH_SEGMENTS as usize] = Digit::Dash;
    let mut j = 0;
    while j < OVERLOAD_MASKS.len() {
        table[OVERLOAD_MASKS[j] as usize] = Digit::Overload;
        j += 1;
    }
    table
}

/// Lookup from a 7-bit segment pattern to the symbol it draws.
static SEGMENT_TABLE: [Digit; 128] = build_segment_table();

/// Look up the symbol drawn by a digit byte; bit 7 is ignored.
pub fn segment_digit(byte: u8) -> Digit {
    SEGMENT_TABLE[usize::from(byte & SEGMENT_MASK)]
}

/// Meaning of a single flag bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Unit(BaseUnit),
    Prefix(Prefix),
    Mode(Mode),
}

/// Position of a flag bit within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagBit {
    pub byte: usize,
    pub bit: u8,
}

impl FlagBit {
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    fn is_set(self, frame: &RawFrame) -> bool {
        frame.0[self.byte] & (1 << self.bit) != 0
    }
}

/// Errors returned when building a [`FlagTable`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlagTableError {
    #[error("flag bit {bit} of byte {byte} is outside of the flag bytes")]
    OutOfRange { byte: usize, bit: u8 },
    #[error("flag bit {bit} of byte {byte} is mapped more than once")]
    Duplicate { byte: usize, bit: u8 },
}

/// Unit priority used when more than one unit flag is set.
pub const UNIT_PRIORITY: [BaseUnit; 6] = [
    BaseUnit::Volt,
    BaseUnit::Ampere,
    BaseUnit::Ohm,
    BaseUnit::Farad,
    BaseUnit::Hertz,
    BaseUnit::Celsius,
];

/// Prefix priority used when more than one prefix flag is set.
pub const PREFIX_PRIORITY: [Prefix; 5] = [
    Prefix::Nano,
    Prefix::Micro,
    Prefix::Milli,
    Prefix::Kilo,
    Prefix::Mega,
];

/// Mapping from flag bits to the annunciator they light.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagTable {
    entries: Vec<(FlagBit, Flag)>,
}

impl FlagTable {
    /// Build a table, checking every bit lies in the flag bytes and is mapped once.
    pub fn new(entries: Vec<(FlagBit, Flag)>) -> Result<Self, FlagTableError> {
        for (i, (position, _)) in entries.iter().enumerate() {
            if !(DIGIT_COUNT..crate::frame::FRAME_LEN).contains(&position.byte) || position.bit > 7
            {
                return Err(FlagTableError::OutOfRange {
                    byte: position.byte,
                    bit: position.bit,
                });
            }
            if entries[..i].iter().any(|(other, _)| other == position) {
                return Err(FlagTableError::Duplicate {
                    byte: position.byte,
                    bit: position.bit,
                });
            }
        }
        Ok(Self { entries })
    }

    /// Flag assignment of the OWON B41T.
    pub fn b41t() -> Self {
        use BaseUnit::*;
        let entries = vec![
            (FlagBit::new(4, 0), Flag::Unit(Volt)),
            (FlagBit::new(4, 1), Flag::Unit(Ampere)),
            (FlagBit::new(4, 2), Flag::Unit(Ohm)),
            (FlagBit::new(4, 3), Flag::Unit(Hertz)),
            (FlagBit::new(4, 4), Flag::Unit(Farad)),
            (FlagBit::new(4, 5), Flag::Unit(Celsius)),
            (FlagBit::new(4, 6), Flag::Mode(Mode::Diode)),
            (FlagBit::new(4, 7), Flag::Mode(Mode::Continuity)),
            (FlagBit::new(5, 0), Flag::Prefix(Prefix::Nano)),
            (FlagBit::new(5, 1), Flag::Prefix(Prefix::Micro)),
            (FlagBit::new(5, 2), Flag::Prefix(Prefix::Milli)),
            (FlagBit::new(5, 3), Flag::Prefix(Prefix::Kilo)),
            (FlagBit::new(5, 4), Flag::Prefix(Prefix::Mega)),
            (FlagBit::new(5, 5), Flag::Mode(Mode::Ac)),
            (FlagBit::new(5, 6), Flag::Mode(Mode::Auto)),
            (FlagBit::new(5, 7), Flag::Mode(Mode::Hold)),
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[(FlagBit, Flag)] {
        &self.entries
    }

    fn set_flags<'a>(&'a self, frame: &'a RawFrame) -> impl Iterator<Item = Flag> + 'a {
        self.entries
            .iter()
            .filter(move |(position, _)| position.is_set(frame))
            .map(|(_, flag)| *flag)
    }

    fn unit(&self, frame: &RawFrame) -> Unit {
        let mut units = Vec::new();
        let mut prefixes = Vec::new();
        for flag in self.set_flags(frame) {
            match flag {
                Flag::Unit(unit) => units.push(unit),
                Flag::Prefix(prefix) => prefixes.push(prefix),
                Flag::Mode(_) => {}
            }
        }

        let Some(base) = UNIT_PRIORITY.into_iter().find(|u| units.contains(u)) else {
            return Unit::Unknown;
        };
        let prefix = PREFIX_PRIORITY.into_iter().find(|p| prefixes.contains(p));
        Unit::Known { prefix, base }
    }

    fn modes(&self, frame: &RawFrame) -> Modes {
        self.set_flags(frame)
            .filter_map(|flag| match flag {
                Flag::Mode(mode) => Some(mode),
                _ => None,
            })
            .collect()
    }
}

impl Default for FlagTable {
    fn default() -> Self {
        Self::b41t()
    }
}

/// Frame decoder holding the flag table in use.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    flags: FlagTable,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with a replacement flag table.
    pub fn with_flags(flags: FlagTable) -> Self {
        Self { flags }
    }

    pub fn flags(&self) -> &FlagTable {
        &self.flags
    }

    /// Decode one frame. Every byte pattern yields a measurement.
    pub fn decode(&self, frame: &RawFrame) -> Measurement {
        let bytes = frame.bytes();
        let digit_bytes = &bytes[..DIGIT_COUNT];

        let digits: Vec<Digit> = digit_bytes.iter().map(|b| segment_digit(*b)).collect();
        let overload = digits.contains(&Digit::Overload);

        let sign = if digit_bytes[0] & HIGH_BIT != 0 {
            Sign::Negative
        } else {
            Sign::Positive
        };

        // First position's high bit is the sign, so points start at slot 1.
        let decimal_point = digit_bytes
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, b)| *b & HIGH_BIT != 0)
            .map(|(slot, _)| slot);

        let unit = self.flags.unit(frame);
        let modes = self.flags.modes(frame);

        Measurement::from_parts(sign, digits, decimal_point, overload, unit, modes)
    }
}

/// Decode a frame with the B41T flag table.
pub fn decode_frame(frame: &RawFrame) -> Measurement {
    Decoder::new().decode(frame)
}
