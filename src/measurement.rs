//! Multimeter measurement data structure.
//!
//! A [`Measurement`] is purely positional: the digits as they appear on the
//! meter's display, the position of the decimal point, the sign and the
//! annunciators. The numeric value and the display string are both derived
//! from it on demand.

use std::fmt;
use thiserror::Error;

/// Text rendered in place of the digits when the meter is in overload.
pub const OVERLOAD_SENTINEL: &str = "OL";

/// The decoded contents of one display position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Digit {
    /// A numeric digit, always in `0..=9`.
    Value(u8),
    /// Nothing lit, or a segment pattern that is not a known symbol.
    Blank,
    /// Only the middle segment lit.
    Dash,
    /// A reserved open-line pattern.
    Overload,
}

impl Digit {
    /// Numeric value of the digit, if it has one.
    pub fn value(self) -> Option<u8> {
        match self {
            Digit::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Digit::Value(v) => write!(f, "{v}"),
            Digit::Blank => Ok(()),
            Digit::Dash => f.write_str("-"),
            Digit::Overload => f.write_str("L"),
        }
    }
}

/// Sign of the reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sign {
    #[default]
    Positive,
    Negative,
}

/// SI prefix shown in front of the base unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Nano,
    Micro,
    Milli,
    Kilo,
    Mega,
}

impl Prefix {
    pub fn symbol(self) -> &'static str {
        match self {
            Prefix::Nano => "n",
            Prefix::Micro => "µ",
            Prefix::Milli => "m",
            Prefix::Kilo => "k",
            Prefix::Mega => "M",
        }
    }

    /// Power of ten the prefix stands for.
    pub fn exponent(self) -> i32 {
        match self {
            Prefix::Nano => -9,
            Prefix::Micro => -6,
            Prefix::Milli => -3,
            Prefix::Kilo => 3,
            Prefix::Mega => 6,
        }
    }
}

/// Physical quantity the meter is measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseUnit {
    Volt,
    Ampere,
    Ohm,
    Farad,
    Hertz,
    Celsius,
}

impl BaseUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            BaseUnit::Volt => "V",
            BaseUnit::Ampere => "A",
            BaseUnit::Ohm => "Ω",
            BaseUnit::Farad => "F",
            BaseUnit::Hertz => "Hz",
            BaseUnit::Celsius => "°C",
        }
    }
}

/// Unit label of a measurement: a base unit with an optional prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Unit {
    /// No unit annunciator was lit.
    #[default]
    Unknown,
    Known {
        prefix: Option<Prefix>,
        base: BaseUnit,
    },
}

impl Unit {
    /// A unit without prefix.
    pub fn base(base: BaseUnit) -> Self {
        Unit::Known { prefix: None, base }
    }

    /// A unit with an SI prefix.
    pub fn prefixed(prefix: Prefix, base: BaseUnit) -> Self {
        Unit::Known {
            prefix: Some(prefix),
            base,
        }
    }

    pub fn is_known(self) -> bool {
        matches!(self, Unit::Known { .. })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Unknown => Ok(()),
            Unit::Known { prefix, base } => {
                if let Some(prefix) = prefix {
                    f.write_str(prefix.symbol())?;
                }
                f.write_str(base.symbol())
            }
        }
    }
}

/// Measurement attribute independent of value and unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Ac,
    Auto,
    Hold,
    Diode,
    Continuity,
}

impl Mode {
    /// All modes in display order.
    pub const ALL: [Mode; 5] = [
        Mode::Ac,
        Mode::Auto,
        Mode::Hold,
        Mode::Diode,
        Mode::Continuity,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Ac => "AC",
            Mode::Auto => "AUTO",
            Mode::Hold => "HOLD",
            Mode::Diode => "DIODE",
            Mode::Continuity => "CONT",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Mode::Ac => 1 << 0,
            Mode::Auto => 1 << 1,
            Mode::Hold => 1 << 2,
            Mode::Diode => 1 << 3,
            Mode::Continuity => 1 << 4,
        }
    }
}

/// Set of active modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modes(u8);

impl Modes {
    pub const fn empty() -> Self {
        Modes(0)
    }

    pub fn insert(&mut self, mode: Mode) {
        self.0 |= mode.bit();
    }

    pub fn with(mut self, mode: Mode) -> Self {
        self.insert(mode);
        self
    }

    pub fn contains(self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active modes in display order.
    pub fn iter(self) -> impl Iterator<Item = Mode> {
        Mode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl FromIterator<Mode> for Modes {
    fn from_iter<I: IntoIterator<Item = Mode>>(iter: I) -> Self {
        iter.into_iter().fold(Modes::empty(), Modes::with)
    }
}

/// Errors returned when building a measurement by hand.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeasurementError {
    #[error("decimal point at {index} is outside of {len} digits")]
    DecimalPointOutOfRange { index: usize, len: usize },
}

/// One reading of the multimeter display.
///
/// `decimal_point` is the index of the digit the point is drawn in front of,
/// so it always lies within `0..=digits.len()`. When `overload` is set the
/// digits and the decimal point carry no numeric meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Measurement {
    sign: Sign,
    digits: Vec<Digit>,
    decimal_point: Option<usize>,
    overload: bool,
    unit: Unit,
    modes: Modes,
}

impl Measurement {
    /// Build a measurement from its display positions.
    ///
    /// # Errors
    /// Returns `MeasurementError::DecimalPointOutOfRange` if the decimal point
    /// index is past the end of `digits`.
    pub fn new(
        sign: Sign,
        digits: Vec<Digit>,
        decimal_point: Option<usize>,
        unit: Unit,
    ) -> Result<Self, MeasurementError> {
        if let Some(index) = decimal_point
            && index > digits.len()
        {
            return Err(MeasurementError::DecimalPointOutOfRange {
                index,
                len: digits.len(),
            });
        }
        Ok(Self {
            sign,
            digits,
            decimal_point,
            overload: false,
            unit,
            modes: Modes::empty(),
        })
    }

    /// Assemble a measurement whose decimal point is already known to be in range.
    pub(crate) fn from_parts(
        sign: Sign,
        digits: Vec<Digit>,
        decimal_point: Option<usize>,
        overload: bool,
        unit: Unit,
        modes: Modes,
    ) -> Self {
        debug_assert!(decimal_point.is_none_or(|p| p <= digits.len()));
        Self {
            sign,
            digits,
            decimal_point,
            overload,
            unit,
            modes,
        }
    }

    /// Mark the measurement as overloaded.
    pub fn with_overload(mut self, overload: bool) -> Self {
        self.overload = overload;
        self
    }

    pub fn with_modes(mut self, modes: Modes) -> Self {
        self.modes = modes;
        self
    }

    pub fn sign(&self) -> Sign {
        self.sign
    }

    pub fn digits(&self) -> &[Digit] {
        &self.digits
    }

    pub fn decimal_point(&self) -> Option<usize> {
        self.decimal_point
    }

    pub fn is_overload(&self) -> bool {
        self.overload
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn modes(&self) -> Modes {
        self.modes
    }

    /// Numeric reading in the displayed unit (prefix not applied).
    ///
    /// Blank positions are skipped. Returns `None` when the meter is in
    /// overload, when a position holds a dash, when nothing is displayed, or
    /// when the digits do not fit a `u64` mantissa.
    pub fn value(&self) -> Option<f64> {
        if self.overload {
            return None;
        }

        let mut mantissa: u64 = 0;
        let mut fraction_digits: i32 = 0;
        let mut seen = false;
        for (i, digit) in self.digits.iter().enumerate() {
            match digit {
                Digit::Value(v) => {
                    mantissa = mantissa.checked_mul(10)?.checked_add(u64::from(*v))?;
                    seen = true;
                    if self.decimal_point.is_some_and(|p| i >= p) {
                        fraction_digits += 1;
                    }
                }
                Digit::Blank => {}
                Digit::Dash | Digit::Overload => return None,
            }
        }
        if !seen {
            return None;
        }

        let magnitude = mantissa as f64 / 10f64.powi(fraction_digits);
        Some(match self.sign {
            Sign::Positive => magnitude,
            Sign::Negative => -magnitude,
        })
    }

    /// Numeric reading scaled to the base unit, e.g. `mV` readings in volts.
    pub fn base_value(&self) -> Option<f64> {
        let value = self.value()?;
        match self.unit {
            Unit::Known {
                prefix: Some(prefix),
                ..
            } => Some(value * 10f64.powi(prefix.exponent())),
            _ => Some(value),
        }
    }

    fn fmt_number(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.overload {
            return f.write_str(OVERLOAD_SENTINEL);
        }
        if self.sign == Sign::Negative {
            f.write_str("-")?;
        }
        for (i, digit) in self.digits.iter().enumerate() {
            if self.decimal_point == Some(i) {
                f.write_str(".")?;
            }
            write!(f, "{digit}")?;
        }
        if self.decimal_point == Some(self.digits.len()) {
            f.write_str(".")?;
        }
        Ok(())
    }
}

/// Canonical display string: `[-]digits[.digits][ unit][ (MODES)]`.
impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_number(f)?;
        if self.unit.is_known() {
            write!(f, " {}", self.unit)?;
        }
        if !self.modes.is_empty() {
            f.write_str(" (")?;
            for (i, mode) in self.modes.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                f.write_str(mode.label())?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digits(values: &[u8]) -> Vec<Digit> {
        values.iter().map(|v| Digit::Value(*v)).collect()
    }

    #[test]
    fn test_format_negative_with_decimal_point() {
        let m = Measurement::new(
            Sign::Negative,
            digits(&[1, 2, 3, 4, 5]),
            Some(2),
            Unit::base(BaseUnit::Volt),
        )
        .unwrap();
        assert_eq!(m.to_string(), "-12.345 V");
    }

    #[test]
    fn test_format_without_decimal_point() {
        let m = Measurement::new(
            Sign::Positive,
            digits(&[0, 4, 2, 0]),
            None,
            Unit::prefixed(Prefix::Kilo, BaseUnit::Ohm),
        )
        .unwrap();
        assert_eq!(m.to_string(), "0420 kΩ");
    }

    #[test]
    fn test_format_skips_blank_positions() {
        let m = Measurement::new(
            Sign::Positive,
            vec![Digit::Blank, Digit::Value(1), Digit::Value(5), Digit::Value(0)],
            Some(2),
            Unit::base(BaseUnit::Hertz),
        )
        .unwrap();
        assert_eq!(m.to_string(), "1.50 Hz");
    }

    #[test]
    fn test_format_overload_ignores_digits_and_sign() {
        let m = Measurement::new(
            Sign::Negative,
            digits(&[9, 9, 9, 9]),
            Some(1),
            Unit::prefixed(Prefix::Mega, BaseUnit::Ohm),
        )
        .unwrap()
        .with_overload(true);
        assert_eq!(m.to_string(), "OL MΩ");
    }

    #[test]
    fn test_format_unknown_unit_has_no_trailing_space() {
        let m = Measurement::new(Sign::Positive, digits(&[1, 2]), None, Unit::Unknown).unwrap();
        assert_eq!(m.to_string(), "12");
    }

    #[test]
    fn test_format_modes_in_fixed_order() {
        let modes: Modes = [Mode::Hold, Mode::Ac, Mode::Auto].into_iter().collect();
        let m = Measurement::new(
            Sign::Positive,
            digits(&[2, 3, 0, 1]),
            Some(3),
            Unit::base(BaseUnit::Volt),
        )
        .unwrap()
        .with_modes(modes);
        assert_eq!(m.to_string(), "230.1 V (AC AUTO HOLD)");
    }

    #[test]
    fn test_decimal_point_at_end_and_start() {
        let end = Measurement::new(Sign::Positive, digits(&[1, 2]), Some(2), Unit::Unknown)
            .unwrap();
        assert_eq!(end.to_string(), "12.");
        let start = Measurement::new(Sign::Positive, digits(&[1, 2]), Some(0), Unit::Unknown)
            .unwrap();
        assert_eq!(start.to_string(), ".12");
    }

    #[test]
    fn test_decimal_point_out_of_range_rejected() {
        let err = Measurement::new(Sign::Positive, digits(&[1, 2]), Some(3), Unit::Unknown)
            .unwrap_err();
        assert_eq!(
            err,
            MeasurementError::DecimalPointOutOfRange { index: 3, len: 2 }
        );
        assert_eq!(err.to_string(), "decimal point at 3 is outside of 2 digits");
    }

    #[test]
    fn test_value() {
        let m = Measurement::new(
            Sign::Negative,
            digits(&[1, 2, 3, 4, 5]),
            Some(2),
            Unit::base(BaseUnit::Volt),
        )
        .unwrap();
        assert!((m.value().unwrap() + 12.345).abs() < 1e-9);
    }

    #[test]
    fn test_base_value_applies_prefix() {
        let m = Measurement::new(
            Sign::Positive,
            digits(&[1, 5, 0, 0]),
            Some(1),
            Unit::prefixed(Prefix::Milli, BaseUnit::Ampere),
        )
        .unwrap();
        assert!((m.base_value().unwrap() - 0.0015).abs() < 1e-12);
    }

    #[test]
    fn test_value_too_many_digits() {
        let m = Measurement::new(
            Sign::Positive,
            vec![Digit::Value(9); 25],
            None,
            Unit::Unknown,
        )
        .unwrap();
        assert_eq!(m.value(), None);
        assert_eq!(m.to_string(), "9".repeat(25));

        let fits = Measurement::new(Sign::Positive, vec![Digit::Value(9); 19], None, Unit::Unknown)
            .unwrap();
        assert!((fits.value().unwrap() - 1e19).abs() < 1e4);
    }

    #[test]
    fn test_value_undefined() {
        let overload = Measurement::new(Sign::Positive, digits(&[1]), None, Unit::Unknown)
            .unwrap()
            .with_overload(true);
        assert_eq!(overload.value(), None);

        let dashes = Measurement::new(
            Sign::Positive,
            vec![Digit::Dash, Digit::Dash],
            None,
            Unit::Unknown,
        )
        .unwrap();
        assert_eq!(dashes.value(), None);
        assert_eq!(dashes.to_string(), "--");

        let blank = Measurement::new(Sign::Positive, vec![Digit::Blank], None, Unit::Unknown)
            .unwrap();
        assert_eq!(blank.value(), None);
    }

    #[test]
    fn test_modes_set() {
        let modes = Modes::empty().with(Mode::Diode);
        assert!(modes.contains(Mode::Diode));
        assert!(!modes.contains(Mode::Ac));
        assert_eq!(modes.iter().collect::<Vec<_>>(), vec![Mode::Diode]);
        assert!(Modes::default().is_empty());
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(Unit::Unknown.to_string(), "");
        assert_eq!(Unit::base(BaseUnit::Celsius).to_string(), "°C");
        assert_eq!(
            Unit::prefixed(Prefix::Micro, BaseUnit::Farad).to_string(),
            "µF"
        );
    }
}
