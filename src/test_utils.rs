use crate::decoder::DIGIT_SEGMENTS;

pub const FLAG_VOLT: u8 = 1 << 0;
pub const FLAG_OHM: u8 = 1 << 2;
pub const FLAG_MILLI: u8 = 1 << 2;
pub const FLAG_AC: u8 = 1 << 5;
pub const FLAG_AUTO: u8 = 1 << 6;

/// Segment byte drawing `value` (0-9) without sign or decimal point.
pub fn digit_byte(value: u8) -> u8 {
    DIGIT_SEGMENTS[usize::from(value)]
}

/// A gatttool notification line carrying `bytes`, terminator included.
pub fn notification_line(bytes: [u8; 6]) -> String {
    let payload: String = bytes.iter().map(|b| format!("{b:02x} ")).collect();
    format!("Notification handle = 0x002e value: {payload}\n")
}

/// Notification line for `-1.234 V (AUTO)`.
pub fn negative_volts_line() -> String {
    notification_line([
        digit_byte(1) | 0x80,
        digit_byte(2) | 0x80,
        digit_byte(3),
        digit_byte(4),
        FLAG_VOLT,
        FLAG_AUTO,
    ])
}
