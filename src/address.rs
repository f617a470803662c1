//! Bluetooth address of the meter, as passed to `gatttool -b`.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A Bluetooth device address such as `98:84:E3:CD:C0:E5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceAddress([u8; 6]);

impl DeviceAddress {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Errors returned when parsing a device address.
#[derive(Error, Debug, PartialEq)]
pub enum AddressError {
    #[error("invalid address '{0}': expected six colon separated octets")]
    Shape(String),
    #[error("invalid address '{address}': '{octet}' is not a hex octet")]
    Octet { address: String, octet: String },
}

impl FromStr for DeviceAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for octet in octets.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| AddressError::Shape(s.to_string()))?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddressError::Octet {
                    address: s.to_string(),
                    octet: part.to_string(),
                });
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| AddressError::Octet {
                address: s.to_string(),
                octet: part.to_string(),
            })?;
        }
        if parts.next().is_some() {
            return Err(AddressError::Shape(s.to_string()));
        }
        Ok(DeviceAddress(octets))
    }
}
