use core::{fmt::Display, str::FromStr};

use crate::{errors::Error, proto::ATTRIBUTE_HANDLE};

/// Bluetooth device address of the bulb.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub struct BulbAddress(pub [u8; 6]);

impl FromStr for BulbAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidAddress(s.to_owned());

        let mut octets = [0_u8; 6];
        let mut parts = s.split(':');
        for octet in &mut octets {
            let part = parts.next().ok_or_else(invalid)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }
        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(Self(octets))
    }
}

impl Display for BulbAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

/// Characteristic write without response.
///
/// Rendered with [`Display`] it becomes an interactive `gatttool` command line.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct CharWrite {
    pub handle: u16,
    pub payload: Vec<u8>,
}

impl CharWrite {
    /// Creates a write command to the bulb color characteristic.
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            handle: ATTRIBUTE_HANDLE,
            payload: payload.into(),
        }
    }
}

impl Display for CharWrite {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "char-write-cmd {:#06x} ", self.handle)?;
        self.payload
            .iter()
            .try_for_each(|byte| write!(f, "{byte:02X}"))
    }
}
