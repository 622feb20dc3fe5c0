//! Facilities for representing the shared data bus.

use std::fmt;

//===========================================================================//

/// The machine's 8-bit shared data bus.
///
/// At most one device drives the bus during a given clock pulse; every device
/// that loads from the bus during that pulse sees the same value.  Driving
/// the bus always replaces its entire value, and the value persists until the
/// next time some device drives it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Bus {
    value: u8,
}

impl Bus {
    /// Returns a new bus with all lines low.
    pub fn new() -> Bus {
        Bus::default()
    }

    /// Returns the value currently on the bus.
    pub fn value(&self) -> u8 {
        self.value
    }

    /// Drives the bus with the given value, replacing whatever was there.
    pub fn drive(&mut self, value: u8) {
        self.value = value;
    }
}

impl fmt::Display for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:02x}", self.value)
    }
}

//===========================================================================//


//===========================================================================//
