use super::{Latch, Register, Source};
use crate::bus::Bus;
use std::fmt;

//===========================================================================//

/// The flags register, written only when the ALU drives the bus.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Flags {
    /// Set if the last ALU result (after truncation to 8 bits) was zero.
    pub zero: bool,
    /// Set if the last ALU result did not fit in 0-255 before truncation.
    pub carry: bool,
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let zero = if self.zero { 'Z' } else { '-' };
        let carry = if self.carry { 'C' } else { '-' };
        write!(f, "{zero}{carry}")
    }
}

//===========================================================================//

/// The adder/subtractor, hard-wired to the A and B registers.
///
/// The ALU has no storage of its own besides the flags register; whenever it
/// is enabled it computes `A + B` (or `A - B`, if subtract mode was selected
/// for this pulse) and drives the bus with the result.
#[derive(Clone, Debug)]
pub struct Alu {
    accumulator: Register,
    b_register: Latch,
    flags: Flags,
    subtract: bool,
}

impl Alu {
    /// Returns a new ALU with zeroed registers and flags.
    pub fn new() -> Alu {
        Alu {
            accumulator: Register::new(0xff, 0xff),
            b_register: Latch::new(0xff),
            flags: Flags::default(),
            subtract: false,
        }
    }

    /// Selects subtract mode for the next time the ALU is enabled.  The mode
    /// reverts to addition once that enable happens.
    pub fn set_subtract(&mut self, subtract: bool) {
        self.subtract = subtract;
    }

    /// Returns the current flags.
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Returns the A register.
    pub fn accumulator(&self) -> &Register {
        &self.accumulator
    }

    /// Returns the B register.
    pub fn b_register(&self) -> &Latch {
        &self.b_register
    }

    pub(super) fn accumulator_mut(&mut self) -> &mut Register {
        &mut self.accumulator
    }

    pub(super) fn b_register_mut(&mut self) -> &mut Latch {
        &mut self.b_register
    }

    /// Returns the value the ALU would drive if enabled now, without updating
    /// the flags.
    pub fn peek(&self) -> u8 {
        self.compute().0
    }

    fn compute(&self) -> (u8, Flags) {
        compute(
            self.accumulator.value(),
            self.b_register.value(),
            self.subtract,
        )
    }
}

impl Default for Alu {
    fn default() -> Alu {
        Alu::new()
    }
}

impl Source for Alu {
    fn enable(&mut self, bus: &mut Bus) {
        let (result, flags) = self.compute();
        self.flags = flags;
        self.subtract = false;
        bus.drive(result);
    }
}

fn compute(lhs: u8, rhs: u8, subtract: bool) -> (u8, Flags) {
    let raw: i16 = if subtract {
        i16::from(lhs) - i16::from(rhs)
    } else {
        i16::from(lhs) + i16::from(rhs)
    };
    let result = raw as u8;
    let flags = Flags { zero: result == 0, carry: !(0..=0xff).contains(&raw) };
    (result, flags)
}

//===========================================================================//


//===========================================================================//
