use super::{Clocked, Sink, Source};
use crate::bus::Bus;

//===========================================================================//

const PC_MASK: u8 = 0x0f;

//===========================================================================//

/// A register that can both latch and drive the bus.
///
/// The load and enable masks model which bus lines the register is actually
/// wired to in each direction.  For example, the instruction register latches
/// all eight lines but only drives the low four (the operand), since the
/// opcode nibble is wired straight to the control unit.
#[derive(Clone, Debug)]
pub struct Register {
    value: u8,
    load_mask: u8,
    enable_mask: u8,
}

impl Register {
    /// Returns a new zeroed register wired with the given masks.
    pub fn new(load_mask: u8, enable_mask: u8) -> Register {
        Register { value: 0, load_mask, enable_mask }
    }

    /// Returns the value currently latched in this register.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl Default for Register {
    fn default() -> Register {
        Register::new(0xff, 0xff)
    }
}

impl Source for Register {
    fn enable(&mut self, bus: &mut Bus) {
        bus.drive(self.value & self.enable_mask);
    }
}

impl Sink for Register {
    fn load(&mut self, bus: &Bus) {
        self.value = bus.value() & self.load_mask;
    }
}

//===========================================================================//

/// A register that can only latch the bus (e.g. the MAR, the B register, or
/// the output register).  Its value is visible to the devices it is wired to,
/// but never placed back on the bus.
#[derive(Clone, Debug)]
pub struct Latch {
    value: u8,
    load_mask: u8,
}

impl Latch {
    /// Returns a new zeroed latch wired with the given load mask.
    pub fn new(load_mask: u8) -> Latch {
        Latch { value: 0, load_mask }
    }

    /// Returns the value currently latched.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl Default for Latch {
    fn default() -> Latch {
        Latch::new(0xff)
    }
}

impl Sink for Latch {
    fn load(&mut self, bus: &Bus) {
        self.value = bus.value() & self.load_mask;
    }
}

//===========================================================================//

/// The 4-bit program counter.  Incrementing past 15 wraps back to zero.
#[derive(Clone, Debug, Default)]
pub struct ProgramCounter {
    value: u8,
}

impl ProgramCounter {
    /// Returns a new program counter pointing at address zero.
    pub fn new() -> ProgramCounter {
        ProgramCounter::default()
    }

    /// Returns the address the program counter currently points at.
    pub fn value(&self) -> u8 {
        self.value
    }
}

impl Source for ProgramCounter {
    fn enable(&mut self, bus: &mut Bus) {
        bus.drive(self.value);
    }
}

impl Sink for ProgramCounter {
    fn load(&mut self, bus: &Bus) {
        self.value = bus.value() & PC_MASK;
    }
}

impl Clocked for ProgramCounter {
    fn clock(&mut self) {
        self.value = self.value.wrapping_add(1) & PC_MASK;
    }
}

//===========================================================================//


//===========================================================================//
