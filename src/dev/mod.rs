//! Facilities for simulating the devices attached to the data bus.

use crate::bus::Bus;
use std::fmt;

mod alu;
mod ram;
mod reg;

pub use alu::{Alu, Flags};
pub use ram::{RAM_SIZE, Ram};
pub use reg::{Latch, ProgramCounter, Register};

//===========================================================================//

/// A device that can drive the data bus.
pub trait Source {
    /// Drives the bus with this device's current output, masked to the lines
    /// this device is wired to.
    fn enable(&mut self, bus: &mut Bus);
}

/// A device that can latch the value on the data bus.
pub trait Sink {
    /// Replaces this device's stored value with the bus value, masked to the
    /// lines this device is wired to.
    fn load(&mut self, bus: &Bus);
}

/// A device with internal state that advances on its own clock input.
pub trait Clocked {
    /// Advances this device's internal state.  This never touches the bus.
    fn clock(&mut self);
}

//===========================================================================//

/// Identifies one of the machine's fixed set of devices.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum DeviceId {
    /// The 4-bit program counter.
    ProgramCounter,
    /// The 4-bit memory address register.
    Mar,
    /// The 16-byte RAM, addressed by the MAR.
    Ram,
    /// The instruction register.
    InstructionRegister,
    /// The A register.
    Accumulator,
    /// The B register, the ALU's second operand.
    BRegister,
    /// The adder/subtractor.
    Alu,
    /// The output register.
    Output,
}

impl DeviceId {
    /// Every device, in a stable order.
    pub const ALL: [DeviceId; 8] = [
        DeviceId::ProgramCounter,
        DeviceId::Mar,
        DeviceId::Ram,
        DeviceId::InstructionRegister,
        DeviceId::Accumulator,
        DeviceId::BRegister,
        DeviceId::Alu,
        DeviceId::Output,
    ];

    /// Returns the short name used for this device in traces.
    pub fn name(self) -> &'static str {
        match self {
            DeviceId::ProgramCounter => "pc",
            DeviceId::Mar => "mar",
            DeviceId::Ram => "ram",
            DeviceId::InstructionRegister => "ir",
            DeviceId::Accumulator => "accumulator",
            DeviceId::BRegister => "b_register",
            DeviceId::Alu => "adder",
            DeviceId::Output => "output",
        }
    }

    /// Returns the set of control lines this device is wired to.
    pub fn capabilities(self) -> Capabilities {
        match self {
            DeviceId::ProgramCounter => Capabilities::ALL,
            DeviceId::Ram
            | DeviceId::InstructionRegister
            | DeviceId::Accumulator => Capabilities::SOURCE_AND_SINK,
            DeviceId::Mar | DeviceId::BRegister | DeviceId::Output => {
                Capabilities::SINK
            }
            DeviceId::Alu => Capabilities::SOURCE,
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

//===========================================================================//

/// The control lines that a device responds to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Capabilities {
    /// True if the device has an enable line (implements [`Source`]).
    pub source: bool,
    /// True if the device has a load line (implements [`Sink`]).
    pub sink: bool,
    /// True if the device has a clock line (implements [`Clocked`]).
    pub clock: bool,
}

impl Capabilities {
    const ALL: Capabilities =
        Capabilities { source: true, sink: true, clock: true };
    const SINK: Capabilities =
        Capabilities { source: false, sink: true, clock: false };
    const SOURCE: Capabilities =
        Capabilities { source: true, sink: false, clock: false };
    const SOURCE_AND_SINK: Capabilities =
        Capabilities { source: true, sink: true, clock: false };
}

//===========================================================================//

/// One instance of each device, as wired together in a single machine.
#[derive(Clone, Debug)]
pub struct Devices {
    pc: ProgramCounter,
    ram: Ram,
    ir: Register,
    alu: Alu,
    output: Latch,
}

impl Devices {
    /// Returns a new device set in its power-on state, with RAM cleared.
    pub fn new() -> Devices {
        Devices {
            pc: ProgramCounter::new(),
            ram: Ram::new(),
            ir: Register::new(0xff, 0x0f),
            alu: Alu::new(),
            output: Latch::new(0xff),
        }
    }

    /// Returns every register to its power-on state, leaving the contents of
    /// RAM intact.
    pub fn reset(&mut self) {
        let cells = *self.ram.cells();
        *self = Devices::new();
        self.ram.load_image(&cells);
    }

    /// Returns the handle for driving the bus from the given device.
    ///
    /// Panics if the device has no enable line; the instruction table is
    /// checked against [`DeviceId::capabilities`] when it is built, so this
    /// indicates a wiring bug rather than bad input.
    pub fn source(&mut self, id: DeviceId) -> &mut dyn Source {
        match id {
            DeviceId::ProgramCounter => &mut self.pc,
            DeviceId::Ram => &mut self.ram,
            DeviceId::InstructionRegister => &mut self.ir,
            DeviceId::Accumulator => self.alu.accumulator_mut(),
            DeviceId::Alu => &mut self.alu,
            DeviceId::Mar | DeviceId::BRegister | DeviceId::Output => {
                not_wired(id, "enable")
            }
        }
    }

    /// Returns the handle for latching the bus into the given device.  Panics
    /// if the device has no load line.
    pub fn sink(&mut self, id: DeviceId) -> &mut dyn Sink {
        match id {
            DeviceId::ProgramCounter => &mut self.pc,
            DeviceId::Mar => self.ram.mar_mut(),
            DeviceId::Ram => &mut self.ram,
            DeviceId::InstructionRegister => &mut self.ir,
            DeviceId::Accumulator => self.alu.accumulator_mut(),
            DeviceId::BRegister => self.alu.b_register_mut(),
            DeviceId::Output => &mut self.output,
            DeviceId::Alu => not_wired(id, "load"),
        }
    }

    /// Returns the handle for clocking the given device.  Panics if the
    /// device has no clock line.
    pub fn clocked(&mut self, id: DeviceId) -> &mut dyn Clocked {
        match id {
            DeviceId::ProgramCounter => &mut self.pc,
            _ => not_wired(id, "clock"),
        }
    }

    /// Returns the value the given device currently holds (or, for the RAM
    /// and ALU, the value it would drive onto the bus), without side effects.
    pub fn value(&self, id: DeviceId) -> u8 {
        match id {
            DeviceId::ProgramCounter => self.pc.value(),
            DeviceId::Mar => self.ram.mar().value(),
            DeviceId::Ram => self.ram.addressed_cell(),
            DeviceId::InstructionRegister => self.ir.value(),
            DeviceId::Accumulator => self.alu.accumulator().value(),
            DeviceId::BRegister => self.alu.b_register().value(),
            DeviceId::Alu => self.alu.peek(),
            DeviceId::Output => self.output.value(),
        }
    }

    /// Returns the program counter.
    pub fn pc(&self) -> &ProgramCounter {
        &self.pc
    }

    /// Returns the RAM, including its address register.
    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    /// Returns the RAM mutably, e.g. for loading a program image.
    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    /// Returns the instruction register.
    pub fn ir(&self) -> &Register {
        &self.ir
    }

    /// Returns the ALU, including the A and B registers and the flags.
    pub fn alu(&self) -> &Alu {
        &self.alu
    }

    /// Returns the ALU mutably, e.g. for selecting subtract mode.
    pub fn alu_mut(&mut self) -> &mut Alu {
        &mut self.alu
    }

    /// Returns the output register.
    pub fn output(&self) -> &Latch {
        &self.output
    }
}

impl Default for Devices {
    fn default() -> Devices {
        Devices::new()
    }
}

fn not_wired(id: DeviceId, line: &str) -> ! {
    panic!("device {id} has no {line} line")
}

//===========================================================================//


//===========================================================================//
