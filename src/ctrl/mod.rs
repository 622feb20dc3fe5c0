//! Facilities for sequencing microcode, one clock pulse at a time.

use crate::bus::Bus;
use crate::dev::{DeviceId, Devices};
use crate::isa::{ControlStep, Instruction, InstructionTable};
use tracing::{debug, info, trace};

//===========================================================================//

/// A report of what happened during a single clock pulse.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pulse {
    /// The opcode whose microcode was executing.
    pub opcode: u8,
    /// The index of the step within that opcode's microcode.
    pub micro_step: usize,
    /// The control step that was looked up.
    pub step: ControlStep,
    /// False if the step's flag conditions failed, so that it had no effect
    /// beyond consuming the pulse.
    pub taken: bool,
    /// True if the machine is halted after this pulse.
    pub halted: bool,
}

//===========================================================================//

/// The hard-wired control unit.
///
/// On each clock pulse, the control unit decodes the opcode from the high
/// nibble of the instruction register, looks up the control step for the
/// current micro-step, asserts that step's control lines, and then advances
/// the micro-step counter (or resets it to zero at the end of the
/// instruction).
#[derive(Clone, Debug)]
pub struct ControlUnit {
    table: InstructionTable,
    micro_step: usize,
    halted: bool,
}

impl ControlUnit {
    /// Returns a new control unit at the start of an instruction fetch.
    pub fn new() -> ControlUnit {
        ControlUnit::with_table(InstructionTable::new())
    }

    /// Returns a new control unit that executes the given microcode.
    pub fn with_table(table: InstructionTable) -> ControlUnit {
        ControlUnit { table, micro_step: 0, halted: false }
    }

    /// Returns the microcode this control unit executes.
    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    /// Returns the index of the step that the next pulse will execute.
    pub fn micro_step(&self) -> usize {
        self.micro_step
    }

    /// Returns true if a halt step has executed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Returns the control unit to the start of an instruction fetch and
    /// clears the halt state.
    pub fn reset(&mut self) {
        self.micro_step = 0;
        self.halted = false;
    }

    /// Returns the instruction currently selected by the opcode nibble of the
    /// instruction register.
    pub fn current_instruction(&self, devices: &Devices) -> &Instruction {
        self.table.get(opcode_of(devices))
    }

    /// Executes one clock pulse.  Returns `None` without touching any state
    /// if the machine has already halted.
    pub fn clock(
        &mut self,
        bus: &mut Bus,
        devices: &mut Devices,
    ) -> Option<Pulse> {
        if self.halted {
            return None;
        }
        let opcode = opcode_of(devices);
        let instruction = self.table.get(opcode);
        let micro_step = self.micro_step;
        let step = *instruction.step(micro_step);
        let taken = step.conditions_hold(devices.alu().flags());
        if taken {
            if step.subtract {
                devices.alu_mut().set_subtract(true);
            }
            if let Some(id) = step.source {
                devices.source(id).enable(bus);
            }
            if let Some(id) = step.sink {
                devices.sink(id).load(bus);
            }
            if let Some(id) = step.clock {
                devices.clocked(id).clock();
            }
            if step.halt {
                self.halted = true;
            }
        }
        trace!(
            mnemonic = instruction.mnemonic(),
            micro_step,
            step = %step,
            taken,
            bus = %bus,
            "control step"
        );
        if step.end_of_instruction {
            self.micro_step = 0;
            debug!(
                mnemonic = instruction.mnemonic(),
                pc = devices.value(DeviceId::ProgramCounter),
                a = devices.value(DeviceId::Accumulator),
                flags = %devices.alu().flags(),
                "instruction complete"
            );
        } else {
            self.micro_step += 1;
        }
        if self.halted {
            info!(
                output = devices.value(DeviceId::Output),
                "machine halted"
            );
        }
        Some(Pulse { opcode, micro_step, step, taken, halted: self.halted })
    }
}

impl Default for ControlUnit {
    fn default() -> ControlUnit {
        ControlUnit::new()
    }
}

fn opcode_of(devices: &Devices) -> u8 {
    devices.ir().value() >> 4
}

//===========================================================================//


//===========================================================================//
