//! Facilities for describing the instruction set as microcode.

use crate::dev::{DeviceId, Flags};
use std::fmt;

mod table;

pub use table::{InstructionTable, NUM_OPCODES, RESERVED};

//===========================================================================//

/// A tri-state requirement on one flag for a control step to take effect.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Condition {
    /// The step takes effect regardless of the flag.
    #[default]
    Ignore,
    /// The step only takes effect if the flag is clear.
    Clear,
    /// The step only takes effect if the flag is set.
    Set,
}

impl Condition {
    /// Returns true if a flag with the given value satisfies this condition.
    pub fn admits(self, flag: bool) -> bool {
        match self {
            Condition::Ignore => true,
            Condition::Clear => !flag,
            Condition::Set => flag,
        }
    }
}

//===========================================================================//

/// One clock pulse worth of control signals (a microinstruction).
///
/// A step may name a different device as its source and its sink, in which
/// case the source drives the bus and the sink latches that same value during
/// the same pulse.  The instruction table must never have two devices drive
/// the bus at once; with a single `source` field that is true by
/// construction.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ControlStep {
    /// The device whose enable line is asserted, if any.
    pub source: Option<DeviceId>,
    /// The device whose load line is asserted, if any.
    pub sink: Option<DeviceId>,
    /// The device whose clock line is pulsed, if any.
    pub clock: Option<DeviceId>,
    /// Selects subtract mode on the ALU before any device is enabled.
    pub subtract: bool,
    /// Marks the last step of an instruction; the micro-step counter resets
    /// after this step.
    pub end_of_instruction: bool,
    /// Halts the machine.
    pub halt: bool,
    /// The carry flag requirement for this step to take effect.
    pub carry: Condition,
    /// The zero flag requirement for this step to take effect.
    pub zero: Condition,
}

impl ControlStep {
    /// A step that asserts no control lines.
    pub const IDLE: ControlStep = ControlStep {
        source: None,
        sink: None,
        clock: None,
        subtract: false,
        end_of_instruction: false,
        halt: false,
        carry: Condition::Ignore,
        zero: Condition::Ignore,
    };

    /// The step that terminates every instruction.
    pub const END: ControlStep =
        ControlStep { end_of_instruction: true, ..ControlStep::IDLE };

    /// A step that halts the machine.
    pub const HALT: ControlStep =
        ControlStep { halt: true, ..ControlStep::IDLE };

    /// A step that drives the bus from the given device.
    pub const fn enable(device: DeviceId) -> ControlStep {
        ControlStep { source: Some(device), ..ControlStep::IDLE }
    }

    /// A step that latches the bus into the given device.
    pub const fn load(device: DeviceId) -> ControlStep {
        ControlStep { sink: Some(device), ..ControlStep::IDLE }
    }

    /// A step that pulses the clock input of the given device.
    pub const fn clock(device: DeviceId) -> ControlStep {
        ControlStep { clock: Some(device), ..ControlStep::IDLE }
    }

    /// Returns a copy of this step that also selects ALU subtract mode.
    pub const fn subtracting(self) -> ControlStep {
        ControlStep { subtract: true, ..self }
    }

    /// Returns a copy of this step gated on the carry flag.
    pub const fn if_carry(self, condition: Condition) -> ControlStep {
        ControlStep { carry: condition, ..self }
    }

    /// Returns a copy of this step gated on the zero flag.
    pub const fn if_zero(self, condition: Condition) -> ControlStep {
        ControlStep { zero: condition, ..self }
    }

    /// Returns true if the given flags satisfy both of this step's
    /// conditions.
    pub fn conditions_hold(&self, flags: Flags) -> bool {
        self.carry.admits(flags.carry) && self.zero.admits(flags.zero)
    }
}

impl fmt::Display for ControlStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        match (self.source, self.sink) {
            (Some(source), Some(sink)) => {
                parts.push(format!("{source}->{sink}"))
            }
            (Some(source), None) => parts.push(format!("{source}->bus")),
            (None, Some(sink)) => parts.push(format!("bus->{sink}")),
            (None, None) => {}
        }
        if let Some(device) = self.clock {
            parts.push(format!("clock {device}"));
        }
        if self.subtract {
            parts.push("sub".to_string());
        }
        if self.halt {
            parts.push("halt".to_string());
        }
        if self.end_of_instruction {
            parts.push("end".to_string());
        }
        if parts.is_empty() {
            parts.push("idle".to_string());
        }
        for (name, condition) in [("C", self.carry), ("Z", self.zero)] {
            match condition {
                Condition::Ignore => {}
                Condition::Clear => parts.push(format!("if !{name}")),
                Condition::Set => parts.push(format!("if {name}")),
            }
        }
        f.write_str(&parts.join(" "))
    }
}

//===========================================================================//

/// A named sequence of control steps implementing one opcode.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instruction {
    mnemonic: &'static str,
    steps: Box<[ControlStep]>,
}

impl Instruction {
    /// The steps shared by every instruction, which load the next instruction
    /// byte into the IR and advance the program counter.
    pub const FETCH: [ControlStep; 5] = [
        ControlStep::enable(DeviceId::ProgramCounter),
        ControlStep::load(DeviceId::Mar),
        ControlStep::enable(DeviceId::Ram),
        ControlStep::load(DeviceId::InstructionRegister),
        ControlStep::clock(DeviceId::ProgramCounter),
    ];

    /// Builds an instruction from its execute-phase steps, surrounding them
    /// with the shared fetch steps and the terminating step.
    pub fn new(
        mnemonic: &'static str,
        execute: &[ControlStep],
    ) -> Instruction {
        let steps = Instruction::FETCH
            .iter()
            .chain(execute)
            .chain(std::iter::once(&ControlStep::END))
            .copied()
            .collect();
        Instruction { mnemonic, steps }
    }

    /// Returns the name of this instruction.
    pub fn mnemonic(&self) -> &'static str {
        self.mnemonic
    }

    /// Returns every step of this instruction, including the fetch steps.
    pub fn steps(&self) -> &[ControlStep] {
        &self.steps
    }

    /// Returns the steps specific to this instruction (everything between the
    /// fetch steps and the terminating step).
    pub fn execute_steps(&self) -> &[ControlStep] {
        &self.steps[Instruction::FETCH.len()..self.steps.len() - 1]
    }

    /// Returns the step at the given micro-step index.  Panics if the index
    /// is past the end of this instruction.
    pub fn step(&self, index: usize) -> &ControlStep {
        self.steps.get(index).unwrap_or_else(|| {
            panic!(
                "micro-step {index} is past the end of {} ({} steps)",
                self.mnemonic,
                self.steps.len()
            )
        })
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{Condition, ControlStep, Instruction};
    use crate::dev::{DeviceId, Flags};

    #[test]
    fn condition_admits() {
        assert!(Condition::Ignore.admits(false));
        assert!(Condition::Ignore.admits(true));
        assert!(Condition::Clear.admits(false));
        assert!(!Condition::Clear.admits(true));
        assert!(!Condition::Set.admits(false));
        assert!(Condition::Set.admits(true));
    }

    #[test]
    fn conditions_hold_needs_both_flags() {
        let step = ControlStep::load(DeviceId::ProgramCounter)
            .if_carry(Condition::Set)
            .if_zero(Condition::Clear);
        assert!(step.conditions_hold(Flags { zero: false, carry: true }));
        assert!(!step.conditions_hold(Flags { zero: true, carry: true }));
        assert!(!step.conditions_hold(Flags { zero: false, carry: false }));
    }

    #[test]
    fn instruction_layout() {
        let inst = Instruction::new(
            "LDI",
            &[
                ControlStep::enable(DeviceId::InstructionRegister),
                ControlStep::load(DeviceId::Accumulator),
            ],
        );
        assert_eq!(inst.steps().len(), 8);
        assert_eq!(inst.steps()[..5], Instruction::FETCH);
        assert_eq!(inst.execute_steps().len(), 2);
        assert_eq!(*inst.step(7), ControlStep::END);
    }

    #[test]
    #[should_panic(expected = "micro-step 6 is past the end of NOP")]
    fn step_past_end() {
        Instruction::new("NOP", &[]).step(6);
    }

    #[test]
    fn display() {
        let step = ControlStep::enable(DeviceId::Alu).subtracting();
        assert_eq!(step.to_string(), "adder->bus sub");
        let step = ControlStep::load(DeviceId::ProgramCounter)
            .if_zero(Condition::Set);
        assert_eq!(step.to_string(), "bus->pc if Z");
        assert_eq!(ControlStep::IDLE.to_string(), "idle");
        assert_eq!(ControlStep::END.to_string(), "end");
    }
}

//===========================================================================//
