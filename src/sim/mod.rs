//! Facilities for simulating a complete machine.

use crate::bus::Bus;
use crate::ctrl::{ControlUnit, Pulse};
use crate::dev::{DeviceId, Devices, Flags, RAM_SIZE};
use crate::isa::Instruction;
use std::fmt;
use tracing::debug;

//===========================================================================//

/// An error returned when a program image cannot be loaded into RAM.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LoadError {
    /// The length of the rejected image, in bytes.
    pub len: usize,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "program is {} bytes, but RAM only holds {RAM_SIZE}",
            self.len
        )
    }
}

impl std::error::Error for LoadError {}

//===========================================================================//

/// An error returned when a run does not reach a halt.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RunError {
    /// The machine was still running after the given number of pulses.
    PulseLimit(u64),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::PulseLimit(limit) => {
                write!(f, "machine did not halt within {limit} clock pulses")
            }
        }
    }
}

impl std::error::Error for RunError {}

//===========================================================================//

/// A complete simulated machine: one data bus, one of each device, and the
/// control unit that drives them.
///
/// Every machine owns all of its state, so separate machines never affect one
/// another.
#[derive(Clone, Debug, Default)]
pub struct Machine {
    bus: Bus,
    devices: Devices,
    control: ControlUnit,
}

impl Machine {
    /// Returns a new machine in its power-on state, with RAM cleared.
    pub fn new() -> Machine {
        Machine::default()
    }

    /// Returns a new machine with the given program image loaded.
    pub fn with_program(image: &[u8]) -> Result<Machine, LoadError> {
        let mut machine = Machine::new();
        machine.load_program(image)?;
        Ok(machine)
    }

    /// Copies a program image into RAM starting at address zero; any cells
    /// past the end of the image are zeroed.  Fails without changing anything
    /// if the image is larger than RAM.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), LoadError> {
        if image.len() > RAM_SIZE {
            return Err(LoadError { len: image.len() });
        }
        self.devices.ram_mut().load_image(image);
        debug!(len = image.len(), "program loaded");
        Ok(())
    }

    /// Returns the machine to its power-on state without clearing RAM, so that
    /// the loaded program can run again from the start.
    pub fn reset(&mut self) {
        self.bus = Bus::new();
        self.devices.reset();
        self.control.reset();
    }

    /// Executes a single clock pulse.  Returns true if the machine is halted
    /// afterwards; once halted, further calls do nothing and return true.
    pub fn step(&mut self) -> bool {
        self.pulse().is_none_or(|pulse| pulse.halted)
    }

    /// Executes a single clock pulse and reports what it did, or returns
    /// `None` if the machine had already halted.
    pub fn pulse(&mut self) -> Option<Pulse> {
        self.control.clock(&mut self.bus, &mut self.devices)
    }

    /// Clocks the machine until it halts, returning the number of pulses
    /// executed.  Fails if the machine is still running after `max_pulses`.
    pub fn run(&mut self, max_pulses: u64) -> Result<u64, RunError> {
        self.run_with(max_pulses, |_, _| {})
    }

    /// Like [`Machine::run`], but calls `observe` with the machine and the
    /// pulse report after every pulse.
    pub fn run_with<F>(
        &mut self,
        max_pulses: u64,
        mut observe: F,
    ) -> Result<u64, RunError>
    where
        F: FnMut(&Machine, &Pulse),
    {
        let mut pulses = 0;
        while !self.control.is_halted() {
            if pulses == max_pulses {
                return Err(RunError::PulseLimit(max_pulses));
            }
            let Some(pulse) = self.pulse() else { break };
            pulses += 1;
            observe(self, &pulse);
        }
        Ok(pulses)
    }

    /// Returns true if the machine has halted.
    pub fn is_halted(&self) -> bool {
        self.control.is_halted()
    }

    /// Returns the value currently on the data bus.
    pub fn bus(&self) -> u8 {
        self.bus.value()
    }

    /// Returns the value held by (or, for the RAM and ALU, presented by) the
    /// given device.
    pub fn device_value(&self, id: DeviceId) -> u8 {
        self.devices.value(id)
    }

    /// Returns the program counter.
    pub fn pc(&self) -> u8 {
        self.devices.value(DeviceId::ProgramCounter)
    }

    /// Returns the memory address register.
    pub fn mar(&self) -> u8 {
        self.devices.value(DeviceId::Mar)
    }

    /// Returns the instruction register.
    pub fn ir(&self) -> u8 {
        self.devices.value(DeviceId::InstructionRegister)
    }

    /// Returns the A register.
    pub fn accumulator(&self) -> u8 {
        self.devices.value(DeviceId::Accumulator)
    }

    /// Returns the B register.
    pub fn b_register(&self) -> u8 {
        self.devices.value(DeviceId::BRegister)
    }

    /// Returns the output register, the program's visible result.
    pub fn output(&self) -> u8 {
        self.devices.value(DeviceId::Output)
    }

    /// Returns the flags register.
    pub fn flags(&self) -> Flags {
        self.devices.alu().flags()
    }

    /// Returns the contents of RAM.
    pub fn ram(&self) -> &[u8; RAM_SIZE] {
        self.devices.ram().cells()
    }

    /// Returns the index of the control step the next pulse will execute.
    pub fn micro_step(&self) -> usize {
        self.control.micro_step()
    }

    /// Returns the instruction whose opcode is in the instruction register.
    pub fn current_instruction(&self) -> &Instruction {
        self.control.current_instruction(&self.devices)
    }

    /// Returns a human-readable, multi-line dump of the machine state.
    pub fn description(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "{} T{}{}",
            self.current_instruction().mnemonic(),
            self.micro_step(),
            if self.is_halted() { " (halted)" } else { "" }
        ));
        lines.push(format!("bus={}  flags={}", self.bus, self.flags()));
        lines.push(
            DeviceId::ALL
                .iter()
                .map(|&id| format!("{id}=${:02x}", self.device_value(id)))
                .collect::<Vec<String>>()
                .join(" "),
        );
        for (row, chunk) in self.ram().chunks(8).enumerate() {
            let bytes = chunk
                .iter()
                .map(|byte| format!("{byte:02x}"))
                .collect::<Vec<String>>()
                .join(" ");
            lines.push(format!("${:x}: {bytes}", row * 8));
        }
        lines.join("\n")
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{LoadError, Machine, RunError};
    use crate::dev::{DeviceId, Flags, RAM_SIZE};

    #[test]
    fn load_pads_with_zeros() {
        let mut machine = Machine::new();
        machine.load_program(&[0xff; RAM_SIZE]).unwrap();
        machine.load_program(&[0x55, 0xf0]).unwrap();
        assert_eq!(machine.ram()[..3], [0x55, 0xf0, 0x00]);
        assert_eq!(machine.ram()[RAM_SIZE - 1], 0x00);
    }

    #[test]
    fn load_too_large_is_rejected() {
        let mut machine = Machine::with_program(&[0xe0]).unwrap();
        assert_eq!(
            machine.load_program(&[0; RAM_SIZE + 1]),
            Err(LoadError { len: RAM_SIZE + 1 })
        );
        assert_eq!(machine.ram()[0], 0xe0);
        assert_eq!(
            LoadError { len: 17 }.to_string(),
            "program is 17 bytes, but RAM only holds 16"
        );
    }

    #[test]
    fn ldi_then_halt() {
        let mut machine = Machine::with_program(&[0x55, 0xf0]).unwrap();
        assert_eq!(machine.run(100), Ok(14));
        assert_eq!(machine.accumulator(), 5);
        assert!(machine.step());
    }

    #[test]
    fn run_hits_pulse_limit() {
        // JMP 0
        let mut machine = Machine::with_program(&[0x60]).unwrap();
        assert_eq!(machine.run(50), Err(RunError::PulseLimit(50)));
        assert!(!machine.is_halted());
        assert_eq!(
            RunError::PulseLimit(50).to_string(),
            "machine did not halt within 50 clock pulses"
        );
    }

    #[test]
    fn run_with_observes_every_pulse() {
        // LDI 7, OUT, HLT
        let mut machine = Machine::with_program(&[0x57, 0xe0, 0xf0]).unwrap();
        let mut seen = 0;
        let mut output = Vec::new();
        let result = machine.run_with(100, |machine, pulse| {
            seen += 1;
            if pulse.taken && pulse.step.sink == Some(DeviceId::Output) {
                output.push(machine.output());
            }
        });
        assert_eq!(result, Ok(22));
        assert_eq!(seen, 22);
        assert_eq!(output, vec![7]);

        let mut machine = Machine::with_program(&[0x60]).unwrap();
        let mut seen = 0;
        let result = machine.run_with(30, |_, _| seen += 1);
        assert_eq!(result, Err(RunError::PulseLimit(30)));
        assert_eq!(seen, 30);
    }

    #[test]
    fn inspection_has_no_side_effects() {
        let mut machine = Machine::with_program(&[0x57, 0x2f, 0xf0]).unwrap();
        for _ in 0..9 {
            machine.step();
        }
        let before = machine.description();
        for _ in 0..3 {
            let _ = machine.bus();
            let _ = machine.device_value(DeviceId::Alu);
            let _ = machine.device_value(DeviceId::Ram);
            let _ = machine.flags();
            let _ = machine.current_instruction();
            assert_eq!(machine.description(), before);
        }
    }

    #[test]
    fn reset_reruns_program() {
        let mut machine = Machine::with_program(&[0x53, 0xe0, 0xf0]).unwrap();
        machine.run(100).unwrap();
        assert_eq!(machine.output(), 3);
        machine.reset();
        assert!(!machine.is_halted());
        assert_eq!(machine.output(), 0);
        assert_eq!(machine.flags(), Flags::default());
        machine.run(100).unwrap();
        assert_eq!(machine.output(), 3);
    }

    #[test]
    fn description() {
        let machine = Machine::with_program(&[0x55, 0xf0]).unwrap();
        assert_eq!(
            machine.description(),
            "NOP T0\n\
             bus=$00  flags=--\n\
             pc=$00 mar=$00 ram=$55 ir=$00 accumulator=$00 b_register=$00 \
             adder=$00 output=$00\n\
             $0: 55 f0 00 00 00 00 00 00\n\
             $8: 00 00 00 00 00 00 00 00"
        );
    }
}

//===========================================================================//
