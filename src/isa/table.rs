use super::{Condition, ControlStep, Instruction};
use crate::dev::{Capabilities, DeviceId};

//===========================================================================//

/// The number of opcodes (one per value of the instruction byte's high
/// nibble).
pub const NUM_OPCODES: usize = 16;

/// The name given to opcodes that have no behavior yet.  It is not a valid
/// identifier, so the assembler can never resolve a mnemonic to it.
pub const RESERVED: &str = "???";

//===========================================================================//

/// The fixed mapping from 4-bit opcodes to instructions.
#[derive(Clone, Debug)]
pub struct InstructionTable {
    instructions: [Instruction; NUM_OPCODES],
}

impl InstructionTable {
    /// Builds the machine's instruction table.
    ///
    /// Panics if any step asserts a control line on a device that doesn't
    /// have it, so that a miswired table is caught before the first pulse.
    pub fn new() -> InstructionTable {
        use DeviceId::{
            Accumulator, Alu, BRegister, InstructionRegister as Ir, Mar,
            Output, ProgramCounter as Pc, Ram,
        };
        let enable = ControlStep::enable;
        let load = ControlStep::load;
        let table = InstructionTable {
            instructions: [
                Instruction::new("NOP", &[]),
                Instruction::new(
                    "LDA",
                    &[enable(Ir), load(Mar), enable(Ram), load(Accumulator)],
                ),
                Instruction::new(
                    "ADD",
                    &[
                        enable(Ir),
                        load(Mar),
                        enable(Ram),
                        load(BRegister),
                        enable(Alu),
                        load(Accumulator),
                    ],
                ),
                // Unlike ADD, SUB's operand goes straight from the IR into
                // the B register with no trip through RAM.
                Instruction::new(
                    "SUB",
                    &[
                        enable(Ir),
                        load(BRegister),
                        enable(Alu).subtracting(),
                        load(Accumulator),
                    ],
                ),
                Instruction::new(
                    "STA",
                    &[enable(Ir), load(Mar), enable(Accumulator), load(Ram)],
                ),
                Instruction::new("LDI", &[enable(Ir), load(Accumulator)]),
                Instruction::new("JMP", &[enable(Ir), load(Pc)]),
                Instruction::new(
                    "JC",
                    &[
                        enable(Ir).if_carry(Condition::Set),
                        load(Pc).if_carry(Condition::Set),
                    ],
                ),
                Instruction::new(
                    "JZ",
                    &[
                        enable(Ir).if_zero(Condition::Set),
                        load(Pc).if_zero(Condition::Set),
                    ],
                ),
                Instruction::new(RESERVED, &[]),
                Instruction::new(RESERVED, &[]),
                Instruction::new(RESERVED, &[]),
                Instruction::new(RESERVED, &[]),
                Instruction::new(RESERVED, &[]),
                Instruction::new("OUT", &[enable(Accumulator), load(Output)]),
                Instruction::new("HLT", &[ControlStep::HALT]),
            ],
        };
        table.check_wiring();
        table
    }

    fn check_wiring(&self) {
        for (opcode, instruction) in self.instructions.iter().enumerate() {
            let steps = instruction.steps();
            assert!(
                steps.last().is_some_and(|step| step.end_of_instruction),
                "opcode {opcode} is not terminated"
            );
            for (index, step) in steps.iter().enumerate() {
                let at = (opcode, index);
                check_line(at, step.source, "enable", |caps| caps.source);
                check_line(at, step.sink, "load", |caps| caps.sink);
                check_line(at, step.clock, "clock", |caps| caps.clock);
            }
        }
    }

    /// Returns the instruction for the given opcode.  Panics if the opcode
    /// doesn't fit in four bits.
    pub fn get(&self, opcode: u8) -> &Instruction {
        &self.instructions[usize::from(opcode)]
    }

    /// Returns the opcode whose mnemonic matches the given name, ignoring
    /// ASCII case.
    pub fn opcode_for(&self, mnemonic: &str) -> Option<u8> {
        self.instructions
            .iter()
            .position(|inst| inst.mnemonic().eq_ignore_ascii_case(mnemonic))
            .map(|index| index as u8)
    }

    /// Returns the step count of the longest instruction.
    pub fn max_steps(&self) -> usize {
        self.instructions
            .iter()
            .map(|inst| inst.steps().len())
            .max()
            .unwrap_or(0)
    }

    /// Returns an iterator over every (opcode, instruction) pair.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Instruction)> {
        self.instructions
            .iter()
            .enumerate()
            .map(|(opcode, inst)| (opcode as u8, inst))
    }
}

fn check_line(
    (opcode, index): (usize, usize),
    device: Option<DeviceId>,
    line: &str,
    wired: fn(Capabilities) -> bool,
) {
    if let Some(id) = device {
        assert!(
            wired(id.capabilities()),
            "opcode {opcode} step {index}: device {id} has no {line} line"
        );
    }
}

impl Default for InstructionTable {
    fn default() -> InstructionTable {
        InstructionTable::new()
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{InstructionTable, NUM_OPCODES};
    use crate::dev::DeviceId;
    use crate::isa::{ControlStep, Instruction};

    #[test]
    fn every_opcode_shares_fetch_prefix() {
        let table = InstructionTable::new();
        assert_eq!(table.iter().count(), NUM_OPCODES);
        for (_, inst) in table.iter() {
            assert_eq!(inst.steps()[..5], Instruction::FETCH);
            assert_eq!(inst.steps().last(), Some(&ControlStep::END));
        }
    }

    #[test]
    fn opcode_numbering() {
        let table = InstructionTable::new();
        let expected = [
            ("NOP", 0),
            ("LDA", 1),
            ("ADD", 2),
            ("SUB", 3),
            ("STA", 4),
            ("LDI", 5),
            ("JMP", 6),
            ("JC", 7),
            ("JZ", 8),
            ("OUT", 14),
            ("HLT", 15),
        ];
        for (mnemonic, opcode) in expected {
            assert_eq!(table.opcode_for(mnemonic), Some(opcode));
            assert_eq!(table.get(opcode).mnemonic(), mnemonic);
        }
        assert_eq!(table.opcode_for("ldi"), Some(5));
        assert_eq!(table.opcode_for("FOO"), None);
    }

    #[test]
    fn reserved_opcodes_do_nothing() {
        let table = InstructionTable::new();
        for opcode in 9..=13 {
            assert!(table.get(opcode).execute_steps().is_empty());
        }
    }

    #[test]
    fn add_reads_ram_but_sub_does_not() {
        let table = InstructionTable::new();
        let reads_ram = |opcode: u8| {
            table
                .get(opcode)
                .execute_steps()
                .iter()
                .any(|step| step.source == Some(DeviceId::Ram))
        };
        assert!(reads_ram(table.opcode_for("ADD").unwrap()));
        assert!(!reads_ram(table.opcode_for("SUB").unwrap()));
    }

    #[test]
    fn only_alu_steps_subtract() {
        let table = InstructionTable::new();
        for (_, inst) in table.iter() {
            for step in inst.steps() {
                if step.subtract {
                    assert_eq!(step.source, Some(DeviceId::Alu));
                }
            }
        }
    }

    #[test]
    fn max_steps() {
        assert_eq!(InstructionTable::new().max_steps(), 12);
    }

    #[test]
    #[should_panic]
    fn opcode_out_of_range() {
        InstructionTable::new().get(16);
    }
}

//===========================================================================//
