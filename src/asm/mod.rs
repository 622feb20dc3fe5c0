//! Facilities for assembling source files into RAM images.

mod error;

use crate::dev::RAM_SIZE;
use crate::isa::InstructionTable;
use crate::parse::{
    AsmModuleAst, AsmStmtAst, IdentifierAst, InstructionAst, OperandAst,
    OperandValue, SrcLoc,
};
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::collections::HashMap;

pub use error::{AsmError, AsmErrorKind, AsmResult};

//===========================================================================//

const MAX_OPERAND: u8 = 0x0f;

//===========================================================================//

/// Assembles source code into a RAM image, one byte per instruction or data
/// directive.  Each instruction byte holds the opcode in its high nibble and
/// the operand (zero if omitted) in its low nibble.
///
/// Either the whole program assembles, or every error found is returned and
/// no bytes are produced.
pub fn assemble(source: &str) -> AsmResult<Vec<u8>> {
    let module = AsmModuleAst::parse_source(source).map_err(|errors| {
        errors.into_iter().map(AsmError::from).collect::<Vec<_>>()
    })?;
    assemble_ast(&module)
}

/// Assembles an already-parsed module into a RAM image.
pub fn assemble_ast(module: &AsmModuleAst) -> AsmResult<Vec<u8>> {
    let mut assembler = Assembler::new();
    assembler.collect_labels(&module.statements);
    assembler.visit_statements(&module.statements);
    assembler.finish()
}

//===========================================================================//

struct Assembler {
    table: InstructionTable,
    labels: HashMap<String, u8>,
    image: Vec<u8>,
    errors: Vec<AsmError>,
}

impl Assembler {
    fn new() -> Assembler {
        Assembler {
            table: InstructionTable::new(),
            labels: HashMap::new(),
            image: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn collect_labels(&mut self, statements: &[AsmStmtAst]) {
        let mut addr: usize = 0;
        for statement in statements {
            match statement {
                AsmStmtAst::Label(id) => self.define_label(id, addr),
                AsmStmtAst::Instruction(_) | AsmStmtAst::U8(_) => addr += 1,
            }
        }
    }

    fn define_label(&mut self, id: &IdentifierAst, addr: usize) {
        if self.labels.contains_key(&id.name) {
            let kind = AsmErrorKind::DuplicateLabel(id.name.clone());
            self.error(id.location, kind);
        } else {
            // Addresses past the end of RAM only matter if something refers
            // to them, in which case they fail the operand range check.
            let addr = u8::try_from(addr).unwrap_or(u8::MAX);
            self.labels.insert(id.name.clone(), addr);
        }
    }

    fn visit_statements(&mut self, statements: &[AsmStmtAst]) {
        for statement in statements {
            match statement {
                AsmStmtAst::Instruction(inst) => self.visit_instruction(inst),
                AsmStmtAst::Label(_) => {}
                AsmStmtAst::U8(operand) => self.visit_u8(operand),
            }
        }
    }

    fn visit_instruction(&mut self, inst: &InstructionAst) {
        let opcode = match self.table.opcode_for(&inst.mnemonic.name) {
            Some(opcode) => opcode,
            None => {
                let name = inst.mnemonic.name.clone();
                let kind = AsmErrorKind::UnknownInstruction(name);
                self.error(inst.mnemonic.location, kind);
                0
            }
        };
        let operand = match &inst.operand {
            Some(operand) => self
                .resolve(operand, MAX_OPERAND)
                .unwrap_or_else(|value| {
                    let kind = AsmErrorKind::OperandOutOfRange(value);
                    self.error(operand.location, kind);
                    0
                }),
            None => 0,
        };
        self.emit(inst.mnemonic.location, (opcode << 4) | operand);
    }

    fn visit_u8(&mut self, operand: &OperandAst) {
        let byte = self.resolve(operand, u8::MAX).unwrap_or_else(|value| {
            let kind = AsmErrorKind::ByteOutOfRange(value);
            self.error(operand.location, kind);
            0
        });
        self.emit(operand.location, byte);
    }

    /// Returns the value of the operand if it is in `0..=max`, or the
    /// out-of-range value otherwise.  Undefined labels are reported here and
    /// resolve to zero.
    fn resolve(
        &mut self,
        operand: &OperandAst,
        max: u8,
    ) -> Result<u8, BigInt> {
        let value = match &operand.value {
            OperandValue::Literal(value) => value.clone(),
            OperandValue::Label(name) => match self.labels.get(name) {
                Some(&addr) => BigInt::from(addr),
                None => {
                    let kind = AsmErrorKind::UndefinedLabel(name.clone());
                    self.error(operand.location, kind);
                    return Ok(0);
                }
            },
        };
        match value.to_u8() {
            Some(byte) if byte <= max => Ok(byte),
            _ => Err(value),
        }
    }

    fn emit(&mut self, location: SrcLoc, byte: u8) {
        if self.image.len() == RAM_SIZE {
            self.error(location, AsmErrorKind::ProgramTooLarge);
        }
        self.image.push(byte);
    }

    fn error(&mut self, location: SrcLoc, kind: AsmErrorKind) {
        self.errors.push(AsmError { location, kind });
    }

    fn finish(self) -> AsmResult<Vec<u8>> {
        if self.errors.is_empty() { Ok(self.image) } else { Err(self.errors) }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{AsmErrorKind, assemble};
    use num_bigint::BigInt;

    fn error_kinds(source: &str) -> Vec<(u32, AsmErrorKind)> {
        assemble(source)
            .unwrap_err()
            .into_iter()
            .map(|error| (error.line(), error.kind))
            .collect()
    }

    #[test]
    fn ldi_then_halt() {
        assert_eq!(assemble("LDI 5\nHLT"), Ok(vec![0x55, 0xf0]));
    }

    #[test]
    fn mnemonics_ignore_case() {
        assert_eq!(
            assemble("ldi 5\nOut\nhlt\n"),
            Ok(vec![0x55, 0xe0, 0xf0])
        );
    }

    #[test]
    fn operand_defaults_to_zero() {
        assert_eq!(assemble("NOP\nJMP\n"), Ok(vec![0x00, 0x60]));
    }

    #[test]
    fn operand_bounds() {
        assert_eq!(assemble("LDA 0\nLDA 15\n"), Ok(vec![0x10, 0x1f]));
        assert_eq!(
            error_kinds("LDA 16"),
            vec![(1, AsmErrorKind::OperandOutOfRange(BigInt::from(16)))]
        );
    }

    #[test]
    fn unknown_instruction() {
        assert_eq!(
            error_kinds("LDI 1\nFOO 1\n"),
            vec![(2, AsmErrorKind::UnknownInstruction("FOO".to_string()))]
        );
    }

    #[test]
    fn reports_every_error() {
        assert_eq!(
            error_kinds("FOO 1\nADD 99\nJMP nowhere\n"),
            vec![
                (1, AsmErrorKind::UnknownInstruction("FOO".to_string())),
                (2, AsmErrorKind::OperandOutOfRange(BigInt::from(99))),
                (3, AsmErrorKind::UndefinedLabel("nowhere".to_string())),
            ]
        );
    }

    #[test]
    fn labels() {
        let source = "\
            start: LDI 3\n\
            loop:\n\
            SUB 1\n\
            JZ done\n\
            JMP loop\n\
            done: HLT\n";
        assert_eq!(
            assemble(source),
            Ok(vec![0x53, 0x31, 0x84, 0x61, 0xf0])
        );
    }

    #[test]
    fn duplicate_label() {
        assert_eq!(
            error_kinds("x: NOP\nx: NOP\n"),
            vec![(2, AsmErrorKind::DuplicateLabel("x".to_string()))]
        );
    }

    #[test]
    fn data_bytes() {
        assert_eq!(
            assemble("LDA value\nHLT\nvalue: .U8 200\n"),
            Ok(vec![0x12, 0xf0, 200])
        );
        assert_eq!(
            error_kinds(".U8 256"),
            vec![(1, AsmErrorKind::ByteOutOfRange(BigInt::from(256)))]
        );
    }

    #[test]
    fn program_too_large() {
        let source = "NOP\n".repeat(17);
        assert_eq!(
            error_kinds(&source),
            vec![(17, AsmErrorKind::ProgramTooLarge)]
        );
        assert_eq!(assemble(&"NOP\n".repeat(16)), Ok(vec![0; 16]));
    }

    #[test]
    fn syntax_error() {
        let errors = error_kinds("LDI 1 2\n");
        assert!(!errors.is_empty());
        assert!(matches!(errors[0], (1, AsmErrorKind::Syntax(_))));
    }

    #[test]
    fn error_display() {
        let errors = assemble("HLT\nSTA 16\n").unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "line 2: operand out of range (0-15): 16"
        );
    }
}

//===========================================================================//
