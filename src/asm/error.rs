use crate::parse::{ParseError, SrcLoc};
use num_bigint::BigInt;
use std::fmt;

//===========================================================================//

/// A specialized `Result` type for assembly operations.
pub type AsmResult<V> = Result<V, Vec<AsmError>>;

//===========================================================================//

/// An error encountered while assembling a program.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AsmError {
    /// The location in the source of the offending line or token.
    pub location: SrcLoc,
    /// What went wrong.
    pub kind: AsmErrorKind,
}

impl AsmError {
    /// Returns the source line number (starting from 1) of the error.
    pub fn line(&self) -> u32 {
        self.location.line
    }
}

impl From<ParseError> for AsmError {
    fn from(error: ParseError) -> AsmError {
        AsmError {
            location: error.location,
            kind: AsmErrorKind::Syntax(error.message),
        }
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.location.line, self.kind)
    }
}

impl std::error::Error for AsmError {}

//===========================================================================//

/// The reason an assembly error occurred.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AsmErrorKind {
    /// A `.U8` value did not fit in a byte.
    ByteOutOfRange(BigInt),
    /// A label was defined more than once.
    DuplicateLabel(String),
    /// An instruction operand did not fit in four bits.
    OperandOutOfRange(BigInt),
    /// The assembled program would not fit in RAM.
    ProgramTooLarge,
    /// The line could not be parsed.
    Syntax(String),
    /// An operand referred to a label that was never defined.
    UndefinedLabel(String),
    /// A mnemonic did not name any instruction.
    UnknownInstruction(String),
}

impl fmt::Display for AsmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmErrorKind::ByteOutOfRange(value) => {
                write!(f, ".U8 value out of range (0-255): {value}")
            }
            AsmErrorKind::DuplicateLabel(name) => {
                write!(f, "label defined more than once: {name}")
            }
            AsmErrorKind::OperandOutOfRange(value) => {
                write!(f, "operand out of range (0-15): {value}")
            }
            AsmErrorKind::ProgramTooLarge => {
                f.write_str("program does not fit in 16 bytes of RAM")
            }
            AsmErrorKind::Syntax(message) => f.write_str(message),
            AsmErrorKind::UndefinedLabel(name) => {
                write!(f, "undefined label: {name}")
            }
            AsmErrorKind::UnknownInstruction(name) => {
                write!(f, "unknown instruction: {name}")
            }
        }
    }
}

//===========================================================================//
