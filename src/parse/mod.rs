//! Facilities for parsing assembly code.

mod asm;
mod atom;
mod lex;
mod types;

pub use asm::{
    AsmModuleAst, AsmStmtAst, IdentifierAst, InstructionAst, OperandAst,
    OperandValue,
};
pub use lex::{Token, TokenLexer, TokenValue};
pub use types::{ParseError, ParseResult, SrcLoc};

//===========================================================================//
