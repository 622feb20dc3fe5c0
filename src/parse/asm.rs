//! Facilities for parsing assembly source code.

use super::atom::{PError, directive, end_of_line, symbol};
use super::lex::{Token, TokenLexer, TokenValue};
use super::types::{ParseError, ParseResult, SrcLoc};
use chumsky::{self, IterParser, Parser};
use num_bigint::BigInt;

//===========================================================================//

/// The abstract syntax tree for an assembly file.
#[derive(Debug)]
pub struct AsmModuleAst {
    /// The statements in this file, in source order.  Blank and comment-only
    /// lines produce no statements.
    pub statements: Vec<AsmStmtAst>,
}

impl AsmModuleAst {
    /// Parses assembly source code.
    pub fn parse_source(source: &str) -> ParseResult<AsmModuleAst> {
        let lexer = TokenLexer::new(source);
        let tokens: Vec<Token> =
            lexer.collect::<Result<_, _>>().map_err(|error| vec![error])?;
        AsmModuleAst::parser()
            .parse(tokens.as_slice())
            .into_result()
            .map_err(|errors| {
                errors
                    .into_iter()
                    .map(|error| {
                        let index = error.span().start;
                        let location = match tokens.get(index) {
                            Some(token) => token.start,
                            None => end_location(&tokens),
                        };
                        let found = match error.found() {
                            Some(token) => token.value.name(),
                            None => "end of input",
                        };
                        let message = format!("unexpected {found}");
                        ParseError::new(location, message)
                    })
                    .collect()
            })
    }

    fn parser<'a>() -> impl Parser<'a, &'a [Token], AsmModuleAst, PError<'a>>
    {
        AsmStmtAst::parser()
            .repeated()
            .collect::<Vec<_>>()
            .then_ignore(chumsky::prelude::end())
            .map(|statements| AsmModuleAst {
                statements: statements.into_iter().flatten().collect(),
            })
    }
}

fn end_location(tokens: &[Token]) -> SrcLoc {
    tokens.last().map_or(SrcLoc::start(), |token| token.start)
}

//===========================================================================//

/// The abstract syntax tree for a single statement in an assembly file.
#[derive(Debug)]
pub enum AsmStmtAst {
    /// An instruction, e.g. `ADD 14`.
    Instruction(InstructionAst),
    /// A label, e.g. `loop:`.
    Label(IdentifierAst),
    /// A `.U8` directive, which emits a single raw data byte.
    U8(OperandAst),
}

impl AsmStmtAst {
    /// Parses one line's worth of input (or just a label, which may share a
    /// line with whatever follows it).  Blank lines parse as `None`.
    fn parser<'a>()
    -> impl Parser<'a, &'a [Token], Option<AsmStmtAst>, PError<'a>> + Clone
    {
        let label = IdentifierAst::parser()
            .then_ignore(symbol(TokenValue::Colon))
            .map(|id| Some(AsmStmtAst::Label(id)));
        let u8_dir = directive(".U8")
            .ignore_then(OperandAst::parser())
            .then_ignore(end_of_line())
            .map(|operand| Some(AsmStmtAst::U8(operand)));
        let instruction = IdentifierAst::parser()
            .then(OperandAst::parser().or_not())
            .then_ignore(end_of_line())
            .map(|(mnemonic, operand)| {
                Some(AsmStmtAst::Instruction(InstructionAst {
                    mnemonic,
                    operand,
                }))
            });
        let blank = symbol(TokenValue::Linebreak).map(|_| None);
        chumsky::prelude::choice((label, u8_dir, instruction, blank))
    }
}

//===========================================================================//

/// The abstract syntax tree for an instruction line.
#[derive(Debug)]
pub struct InstructionAst {
    /// The instruction's mnemonic, as written.
    pub mnemonic: IdentifierAst,
    /// The operand, if one was given.
    pub operand: Option<OperandAst>,
}

//===========================================================================//

/// An identifier (a mnemonic or label name) in an assembly file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IdentifierAst {
    /// The location of the identifier.
    pub location: SrcLoc,
    /// The identifier's name, as written.
    pub name: String,
}

impl IdentifierAst {
    fn parser<'a>()
    -> impl Parser<'a, &'a [Token], IdentifierAst, PError<'a>> + Clone {
        chumsky::prelude::any()
            .filter(|token: &Token| {
                matches!(token.value, TokenValue::Identifier(_))
            })
            .map(|token: Token| match token.value {
                TokenValue::Identifier(name) => {
                    IdentifierAst { location: token.start, name }
                }
                _ => unreachable!(),
            })
            .labelled("identifier")
    }
}

//===========================================================================//

/// An instruction operand or data value in an assembly file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OperandAst {
    /// The location of the operand.
    pub location: SrcLoc,
    /// The operand's value.
    pub value: OperandValue,
}

/// The value of an [`OperandAst`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OperandValue {
    /// A label reference, resolved to that label's address.
    Label(String),
    /// An integer literal, not yet range-checked.
    Literal(BigInt),
}

impl OperandAst {
    fn parser<'a>()
    -> impl Parser<'a, &'a [Token], OperandAst, PError<'a>> + Clone {
        chumsky::prelude::any()
            .filter(|token: &Token| {
                matches!(
                    token.value,
                    TokenValue::Identifier(_) | TokenValue::IntLiteral(_)
                )
            })
            .map(|token: Token| {
                let value = match token.value {
                    TokenValue::Identifier(name) => OperandValue::Label(name),
                    TokenValue::IntLiteral(int) => OperandValue::Literal(int),
                    _ => unreachable!(),
                };
                OperandAst { location: token.start, value }
            })
            .labelled("operand")
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{AsmModuleAst, AsmStmtAst, OperandValue};
    use crate::parse::{ParseError, SrcLoc};
    use num_bigint::BigInt;

    fn parse(source: &str) -> Vec<AsmStmtAst> {
        AsmModuleAst::parse_source(source).unwrap().statements
    }

    fn parse_error(source: &str) -> ParseError {
        let mut errors = AsmModuleAst::parse_source(source).unwrap_err();
        assert!(!errors.is_empty());
        errors.remove(0)
    }

    #[test]
    fn blank_and_comment_lines() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n; nothing here\n   \n").is_empty());
    }

    #[test]
    fn instructions() {
        let statements = parse("LDI 5 ; five\nOUT\nHLT");
        assert_eq!(statements.len(), 3);
        match &statements[0] {
            AsmStmtAst::Instruction(inst) => {
                assert_eq!(inst.mnemonic.name, "LDI");
                assert_eq!(inst.mnemonic.location, SrcLoc::start());
                let operand = inst.operand.as_ref().unwrap();
                assert_eq!(
                    operand.value,
                    OperandValue::Literal(BigInt::from(5))
                );
            }
            other => panic!("unexpected statement: {other:?}"),
        }
        match &statements[2] {
            AsmStmtAst::Instruction(inst) => {
                assert_eq!(inst.mnemonic.name, "HLT");
                assert_eq!(inst.mnemonic.location.line, 3);
                assert!(inst.operand.is_none());
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn label_shares_line() {
        let statements = parse("top: JMP top\n");
        assert_eq!(statements.len(), 2);
        match &statements[0] {
            AsmStmtAst::Label(id) => assert_eq!(id.name, "top"),
            other => panic!("unexpected statement: {other:?}"),
        }
        match &statements[1] {
            AsmStmtAst::Instruction(inst) => {
                let operand = inst.operand.as_ref().unwrap();
                assert_eq!(operand.value, OperandValue::Label("top".into()));
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn u8_directive() {
        let statements = parse(".u8 $ff");
        match &statements[0] {
            AsmStmtAst::U8(operand) => {
                assert_eq!(
                    operand.value,
                    OperandValue::Literal(BigInt::from(255))
                );
            }
            other => panic!("unexpected statement: {other:?}"),
        }
    }

    #[test]
    fn extra_operand() {
        let error = parse_error("LDI 5\nLDI 5 6\n");
        assert_eq!(error.location.line, 2);
        assert!(error.message.starts_with("unexpected "));
    }

    #[test]
    fn lexer_error() {
        let error = parse_error("OUT @\n");
        assert_eq!(error.location, SrcLoc { line: 1, column: 4 });
    }
}

//===========================================================================//
