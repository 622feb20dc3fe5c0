use super::types::{ParseError, SrcLoc};
use logos::{self, Logos};
use num_bigint::BigInt;

//===========================================================================//

struct LexerState {
    line: u32,
    start_of_line: usize,
    start_of_previous_line: usize,
}

impl Default for LexerState {
    fn default() -> LexerState {
        LexerState { line: 1, start_of_line: 0, start_of_previous_line: 0 }
    }
}

//===========================================================================//

fn binary_literal_callback(
    lexer: &mut logos::Lexer<TokenKind>,
) -> Option<BigInt> {
    signed_literal(lexer.slice(), 1, 2)
}

fn decimal_literal_callback(
    lexer: &mut logos::Lexer<TokenKind>,
) -> Option<BigInt> {
    signed_literal(lexer.slice(), 0, 10)
}

fn hex_literal_callback(
    lexer: &mut logos::Lexer<TokenKind>,
) -> Option<BigInt> {
    signed_literal(lexer.slice(), 1, 16)
}

/// Parses a literal with an optional leading `-`, followed by a radix prefix
/// of `prefix_len` bytes, followed by digits.
fn signed_literal(
    slice: &str,
    prefix_len: usize,
    radix: u32,
) -> Option<BigInt> {
    let (negative, rest) = match slice.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, slice),
    };
    let digits = &rest.as_bytes()[prefix_len..];
    let magnitude = BigInt::parse_bytes(digits, radix)?;
    Some(if negative { -magnitude } else { magnitude })
}

fn newline_callback(lexer: &mut logos::Lexer<TokenKind>) {
    lexer.extras.line += 1;
    lexer.extras.start_of_previous_line = lexer.extras.start_of_line;
    lexer.extras.start_of_line = lexer.span().end;
}

#[derive(Debug, Eq, Logos, PartialEq)]
#[logos(extras = LexerState)]
#[logos(skip r"[ \t\r]+")] // whitespace
#[logos(skip r";[^\n]*")] // comments
enum TokenKind {
    #[token(":")]
    Colon,
    #[regex(r"\.[_A-Za-z][_A-Za-z0-9]*")]
    Directive,
    #[regex(r"[_A-Za-z][_A-Za-z0-9]*")]
    Identifier,
    #[regex(r"-?%[01]+", binary_literal_callback)]
    #[regex(r"-?[0-9]+", decimal_literal_callback)]
    #[regex(r"-?\$[0-9A-Fa-f]+", hex_literal_callback)]
    IntLiteral(BigInt),
    #[regex(r"\n", newline_callback)]
    Linebreak,
}

impl TokenKind {
    fn lexer_location(lexer: &logos::Lexer<TokenKind>) -> SrcLoc {
        SrcLoc {
            line: lexer.extras.line,
            column: lexer.span().start - lexer.extras.start_of_line,
        }
    }

    fn location(&self, lexer: &logos::Lexer<TokenKind>) -> SrcLoc {
        if let &TokenKind::Linebreak = self {
            SrcLoc {
                line: lexer.extras.line - 1,
                column: lexer.span().start
                    - lexer.extras.start_of_previous_line,
            }
        } else {
            TokenKind::lexer_location(lexer)
        }
    }

    fn into_token(self, lexer: &logos::Lexer<TokenKind>) -> Token {
        let start = self.location(lexer);
        let value = match self {
            TokenKind::Colon => TokenValue::Colon,
            TokenKind::Directive => {
                TokenValue::Directive(lexer.slice().to_string())
            }
            TokenKind::Identifier => {
                TokenValue::Identifier(lexer.slice().to_string())
            }
            TokenKind::IntLiteral(int) => TokenValue::IntLiteral(int),
            TokenKind::Linebreak => TokenValue::Linebreak,
        };
        Token { start, value }
    }
}

//===========================================================================//

/// The contents of a single lexical token.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TokenValue {
    /// A "`:`" symbol.
    Colon,
    /// A directive name, including its leading "`.`".
    Directive(String),
    /// An identifier or mnemonic.
    Identifier(String),
    /// An integer literal.
    IntLiteral(BigInt),
    /// A linebreak.
    Linebreak,
}

impl TokenValue {
    /// Returns the human-readable name for this kind of token.
    pub fn name(&self) -> &'static str {
        match &self {
            TokenValue::Colon => "colon",
            TokenValue::Directive(_) => "directive",
            TokenValue::Identifier(_) => "identifier",
            TokenValue::IntLiteral(_) => "int literal",
            TokenValue::Linebreak => "linebreak",
        }
    }
}

//===========================================================================//

/// A single lexical token, including location information.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// The location in the file of the start of the token.
    pub start: SrcLoc,
    /// The contents of the token.
    pub value: TokenValue,
}

//===========================================================================//

/// A lexer for tokenizing an input file.
pub struct TokenLexer<'a> {
    lexer: logos::Lexer<'a, TokenKind>,
}

impl<'a> TokenLexer<'a> {
    /// Constructs a new lexer in its initial state.
    pub fn new(input: &'a str) -> TokenLexer<'a> {
        TokenLexer { lexer: TokenKind::lexer(input) }
    }
}

impl Iterator for TokenLexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Result<Token, ParseError>> {
        match self.lexer.next()? {
            Ok(kind) => Some(Ok(kind.into_token(&self.lexer))),
            Err(()) => {
                let location = TokenKind::lexer_location(&self.lexer);
                let message = format!(
                    "invalid character: {}",
                    self.lexer.slice().escape_debug()
                );
                Some(Err(ParseError { location, message }))
            }
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{ParseError, Token, TokenLexer, TokenValue};
    use crate::parse::SrcLoc;
    use num_bigint::BigInt;

    fn token(line: u32, column: usize, value: TokenValue) -> Token {
        Token { start: SrcLoc { line, column }, value }
    }

    fn int(line: u32, column: usize, value: i64) -> Token {
        token(line, column, TokenValue::IntLiteral(BigInt::from(value)))
    }

    fn ident(line: u32, column: usize, name: &str) -> Token {
        token(line, column, TokenValue::Identifier(name.to_string()))
    }

    fn read_all(input: &str) -> Vec<Token> {
        TokenLexer::new(input).collect::<Result<_, _>>().unwrap()
    }

    fn expect_error(input: &str) -> ParseError {
        for result in TokenLexer::new(input) {
            if let Err(error) = result {
                return error;
            }
        }
        panic!("no error occurred");
    }

    #[test]
    fn empty_input() {
        assert_eq!(read_all(""), vec![]);
    }

    #[test]
    fn comment() {
        assert_eq!(read_all("; count down from five"), vec![]);
        assert_eq!(read_all(";"), vec![]);
    }

    #[test]
    fn instruction_with_trailing_comment() {
        assert_eq!(
            read_all("  LDI 5 ; load\nHLT"),
            vec![
                ident(1, 2, "LDI"),
                int(1, 6, 5),
                token(1, 14, TokenValue::Linebreak),
                ident(2, 0, "HLT"),
            ]
        );
    }

    #[test]
    fn int_literal_radixes() {
        assert_eq!(
            read_all("12 $1f %101"),
            vec![int(1, 0, 12), int(1, 3, 0x1f), int(1, 7, 0b101)]
        );
    }

    #[test]
    fn negative_int_literals() {
        assert_eq!(
            read_all("-1 -$1f -%101"),
            vec![int(1, 0, -1), int(1, 3, -0x1f), int(1, 8, -0b101)]
        );
    }

    #[test]
    fn huge_int_literal() {
        let tokens = read_all("123456789012345678901234567890");
        let expected: BigInt =
            "123456789012345678901234567890".parse().unwrap();
        assert_eq!(
            tokens,
            vec![token(1, 0, TokenValue::IntLiteral(expected))]
        );
    }

    #[test]
    fn label_and_directive() {
        assert_eq!(
            read_all("one: .U8 1"),
            vec![
                ident(1, 0, "one"),
                token(1, 3, TokenValue::Colon),
                token(1, 5, TokenValue::Directive(".U8".to_string())),
                int(1, 9, 1),
            ]
        );
    }

    #[test]
    fn crlf_linebreaks() {
        assert_eq!(
            read_all("OUT\r\nHLT\r\n"),
            vec![
                ident(1, 0, "OUT"),
                token(1, 4, TokenValue::Linebreak),
                ident(2, 0, "HLT"),
                token(2, 4, TokenValue::Linebreak),
            ]
        );
    }

    #[test]
    fn invalid_token() {
        assert_eq!(
            expect_error("LDI 5\nSUB #1\n"),
            ParseError {
                location: SrcLoc { line: 2, column: 4 },
                message: "invalid character: #".to_string(),
            }
        );
    }
}

//===========================================================================//
