use std::fmt;

//===========================================================================//

/// A location within a source code file.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SrcLoc {
    /// The line number within the file.  The file starts on line 1.
    pub line: u32,
    /// The column number within the line.  Each line starts at column 0.
    pub column: usize,
}

impl SrcLoc {
    /// Constructs the location for the start of a source code file.
    pub fn start() -> SrcLoc {
        SrcLoc { line: 1, column: 0 }
    }
}

impl fmt::Display for SrcLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

//===========================================================================//

/// A specialized `Result` type for parsing operations.
pub type ParseResult<V> = Result<V, Vec<ParseError>>;

//===========================================================================//

/// An error encountered while parsing a source code file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParseError {
    /// The location in the file where the error occurred.
    pub location: SrcLoc,
    /// The error message to report to the user.
    pub message: String,
}

impl ParseError {
    /// Constructs a parse error with the given location and message.
    pub fn new(location: SrcLoc, message: String) -> ParseError {
        ParseError { location, message }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

impl std::error::Error for ParseError {}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::{ParseError, SrcLoc};

    #[test]
    fn display() {
        let location = SrcLoc { line: 3, column: 7 };
        assert_eq!(location.to_string(), "3:7");
        let error = ParseError::new(location, "bad".to_string());
        assert_eq!(error.to_string(), "3:7: bad");
        assert_eq!(SrcLoc::start().to_string(), "1:0");
    }
}

//===========================================================================//
