use std::fmt;

/// Searchable codes for every compile-time diagnostic.
///
/// The first digit names the phase:
/// - E0xxx: lexer
/// - E1xxx: parser
/// - E2xxx: analysis
/// - E3xxx: unit loading
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unrecognized character
    E0001,
    /// Unterminated string literal
    E0002,
    /// Malformed number literal
    E0003,
    /// Invalid escape sequence
    E0004,
    /// Malformed datetime literal
    E0005,
    /// Unterminated block comment
    E0006,

    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Expected identifier
    E1004,
    /// Invalid pattern
    E1005,

    /// Duplicate binding
    E2001,
    /// Unresolved reference
    E2002,
    /// Reference to a non-value
    E2003,
    /// Illegal cycle
    E2004,
    /// Too many closure captures
    E2005,
    /// Native function access denied
    E2006,
    /// Invalid metadata
    E2007,

    /// Unit not found on the load path
    E3001,
    /// Unit could not be read
    E3002,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
        }
    }

    pub fn is_parse_error(self) -> bool {
        matches!(self.as_str().as_bytes()[1], b'0' | b'1')
    }

    pub fn is_analysis_error(self) -> bool {
        self.as_str().as_bytes()[1] == b'2'
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
