//! Parse error types
//!
//! Every parse failure carries the full source text and the character
//! offset where it was detected. Errors are never recovered from.

use std::fmt;

use thiserror::Error;

/// Result type for parse operations
pub type ParseResult<T> = Result<T, ParseError>;

/// What went wrong while lexing or parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// String literal without a closing quote
    UnterminatedString,
    /// Backslash followed by something other than `\`, `'` or `"`
    InvalidEscape {
        /// Character after the backslash
        escaped: char,
    },
    /// Character that cannot start a token
    UnexpectedCharacter {
        /// The offending character
        character: char,
    },
    /// Token that does not fit the grammar here
    UnexpectedToken {
        /// Token found
        found: String,
        /// What the parser was looking for
        expected: String,
    },
    /// Input ended in the middle of an expression
    UnexpectedEnd {
        /// What the parser was looking for
        expected: String,
    },
    /// `${` and `#{` used in the same template
    MixedDelimiters,
    /// Numeric literal that does not fit its type
    InvalidNumber {
        /// Literal text
        literal: String,
    },
    /// `${` or `#{` without a matching `}`
    UnclosedExpression,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::InvalidEscape { escaped } => {
                write!(f, "invalid escape sequence '\\{escaped}' in string literal")
            }
            Self::UnexpectedCharacter { character } => {
                write!(f, "unexpected character '{character}'")
            }
            Self::UnexpectedToken { found, expected } => {
                write!(f, "unexpected token '{found}', expected {expected}")
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of expression, expected {expected}")
            }
            Self::MixedDelimiters => write!(f, "mixing '${{' and '#{{' is not allowed"),
            Self::InvalidNumber { literal } => write!(f, "invalid number literal '{literal}'"),
            Self::UnclosedExpression => write!(f, "expression is missing its closing '}}'"),
        }
    }
}

/// A lexical or syntax error in a template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error parsing '{expression}': {kind} at position {position}")]
pub struct ParseError {
    /// What went wrong
    pub kind: ParseErrorKind,
    /// Full source text being parsed
    pub expression: String,
    /// Character offset into `expression`
    pub position: usize,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(kind: ParseErrorKind, expression: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            expression: expression.into(),
            position,
        }
    }

    /// Whether the error comes from the lexer rather than the grammar
    pub fn is_lexical(&self) -> bool {
        matches!(
            self.kind,
            ParseErrorKind::UnterminatedString
                | ParseErrorKind::InvalidEscape { .. }
                | ParseErrorKind::UnexpectedCharacter { .. }
                | ParseErrorKind::MixedDelimiters
                | ParseErrorKind::InvalidNumber { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_source_and_position() {
        let err = ParseError::new(ParseErrorKind::UnterminatedString, "${'abc}", 2);
        assert_eq!(
            err.to_string(),
            "Error parsing '${'abc}': unterminated string literal at position 2"
        );
        assert!(err.is_lexical());
    }
}
