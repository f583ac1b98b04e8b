//! Crate-level error type

use thiserror::Error;

use crate::config::ConfigError;
use crate::evaluator::EvaluationError;
use crate::model::CoercionError;
use crate::parser::ParseError;
use crate::registry::FunctionError;

/// Result type alias for engine operations
pub type ElResult<T> = Result<T, ElError>;

/// Any failure surfaced by the expression engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ElError {
    /// The template text is malformed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Evaluation failed
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// The result could not be converted to the expected type
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// A function failed outside of an evaluation
    #[error(transparent)]
    Function(#[from] FunctionError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ElError {
    /// Whether the error comes from malformed template text
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse(_))
    }

    /// Character offset of a parse error
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Parse(error) => Some(error.position),
            _ => None,
        }
    }
}
