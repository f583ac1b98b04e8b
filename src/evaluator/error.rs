//! Error types for expression evaluation

use thiserror::Error;

use crate::model::{CoercionError, ObjectError};
use crate::registry::function::FunctionError;

/// Result type for evaluation operations
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Errors that can occur during evaluation
///
/// An undefined variable is never an error; it evaluates to `null`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// No method with a matching name and arity
    #[error("Method not found: class {class}.{method}({})", arguments.join(", "))]
    MethodNotFound {
        /// Fully qualified class name of the target
        class: String,
        /// Method name
        method: String,
        /// Class names of the actual arguments
        arguments: Vec<String>,
    },

    /// Two or more equally specific overloads apply
    #[error("Unable to find unambiguous method: class {class}.{method}({})", arguments.join(", "))]
    AmbiguousMethod {
        /// Fully qualified class name of the target
        class: String,
        /// Method name
        method: String,
        /// Class names of the actual arguments
        arguments: Vec<String>,
    },

    /// `prefix:name` is not registered
    #[error("Could not resolve function '{name}'")]
    FunctionNotFound {
        /// Qualified function name
        name: String,
    },

    /// Function evaluation error
    #[error("Function error: {0}")]
    Function(#[from] FunctionError),

    /// No resolver handled a property read on a non-null base
    #[error("Property '{property}' not found on type {class}")]
    PropertyNotFound {
        /// Property name
        property: String,
        /// Class of the base object
        class: String,
    },

    /// Property exists but cannot be written
    #[error("Property '{property}' is not writable on type {class}")]
    PropertyNotWritable {
        /// Property name
        property: String,
        /// Class of the base object
        class: String,
    },

    /// A method call or assignment needs a base that evaluated to `null`
    #[error("Target unreachable, '{expression}' returned null")]
    TargetUnreachable {
        /// Canonical text of the base expression
        expression: String,
    },

    /// Value conversion failed
    #[error("Cannot coerce value: {0}")]
    Coercion(#[from] CoercionError),

    /// Arithmetic failure (division by zero, overflow of exact types)
    #[error("Arithmetic error: {message}")]
    Arithmetic {
        /// Error message
        message: String,
    },

    /// A host method or field raised an error
    #[error("Error invoking {target}: {source}")]
    Invocation {
        /// Method or field description
        target: String,
        /// Failure raised by the host
        #[source]
        source: ObjectError,
    },

    /// Expression cannot be assigned to
    #[error("Expression '{expression}' is not an lvalue")]
    NotAssignable {
        /// Canonical text of the expression
        expression: String,
    },

    /// A method expression was requested for something that is not a method call
    #[error("Expression '{expression}' is not a method call")]
    NotAMethod {
        /// Canonical text of the expression
        expression: String,
    },
}

impl EvaluationError {
    /// Arithmetic error with a message
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic {
            message: message.into(),
        }
    }
}
