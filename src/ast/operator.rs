//! Operator definitions for EL expressions
//!
//! This module defines the binary and unary operators of the expression
//! grammar together with their precedence.

use std::fmt;

/// Binary operators in EL expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic operators
    /// Addition (+)
    Add,
    /// Subtraction (-)
    Subtract,
    /// Multiplication (*)
    Multiply,
    /// Division (/, div)
    Divide,
    /// Modulo (%, mod)
    Modulo,

    // Comparison operators
    /// Equality (==, eq)
    Equal,
    /// Inequality (!=, ne)
    NotEqual,
    /// Less than (<, lt)
    LessThan,
    /// Less than or equal (<=, le)
    LessThanOrEqual,
    /// Greater than (>, gt)
    GreaterThan,
    /// Greater than or equal (>=, ge)
    GreaterThanOrEqual,

    // Logical operators
    /// Logical AND (&&, and)
    And,
    /// Logical OR (||, or)
    Or,

    // String operators
    /// String concatenation (+=)
    Concatenate,
}

/// Unary operators in EL expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation (-)
    Negate,
    /// Logical negation (!, not)
    Not,
    /// Emptiness test (empty)
    Empty,
}

impl BinaryOperator {
    /// Get the precedence level of this operator (higher = binds tighter)
    pub fn precedence(self) -> u8 {
        match self {
            Self::Multiply | Self::Divide | Self::Modulo => 7,
            Self::Add | Self::Subtract => 6,
            Self::Concatenate => 5,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual => {
                4
            }
            Self::Equal | Self::NotEqual => 3,
            Self::And => 2,
            Self::Or => 1,
        }
    }

    /// Check if this operator is arithmetic
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    /// Check if this operator compares its operands
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    /// Check if this operator is logical (short-circuiting)
    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Canonical symbol
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Concatenate => "+=",
        }
    }
}

impl UnaryOperator {
    /// Canonical symbol
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Negate => "-",
            Self::Not => "!",
            Self::Empty => "empty ",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
