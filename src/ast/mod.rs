//! Abstract Syntax Tree (AST) definitions for EL expressions
//!
//! This module provides the types used to represent parsed templates and
//! the expressions embedded in them.

#![warn(missing_docs)]

mod expression;
mod operator;
mod template;
mod visitor;

pub use expression::*;
pub use operator::*;
pub use template::*;
pub use visitor::*;
