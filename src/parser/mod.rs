//! Expression language parser
//!
//! Templates are split into literal text and embedded `${...}` / `#{...}`
//! expressions; each embedded expression is tokenized and parsed into an
//! [`ExpressionNode`](crate::ast::ExpressionNode) tree.

#![warn(missing_docs)]

pub mod error;
pub mod pratt;
pub mod span;
pub mod template;
pub mod tokenizer;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use pratt::PrattParser;
pub use span::{SourceText, Spanned};
pub use template::parse_template;
pub use tokenizer::{Token, Tokenizer};

use crate::ast::ExpressionNode;

/// Parse a bare expression, without `${` / `#{` delimiters
pub fn parse_expression(input: &str) -> ParseResult<ExpressionNode> {
    let source = SourceText::new(input);
    PrattParser::new(&source, 0, None)?.parse_complete()
}
