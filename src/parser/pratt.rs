//! Pratt parser for embedded expressions
//!
//! Binding power comes from [`BinaryOperator::precedence`]. The ternary
//! sits below every binary operator and associates to the right; unary
//! operators bind tighter than any binary one, and postfix navigation
//! (`.name`, `.name(...)`, `[expr]`) binds tightest.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::span::{SourceText, Spanned};
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{BinaryOperator, ExpressionNode, LiteralValue, UnaryOperator};

/// Binary operator for a token, if it is one
#[inline]
fn binary_operator(token: &Token) -> Option<BinaryOperator> {
    let op = match token {
        Token::Equal => BinaryOperator::Equal,
        Token::NotEqual => BinaryOperator::NotEqual,
        Token::And => BinaryOperator::And,
        Token::Or => BinaryOperator::Or,
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Subtract,
        Token::Multiply => BinaryOperator::Multiply,
        Token::Divide => BinaryOperator::Divide,
        Token::Modulo => BinaryOperator::Modulo,
        Token::LessThan => BinaryOperator::LessThan,
        Token::LessThanOrEqual => BinaryOperator::LessThanOrEqual,
        Token::GreaterThan => BinaryOperator::GreaterThan,
        Token::GreaterThanOrEqual => BinaryOperator::GreaterThanOrEqual,
        Token::Concat => BinaryOperator::Concatenate,
        _ => return None,
    };
    Some(op)
}

/// Recursive-descent parser with precedence climbing for binary operators
pub struct PrattParser<'s, 'a> {
    source: &'s SourceText<'a>,
    tokenizer: Tokenizer<'s, 'a>,
    current: Option<Spanned<Token>>,
    /// Position of the `${` / `#{` opener when parsing inside a template
    opener: Option<usize>,
}

impl<'s, 'a> PrattParser<'s, 'a> {
    /// Parser starting at character offset `start`
    pub fn new(source: &'s SourceText<'a>, start: usize, opener: Option<usize>) -> ParseResult<Self> {
        let mut tokenizer = Tokenizer::new(source, start);
        let current = tokenizer.next_token()?;
        Ok(Self {
            source,
            tokenizer,
            current,
            opener,
        })
    }

    fn advance(&mut self) -> ParseResult<Option<Spanned<Token>>> {
        let next = self.tokenizer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// Token after the current one, without consuming anything
    fn peek(&self) -> Option<Spanned<Token>> {
        self.tokenizer.clone().next_token().ok().flatten()
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match &self.current {
            Some(token) => ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: token.value.to_string(),
                    expected: expected.to_string(),
                },
                self.source.as_str(),
                token.start,
            ),
            None => match self.opener {
                Some(opener) => ParseError::new(
                    ParseErrorKind::UnclosedExpression,
                    self.source.as_str(),
                    opener,
                ),
                None => ParseError::new(
                    ParseErrorKind::UnexpectedEnd {
                        expected: expected.to_string(),
                    },
                    self.source.as_str(),
                    self.source.len(),
                ),
            },
        }
    }

    fn check(&self, expected: &Token) -> bool {
        self.current.as_ref().is_some_and(|t| &t.value == expected)
    }

    fn expect(&mut self, expected: Token) -> ParseResult<Spanned<Token>> {
        if self.check(&expected) {
            if let Some(token) = self.advance()? {
                return Ok(token);
            }
        }
        Err(self.unexpected(&format!("'{expected}'")))
    }

    /// Name-like text of a token: identifiers and keywords spelled as words
    fn word(&self, token: &Spanned<Token>) -> Option<String> {
        match &token.value {
            Token::Identifier(name) => Some(name.clone()),
            Token::Instanceof => None,
            _ => {
                let text = self.source.slice(token.start, token.end);
                let is_word = text.chars().next().is_some_and(|c| c.is_alphabetic());
                is_word.then_some(text)
            }
        }
    }

    /// Parse an expression terminated by `}`; returns the offset after it
    pub fn parse_embedded(mut self) -> ParseResult<(ExpressionNode, usize)> {
        let expr = self.parse_expression()?;
        let close = self.expect(Token::RightBrace)?;
        Ok((expr, close.end))
    }

    /// Parse an expression that must span the rest of the input
    pub fn parse_complete(mut self) -> ParseResult<ExpressionNode> {
        let expr = self.parse_expression()?;
        if self.current.is_some() {
            return Err(self.unexpected("end of expression"));
        }
        Ok(expr)
    }

    /// expression := binary ('?' expression ':' expression)?
    pub fn parse_expression(&mut self) -> ParseResult<ExpressionNode> {
        let condition = self.parse_binary(0)?;
        if !self.check(&Token::Question) {
            return Ok(condition);
        }
        self.advance()?;
        let then_branch = self.parse_expression()?;
        self.expect(Token::Colon)?;
        let else_branch = self.parse_expression()?;
        Ok(ExpressionNode::conditional(condition, then_branch, else_branch))
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_unary()?;

        while let Some(op) = self.current.as_ref().and_then(|t| binary_operator(&t.value)) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let right = self.parse_binary(precedence + 1)?;
            left = ExpressionNode::binary_op(left, op, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<ExpressionNode> {
        let operator = match self.current.as_ref().map(|t| &t.value) {
            Some(Token::Minus) => UnaryOperator::Negate,
            Some(Token::Not) => UnaryOperator::Not,
            Some(Token::Empty) => UnaryOperator::Empty,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance()?;
        let operand = self.parse_unary()?;
        Ok(ExpressionNode::unary_op(operator, operand))
    }

    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        let Some(token) = self.current.clone() else {
            return Err(self.unexpected("expression"));
        };
        let end = token.end;

        let node = match token.value {
            Token::Long(v) => ExpressionNode::literal(LiteralValue::Long(v)),
            Token::Double(v) => ExpressionNode::literal(LiteralValue::Double(v)),
            Token::String(s) => ExpressionNode::literal(LiteralValue::String(s)),
            Token::Boolean(b) => ExpressionNode::literal(LiteralValue::Boolean(b)),
            Token::Null => ExpressionNode::literal(LiteralValue::Null),
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(Token::RightParen)?;
                return Ok(inner);
            }
            Token::Identifier(name) => return self.parse_identifier(name, end),
            _ => return Err(self.unexpected("expression")),
        };

        self.advance()?;
        Ok(node)
    }

    /// identifier | name '(' args ')' | prefix ':' name '(' args ')'
    fn parse_identifier(&mut self, name: String, name_end: usize) -> ParseResult<ExpressionNode> {
        self.advance()?;

        if self.check(&Token::LeftParen) {
            let arguments = self.parse_arguments()?;
            return Ok(ExpressionNode::function_call(None, name, arguments));
        }

        // `prefix:name(`, with no whitespace around the colon
        let colon_adjacent = self
            .current
            .as_ref()
            .is_some_and(|t| t.value == Token::Colon && t.start == name_end);
        if colon_adjacent {
            let colon_end = self.current.as_ref().map_or(0, |t| t.end);
            let local = self
                .peek()
                .filter(|t| t.start == colon_end)
                .and_then(|t| self.word(&t));
            if let Some(local) = local {
                let mut lookahead = self.tokenizer.clone();
                let after = lookahead.next_token().ok().flatten();
                let then_paren = lookahead
                    .next_token()
                    .ok()
                    .flatten()
                    .is_some_and(|t| t.value == Token::LeftParen);
                if after.is_some() && then_paren {
                    self.advance()?;
                    self.advance()?;
                    let arguments = self.parse_arguments()?;
                    return Ok(ExpressionNode::function_call(Some(name), local, arguments));
                }
            }
        }

        Ok(ExpressionNode::identifier(name))
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<ExpressionNode>> {
        self.expect(Token::LeftParen)?;
        let mut arguments = Vec::new();
        if self.check(&Token::RightParen) {
            self.advance()?;
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_expression()?);
            if self.check(&Token::Comma) {
                self.advance()?;
                continue;
            }
            self.expect(Token::RightParen)?;
            return Ok(arguments);
        }
    }

    fn parse_postfix(&mut self, mut node: ExpressionNode) -> ParseResult<ExpressionNode> {
        loop {
            if self.check(&Token::Dot) {
                self.advance()?;
                let name = match self.current.as_ref().and_then(|t| self.word(t)) {
                    Some(name) => name,
                    None => return Err(self.unexpected("property or method name")),
                };
                self.advance()?;
                node = if self.check(&Token::LeftParen) {
                    let arguments = self.parse_arguments()?;
                    ExpressionNode::method_call(node, name, arguments)
                } else {
                    ExpressionNode::property_access(node, name)
                };
            } else if self.check(&Token::LeftBracket) {
                self.advance()?;
                let index = self.parse_expression()?;
                self.expect(Token::RightBracket)?;
                node = match index {
                    ExpressionNode::Literal(LiteralValue::String(name))
                        if self.check(&Token::LeftParen) =>
                    {
                        let arguments = self.parse_arguments()?;
                        ExpressionNode::method_call(node, name, arguments)
                    }
                    index => ExpressionNode::index_access(node, index),
                };
            } else {
                return Ok(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(input: &str) -> ParseResult<ExpressionNode> {
        let source = SourceText::new(input);
        PrattParser::new(&source, 0, None)?.parse_complete()
    }

    fn canonical(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[rstest]
    #[case("1 + 2 * 3", "(1 + (2 * 3))")]
    #[case("(1 + 2) * 3", "((1 + 2) * 3)")]
    #[case("a - b - c", "((a - b) - c)")]
    #[case("a || b && c", "(a || (b && c))")]
    #[case("a == 1 and b lt 2", "((a == 1) && (b < 2))")]
    #[case("a += b + 1", "(a += (b + 1))")]
    #[case("-a * b", "(-a * b)")]
    #[case("not empty x", "!empty x")]
    #[case("a mod 2 eq 0", "((a % 2) == 0)")]
    fn test_precedence(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical(input), expected);
    }

    #[test]
    fn test_nested_ternary_is_right_associative() {
        assert_eq!(canonical("a ? b : c ? d : e"), "(a ? b : (c ? d : e))");
        assert_eq!(canonical("a?b:c"), canonical("a   ?   b   :   c"));
    }

    #[test]
    fn test_navigation() {
        assert_eq!(canonical("bean.name"), "bean.name");
        assert_eq!(canonical("bean.doTest('apple', 1)"), "bean.doTest('apple', 1)");
        assert_eq!(canonical("items[0].name"), "items[0].name");
        assert_eq!(canonical("bean['doTest']('x')"), "bean.doTest('x')");
        assert_eq!(canonical("map['key']"), "map['key']");
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(
            canonical("variables:get(planItemInstance, 'x')"),
            "variables:get(planItemInstance, 'x')"
        );
        assert_eq!(canonical("vars:empty(x)"), "vars:empty(x)");
        assert_eq!(canonical("now()"), "now()");
        assert_eq!(canonical("a ? b : c(1)"), "(a ? b : c(1))");
    }

    #[test]
    fn test_errors() {
        let err = parse("a +").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedEnd { .. }));
        assert_eq!(err.position, 3);

        let err = parse("a b").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
        assert_eq!(err.position, 2);

        let err = parse("a instanceof b").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
    }
}
