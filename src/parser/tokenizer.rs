//! Tokenizer for the expression language
//!
//! The tokenizer walks a [`SourceText`] from the first character after an
//! opening `${` / `#{` and stops when it produces [`Token::RightBrace`].
//! String literals are scanned as a whole, so a `}` inside quotes never
//! closes the expression.

use std::fmt;

use unicode_xid::UnicodeXID;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::span::{SourceText, Spanned};

/// Lexical token
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Integer literal (e.g., 42)
    Long(i64),
    /// Floating point literal (e.g., 3.14, .5, 1e3)
    Double(f64),
    /// String literal with escapes removed
    String(String),
    /// `true` / `false`
    Boolean(bool),
    /// `null`
    Null,

    /// Identifier
    Identifier(String),

    // Arithmetic
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Multiply,
    /// `/` or `div`
    Divide,
    /// `%` or `mod`
    Modulo,
    /// `+=`
    Concat,

    // Comparison
    /// `==` or `eq`
    Equal,
    /// `!=` or `ne`
    NotEqual,
    /// `<` or `lt`
    LessThan,
    /// `<=` or `le`
    LessThanOrEqual,
    /// `>` or `gt`
    GreaterThan,
    /// `>=` or `ge`
    GreaterThanOrEqual,

    // Logical
    /// `&&` or `and`
    And,
    /// `||` or `or`
    Or,
    /// `!` or `not`
    Not,
    /// `empty`
    Empty,
    /// `instanceof` (reserved, never valid)
    Instanceof,

    // Punctuation
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `.`
    Dot,
    /// `,`
    Comma,
    /// `}` closing the expression
    RightBrace,
}

impl Token {
    /// Map a reserved word to its token
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "eq" => Token::Equal,
            "ne" => Token::NotEqual,
            "lt" => Token::LessThan,
            "le" => Token::LessThanOrEqual,
            "gt" => Token::GreaterThan,
            "ge" => Token::GreaterThanOrEqual,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            "div" => Token::Divide,
            "mod" => Token::Modulo,
            "empty" => Token::Empty,
            "instanceof" => Token::Instanceof,
            _ => return None,
        };
        Some(token)
    }

    /// Whether the token can end an operand
    fn ends_operand(&self) -> bool {
        matches!(
            self,
            Token::Long(_)
                | Token::Double(_)
                | Token::String(_)
                | Token::Boolean(_)
                | Token::Null
                | Token::Identifier(_)
                | Token::RightParen
                | Token::RightBracket
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Long(v) => write!(f, "{v}"),
            Token::Double(v) => write!(f, "{v}"),
            Token::String(s) => write!(f, "'{s}'"),
            Token::Boolean(b) => write!(f, "{b}"),
            Token::Null => f.write_str("null"),
            Token::Identifier(name) => f.write_str(name),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Multiply => f.write_str("*"),
            Token::Divide => f.write_str("/"),
            Token::Modulo => f.write_str("%"),
            Token::Concat => f.write_str("+="),
            Token::Equal => f.write_str("=="),
            Token::NotEqual => f.write_str("!="),
            Token::LessThan => f.write_str("<"),
            Token::LessThanOrEqual => f.write_str("<="),
            Token::GreaterThan => f.write_str(">"),
            Token::GreaterThanOrEqual => f.write_str(">="),
            Token::And => f.write_str("&&"),
            Token::Or => f.write_str("||"),
            Token::Not => f.write_str("!"),
            Token::Empty => f.write_str("empty"),
            Token::Instanceof => f.write_str("instanceof"),
            Token::Question => f.write_str("?"),
            Token::Colon => f.write_str(":"),
            Token::LeftParen => f.write_str("("),
            Token::RightParen => f.write_str(")"),
            Token::LeftBracket => f.write_str("["),
            Token::RightBracket => f.write_str("]"),
            Token::Dot => f.write_str("."),
            Token::Comma => f.write_str(","),
            Token::RightBrace => f.write_str("}"),
        }
    }
}

/// Tokenizer over one embedded expression
#[derive(Debug, Clone)]
pub struct Tokenizer<'s, 'a> {
    source: &'s SourceText<'a>,
    pos: usize,
    after_operand: bool,
}

impl<'s, 'a> Tokenizer<'s, 'a> {
    /// Start tokenizing at character offset `start`
    pub fn new(source: &'s SourceText<'a>, start: usize) -> Self {
        Self {
            source,
            pos: start,
            after_operand: false,
        }
    }

    /// Current character offset
    pub fn position(&self) -> usize {
        self.pos
    }

    fn error(&self, kind: ParseErrorKind, position: usize) -> ParseError {
        ParseError::new(kind, self.source.as_str(), position)
    }

    fn peek_char(&self) -> Option<char> {
        self.source.at(self.pos)
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.source.at(self.pos + offset)
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Produce the next token, or `None` at end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Spanned<Token>>> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.peek_char() else {
            return Ok(None);
        };

        let token = match c {
            '\'' | '"' => self.scan_string(c)?,
            '0'..='9' => self.scan_number()?,
            '.' if !self.after_operand && self.peek_char_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.scan_number()?
            }
            c if c.is_xid_start() || c == '_' || c == '$' => self.scan_word(),
            _ => self.scan_operator(c)?,
        };

        self.after_operand = token.ends_operand();
        Ok(Some(Spanned::new(token, start, self.pos)))
    }

    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while self
            .peek_char()
            .is_some_and(|c| c.is_xid_continue() || c == '$')
        {
            self.pos += 1;
        }
        let word = self.source.slice(start, self.pos);
        Token::keyword(&word).unwrap_or(Token::Identifier(word))
    }

    fn scan_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn scan_number(&mut self) -> ParseResult<Token> {
        let start = self.pos;
        let mut floating = false;

        self.scan_digits();
        if self.peek_char() == Some('.') {
            let next = self.peek_char_at(1);
            let fraction = next.is_some_and(|c| c.is_ascii_digit());
            let bare = !next.is_some_and(|c| c.is_xid_start() || c == '.');
            if fraction || bare {
                floating = true;
                self.pos += 1;
                self.scan_digits();
            }
        }
        if matches!(self.peek_char(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_char_at(1), Some('+' | '-')));
            if self.peek_char_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                floating = true;
                self.pos += 1 + sign;
                self.scan_digits();
            }
        }

        let literal = self.source.slice(start, self.pos);
        let invalid = || self.error(ParseErrorKind::InvalidNumber { literal: literal.clone() }, start);
        if floating {
            literal
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Token::Double)
                .ok_or_else(invalid)
        } else {
            literal.parse::<i64>().map(Token::Long).map_err(|_| invalid())
        }
    }

    fn scan_string(&mut self, quote: char) -> ParseResult<Token> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(c) = self.peek_char() else {
                return Err(self.error(ParseErrorKind::UnterminatedString, start));
            };
            self.pos += 1;
            match c {
                '\\' => match self.peek_char() {
                    Some(escaped @ ('\\' | '\'' | '"')) => {
                        value.push(escaped);
                        self.pos += 1;
                    }
                    Some(escaped) => {
                        return Err(self.error(ParseErrorKind::InvalidEscape { escaped }, self.pos - 1));
                    }
                    None => return Err(self.error(ParseErrorKind::UnterminatedString, start)),
                },
                c if c == quote => return Ok(Token::String(value)),
                c => value.push(c),
            }
        }
    }

    fn scan_operator(&mut self, c: char) -> ParseResult<Token> {
        let next = self.peek_char_at(1);
        let (token, width) = match (c, next) {
            ('+', Some('=')) => (Token::Concat, 2),
            ('+', _) => (Token::Plus, 1),
            ('-', _) => (Token::Minus, 1),
            ('*', _) => (Token::Multiply, 1),
            ('/', _) => (Token::Divide, 1),
            ('%', _) => (Token::Modulo, 1),
            ('=', Some('=')) => (Token::Equal, 2),
            ('!', Some('=')) => (Token::NotEqual, 2),
            ('!', _) => (Token::Not, 1),
            ('<', Some('=')) => (Token::LessThanOrEqual, 2),
            ('<', _) => (Token::LessThan, 1),
            ('>', Some('=')) => (Token::GreaterThanOrEqual, 2),
            ('>', _) => (Token::GreaterThan, 1),
            ('&', Some('&')) => (Token::And, 2),
            ('|', Some('|')) => (Token::Or, 2),
            ('?', _) => (Token::Question, 1),
            (':', _) => (Token::Colon, 1),
            ('(', _) => (Token::LeftParen, 1),
            (')', _) => (Token::RightParen, 1),
            ('[', _) => (Token::LeftBracket, 1),
            (']', _) => (Token::RightBracket, 1),
            ('.', _) => (Token::Dot, 1),
            (',', _) => (Token::Comma, 1),
            ('}', _) => (Token::RightBrace, 1),
            (character, _) => {
                return Err(self.error(ParseErrorKind::UnexpectedCharacter { character }, self.pos));
            }
        };
        self.pos += width;
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(input: &str) -> ParseResult<Vec<Token>> {
        let source = SourceText::new(input);
        let mut tokenizer = Tokenizer::new(&source, 0);
        let mut out = Vec::new();
        while let Some(token) = tokenizer.next_token()? {
            out.push(token.value);
        }
        Ok(out)
    }

    #[test]
    fn test_keywords_fold_into_operators() {
        assert_eq!(
            tokens("a eq 1 and not b").unwrap(),
            vec![
                Token::Identifier("a".into()),
                Token::Equal,
                Token::Long(1),
                Token::And,
                Token::Not,
                Token::Identifier("b".into()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("1 2.5 .5 1e3 7.").unwrap(),
            vec![
                Token::Long(1),
                Token::Double(2.5),
                Token::Double(0.5),
                Token::Double(1000.0),
                Token::Double(7.0),
            ]
        );
        assert!(matches!(
            tokens("99999999999999999999"),
            Err(ParseError { kind: ParseErrorKind::InvalidNumber { .. }, position: 0, .. })
        ));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            tokens(r#"'it\'s' "say \"hi\"" 'a\\b' '}'"#).unwrap(),
            vec![
                Token::String("it's".into()),
                Token::String("say \"hi\"".into()),
                Token::String("a\\b".into()),
                Token::String("}".into()),
            ]
        );
    }

    #[test]
    fn test_escaping_delimiters_in_strings_is_rejected() {
        let err = tokens(r"'\${x}'").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidEscape { escaped: '$' });
        assert_eq!(err.position, 1);

        let err = tokens(r"'\#{x}'").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidEscape { escaped: '#' });
    }

    #[test]
    fn test_unterminated_string_reports_start() {
        let err = tokens("a + 'abc").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            tokens("a+=b!=c<=d||!e").unwrap(),
            vec![
                Token::Identifier("a".into()),
                Token::Concat,
                Token::Identifier("b".into()),
                Token::NotEqual,
                Token::Identifier("c".into()),
                Token::LessThanOrEqual,
                Token::Identifier("d".into()),
                Token::Or,
                Token::Not,
                Token::Identifier("e".into()),
            ]
        );
        assert!(matches!(
            tokens("a = b").unwrap_err().kind,
            ParseErrorKind::UnexpectedCharacter { character: '=' }
        ));
    }
}
