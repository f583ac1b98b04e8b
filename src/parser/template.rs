//! Template splitting: literal text and `${...}` / `#{...}` segments
//!
//! A backslash escapes only a directly following `${` or `#{`; before any
//! other character it is kept as-is. One template may use only one
//! delimiter style.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::pratt::PrattParser;
use super::span::SourceText;
use crate::ast::{Delimiter, Template, TemplatePart};

fn delimiter_at(source: &SourceText<'_>, pos: usize) -> Option<Delimiter> {
    if source.starts_with_at(pos, "${") {
        Some(Delimiter::Deferred)
    } else if source.starts_with_at(pos, "#{") {
        Some(Delimiter::Immediate)
    } else {
        None
    }
}

/// Parse a raw template into literal and expression parts
pub fn parse_template(input: &str) -> ParseResult<Template> {
    let source = SourceText::new(input);
    let mut parts = Vec::new();
    let mut text = String::new();
    let mut delimiter: Option<Delimiter> = None;
    let mut pos = 0;

    while let Some(c) = source.at(pos) {
        if c == '\\' {
            if let Some(escaped) = delimiter_at(&source, pos + 1) {
                text.push_str(escaped.opener());
                pos += 3;
                continue;
            }
        }

        let Some(found) = delimiter_at(&source, pos) else {
            text.push(c);
            pos += 1;
            continue;
        };

        match delimiter {
            Some(existing) if existing != found => {
                return Err(ParseError::new(ParseErrorKind::MixedDelimiters, input, pos));
            }
            _ => delimiter = Some(found),
        }

        if !text.is_empty() {
            parts.push(TemplatePart::Text(std::mem::take(&mut text)));
        }
        let (expr, end) = PrattParser::new(&source, pos + 2, Some(pos))?.parse_embedded()?;
        parts.push(TemplatePart::Eval(expr));
        pos = end;
    }

    if !text.is_empty() {
        parts.push(TemplatePart::Text(text));
    }

    Ok(Template { parts, delimiter })
}
