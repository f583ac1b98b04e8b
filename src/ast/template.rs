//! Parsed templates: literal text interleaved with embedded expressions

use std::fmt;

use super::expression::ExpressionNode;
use super::visitor::{ReferenceCollector, Visitor};

/// Delimiter style of a template's embedded expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `${...}`: deferred evaluation
    Deferred,
    /// `#{...}`: immediate evaluation
    Immediate,
}

impl Delimiter {
    /// Opening sequence
    pub fn opener(self) -> &'static str {
        match self {
            Delimiter::Deferred => "${",
            Delimiter::Immediate => "#{",
        }
    }
}

/// A segment of a template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Literal text, escapes already removed
    Text(String),
    /// Embedded expression
    Eval(ExpressionNode),
}

/// A parsed template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// Segments in source order; adjacent text segments are merged
    pub parts: Vec<TemplatePart>,
    /// Delimiter style, `None` for pure literal text
    pub delimiter: Option<Delimiter>,
}

impl Template {
    /// Whether the template has no embedded expression
    pub fn is_literal_text(&self) -> bool {
        self.parts
            .iter()
            .all(|part| matches!(part, TemplatePart::Text(_)))
    }

    /// Whether the template uses `${...}`
    pub fn is_deferred(&self) -> bool {
        self.delimiter == Some(Delimiter::Deferred)
    }

    /// The expression when the template is exactly one embedded expression
    pub fn single_expression(&self) -> Option<&ExpressionNode> {
        match self.parts.as_slice() {
            [TemplatePart::Eval(expr)] => Some(expr),
            _ => None,
        }
    }

    /// Identifiers and functions referenced by all embedded expressions
    pub fn references(&self) -> ReferenceCollector {
        let mut collector = ReferenceCollector::default();
        for part in &self.parts {
            if let TemplatePart::Eval(expr) = part {
                collector.visit_expression(expr);
            }
        }
        collector
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let opener = self.delimiter.unwrap_or(Delimiter::Deferred).opener();
        for part in &self.parts {
            match part {
                TemplatePart::Text(text) => {
                    write!(f, "{}", text.replace("${", "\\${").replace("#{", "\\#{"))?
                }
                TemplatePart::Eval(expr) => write!(f, "{opener}{expr}}}")?,
            }
        }
        Ok(())
    }
}
