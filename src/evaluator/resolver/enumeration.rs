//! Enum constants

use super::{ElResolver, Resolution, ResolverContext};
use crate::evaluator::error::EvaluationResult;
use crate::model::ElValue;

/// Any property of an enum constant that no getter answered reads as the
/// constant's `name()`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumResolver;

impl ElResolver for EnumResolver {
    fn name(&self) -> &str {
        "enum"
    }

    fn get_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        _property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        Ok(match base {
            Some(ElValue::Enum(constant)) => {
                Resolution::Handled(ElValue::String(constant.name.to_string()))
            }
            _ => Resolution::NotHandled,
        })
    }
}
