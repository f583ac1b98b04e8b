//! Maps by key

use super::{ElResolver, Resolution, ResolverContext, property_name};
use crate::evaluator::error::EvaluationResult;
use crate::model::ElValue;

/// `map.key` and `map['key']`; a missing key reads as `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct MapResolver;

impl ElResolver for MapResolver {
    fn name(&self) -> &str {
        "map"
    }

    fn get_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        let Some(ElValue::Map(entries)) = base else {
            return Ok(Resolution::NotHandled);
        };
        let key = property_name(property)?;
        Ok(Resolution::Handled(
            entries.read().get(&key).cloned().unwrap_or_default(),
        ))
    }

    fn set_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let Some(ElValue::Map(entries)) = base else {
            return Ok(false);
        };
        entries.write().insert(property_name(property)?, value);
        Ok(true)
    }
}
