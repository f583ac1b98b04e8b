//! JSON node navigation

use super::{ElResolver, Resolution, ResolverContext, property_name};
use crate::evaluator::error::EvaluationResult;
use crate::model::{ElValue, JsonNode, NumberKind, TypeCoercion};

/// Fields of JSON objects and elements of JSON arrays
///
/// Value nodes are read as plain values (`"text"` as a string, numbers as
/// numbers); objects and arrays stay JSON nodes so navigation can continue.
/// Writes create the node kind matching the written value; values without
/// a JSON counterpart become a null node.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonResolver;

fn array_index(node: &JsonNode, property: &ElValue) -> Option<usize> {
    if !node.is_array() {
        return None;
    }
    TypeCoercion::coerce_to_number(property, NumberKind::Long)
        .ok()
        .and_then(|n| n.to_i64())
        .and_then(|i| usize::try_from(i).ok())
}

impl ElResolver for JsonResolver {
    fn name(&self) -> &str {
        "json"
    }

    fn get_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        let Some(ElValue::Json(node)) = base else {
            return Ok(Resolution::NotHandled);
        };
        let child = match array_index(node, property) {
            Some(index) => node.get_index(index),
            None => node.get(&property_name(property)?),
        };
        Ok(Resolution::Handled(
            child.map(|c| c.to_el_value()).unwrap_or_default(),
        ))
    }

    fn set_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let Some(ElValue::Json(node)) = base else {
            return Ok(false);
        };
        let child = JsonNode::from_el_value(&value);
        Ok(match array_index(node, property) {
            Some(index) => node.set_index(index, child),
            None => node.set(&property_name(property)?, child),
        })
    }
}
