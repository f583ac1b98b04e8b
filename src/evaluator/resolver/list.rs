//! Lists and arrays by index

use super::{ElResolver, Resolution, ResolverContext};
use crate::evaluator::error::{EvaluationError, EvaluationResult};
use crate::model::{ElValue, NumberKind, TypeCoercion};

/// `list[index]` and `array[index]`; an index out of range reads as `null`
#[derive(Debug, Clone, Copy, Default)]
pub struct ListResolver;

fn index_of(property: &ElValue) -> EvaluationResult<i64> {
    let number = TypeCoercion::coerce_to_number(property, NumberKind::Long)?;
    Ok(number.to_i64().unwrap_or(-1))
}

impl ElResolver for ListResolver {
    fn name(&self) -> &str {
        "list"
    }

    fn get_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        let items = match base {
            Some(ElValue::List(items)) => items,
            Some(ElValue::Array(array)) => &array.items,
            _ => return Ok(Resolution::NotHandled),
        };
        let index = index_of(property)?;
        let value = usize::try_from(index)
            .ok()
            .and_then(|i| items.read().get(i).cloned())
            .unwrap_or_default();
        Ok(Resolution::Handled(value))
    }

    fn set_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let (items, value) = match base {
            Some(ElValue::List(items)) => (items, value),
            Some(ElValue::Array(array)) => (
                &array.items,
                TypeCoercion::coerce_to_type(&value, &array.element_type, context.types)?,
            ),
            _ => return Ok(false),
        };
        let index = index_of(property)?;
        let mut items = items.write();
        let len = items.len();
        match usize::try_from(index).ok().filter(|&i| i < len) {
            Some(i) => {
                items[i] = value;
                Ok(true)
            }
            None => Err(EvaluationError::PropertyNotFound {
                property: format!("[{index}]"),
                class: format!("list of size {len}"),
            }),
        }
    }
}
