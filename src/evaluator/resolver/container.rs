//! Variables of a nested scope

use super::bean::read_getter;
use super::{ElResolver, Resolution, ResolverContext, property_name};
use crate::evaluator::error::{EvaluationError, EvaluationResult};
use crate::model::{ElType, ElValue};

/// `scope.variable` where `scope` is a variable container
///
/// A variable of the scope wins; otherwise a getter of the scope's class
/// (`scope.variableNames`) is called, and anything else reads as `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerResolver;

impl ElResolver for ContainerResolver {
    fn name(&self) -> &str {
        "container"
    }

    fn get_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        let Some((base, scope)) = base.and_then(|b| b.as_variable_container().map(|s| (b, s)))
        else {
            return Ok(Resolution::NotHandled);
        };
        let name = property_name(property)?;
        if let Some(value) = scope.get_variable(&name) {
            return Ok(Resolution::Handled(value));
        }
        let ty = base.el_type().unwrap_or(ElType::VariableContainer);
        let value = read_getter(context.types, &ty, base, &name)?;
        Ok(Resolution::Handled(value.unwrap_or_default()))
    }

    fn set_value(
        &self,
        _context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let Some(scope) = base.and_then(ElValue::as_variable_container) else {
            return Ok(false);
        };
        let name = property_name(property)?;
        scope
            .set_variable(&name, value)
            .map_err(|source| EvaluationError::Invocation {
                target: format!("setVariable({name})"),
                source,
            })?;
        Ok(true)
    }
}
