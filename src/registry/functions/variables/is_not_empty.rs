//! variables:isNotEmpty(container, name)

use super::{VARIABLES_PREFIX, container_param, name_param, variable_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::FunctionSignature;

/// variables:isNotEmpty() - negation of variables:isEmpty()
pub struct IsNotEmptyFunction;

impl ElFunction for IsNotEmptyFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "isNotEmpty"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:isNotEmpty",
                vec![container_param(), name_param()],
                ElType::BOOLEAN,
            )
        });
        &SIG
    }
    fn evaluate(&self, args: &[ElValue], _context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let not_empty = variable_value(&args[0], &args[1])
            .is_some_and(|value| !operators::is_empty(&value));
        Ok(ElValue::Boolean(not_empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};

    #[test]
    fn test_is_not_empty() {
        assert_eq!(
            call(&IsNotEmptyFunction, &[scope(), "name".into()]).unwrap(),
            ElValue::Boolean(true)
        );
        assert_eq!(
            call(&IsNotEmptyFunction, &[scope(), "missing".into()]).unwrap(),
            ElValue::Boolean(false)
        );
    }
}
