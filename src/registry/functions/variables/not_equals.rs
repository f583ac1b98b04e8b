//! variables:notEquals(container, name, value)

use super::{VARIABLES_PREFIX, container_param, evaluation_error, name_param, variable_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// variables:notEquals() - whether the variable exists and differs from the value
pub struct NotEqualsFunction;

impl ElFunction for NotEqualsFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "notEquals"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:notEquals",
                vec![
                    container_param(),
                    name_param(),
                    ParameterInfo::required("value", ElType::Object),
                ],
                ElType::BOOLEAN,
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns `true` when the variable exists and is not equal to `value`. A missing variable yields `false`, not `true`."
    }
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let Some(value) = variable_value(&args[0], &args[1]) else {
            return Ok(ElValue::Boolean(false));
        };
        operators::equals(&value, &args[2], context.types)
            .map(|equal| ElValue::Boolean(!equal))
            .map_err(|e| evaluation_error(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};

    #[test]
    fn test_missing_variable_is_not_unequal() {
        let f = NotEqualsFunction;
        assert_eq!(
            call(&f, &[scope(), "missing".into(), 1.into()]).unwrap(),
            ElValue::Boolean(false)
        );
        assert_eq!(
            call(&f, &[scope(), "myVar".into(), 1.into()]).unwrap(),
            ElValue::Boolean(true)
        );
        assert_eq!(
            call(&f, &[scope(), "myVar".into(), 123.into()]).unwrap(),
            ElValue::Boolean(false)
        );
    }
}
