//! variables:equals(container, name, value)

use super::{VARIABLES_PREFIX, container_param, evaluation_error, name_param, variable_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// variables:equals() - whether the variable exists and equals the value
pub struct EqualsFunction;

impl ElFunction for EqualsFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "equals"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:equals",
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
        "Returns `true` when the variable exists and is equal to `value` by the `==` operator. A missing variable yields `false`."
    }
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let Some(value) = variable_value(&args[0], &args[1]) else {
            return Ok(ElValue::Boolean(false));
        };
        operators::equals(&value, &args[2], context.types)
            .map(ElValue::Boolean)
            .map_err(|e| evaluation_error(self.name(), e))
    }
}
