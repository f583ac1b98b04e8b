//! variables:get(container, name)

use super::{VARIABLES_PREFIX, container_param, name_param, variable_value};
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::FunctionSignature;

/// variables:get() - raw value of the variable, null when missing
pub struct GetFunction;

impl ElFunction for GetFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "get"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:get",
                vec![container_param(), name_param()],
                ElType::Object,
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the value of the variable, or null when it does not exist."
    }
    fn evaluate(&self, args: &[ElValue], _context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        Ok(variable_value(&args[0], &args[1]).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};

    #[test]
    fn test_get() {
        assert_eq!(
            call(&GetFunction, &[scope(), "name".into()]).unwrap(),
            ElValue::from("Kermit")
        );
        assert_eq!(
            call(&GetFunction, &[scope(), "missing".into()]).unwrap(),
            ElValue::Null
        );
    }
}
