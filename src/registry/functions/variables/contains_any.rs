//! variables:containsAny(container, name, values...)

use super::contains::contains_value;
use super::{VARIABLES_PREFIX, container_param, name_param, non_null_value};
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// variables:containsAny() - whether the variable contains at least one of
/// the given values
pub struct ContainsAnyFunction;

impl ElFunction for ContainsAnyFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "containsAny"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::variadic(
                "variables:containsAny",
                vec![
                    container_param(),
                    name_param(),
                    ParameterInfo::required("values", ElType::Object),
                ],
                ElType::BOOLEAN,
            )
        });
        &SIG
    }
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let Some(value) = non_null_value(&args[0], &args[1]) else {
            return Ok(ElValue::Boolean(false));
        };
        for needle in &args[2..] {
            if contains_value(&value, needle, context.types)? {
                return Ok(ElValue::Boolean(true));
            }
        }
        Ok(ElValue::Boolean(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};

    #[test]
    fn test_contains_any() {
        let f = ContainsAnyFunction;
        assert_eq!(
            call(&f, &[scope(), "fruits".into(), "plum".into(), "pear".into()]).unwrap(),
            ElValue::Boolean(true)
        );
        assert_eq!(
            call(&f, &[scope(), "fruits".into(), "plum".into()]).unwrap(),
            ElValue::Boolean(false)
        );
    }
}
