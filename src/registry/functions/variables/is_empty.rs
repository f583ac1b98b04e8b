//! variables:isEmpty(container, name)

use super::{VARIABLES_PREFIX, container_param, name_param, variable_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::FunctionSignature;

/// variables:isEmpty() - whether the variable is missing, null, or an empty
/// string, collection or JSON container
pub struct IsEmptyFunction;

impl ElFunction for IsEmptyFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "isEmpty"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:isEmpty",
                vec![container_param(), name_param()],
                ElType::BOOLEAN,
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns `true` when the variable is missing, null, an empty string, or an empty collection, map or JSON container."
    }
    fn evaluate(&self, args: &[ElValue], _context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let empty = variable_value(&args[0], &args[1])
            .map(|value| operators::is_empty(&value))
            .unwrap_or(true);
        Ok(ElValue::Boolean(empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};
    use rstest::rstest;

    #[rstest]
    #[case("missing", true)]
    #[case("nothing", true)]
    #[case("emptyText", true)]
    #[case("name", false)]
    #[case("fruits", false)]
    fn test_is_empty(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(
            call(&IsEmptyFunction, &[scope(), name.into()]).unwrap(),
            ElValue::Boolean(expected)
        );
    }
}
