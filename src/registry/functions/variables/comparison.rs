//! variables:lowerThan, lowerThanOrEquals, greaterThan, greaterThanOrEquals

use std::cmp::Ordering;

use super::{VARIABLES_PREFIX, container_param, evaluation_error, name_param, non_null_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// Relational test applied by a [`VariableComparisonFunction`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKind {
    /// `<`
    LowerThan,
    /// `<=`
    LowerThanOrEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEquals,
}

impl ComparisonKind {
    /// Local function name
    pub fn function_name(self) -> &'static str {
        match self {
            ComparisonKind::LowerThan => "lowerThan",
            ComparisonKind::LowerThanOrEquals => "lowerThanOrEquals",
            ComparisonKind::GreaterThan => "greaterThan",
            ComparisonKind::GreaterThanOrEquals => "greaterThanOrEquals",
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            ComparisonKind::LowerThan => ordering == Ordering::Less,
            ComparisonKind::LowerThanOrEquals => ordering != Ordering::Greater,
            ComparisonKind::GreaterThan => ordering == Ordering::Greater,
            ComparisonKind::GreaterThanOrEquals => ordering != Ordering::Less,
        }
    }
}

/// Relational comparison of a variable against a value; a missing or null
/// variable compares as `false`
pub struct VariableComparisonFunction {
    kind: ComparisonKind,
    signature: FunctionSignature,
}

impl VariableComparisonFunction {
    /// Create the function for one relational test
    pub fn new(kind: ComparisonKind) -> Self {
        Self {
            kind,
            signature: FunctionSignature::new(
                format!("{VARIABLES_PREFIX}:{}", kind.function_name()),
                vec![
                    container_param(),
                    name_param(),
                    ParameterInfo::required("value", ElType::Object),
                ],
                ElType::BOOLEAN,
            ),
        }
    }
}

impl ElFunction for VariableComparisonFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        self.kind.function_name()
    }
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
    fn documentation(&self) -> &str {
        "Compares the variable with `value` using the EL relational operators. A missing or null variable yields `false`."
    }
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let Some(value) = non_null_value(&args[0], &args[1]) else {
            return Ok(ElValue::Boolean(false));
        };
        if args[2].is_null() {
            return Ok(ElValue::Boolean(false));
        }
        let ordering = operators::compare(&value, &args[2], context.types)
            .map_err(|e| evaluation_error(self.name(), e))?;
        Ok(ElValue::Boolean(self.kind.accepts(ordering)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};
    use rstest::rstest;

    #[rstest]
    #[case(ComparisonKind::LowerThan, 124, true)]
    #[case(ComparisonKind::LowerThan, 123, false)]
    #[case(ComparisonKind::LowerThanOrEquals, 123, true)]
    #[case(ComparisonKind::GreaterThan, 122, true)]
    #[case(ComparisonKind::GreaterThan, 123, false)]
    #[case(ComparisonKind::GreaterThanOrEquals, 123, true)]
    fn test_numeric_comparison(
        #[case] kind: ComparisonKind,
        #[case] value: i64,
        #[case] expected: bool,
    ) {
        let f = VariableComparisonFunction::new(kind);
        assert_eq!(
            call(&f, &[scope(), "myVar".into(), value.into()]).unwrap(),
            ElValue::Boolean(expected)
        );
    }

    #[test]
    fn test_missing_variable_is_false_for_every_kind() {
        for kind in [
            ComparisonKind::LowerThan,
            ComparisonKind::LowerThanOrEquals,
            ComparisonKind::GreaterThan,
            ComparisonKind::GreaterThanOrEquals,
        ] {
            let f = VariableComparisonFunction::new(kind);
            assert_eq!(
                call(&f, &[scope(), "missing".into(), 1.into()]).unwrap(),
                ElValue::Boolean(false)
            );
        }
    }
}
