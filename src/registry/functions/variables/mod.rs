// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `variables:*` functions over a variable scope
//!
//! Every function takes the scope as its first argument. Workflow authors
//! normally write the shorthand forms (`var:eq(x, 1)`), which the
//! [`VariableFunctionEnhancer`](crate::enhancer::VariableFunctionEnhancer)
//! rewrites to the canonical call with the scope injected.

mod comparison;
mod contains;
mod contains_any;
mod equals;
mod exists;
mod get;
mod get_or_default;
mod is_empty;
mod is_not_empty;
mod not_equals;

pub use comparison::{ComparisonKind, VariableComparisonFunction};
pub use contains::ContainsFunction;
pub use contains_any::ContainsAnyFunction;
pub use equals::EqualsFunction;
pub use exists::ExistsFunction;
pub use get::GetFunction;
pub use get_or_default::GetOrDefaultFunction;
pub use is_empty::IsEmptyFunction;
pub use is_not_empty::IsNotEmptyFunction;
pub use not_equals::NotEqualsFunction;

use crate::model::{ElType, ElValue, JsonNode, TypeCoercion};
use crate::registry::function::{FunctionError, FunctionRegistry};
use crate::registry::signature::ParameterInfo;

/// Namespace prefix of the variable functions
pub const VARIABLES_PREFIX: &str = "variables";

/// Register all variable functions
pub fn register_variable_functions(registry: &mut FunctionRegistry) {
    registry.register(EqualsFunction);
    registry.register(NotEqualsFunction);
    registry.register(ExistsFunction);
    registry.register(GetFunction);
    registry.register(GetOrDefaultFunction);
    for kind in [
        ComparisonKind::LowerThan,
        ComparisonKind::LowerThanOrEquals,
        ComparisonKind::GreaterThan,
        ComparisonKind::GreaterThanOrEquals,
    ] {
        registry.register(VariableComparisonFunction::new(kind));
    }
    registry.register(IsEmptyFunction);
    registry.register(IsNotEmptyFunction);
    registry.register(ContainsFunction);
    registry.register(ContainsAnyFunction);
}

/// Value of variable `name` in `container`
///
/// Scopes, host objects exposing a scope, maps and JSON objects can act as
/// the container. `None` when the container is of any other kind or has no
/// such variable.
pub(crate) fn variable_value(container: &ElValue, name: &ElValue) -> Option<ElValue> {
    let name = match name {
        ElValue::Null => return None,
        other => TypeCoercion::coerce_to_string(other).ok()?,
    };
    if let Some(scope) = container.as_variable_container() {
        return if scope.has_variable(&name) {
            scope.get_variable(&name)
        } else {
            None
        };
    }
    match container {
        ElValue::Map(entries) => entries.read().get(&name).cloned(),
        ElValue::Json(node @ JsonNode::Object(_)) => node.get(&name).map(|n| n.to_el_value()),
        _ => None,
    }
}

/// Value of variable `name`, treating a null value as absent
pub(crate) fn non_null_value(container: &ElValue, name: &ElValue) -> Option<ElValue> {
    variable_value(container, name).filter(|v| !v.is_null())
}

pub(crate) fn container_param() -> ParameterInfo {
    ParameterInfo::required("container", ElType::Object)
}

pub(crate) fn name_param() -> ParameterInfo {
    ParameterInfo::required("variableName", ElType::Object)
}

pub(crate) fn evaluation_error(name: &str, error: impl std::fmt::Display) -> FunctionError {
    FunctionError::EvaluationError {
        name: format!("{VARIABLES_PREFIX}:{name}"),
        message: error.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::model::{ElValue, MapVariableContainer};
    use crate::registry::TypeRegistry;
    use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};

    pub fn scope() -> ElValue {
        ElValue::container(
            MapVariableContainer::new()
                .with_variable("myVar", 123)
                .with_variable("name", "Kermit")
                .with_variable("nothing", ElValue::Null)
                .with_variable("emptyText", "")
                .with_variable(
                    "fruits",
                    ElValue::list(vec!["apple".into(), "pear".into()]),
                ),
        )
    }

    pub fn call(function: &dyn ElFunction, args: &[ElValue]) -> FunctionResult<ElValue> {
        let types = TypeRegistry::new();
        let context = FunctionContext::new(&types);
        function.validate_args(args, &types)?;
        function.evaluate(args, &context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapVariableContainer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_container_kinds() {
        let name = ElValue::from("a");
        let scope = ElValue::container(MapVariableContainer::new().with_variable("a", 1));
        let map = ElValue::map([("a", ElValue::from(1))]);
        let json = ElValue::Json(JsonNode::from_serde(&json!({"a": 1})));
        for container in [scope, map, json] {
            assert_eq!(variable_value(&container, &name), Some(ElValue::from(1)));
        }
        assert_eq!(variable_value(&ElValue::from("text"), &name), None);
        assert_eq!(variable_value(&ElValue::Null, &name), None);
    }

    #[test]
    fn test_registration() {
        let mut registry = FunctionRegistry::new();
        register_variable_functions(&mut registry);
        assert_eq!(
            registry.function_names(),
            vec![
                "variables:contains",
                "variables:containsAny",
                "variables:equals",
                "variables:exists",
                "variables:get",
                "variables:getOrDefault",
                "variables:greaterThan",
                "variables:greaterThanOrEquals",
                "variables:isEmpty",
                "variables:isNotEmpty",
                "variables:lowerThan",
                "variables:lowerThanOrEquals",
                "variables:notEquals",
            ]
        );
    }
}
