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

//! variables:contains(container, name, values...)

use super::{VARIABLES_PREFIX, container_param, evaluation_error, name_param, non_null_value};
use crate::evaluator::operators;
use crate::model::{ElType, ElValue, JsonNode, TypeCoercion};
use crate::registry::TypeRegistry;
use crate::registry::function::{ElFunction, FunctionContext, FunctionError, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// variables:contains() - whether a string variable contains every given
/// substring, or a collection variable contains every given element
pub struct ContainsFunction;

impl ElFunction for ContainsFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "contains"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::variadic(
                "variables:contains",
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
    fn documentation(&self) -> &str {
        "Returns `true` when every value is contained in the variable: as a substring for string variables, as an element for collections and JSON arrays. A missing or null variable yields `false`."
    }
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        let Some(value) = non_null_value(&args[0], &args[1]) else {
            return Ok(ElValue::Boolean(false));
        };
        let mut all = true;
        for needle in &args[2..] {
            if !contains_value(&value, needle, context.types)
                .map_err(|e| evaluation_error(self.name(), e))?
            {
                all = false;
                break;
            }
        }
        Ok(ElValue::Boolean(all))
    }
}

/// Whether `haystack` contains `needle`; values that are neither strings
/// nor collections contain nothing
pub(crate) fn contains_value(
    haystack: &ElValue,
    needle: &ElValue,
    types: &TypeRegistry,
) -> Result<bool, FunctionError> {
    let in_items = |items: &[ElValue]| -> Result<bool, FunctionError> {
        for item in items {
            if operators::equals(item, needle, types)
                .map_err(|e| evaluation_error("contains", e))?
            {
                return Ok(true);
            }
        }
        Ok(false)
    };
    match haystack {
        ElValue::String(text) => match needle {
            ElValue::Null => Ok(false),
            other => TypeCoercion::coerce_to_string(other)
                .map(|needle| text.contains(&needle))
                .map_err(|e| evaluation_error("contains", e)),
        },
        ElValue::List(items) => in_items(&items.read()),
        ElValue::Array(array) => in_items(&array.items.read()),
        ElValue::Json(JsonNode::Array(items)) => {
            let values: Vec<ElValue> = items.read().iter().map(|n| n.to_el_value()).collect();
            in_items(&values)
        }
        _ => Ok(false),
    }
}
