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

//! variables:getOrDefault(container, name, default)

use super::{VARIABLES_PREFIX, container_param, name_param, non_null_value};
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::{FunctionSignature, ParameterInfo};

/// variables:getOrDefault() - value of the variable, or the default when it
/// is missing or null
pub struct GetOrDefaultFunction;

impl ElFunction for GetOrDefaultFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "getOrDefault"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:getOrDefault",
                vec![
                    container_param(),
                    name_param(),
                    ParameterInfo::required("defaultValue", ElType::Object),
                ],
                ElType::Object,
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns the value of the variable, or `defaultValue` when the variable is missing or null."
    }
    fn evaluate(&self, args: &[ElValue], _context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        Ok(non_null_value(&args[0], &args[1]).unwrap_or_else(|| args[2].clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};

    #[test]
    fn test_get_or_default() {
        let f = GetOrDefaultFunction;
        assert_eq!(
            call(&f, &[scope(), "myVar".into(), 1.into()]).unwrap(),
            ElValue::from(123)
        );
        assert_eq!(
            call(&f, &[scope(), "nothing".into(), "fallback".into()]).unwrap(),
            ElValue::from("fallback")
        );
        assert_eq!(
            call(&f, &[scope(), "missing".into(), "fallback".into()]).unwrap(),
            ElValue::from("fallback")
        );
    }
}
