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

//! variables:exists(container, name)

use super::{VARIABLES_PREFIX, container_param, name_param, non_null_value};
use crate::model::{ElType, ElValue};
use crate::registry::function::{ElFunction, FunctionContext, FunctionResult};
use crate::registry::signature::FunctionSignature;

/// variables:exists() - whether the variable exists with a non-null value
pub struct ExistsFunction;

impl ElFunction for ExistsFunction {
    fn prefix(&self) -> &str {
        VARIABLES_PREFIX
    }
    fn name(&self) -> &str {
        "exists"
    }
    fn signature(&self) -> &FunctionSignature {
        static SIG: std::sync::LazyLock<FunctionSignature> = std::sync::LazyLock::new(|| {
            FunctionSignature::new(
                "variables:exists",
                vec![container_param(), name_param()],
                ElType::BOOLEAN,
            )
        });
        &SIG
    }
    fn documentation(&self) -> &str {
        "Returns `true` when the variable exists and its value is not null."
    }
    fn evaluate(&self, args: &[ElValue], _context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        Ok(ElValue::Boolean(non_null_value(&args[0], &args[1]).is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::functions::variables::test_support::{call, scope};
    use rstest::rstest;

    #[rstest]
    #[case("myVar", true)]
    #[case("nothing", false)]
    #[case("missing", false)]
    fn test_exists(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(
            call(&ExistsFunction, &[scope(), name.into()]).unwrap(),
            ElValue::Boolean(expected)
        );
    }
}
