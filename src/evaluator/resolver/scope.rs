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

//! Bare identifiers against the root variable scope

use super::{ElResolver, Resolution, ResolverContext, property_name};
use crate::evaluator::error::{EvaluationError, EvaluationResult};
use crate::model::{ElValue, JsonNode};
use crate::registry::functions::variables::variable_value;

/// Resolves bare identifiers
///
/// A variable of the root scope wins. Otherwise the scope's own name
/// (e.g. `planItemInstance`) evaluates to the root scope itself and the
/// principal variable (e.g. `authenticatedUserId`) to the evaluation's
/// principal.
#[derive(Debug, Clone)]
pub struct ScopeResolver {
    scope_variable: String,
    principal_variable: String,
}

impl ScopeResolver {
    /// Resolver with custom names for the scope and principal variables
    pub fn new(scope_variable: impl Into<String>, principal_variable: impl Into<String>) -> Self {
        Self {
            scope_variable: scope_variable.into(),
            principal_variable: principal_variable.into(),
        }
    }

    /// Name the root scope is reachable under
    pub fn scope_variable(&self) -> &str {
        &self.scope_variable
    }
}

impl Default for ScopeResolver {
    fn default() -> Self {
        Self::new("planItemInstance", "authenticatedUserId")
    }
}

impl ElResolver for ScopeResolver {
    fn name(&self) -> &str {
        "scope"
    }

    fn get_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        if base.is_some() {
            return Ok(Resolution::NotHandled);
        }
        if let Some(value) = context.root.and_then(|root| variable_value(root, property)) {
            return Ok(Resolution::Handled(value));
        }
        let name = property_name(property)?;
        if name == self.scope_variable {
            if let Some(root) = context.root {
                return Ok(Resolution::Handled(root.clone()));
            }
        }
        if name == self.principal_variable {
            return Ok(Resolution::Handled(context.principal.into()));
        }
        Ok(Resolution::NotHandled)
    }

    fn set_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let (None, Some(root)) = (base, context.root) else {
            return Ok(false);
        };
        let name = property_name(property)?;
        let invocation = |source| EvaluationError::Invocation {
            target: format!("setVariable({name})"),
            source,
        };
        if let Some(scope) = root.as_variable_container() {
            scope.set_variable(&name, value).map_err(invocation)?;
            return Ok(true);
        }
        match root {
            ElValue::Map(entries) => {
                entries.write().insert(name, value);
                Ok(true)
            }
            ElValue::Json(node @ JsonNode::Object(_)) => {
                Ok(node.set(&name, JsonNode::from_el_value(&value)))
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MapVariableContainer, VariableContainer};
    use crate::registry::TypeRegistry;
    use std::sync::Arc;

    #[test]
    fn test_scope_and_principal_names() {
        let types = TypeRegistry::new();
        let scope = Arc::new(MapVariableContainer::new().with_variable("a", 1));
        let root = ElValue::Container(scope.clone());
        let context = ResolverContext {
            types: &types,
            root: Some(&root),
            principal: Some("kermit"),
        };
        let resolver = ScopeResolver::default();
        let get = |name: &str| resolver.get_value(&context, None, &name.into()).unwrap();

        assert_eq!(get("a"), Resolution::Handled(ElValue::from(1)));
        assert_eq!(get("planItemInstance"), Resolution::Handled(root.clone()));
        assert_eq!(get("authenticatedUserId"), Resolution::Handled("kermit".into()));
        assert_eq!(get("b"), Resolution::NotHandled);

        assert!(resolver.set_value(&context, None, &"b".into(), 2.into()).unwrap());
        assert_eq!(scope.get_variable("b"), Some(ElValue::from(2)));
    }
}
