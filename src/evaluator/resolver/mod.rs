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

//! Property resolution chain
//!
//! Reads and writes of `base.property`, `base[property]` and bare
//! identifiers go through an ordered list of [`ElResolver`]s. The first
//! resolver that reports [`Resolution::Handled`] answers the lookup, even
//! when its answer is `null`; later resolvers are not consulted.
//!
//! The standard order is:
//!
//! 1. [`ScopeResolver`]: bare identifiers against the root variable scope
//! 2. custom resolvers, in registration order
//! 3. [`BeanResolver`]: `getX()`/`isX()` getters, public fields, `setX(v)`
//! 4. [`ListResolver`]: lists and arrays by index
//! 5. [`MapResolver`]: maps by key
//! 6. [`JsonResolver`]: JSON object fields and array elements
//! 7. [`ContainerResolver`]: variables of a nested scope
//! 8. [`EnumResolver`]: any property of an enum constant reads its name

#![warn(missing_docs)]

mod bean;
mod container;
mod enumeration;
mod json;
mod list;
mod map;
mod scope;

pub use bean::BeanResolver;
pub use container::ContainerResolver;
pub use enumeration::EnumResolver;
pub use json::JsonResolver;
pub use list::ListResolver;
pub use map::MapResolver;
pub use scope::ScopeResolver;

use std::fmt;
use std::sync::Arc;

use log::trace;

use super::error::EvaluationResult;
use crate::model::ElValue;
use crate::registry::TypeRegistry;

/// Outcome of a resolver lookup
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The resolver owns this lookup; the value may be `null`
    Handled(ElValue),
    /// Ask the next resolver
    NotHandled,
}

/// What a resolver can see of the running evaluation
#[derive(Clone, Copy)]
pub struct ResolverContext<'a> {
    /// Class declarations
    pub types: &'a TypeRegistry,
    /// Root variable scope, if any
    pub root: Option<&'a ElValue>,
    /// Principal the evaluation runs for
    pub principal: Option<&'a str>,
}

/// A strategy for reading and writing one kind of property
pub trait ElResolver: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Read `property` of `base`; `base` is `None` for a bare identifier
    fn get_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution>;

    /// Write `property` of `base`; `Ok(false)` when not handled
    fn set_value(
        &self,
        _context: &ResolverContext<'_>,
        _base: Option<&ElValue>,
        _property: &ElValue,
        _value: ElValue,
    ) -> EvaluationResult<bool> {
        Ok(false)
    }
}

/// Property name as text; indexes and other values use their string form
pub(crate) fn property_name(property: &ElValue) -> EvaluationResult<String> {
    Ok(crate::model::TypeCoercion::coerce_to_string(property)?)
}

/// Ordered resolver chain
#[derive(Clone)]
pub struct ResolverChain {
    resolvers: Vec<Arc<dyn ElResolver>>,
}

impl ResolverChain {
    /// Chain without any resolver
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// The standard chain with `custom` resolvers after the scope resolver
    pub fn standard(scope: ScopeResolver, custom: Vec<Arc<dyn ElResolver>>) -> Self {
        let mut chain = Self::empty();
        chain.push(scope);
        for resolver in custom {
            chain.resolvers.push(resolver);
        }
        chain.push(BeanResolver);
        chain.push(ListResolver);
        chain.push(MapResolver);
        chain.push(JsonResolver);
        chain.push(ContainerResolver);
        chain.push(EnumResolver);
        chain
    }

    /// Append a resolver
    pub fn push<R: ElResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.push(Arc::new(resolver));
    }

    /// Number of resolvers
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Whether the chain is empty
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    /// Names in query order
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// Ask each resolver in turn until one handles the lookup
    pub fn get_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        for resolver in &self.resolvers {
            if let Resolution::Handled(value) = resolver.get_value(context, base, property)? {
                trace!("{} resolver handled {property:?}", resolver.name());
                return Ok(Resolution::Handled(value));
            }
        }
        Ok(Resolution::NotHandled)
    }

    /// Ask each resolver in turn until one performs the write
    pub fn set_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        for resolver in &self.resolvers {
            if resolver.set_value(context, base, property, value.clone())? {
                trace!("{} resolver wrote {property:?}", resolver.name());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Default for ResolverChain {
    fn default() -> Self {
        Self::standard(ScopeResolver::default(), Vec::new())
    }
}

impl fmt::Debug for ResolverChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapVariableContainer;

    struct Constant;

    impl ElResolver for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn get_value(
            &self,
            _context: &ResolverContext<'_>,
            base: Option<&ElValue>,
            property: &ElValue,
        ) -> EvaluationResult<Resolution> {
            Ok(match (base, property.as_str()) {
                (None, Some("answer" | "name")) => Resolution::Handled(ElValue::from(42)),
                _ => Resolution::NotHandled,
            })
        }
    }

    #[test]
    fn test_first_handler_wins() {
        let types = TypeRegistry::new();
        let root = ElValue::container(MapVariableContainer::new().with_variable("name", "Kermit"));
        let context = ResolverContext {
            types: &types,
            root: Some(&root),
            principal: None,
        };
        let chain = ResolverChain::standard(ScopeResolver::default(), vec![Arc::new(Constant)]);
        assert_eq!(chain.names()[..2], ["scope", "constant"]);

        let lookup = |name: &str| chain.get_value(&context, None, &ElValue::from(name)).unwrap();
        assert_eq!(lookup("name"), Resolution::Handled(ElValue::from("Kermit")));
        assert_eq!(lookup("answer"), Resolution::Handled(ElValue::from(42)));
        assert_eq!(lookup("missing"), Resolution::NotHandled);
    }
}
