//! Evaluation context
//!
//! An [`ElRuntime`] holds everything shared across evaluations: class
//! declarations, the function registry and the resolver chain. An
//! [`EvaluationContext`] is created for one evaluation call, borrows the
//! runtime, and carries the per-call state: the root variable scope, the
//! variable mapper and the current principal.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::resolver::{ResolverChain, ResolverContext};
use crate::ast::Template;
use crate::model::{ElValue, SharedContainer};
use crate::registry::{FunctionContext, FunctionRegistry, TypeRegistry};

/// Shared, immutable evaluation machinery
#[derive(Debug, Clone)]
pub struct ElRuntime {
    /// Class declarations used for member access and coercion
    pub types: TypeRegistry,
    /// Functions callable as `prefix:name(...)`
    pub functions: FunctionRegistry,
    /// Property resolvers in query order
    pub resolvers: ResolverChain,
}

impl ElRuntime {
    /// Runtime with the given registries and the standard resolver chain
    pub fn new(types: TypeRegistry, functions: FunctionRegistry) -> Self {
        Self {
            types,
            functions,
            resolvers: ResolverChain::default(),
        }
    }

    /// Replace the resolver chain
    pub fn with_resolvers(mut self, resolvers: ResolverChain) -> Self {
        self.resolvers = resolvers;
        self
    }
}

impl Default for ElRuntime {
    fn default() -> Self {
        Self::new(TypeRegistry::new(), FunctionRegistry::standard())
    }
}

/// A variable bound in the variable mapper
#[derive(Debug, Clone)]
pub enum MappedVariable {
    /// Fixed value
    Value(ElValue),
    /// Expression evaluated each time the variable is read
    Expression(Arc<Template>),
}

/// Named values and sub-expressions that shadow the resolver chain
#[derive(Debug, Clone, Default)]
pub struct VariableMapper {
    entries: FxHashMap<String, MappedVariable>,
}

impl VariableMapper {
    /// Create an empty mapper
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a fixed value
    pub fn bind_value(&mut self, name: impl Into<String>, value: ElValue) {
        self.entries.insert(name.into(), MappedVariable::Value(value));
    }

    /// Bind an expression
    pub fn bind_expression(&mut self, name: impl Into<String>, template: Arc<Template>) {
        self.entries
            .insert(name.into(), MappedVariable::Expression(template));
    }

    /// Look up a binding
    pub fn get(&self, name: &str) -> Option<&MappedVariable> {
        self.entries.get(name)
    }

    /// Remove a binding
    pub fn remove(&mut self, name: &str) -> Option<MappedVariable> {
        self.entries.remove(name)
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-call evaluation state; never shared between threads
#[derive(Debug, Clone)]
pub struct EvaluationContext<'r> {
    /// Shared machinery
    pub runtime: &'r ElRuntime,
    /// Root variable scope that bare identifiers resolve against
    pub root: Option<ElValue>,
    /// Named bindings consulted before the resolver chain
    pub variables: VariableMapper,
    /// Principal the evaluation runs for
    pub principal: Option<String>,
}

impl<'r> EvaluationContext<'r> {
    /// Context without a root scope
    pub fn new(runtime: &'r ElRuntime) -> Self {
        Self {
            runtime,
            root: None,
            variables: VariableMapper::new(),
            principal: None,
        }
    }

    /// Context rooted at a variable scope
    pub fn for_container(runtime: &'r ElRuntime, container: SharedContainer) -> Self {
        Self::new(runtime).with_root(ElValue::Container(container))
    }

    /// Set the root scope; maps and JSON objects work as well as scopes
    pub fn with_root(mut self, root: ElValue) -> Self {
        self.root = Some(root);
        self
    }

    /// Set the principal
    pub fn with_principal(mut self, principal: impl Into<String>) -> Self {
        self.principal = Some(principal.into());
        self
    }

    /// Class declarations
    pub fn types(&self) -> &'r TypeRegistry {
        &self.runtime.types
    }

    /// View handed to resolvers
    pub fn resolver_context(&self) -> ResolverContext<'_> {
        ResolverContext {
            types: &self.runtime.types,
            root: self.root.as_ref(),
            principal: self.principal.as_deref(),
        }
    }

    /// View handed to functions
    pub fn function_context(&self) -> FunctionContext<'_> {
        FunctionContext {
            types: &self.runtime.types,
            scope: self.root.as_ref(),
            principal: self.principal.as_deref(),
        }
    }
}
