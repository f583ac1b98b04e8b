//! Function registry (the function mapper behind `prefix:name(...)` calls)

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::model::{ElValue, TypeHierarchy};
use crate::registry::TypeRegistry;
use crate::registry::signature::FunctionSignature;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function evaluation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    /// Invalid number of arguments
    #[error("Function '{name}' expects {min}-{} arguments, got {actual}", max.map_or("∞".to_string(), |n| n.to_string()))]
    InvalidArity {
        /// Function name
        name: String,
        /// Minimum arguments
        min: usize,
        /// Maximum arguments (None for unlimited)
        max: Option<usize>,
        /// Actual arguments provided
        actual: usize,
    },

    /// Invalid argument type
    #[error("Function '{name}' argument {index} expects {expected}, got {actual}")]
    InvalidArgumentType {
        /// Function name
        name: String,
        /// Argument index
        index: usize,
        /// Expected type
        expected: String,
        /// Actual type
        actual: String,
    },

    /// Runtime evaluation error
    #[error("Function '{name}' evaluation error: {message}")]
    EvaluationError {
        /// Function name
        name: String,
        /// Error message
        message: String,
    },
}

/// What a function can see of the evaluation calling it
#[derive(Clone, Copy)]
pub struct FunctionContext<'a> {
    /// Class declarations, for coercion and comparisons
    pub types: &'a TypeRegistry,
    /// Root variable scope of the evaluation, if any
    pub scope: Option<&'a ElValue>,
    /// Principal the evaluation runs for
    pub principal: Option<&'a str>,
}

impl<'a> FunctionContext<'a> {
    /// Context without a scope or principal
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self {
            types,
            scope: None,
            principal: None,
        }
    }
}

/// A function callable as `prefix:name(args...)`
pub trait ElFunction: Send + Sync {
    /// Namespace prefix; empty for the default namespace
    fn prefix(&self) -> &str;

    /// Local function name
    fn name(&self) -> &str;

    /// Get the function signature
    fn signature(&self) -> &FunctionSignature;

    /// Evaluate the function with given arguments
    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>)
    -> FunctionResult<ElValue>;

    /// Get function documentation
    fn documentation(&self) -> &str {
        ""
    }

    /// Qualified `prefix:name`
    fn qualified_name(&self) -> String {
        qualified_name(self.prefix(), self.name())
    }

    /// Validate arguments before evaluation (both arity and types)
    fn validate_args(&self, args: &[ElValue], types: &dyn TypeHierarchy) -> FunctionResult<()> {
        let sig = self.signature();
        let arg_count = args.len();

        if arg_count < sig.min_arity || sig.max_arity.is_some_and(|max| arg_count > max) {
            return Err(FunctionError::InvalidArity {
                name: self.qualified_name(),
                min: sig.min_arity,
                max: sig.max_arity,
                actual: arg_count,
            });
        }

        for (i, arg) in args.iter().enumerate() {
            let Some(param) = sig.parameters.get(i).or_else(|| sig.parameters.last()) else {
                continue;
            };
            let compatible = match arg.el_type() {
                Some(arg_type) => param.param_type.is_convertible_from(&arg_type, types),
                None => !param.param_type.is_primitive(),
            };
            if !compatible {
                return Err(FunctionError::InvalidArgumentType {
                    name: self.qualified_name(),
                    index: i,
                    expected: param.param_type.name(),
                    actual: arg.class_name(),
                });
            }
        }

        Ok(())
    }
}

/// `prefix:name`, or just `name` in the default namespace
pub fn qualified_name(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}:{name}")
    }
}

type ClosureFn =
    dyn Fn(&[ElValue], &FunctionContext<'_>) -> FunctionResult<ElValue> + Send + Sync;

/// Function backed by a closure
pub struct ClosureFunction {
    prefix: String,
    name: String,
    signature: FunctionSignature,
    documentation: String,
    body: Box<ClosureFn>,
}

impl ElFunction for ClosureFunction {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn evaluate(&self, args: &[ElValue], context: &FunctionContext<'_>) -> FunctionResult<ElValue> {
        self.validate_args(args, context.types)?;
        (self.body)(args, context)
    }

    fn documentation(&self) -> &str {
        &self.documentation
    }
}

/// Registry of functions keyed by qualified name
#[derive(Clone, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Arc<dyn ElFunction>>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `variables:*` library
    pub fn standard() -> Self {
        let mut registry = Self::new();
        super::functions::register_builtin_functions(&mut registry);
        registry
    }

    /// Register a trait-based function, replacing one with the same
    /// qualified name
    pub fn register<F: ElFunction + 'static>(&mut self, function: F) {
        self.functions
            .insert(function.qualified_name(), Arc::new(function));
    }

    /// Register a closure-based function
    pub fn register_closure<F>(
        &mut self,
        prefix: impl Into<String>,
        name: impl Into<String>,
        signature: FunctionSignature,
        documentation: impl Into<String>,
        body: F,
    ) where
        F: Fn(&[ElValue], &FunctionContext<'_>) -> FunctionResult<ElValue> + Send + Sync + 'static,
    {
        self.register(ClosureFunction {
            prefix: prefix.into(),
            name: name.into(),
            signature,
            documentation: documentation.into(),
            body: Box::new(body),
        });
    }

    /// Look up a function; `prefix` is `None` for unprefixed calls
    pub fn resolve(&self, prefix: Option<&str>, name: &str) -> Option<Arc<dyn ElFunction>> {
        self.functions
            .get(&qualified_name(prefix.unwrap_or_default(), name))
            .cloned()
    }

    /// Whether a function is registered under the qualified name
    pub fn contains(&self, qualified_name: &str) -> bool {
        self.functions.contains_key(qualified_name)
    }

    /// Qualified names of all registered functions, sorted
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.function_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElType;
    use crate::registry::ParameterInfo;

    #[test]
    fn test_closure_registration_and_arity() {
        let mut registry = FunctionRegistry::new();
        registry.register_closure(
            "fn",
            "upper",
            FunctionSignature::new(
                "fn:upper",
                vec![ParameterInfo::required("value", ElType::String)],
                ElType::String,
            ),
            "Upper-cases a string",
            |args, _| Ok(ElValue::String(args[0].as_str().unwrap_or_default().to_uppercase())),
        );

        let types = TypeRegistry::new();
        let context = FunctionContext::new(&types);
        let upper = registry.resolve(Some("fn"), "upper").unwrap();
        assert_eq!(
            upper.evaluate(&[ElValue::from("abc")], &context).unwrap(),
            ElValue::from("ABC")
        );
        assert!(matches!(
            upper.evaluate(&[], &context),
            Err(FunctionError::InvalidArity { actual: 0, .. })
        ));
        assert!(matches!(
            upper.evaluate(&[ElValue::from(1)], &context),
            Err(FunctionError::InvalidArgumentType { index: 0, .. })
        ));
        assert!(registry.resolve(None, "upper").is_none());
    }
}
