//! Expression language engine for BPMN/CMMN workflow definitions
//!
//! Workflow definitions embed expressions in `${...}` (deferred) and
//! `#{...}` (immediate) delimiters, e.g. sentry conditions such as
//! `${var:eq(status, 'open') && amount > 100}`. This crate parses such
//! templates, rewrites shorthand function syntax, and evaluates them
//! against a variable scope supplied by the workflow engine.
//!
//! ```
//! use std::sync::Arc;
//! use caseflow_el::{ElValue, ExpressionManager, MapVariableContainer};
//!
//! let manager = ExpressionManager::new();
//! let scope = Arc::new(MapVariableContainer::new().with_variable("amount", 250));
//! let result = manager.evaluate("${amount > 100}", scope).unwrap();
//! assert_eq!(result, ElValue::Boolean(true));
//! ```

pub mod ast;
pub mod cache;
pub mod config;
pub mod engine;
pub mod enhancer;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod model;
pub mod parser;
pub mod registry;

pub use cache::{CacheStats, ExpressionCache};
pub use config::{ConfigError, EngineConfig};
pub use engine::{ExpressionManager, ExpressionManagerBuilder};
pub use enhancer::{EnhancerChain, ExpressionEnhancer, VariableFunctionEnhancer};
pub use error::{ElError, ElResult};
pub use evaluator::{
    ElResolver, ElRuntime, EvaluationContext, EvaluationError, Resolution, ResolverContext,
    ValueReference,
};
pub use expression::{MethodExpression, ValueExpression};
pub use model::{
    ElObject, ElType, ElValue, JsonNode, MapVariableContainer, Number, SharedContainer,
    VariableContainer,
};
pub use parser::{ParseError, parse_template};
pub use registry::{ClassBuilder, ElFunction, FunctionRegistry, TypeRegistry};
