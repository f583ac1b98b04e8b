//! Expression evaluation
//!
//! The [`Evaluator`] walks parsed templates against an
//! [`EvaluationContext`]. Member access goes through the [`ResolverChain`],
//! method calls through the [`MethodResolver`], and operators through the
//! coercion rules in [`operators`].

#![warn(missing_docs)]

pub mod context;
pub mod engine;
pub mod error;
pub mod method_resolver;
pub mod operators;
pub mod resolver;

pub use context::{ElRuntime, EvaluationContext, MappedVariable, VariableMapper};
pub use engine::{Evaluator, ValueReference};
pub use error::{EvaluationError, EvaluationResult};
pub use method_resolver::{MethodResolver, ResolvedMethod};
pub use resolver::{
    BeanResolver, ContainerResolver, ElResolver, EnumResolver, JsonResolver, ListResolver,
    MapResolver, Resolution, ResolverChain, ResolverContext, ScopeResolver,
};
