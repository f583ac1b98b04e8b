//! Built-in function libraries

pub mod variables;

pub use variables::*;

use crate::registry::function::FunctionRegistry;

/// Register every built-in function library
/// Register every built-in function library
pub fn register_builtin_functions(registry: &mut FunctionRegistry) {
    variables::register_variable_functions(registry);
}
