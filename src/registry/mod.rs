//! Class tables and function registry for EL
//!
//! Host types expose their methods and fields through the [`TypeRegistry`];
//! `prefix:name(...)` calls are dispatched through the [`FunctionRegistry`].

#![warn(missing_docs)]

pub mod builtin_classes;
pub mod class;
pub mod function;
pub mod functions;
pub mod signature;

pub use class::{
    ClassBuilder, ClassDescriptor, FieldDescriptor, HostResult, MethodDescriptor, MethodInvoker,
    OBJECT_CLASS, TypeRegistry,
};
pub use function::{
    ElFunction, FunctionContext, FunctionError, FunctionRegistry, FunctionResult, qualified_name,
};
pub use signature::{FunctionSignature, ParameterInfo};

