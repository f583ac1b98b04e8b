//! Data model and value types for EL expressions
//!
//! This module provides the runtime value model, the type lattice used by
//! coercion and overload resolution, the JSON node abstraction and the
//! variable scope interface consumed from the workflow engine.

#![warn(missing_docs)]

pub mod container;
pub mod json;
pub mod number;
pub mod object;
pub mod type_coercion;
pub mod types;
pub mod value;

pub use container::{MapVariableContainer, SharedContainer, VariableContainer};
pub use json::{JsonAdapter, JsonNode, JsonNumber, SerdeJsonAdapter};
pub use number::{Number, NumberKind};
pub use object::{ElObject, ObjectError};
pub use type_coercion::{CoercionError, CoercionResult, TypeCoercion};
pub use types::{ElType, PrimitiveKind, TypeHierarchy};
pub use value::{ElArray, ElList, ElMap, ElValue, EnumConstant};
