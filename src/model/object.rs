//! Host objects exposed to expressions

use std::any::Any;
use std::fmt;

use thiserror::Error;

use super::container::VariableContainer;

/// Failure raised by host code called from an expression
/// (a `toString`, a getter, a registered method)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ObjectError {
    /// Error message
    pub message: String,
}

impl ObjectError {
    /// Create a new host error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A host object reachable from an expression
///
/// Methods and bean properties are not discovered at runtime; they are
/// declared for [`class_name`](ElObject::class_name) in the
/// [`TypeRegistry`](crate::registry::TypeRegistry).
pub trait ElObject: Send + Sync + 'static {
    /// Registered class name of this object
    fn class_name(&self) -> &str;

    /// Downcasting support for registered method invokers
    fn as_any(&self) -> &dyn Any;

    /// `toString()` of the object
    fn to_display_string(&self) -> Result<String, ObjectError> {
        Ok(format!("{}@{:p}", self.class_name(), self.as_any()))
    }

    /// View of the object as a variable scope, if it is one
    fn as_variable_container(&self) -> Option<&dyn VariableContainer> {
        None
    }

    /// `equals()` of the object; identity unless overridden
    fn equals(&self, other: &dyn ElObject) -> bool {
        std::ptr::addr_eq(self.as_any() as *const dyn Any, other.as_any() as *const dyn Any)
    }
}

impl fmt::Debug for dyn ElObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:p}", self.class_name(), self.as_any())
    }
}
