//! Variable scopes supplied by the workflow engine

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::object::ObjectError;
use super::value::ElValue;

/// A scope of named variables (case instance, process instance, plan item
/// instance, or a plain mapping)
///
/// The expression engine only reads through this interface, and writes
/// through [`set_variable`](VariableContainer::set_variable) when an
/// assignment is requested explicitly.
pub trait VariableContainer: Send + Sync {
    /// Whether a variable with this name exists, even if its value is null
    fn has_variable(&self, name: &str) -> bool;

    /// Value of the variable, `None` when it does not exist
    fn get_variable(&self, name: &str) -> Option<ElValue>;

    /// Names of all variables in the scope
    fn variable_names(&self) -> Vec<String>;

    /// Create or replace a variable
    fn set_variable(&self, name: &str, _value: ElValue) -> Result<(), ObjectError> {
        Err(ObjectError::new(format!(
            "variable '{name}' cannot be set on a read-only scope"
        )))
    }
}

/// Shared handle to a variable scope
pub type SharedContainer = Arc<dyn VariableContainer>;

impl fmt::Debug for dyn VariableContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VariableContainer")
            .field(&self.variable_names())
            .finish()
    }
}

/// Variable scope over an insertion-ordered map
#[derive(Debug, Default)]
pub struct MapVariableContainer {
    variables: RwLock<IndexMap<String, ElValue>>,
}

impl MapVariableContainer {
    /// Create an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope from name/value pairs
    pub fn from_variables<K, V>(variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<ElValue>,
    {
        Self {
            variables: RwLock::new(
                variables
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Add a variable (builder style)
    pub fn with_variable(self, name: impl Into<String>, value: impl Into<ElValue>) -> Self {
        self.variables.write().insert(name.into(), value.into());
        self
    }

    /// Remove a variable, returning its previous value
    pub fn remove_variable(&self, name: &str) -> Option<ElValue> {
        self.variables.write().shift_remove(name)
    }

    /// Wrap into a shared handle
    pub fn into_shared(self) -> SharedContainer {
        Arc::new(self)
    }
}

impl VariableContainer for MapVariableContainer {
    fn has_variable(&self, name: &str) -> bool {
        self.variables.read().contains_key(name)
    }

    fn get_variable(&self, name: &str) -> Option<ElValue> {
        self.variables.read().get(name).cloned()
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.read().keys().cloned().collect()
    }

    fn set_variable(&self, name: &str, value: ElValue) -> Result<(), ObjectError> {
        self.variables.write().insert(name.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_variable_is_present() {
        let scope = MapVariableContainer::new()
            .with_variable("a", 1)
            .with_variable("b", ElValue::Null);
        assert!(scope.has_variable("b"));
        assert_eq!(scope.get_variable("b"), Some(ElValue::Null));
        assert!(!scope.has_variable("c"));
        assert_eq!(scope.variable_names(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_set_variable() {
        let scope = MapVariableContainer::new();
        scope.set_variable("x", ElValue::from("v")).unwrap();
        assert_eq!(scope.get_variable("x"), Some(ElValue::from("v")));
    }
}
