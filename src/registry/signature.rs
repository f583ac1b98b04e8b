//! Function signatures for arity and argument checking

use crate::model::{ElType, TypeHierarchy};
use std::fmt;

/// Function signature used to validate calls to registered functions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSignature {
    /// Function name, including its prefix
    pub name: String,
    /// Parameter types
    pub parameters: Vec<ParameterInfo>,
    /// Return type
    pub return_type: ElType,
    /// Minimum number of arguments
    pub min_arity: usize,
    /// Maximum number of arguments (None for variadic)
    pub max_arity: Option<usize>,
}

/// Parameter information for functions
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub param_type: ElType,
    /// Whether this parameter is optional
    pub optional: bool,
}

impl FunctionSignature {
    /// Create a new function signature
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: ElType,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();
        let max_arity = Some(parameters.len());

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity,
        }
    }

    /// Create a variadic function signature; the last parameter repeats
    pub fn variadic(
        name: impl Into<String>,
        parameters: Vec<ParameterInfo>,
        return_type: ElType,
    ) -> Self {
        let required_params = parameters.iter().filter(|p| !p.optional).count();

        Self {
            name: name.into(),
            parameters,
            return_type,
            min_arity: required_params,
            max_arity: None,
        }
    }

    /// Whether the signature accepts arguments of these runtime types;
    /// `None` stands for a `null` argument and matches any reference type
    pub fn matches(&self, arg_types: &[Option<ElType>], types: &dyn TypeHierarchy) -> bool {
        if arg_types.len() < self.min_arity {
            return false;
        }

        if let Some(max) = self.max_arity {
            if arg_types.len() > max {
                return false;
            }
        }

        for (i, arg_type) in arg_types.iter().enumerate() {
            let param = match self.parameters.get(i).or_else(|| self.parameters.last()) {
                Some(param) => param,
                None => return false,
            };
            let compatible = match arg_type {
                Some(arg_type) => param.param_type.is_convertible_from(arg_type, types),
                None => !param.param_type.is_primitive(),
            };
            if !compatible {
                return false;
            }
        }

        true
    }
}

impl ParameterInfo {
    /// Create a required parameter
    pub fn required(name: impl Into<String>, param_type: ElType) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: false,
        }
    }

    /// Create an optional parameter
    pub fn optional(name: impl Into<String>, param_type: ElType) -> Self {
        Self {
            name: name.into(),
            param_type,
            optional: true,
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", param.name, param.param_type)?;
            if param.optional {
                write!(f, "?")?;
            }
        }
        if self.max_arity.is_none() {
            write!(f, "...")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;

    #[test]
    fn test_function_signature_matching() {
        let types = TypeRegistry::new();
        let sig = FunctionSignature::new(
            "test:fn",
            vec![
                ParameterInfo::required("x", ElType::LONG),
                ParameterInfo::optional("y", ElType::String),
            ],
            ElType::BOOLEAN_OBJECT,
        );

        assert!(sig.matches(&[Some(ElType::INTEGER_OBJECT)], &types));
        assert!(sig.matches(&[Some(ElType::LONG_OBJECT), None], &types));
        assert!(!sig.matches(&[], &types)); // Too few arguments
        assert!(!sig.matches(&[None], &types)); // null for a primitive
        assert!(!sig.matches(&[Some(ElType::String)], &types)); // Wrong type
    }

    #[test]
    fn test_variadic_signature() {
        let types = TypeRegistry::new();
        let sig = FunctionSignature::variadic(
            "variables:contains",
            vec![
                ParameterInfo::required("container", ElType::Object),
                ParameterInfo::required("name", ElType::String),
                ParameterInfo::required("values", ElType::Object),
            ],
            ElType::BOOLEAN_OBJECT,
        );
        let args = [
            Some(ElType::VariableContainer),
            Some(ElType::String),
            Some(ElType::LONG_OBJECT),
            None,
            Some(ElType::String),
        ];
        assert!(sig.matches(&args, &types));
        assert!(!sig.matches(&args[..2], &types));
        assert_eq!(
            sig.to_string(),
            "variables:contains(container: java.lang.Object, name: java.lang.String, values: java.lang.Object...) -> java.lang.Boolean"
        );
    }
}
