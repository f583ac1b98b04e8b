//! Type coercion and conversion utilities for EL values

use thiserror::Error;

use super::number::{Number, NumberKind};
use super::object::ObjectError;
use super::types::{ElType, PrimitiveKind, TypeHierarchy};
use super::value::ElValue;

/// Result type for type coercion operations
pub type CoercionResult<T> = Result<T, CoercionError>;

/// Errors that can occur during type coercion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoercionError {
    /// No conversion path between the types
    #[error("Cannot coerce from {from} to {to}")]
    IncompatibleTypes {
        /// Source class name
        from: String,
        /// Target type name
        to: String,
    },

    /// The text cannot be read as the target type
    #[error("Invalid format '{value}' for type {target_type}")]
    InvalidFormat {
        /// Offending text
        value: String,
        /// Target type name
        target_type: String,
    },

    /// The number does not fit the target type
    #[error("Value {value} is out of range for type {target_type}")]
    OutOfRange {
        /// Offending value
        value: String,
        /// Target type name
        target_type: String,
    },

    /// The host object's own `toString()` failed
    #[error("toString() of {class_name} failed: {source}")]
    ToStringFailed {
        /// Class of the object
        class_name: String,
        /// Failure raised by the object
        #[source]
        source: ObjectError,
    },
}

/// Type coercion utility for EL values
pub struct TypeCoercion;

impl TypeCoercion {
    /// Coerce a value to the requested type
    ///
    /// Values already assignable are returned unchanged. `null` stays `null`
    /// for reference targets, becomes the zero value for primitives and the
    /// empty string for `String`.
    pub fn coerce_to_type(
        value: &ElValue,
        target: &ElType,
        types: &dyn TypeHierarchy,
    ) -> CoercionResult<ElValue> {
        if let Some(source) = value.el_type() {
            if target.is_assignable_from(&source, types) {
                return Ok(value.clone());
            }
        }
        match target {
            ElType::Object => Ok(value.clone()),
            ElType::String => Self::coerce_to_string(value).map(ElValue::String),
            ElType::Primitive(PrimitiveKind::Boolean) => {
                Self::coerce_to_boolean(value).map(ElValue::Boolean)
            }
            ElType::Boxed(PrimitiveKind::Boolean) => match value {
                ElValue::Null => Ok(ElValue::Null),
                _ => Self::coerce_to_boolean(value).map(ElValue::Boolean),
            },
            ElType::Primitive(_) => match target.number_kind() {
                Some(kind) => Self::coerce_to_number(value, kind).map(ElValue::Number),
                None => Err(Self::incompatible(value, target)),
            },
            ElType::Boxed(_) | ElType::BigInteger | ElType::BigDecimal => {
                match (value, target.number_kind()) {
                    (ElValue::Null, _) => Ok(ElValue::Null),
                    (_, Some(kind)) => Self::coerce_to_number(value, kind).map(ElValue::Number),
                    (_, None) => Err(Self::incompatible(value, target)),
                }
            }
            ElType::Number => match value {
                ElValue::Null => Ok(ElValue::Null),
                ElValue::String(s) => Self::parse_any_number(s).map(ElValue::Number),
                _ => Err(Self::incompatible(value, target)),
            },
            ElType::Class(name) if types.is_enum_type(name) => {
                Self::coerce_to_enum(value, name, types)
            }
            ElType::Enum => match value {
                ElValue::Null => Ok(ElValue::Null),
                _ => Err(Self::incompatible(value, target)),
            },
            _ => match value {
                ElValue::Null => Ok(ElValue::Null),
                _ => Err(Self::incompatible(value, target)),
            },
        }
    }

    /// Coerce to a string: `null` is empty, enums use their name, host
    /// objects their `toString()`
    pub fn coerce_to_string(value: &ElValue) -> CoercionResult<String> {
        match value {
            ElValue::Null => Ok(String::new()),
            ElValue::Enum(constant) => Ok(constant.name.to_string()),
            _ => Self::display_string(value),
        }
    }

    /// Display string of a value, as `toString()`/`asText()` render it:
    /// `null` is the text `"null"`
    pub fn display_string(value: &ElValue) -> CoercionResult<String> {
        Ok(match value {
            ElValue::Null => "null".to_string(),
            ElValue::Boolean(b) => b.to_string(),
            ElValue::Number(n) => n.to_string(),
            ElValue::String(s) => s.clone(),
            ElValue::Enum(constant) => constant.display_string().to_string(),
            ElValue::Bytes(bytes) => super::json::JsonNode::Binary(bytes.clone()).as_text(),
            ElValue::List(items) => Self::join_display(&items.read())?,
            ElValue::Array(array) => Self::join_display(&array.items.read())?,
            ElValue::Map(entries) => {
                let mut parts = Vec::with_capacity(entries.read().len());
                for (key, item) in entries.read().iter() {
                    parts.push(format!("{key}={}", Self::display_string(item)?));
                }
                format!("{{{}}}", parts.join(", "))
            }
            ElValue::Json(node) => node.to_json_string(),
            ElValue::Object(object) => {
                object
                    .to_display_string()
                    .map_err(|source| CoercionError::ToStringFailed {
                        class_name: object.class_name().to_string(),
                        source,
                    })?
            }
            ElValue::Container(_) => value.to_json().to_string(),
        })
    }

    fn join_display(items: &[ElValue]) -> CoercionResult<String> {
        let parts = items
            .iter()
            .map(Self::display_string)
            .collect::<CoercionResult<Vec<_>>>()?;
        Ok(format!("[{}]", parts.join(", ")))
    }

    /// Coerce to a primitive boolean: `null` and `""` are false, strings
    /// are compared to `true` ignoring case
    pub fn coerce_to_boolean(value: &ElValue) -> CoercionResult<bool> {
        match value {
            ElValue::Null => Ok(false),
            ElValue::Boolean(b) => Ok(*b),
            ElValue::String(s) => Ok(s.eq_ignore_ascii_case("true")),
            _ => Err(Self::incompatible(
                value,
                &ElType::Primitive(PrimitiveKind::Boolean),
            )),
        }
    }

    /// Coerce to a number of the given kind: `null` and `""` are zero,
    /// strings are parsed, numbers are range checked
    pub fn coerce_to_number(value: &ElValue, kind: NumberKind) -> CoercionResult<Number> {
        let target = kind.el_type();
        match value {
            ElValue::Null => Ok(Self::zero(kind)),
            ElValue::String(s) if s.is_empty() => Ok(Self::zero(kind)),
            ElValue::String(s) => {
                Number::parse(s, kind).ok_or_else(|| CoercionError::InvalidFormat {
                    value: s.clone(),
                    target_type: target.name(),
                })
            }
            ElValue::Number(n) => n.convert(kind).ok_or_else(|| CoercionError::OutOfRange {
                value: n.to_string(),
                target_type: target.name(),
            }),
            _ => Err(Self::incompatible(value, &target)),
        }
    }

    /// Coerce to a constant of enum `class`: strings name the constant,
    /// `null` and `""` stay `null`
    pub fn coerce_to_enum(
        value: &ElValue,
        class: &str,
        types: &dyn TypeHierarchy,
    ) -> CoercionResult<ElValue> {
        match value {
            ElValue::Null => Ok(ElValue::Null),
            ElValue::String(s) if s.is_empty() => Ok(ElValue::Null),
            ElValue::String(s) => types
                .enum_constant(class, s)
                .map(ElValue::Enum)
                .ok_or_else(|| CoercionError::InvalidFormat {
                    value: s.clone(),
                    target_type: class.to_string(),
                }),
            ElValue::Enum(constant) if &*constant.type_name == class => Ok(value.clone()),
            _ => Err(Self::incompatible(value, &ElType::class(class))),
        }
    }

    /// Whether a non-null value can be coerced to `target` without loss:
    /// enums, numbers and booleans to `String`, in-range numbers and
    /// numeric text to numeric types, boolean text to booleans, constant
    /// names to enums
    pub fn is_coercible(value: &ElValue, target: &ElType, types: &dyn TypeHierarchy) -> bool {
        match (value, target) {
            (ElValue::Null, target) => !target.is_primitive(),
            (
                ElValue::Enum(_) | ElValue::Number(_) | ElValue::Boolean(_) | ElValue::String(_),
                ElType::String,
            ) => true,
            (ElValue::Boolean(_), target) if target.is_boolean() => true,
            (ElValue::String(s), target) if target.is_boolean() => {
                s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
            }
            (ElValue::Number(n), target) => target
                .number_kind()
                .is_some_and(|kind| n.convert(kind).is_some()),
            (ElValue::String(s), target) if target.number_kind().is_some() => target
                .number_kind()
                .is_some_and(|kind| Number::parse(s, kind).is_some()),
            (ElValue::String(s), ElType::Class(name)) => types.enum_constant(name, s).is_some(),
            _ => false,
        }
    }

    fn parse_any_number(text: &str) -> CoercionResult<Number> {
        Number::parse(text, NumberKind::Long)
            .or_else(|| Number::parse(text, NumberKind::Double))
            .ok_or_else(|| CoercionError::InvalidFormat {
                value: text.to_string(),
                target_type: ElType::Number.name(),
            })
    }

    fn zero(kind: NumberKind) -> Number {
        match kind {
            NumberKind::Byte => Number::Byte(0),
            NumberKind::Short => Number::Short(0),
            NumberKind::Integer => Number::Integer(0),
            NumberKind::Long => Number::Long(0),
            NumberKind::Float => Number::Float(0.0),
            NumberKind::Double => Number::Double(0.0),
            NumberKind::BigInteger => Number::BigInteger(0),
            NumberKind::BigDecimal => Number::BigDecimal(rust_decimal::Decimal::ZERO),
        }
    }

    fn incompatible(value: &ElValue, target: &ElType) -> CoercionError {
        CoercionError::IncompatibleTypes {
            from: value.class_name(),
            to: target.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElObject, EnumConstant};
    use crate::registry::{ClassBuilder, TypeRegistry};
    use std::any::Any;

    fn types() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(
            ClassBuilder::enumeration("Fruit", ["APPLE", "PEAR"])
                .display_names([("APPLE", "An apple")])
                .build(),
        );
        registry
    }

    struct Broken;

    impl ElObject for Broken {
        fn class_name(&self) -> &str {
            "Broken"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn to_display_string(&self) -> Result<String, ObjectError> {
            Err(ObjectError::new("boom"))
        }
    }

    #[test]
    fn test_enum_to_string_uses_name() {
        let types = types();
        let apple = types.enum_constant("Fruit", "APPLE").unwrap();
        assert_eq!(apple.display_string(), "An apple");
        let coerced =
            TypeCoercion::coerce_to_type(&ElValue::Enum(apple), &ElType::String, &types).unwrap();
        assert_eq!(coerced, ElValue::from("APPLE"));
    }

    #[test]
    fn test_null_handling() {
        let types = types();
        assert_eq!(
            TypeCoercion::coerce_to_type(&ElValue::Null, &ElType::LONG_OBJECT, &types).unwrap(),
            ElValue::Null
        );
        assert_eq!(
            TypeCoercion::coerce_to_type(&ElValue::Null, &ElType::INT, &types).unwrap(),
            ElValue::from(0)
        );
        assert_eq!(TypeCoercion::coerce_to_string(&ElValue::Null).unwrap(), "");
        assert_eq!(TypeCoercion::display_string(&ElValue::Null).unwrap(), "null");
    }

    #[test]
    fn test_numeric_boundaries() {
        let types = types();
        let short_min = ElValue::from(i16::MIN);
        assert_eq!(
            TypeCoercion::coerce_to_type(&short_min, &ElType::INT, &types).unwrap(),
            ElValue::from(i16::MIN as i32)
        );
        let err = TypeCoercion::coerce_to_number(&ElValue::from(i32::MIN), NumberKind::Short)
            .unwrap_err();
        assert!(matches!(err, CoercionError::OutOfRange { .. }));
    }

    #[test]
    fn test_string_to_enum() {
        let types = types();
        let pear =
            TypeCoercion::coerce_to_type(&ElValue::from("PEAR"), &ElType::class("Fruit"), &types)
                .unwrap();
        assert_eq!(pear, ElValue::Enum(EnumConstant::new("Fruit", "PEAR", 1)));
        assert!(
            TypeCoercion::coerce_to_type(&ElValue::from("PLUM"), &ElType::class("Fruit"), &types)
                .is_err()
        );
    }

    #[test]
    fn test_to_string_failure_is_chained() {
        let err = TypeCoercion::coerce_to_string(&ElValue::object(Broken)).unwrap_err();
        let CoercionError::ToStringFailed { source, .. } = err else {
            panic!("unexpected error {err:?}");
        };
        assert_eq!(source.message, "boom");
    }
}
