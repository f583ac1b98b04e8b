//! The EL type lattice used for coercion and method overload resolution

use std::fmt;
use std::sync::Arc;

use super::number::NumberKind;
use super::value::EnumConstant;

/// Primitive (unboxed) value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// Primitive type name
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Name of the boxed counterpart
    pub fn boxed_name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "java.lang.Boolean",
            PrimitiveKind::Byte => "java.lang.Byte",
            PrimitiveKind::Short => "java.lang.Short",
            PrimitiveKind::Int => "java.lang.Integer",
            PrimitiveKind::Long => "java.lang.Long",
            PrimitiveKind::Float => "java.lang.Float",
            PrimitiveKind::Double => "java.lang.Double",
        }
    }

    /// Numeric kind carried by this primitive, `None` for `boolean`
    pub fn number_kind(self) -> Option<NumberKind> {
        match self {
            PrimitiveKind::Boolean => None,
            PrimitiveKind::Byte => Some(NumberKind::Byte),
            PrimitiveKind::Short => Some(NumberKind::Short),
            PrimitiveKind::Int => Some(NumberKind::Integer),
            PrimitiveKind::Long => Some(NumberKind::Long),
            PrimitiveKind::Float => Some(NumberKind::Float),
            PrimitiveKind::Double => Some(NumberKind::Double),
        }
    }

    /// Whether this is a numeric primitive
    pub fn is_numeric(self) -> bool {
        self != PrimitiveKind::Boolean
    }

    /// Widening primitive conversion (`int` to `long`, `float` to `double`, ...)
    pub fn widens_to(self, target: PrimitiveKind) -> bool {
        use PrimitiveKind::*;
        matches!(
            (self, target),
            (Byte, Short | Int | Long | Float | Double)
                | (Short, Int | Long | Float | Double)
                | (Int, Long | Float | Double)
                | (Long, Float | Double)
                | (Float, Double)
        )
    }
}

/// Type of an EL value or of a method/function parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElType {
    /// Root of the hierarchy; every reference type is assignable to it
    Object,
    /// Unboxed primitive
    Primitive(PrimitiveKind),
    /// Boxed primitive (`Integer`, `Boolean`, ...)
    Boxed(PrimitiveKind),
    /// Abstract number supertype
    Number,
    /// Large integer
    BigInteger,
    /// Arbitrary precision decimal
    BigDecimal,
    /// Character string
    String,
    /// Supertype of every enum class
    Enum,
    /// Host class, interface or enum registered in the type registry
    Class(Arc<str>),
    /// Ordered list
    List,
    /// String-keyed map
    Map,
    /// Array with an element type
    Array(Box<ElType>),
    /// JSON node abstraction
    JsonNode,
    /// Variable scope object
    VariableContainer,
}

/// Class hierarchy lookups needed by assignability and coercion
pub trait TypeHierarchy {
    /// Whether `class` equals `ancestor` or extends/implements it
    fn is_subtype_of(&self, class: &str, ancestor: &str) -> bool;

    /// Whether `class` is a registered enum
    fn is_enum_type(&self, class: &str) -> bool;

    /// Enum constant `name` of enum `class`
    fn enum_constant(&self, class: &str, name: &str) -> Option<EnumConstant>;
}

impl ElType {
    /// Named host class type
    pub fn class(name: impl AsRef<str>) -> Self {
        ElType::Class(Arc::from(name.as_ref()))
    }

    /// Array type of `element`
    pub fn array_of(element: ElType) -> Self {
        ElType::Array(Box::new(element))
    }

    /// `int`
    pub const INT: ElType = ElType::Primitive(PrimitiveKind::Int);
    /// `long`
    pub const LONG: ElType = ElType::Primitive(PrimitiveKind::Long);
    /// `boolean`
    pub const BOOLEAN: ElType = ElType::Primitive(PrimitiveKind::Boolean);
    /// `double`
    pub const DOUBLE: ElType = ElType::Primitive(PrimitiveKind::Double);
    /// `java.lang.Integer`
    pub const INTEGER_OBJECT: ElType = ElType::Boxed(PrimitiveKind::Int);
    /// `java.lang.Long`
    pub const LONG_OBJECT: ElType = ElType::Boxed(PrimitiveKind::Long);
    /// `java.lang.Boolean`
    pub const BOOLEAN_OBJECT: ElType = ElType::Boxed(PrimitiveKind::Boolean);
    /// `java.lang.Double`
    pub const DOUBLE_OBJECT: ElType = ElType::Boxed(PrimitiveKind::Double);

    /// Fully qualified type name, used in diagnostics
    pub fn name(&self) -> String {
        match self {
            ElType::Object => "java.lang.Object".to_string(),
            ElType::Primitive(kind) => kind.name().to_string(),
            ElType::Boxed(kind) => kind.boxed_name().to_string(),
            ElType::Number => "java.lang.Number".to_string(),
            ElType::BigInteger => "java.math.BigInteger".to_string(),
            ElType::BigDecimal => "java.math.BigDecimal".to_string(),
            ElType::String => "java.lang.String".to_string(),
            ElType::Enum => "java.lang.Enum".to_string(),
            ElType::Class(name) => name.to_string(),
            ElType::List => "java.util.List".to_string(),
            ElType::Map => "java.util.Map".to_string(),
            ElType::Array(element) => format!("{}[]", element.name()),
            ElType::JsonNode => "JsonNode".to_string(),
            ElType::VariableContainer => "VariableContainer".to_string(),
        }
    }

    /// Parse a type name as written in declared method signatures
    ///
    /// Simple names of the built-in types are accepted alongside the fully
    /// qualified ones; anything unknown is taken as a host class name.
    pub fn from_name(name: &str) -> ElType {
        let name = name.trim();
        if let Some(element) = name.strip_suffix("[]") {
            return ElType::array_of(ElType::from_name(element));
        }
        match name {
            "boolean" => ElType::Primitive(PrimitiveKind::Boolean),
            "byte" => ElType::Primitive(PrimitiveKind::Byte),
            "short" => ElType::Primitive(PrimitiveKind::Short),
            "int" => ElType::Primitive(PrimitiveKind::Int),
            "long" => ElType::Primitive(PrimitiveKind::Long),
            "float" => ElType::Primitive(PrimitiveKind::Float),
            "double" => ElType::Primitive(PrimitiveKind::Double),
            "Boolean" | "java.lang.Boolean" => ElType::Boxed(PrimitiveKind::Boolean),
            "Byte" | "java.lang.Byte" => ElType::Boxed(PrimitiveKind::Byte),
            "Short" | "java.lang.Short" => ElType::Boxed(PrimitiveKind::Short),
            "Integer" | "java.lang.Integer" => ElType::Boxed(PrimitiveKind::Int),
            "Long" | "java.lang.Long" => ElType::Boxed(PrimitiveKind::Long),
            "Float" | "java.lang.Float" => ElType::Boxed(PrimitiveKind::Float),
            "Double" | "java.lang.Double" => ElType::Boxed(PrimitiveKind::Double),
            "Object" | "java.lang.Object" => ElType::Object,
            "Number" | "java.lang.Number" => ElType::Number,
            "BigInteger" | "java.math.BigInteger" => ElType::BigInteger,
            "BigDecimal" | "java.math.BigDecimal" => ElType::BigDecimal,
            "String" | "java.lang.String" => ElType::String,
            "Enum" | "java.lang.Enum" => ElType::Enum,
            "List" | "java.util.List" => ElType::List,
            "Map" | "java.util.Map" => ElType::Map,
            "JsonNode" => ElType::JsonNode,
            "VariableContainer" => ElType::VariableContainer,
            other => ElType::class(other),
        }
    }

    /// Whether this is an unboxed primitive
    pub fn is_primitive(&self) -> bool {
        matches!(self, ElType::Primitive(_))
    }

    /// Numeric kind for number-like types
    pub fn number_kind(&self) -> Option<NumberKind> {
        match self {
            ElType::Primitive(kind) | ElType::Boxed(kind) => kind.number_kind(),
            ElType::BigInteger => Some(NumberKind::BigInteger),
            ElType::BigDecimal => Some(NumberKind::BigDecimal),
            _ => None,
        }
    }

    /// Whether the type is `boolean` or `Boolean`
    pub fn is_boolean(&self) -> bool {
        matches!(
            self,
            ElType::Primitive(PrimitiveKind::Boolean) | ElType::Boxed(PrimitiveKind::Boolean)
        )
    }

    /// Reference assignability: identity and subtyping only, no boxing
    pub fn is_assignable_from(&self, source: &ElType, types: &dyn TypeHierarchy) -> bool {
        if self == source {
            return true;
        }
        match (self, source) {
            (ElType::Object, source) => !source.is_primitive(),
            (ElType::Number, ElType::Boxed(kind)) => kind.is_numeric(),
            (ElType::Number, ElType::BigInteger | ElType::BigDecimal) => true,
            (ElType::Enum, ElType::Class(name)) => types.is_enum_type(name),
            (ElType::Class(target), ElType::Class(name)) => types.is_subtype_of(name, target),
            (ElType::VariableContainer, ElType::Class(name)) => {
                types.is_subtype_of(name, "VariableContainer")
            }
            (ElType::Array(target), ElType::Array(element)) => {
                !target.is_primitive()
                    && !element.is_primitive()
                    && target.is_assignable_from(element, types)
            }
            _ => false,
        }
    }

    /// Method invocation conversion: reference assignability plus
    /// primitive widening, boxing and unboxing
    pub fn is_convertible_from(&self, source: &ElType, types: &dyn TypeHierarchy) -> bool {
        if self.is_assignable_from(source, types) {
            return true;
        }
        match (self, source) {
            (ElType::Primitive(target), ElType::Primitive(kind))
            | (ElType::Primitive(target), ElType::Boxed(kind)) => {
                kind == target || kind.widens_to(*target)
            }
            (ElType::Boxed(target), ElType::Primitive(kind)) => kind == target,
            (ElType::Object | ElType::Number, ElType::Primitive(kind)) => {
                self.is_assignable_from(&ElType::Boxed(*kind), types)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ElType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassBuilder, TypeRegistry};

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(ClassBuilder::new("A").build());
        registry.register(ClassBuilder::new("AA").extends("A").build());
        registry.register(ClassBuilder::enumeration("Color", ["RED", "GREEN"]).build());
        registry
    }

    #[test]
    fn test_reference_assignability() {
        let types = registry();
        assert!(ElType::class("A").is_assignable_from(&ElType::class("AA"), &types));
        assert!(!ElType::class("AA").is_assignable_from(&ElType::class("A"), &types));
        assert!(ElType::Object.is_assignable_from(&ElType::String, &types));
        assert!(!ElType::Object.is_assignable_from(&ElType::INT, &types));
        assert!(ElType::Enum.is_assignable_from(&ElType::class("Color"), &types));
        assert!(ElType::Number.is_assignable_from(&ElType::LONG_OBJECT, &types));
    }

    #[test]
    fn test_invocation_conversion() {
        let types = registry();
        assert!(ElType::LONG.is_convertible_from(&ElType::INTEGER_OBJECT, &types));
        assert!(ElType::INT.is_convertible_from(&ElType::INTEGER_OBJECT, &types));
        assert!(!ElType::INT.is_convertible_from(&ElType::LONG_OBJECT, &types));
        assert!(ElType::INTEGER_OBJECT.is_convertible_from(&ElType::INT, &types));
        assert!(!ElType::LONG_OBJECT.is_convertible_from(&ElType::INTEGER_OBJECT, &types));
        assert!(ElType::Object.is_convertible_from(&ElType::DOUBLE, &types));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(ElType::from_name("int"), ElType::INT);
        assert_eq!(ElType::from_name("java.lang.String"), ElType::String);
        assert_eq!(
            ElType::from_name("String[]"),
            ElType::array_of(ElType::String)
        );
        assert_eq!(ElType::from_name("com.acme.Bean"), ElType::class("com.acme.Bean"));
        assert_eq!(ElType::array_of(ElType::String).name(), "java.lang.String[]");
    }
}
