//! Runtime values produced and consumed by expressions

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::container::{SharedContainer, VariableContainer};
use super::json::JsonNode;
use super::number::Number;
use super::object::ElObject;
use super::types::{ElType, PrimitiveKind};

/// Shared, mutable list
pub type ElList = Arc<RwLock<Vec<ElValue>>>;

/// Shared, mutable string-keyed map preserving insertion order
pub type ElMap = Arc<RwLock<IndexMap<String, ElValue>>>;

/// A constant of a registered enum class
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    /// Enum class name
    pub type_name: Arc<str>,
    /// Constant name, as returned by `name()`
    pub name: Arc<str>,
    /// Declaration index
    pub ordinal: i32,
    /// `toString()` override, if the enum declares one
    pub display: Option<Arc<str>>,
}

impl EnumConstant {
    /// Create a constant without a `toString()` override
    pub fn new(type_name: impl AsRef<str>, name: impl AsRef<str>, ordinal: i32) -> Self {
        Self {
            type_name: Arc::from(type_name.as_ref()),
            name: Arc::from(name.as_ref()),
            ordinal,
            display: None,
        }
    }

    /// `toString()` of the constant
    pub fn display_string(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.name)
    }
}

/// Fixed-size array with a declared element type
#[derive(Clone)]
pub struct ElArray {
    /// Element type
    pub element_type: ElType,
    /// Elements; the length never changes after creation
    pub items: Arc<RwLock<Vec<ElValue>>>,
}

impl ElArray {
    /// Create an array
    pub fn new(element_type: ElType, items: Vec<ElValue>) -> Self {
        Self {
            element_type,
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Snapshot of the elements
    pub fn to_vec(&self) -> Vec<ElValue> {
        self.items.read().clone()
    }
}

/// EL runtime value
#[derive(Clone, Default)]
pub enum ElValue {
    /// `null`
    #[default]
    Null,
    /// Boolean
    Boolean(bool),
    /// Any numeric kind
    Number(Number),
    /// Character string
    String(String),
    /// Enum constant
    Enum(EnumConstant),
    /// `byte[]`
    Bytes(Vec<u8>),
    /// `java.util.List`
    List(ElList),
    /// Typed array
    Array(ElArray),
    /// `java.util.Map` with string keys
    Map(ElMap),
    /// JSON node
    Json(JsonNode),
    /// Registered host object
    Object(Arc<dyn ElObject>),
    /// Variable scope
    Container(SharedContainer),
}

impl ElValue {
    /// Build a list value
    pub fn list(items: impl IntoIterator<Item = ElValue>) -> Self {
        ElValue::List(Arc::new(RwLock::new(items.into_iter().collect())))
    }

    /// Build a map value
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, ElValue)>) -> Self {
        ElValue::Map(Arc::new(RwLock::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        )))
    }

    /// Wrap a host object
    pub fn object(object: impl ElObject) -> Self {
        ElValue::Object(Arc::new(object))
    }

    /// Wrap a variable scope
    pub fn container(container: impl VariableContainer + 'static) -> Self {
        ElValue::Container(Arc::new(container))
    }

    /// Whether the value is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, ElValue::Null)
    }

    /// Runtime type, `None` for `null`
    pub fn el_type(&self) -> Option<ElType> {
        Some(match self {
            ElValue::Null => return None,
            ElValue::Boolean(_) => ElType::Boxed(PrimitiveKind::Boolean),
            ElValue::Number(n) => n.kind().el_type(),
            ElValue::String(_) => ElType::String,
            ElValue::Enum(constant) => ElType::class(&*constant.type_name),
            ElValue::Bytes(_) => ElType::array_of(ElType::Primitive(PrimitiveKind::Byte)),
            ElValue::List(_) => ElType::List,
            ElValue::Array(array) => ElType::array_of(array.element_type.clone()),
            ElValue::Map(_) => ElType::Map,
            ElValue::Json(_) => ElType::JsonNode,
            ElValue::Object(object) => ElType::class(object.class_name()),
            ElValue::Container(_) => ElType::VariableContainer,
        })
    }

    /// Class name used in diagnostics; `null` for the null value
    pub fn class_name(&self) -> String {
        self.el_type()
            .map(|t| t.name())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Borrow the string content
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ElValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ElValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric content
    pub fn as_number(&self) -> Option<Number> {
        match self {
            ElValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Downcast a host object to its concrete type
    pub fn downcast_object<T: 'static>(&self) -> Option<&T> {
        match self {
            ElValue::Object(object) => object.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// View the value as a variable scope: scopes themselves and host
    /// objects that expose one
    pub fn as_variable_container(&self) -> Option<&dyn VariableContainer> {
        match self {
            ElValue::Container(container) => Some(container.as_ref()),
            ElValue::Object(object) => object.as_variable_container(),
            _ => None,
        }
    }

    /// Convert plain JSON data; objects become maps and arrays become lists
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ElValue::Null,
            serde_json::Value::Bool(b) => ElValue::Boolean(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    match i32::try_from(i) {
                        Ok(i) => ElValue::Number(Number::Integer(i)),
                        Err(_) => ElValue::Number(Number::Long(i)),
                    }
                } else if let Some(u) = n.as_u64() {
                    ElValue::Number(Number::BigInteger(u as i128))
                } else {
                    ElValue::Number(Number::Double(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_json::Value::String(s) => ElValue::String(s.clone()),
            serde_json::Value::Array(items) => ElValue::list(items.iter().map(ElValue::from_json)),
            serde_json::Value::Object(entries) => ElValue::map(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), ElValue::from_json(v))),
            ),
        }
    }

    /// Render as JSON data for output; host objects and scopes are rendered
    /// through their display string and variables respectively
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            ElValue::Null => Value::Null,
            ElValue::Boolean(b) => Value::Bool(*b),
            ElValue::Number(n) => number_to_json(n),
            ElValue::String(s) => Value::String(s.clone()),
            ElValue::Enum(constant) => Value::String(constant.name.to_string()),
            ElValue::Bytes(bytes) => JsonNode::Binary(bytes.clone()).to_serde(),
            ElValue::List(items) => Value::Array(items.read().iter().map(|v| v.to_json()).collect()),
            ElValue::Array(array) => {
                Value::Array(array.items.read().iter().map(|v| v.to_json()).collect())
            }
            ElValue::Map(entries) => Value::Object(
                entries
                    .read()
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            ElValue::Json(node) => node.to_serde(),
            ElValue::Object(object) => object
                .to_display_string()
                .map(Value::String)
                .unwrap_or(Value::Null),
            ElValue::Container(container) => Value::Object(
                container
                    .variable_names()
                    .into_iter()
                    .map(|name| {
                        let value = container
                            .get_variable(&name)
                            .map(|v| v.to_json())
                            .unwrap_or(Value::Null);
                        (name, value)
                    })
                    .collect(),
            ),
        }
    }
}

pub(crate) fn number_to_json(n: &Number) -> serde_json::Value {
    use serde_json::Value;
    match *n {
        Number::Byte(v) => Value::from(v),
        Number::Short(v) => Value::from(v),
        Number::Integer(v) => Value::from(v),
        Number::Long(v) => Value::from(v),
        Number::Float(v) => serde_json::Number::from_f64(v as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Number::Double(v) => serde_json::Number::from_f64(v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Number::BigInteger(v) => match i64::try_from(v) {
            Ok(v) => Value::from(v),
            Err(_) => Value::String(v.to_string()),
        },
        Number::BigDecimal(v) => v
            .to_string()
            .parse::<serde_json::Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(v.to_string())),
    }
}

impl PartialEq for ElValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ElValue::Null, ElValue::Null) => true,
            (ElValue::Boolean(a), ElValue::Boolean(b)) => a == b,
            (ElValue::Number(a), ElValue::Number(b)) => a == b,
            (ElValue::String(a), ElValue::String(b)) => a == b,
            (ElValue::Enum(a), ElValue::Enum(b)) => a == b,
            (ElValue::Bytes(a), ElValue::Bytes(b)) => a == b,
            (ElValue::List(a), ElValue::List(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (ElValue::Array(a), ElValue::Array(b)) => {
                Arc::ptr_eq(&a.items, &b.items) || *a.items.read() == *b.items.read()
            }
            (ElValue::Map(a), ElValue::Map(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (ElValue::Json(a), ElValue::Json(b)) => a == b,
            (ElValue::Object(a), ElValue::Object(b)) => a.equals(b.as_ref()),
            (ElValue::Container(a), ElValue::Container(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for ElValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElValue::Null => f.write_str("Null"),
            ElValue::Boolean(b) => f.debug_tuple("Boolean").field(b).finish(),
            ElValue::Number(n) => f.debug_tuple("Number").field(n).finish(),
            ElValue::String(s) => f.debug_tuple("String").field(s).finish(),
            ElValue::Enum(constant) => {
                write!(f, "Enum({}.{})", constant.type_name, constant.name)
            }
            ElValue::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            ElValue::List(items) => f.debug_tuple("List").field(&*items.read()).finish(),
            ElValue::Array(array) => f
                .debug_struct("Array")
                .field("element_type", &array.element_type)
                .field("items", &*array.items.read())
                .finish(),
            ElValue::Map(entries) => f.debug_tuple("Map").field(&*entries.read()).finish(),
            ElValue::Json(node) => f.debug_tuple("Json").field(node).finish(),
            ElValue::Object(object) => f.debug_tuple("Object").field(object).finish(),
            ElValue::Container(container) => fmt::Debug::fmt(container.as_ref(), f),
        }
    }
}

impl fmt::Debug for ElArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElArray")
            .field("element_type", &self.element_type)
            .field("items", &*self.items.read())
            .finish()
    }
}

impl From<bool> for ElValue {
    fn from(value: bool) -> Self {
        ElValue::Boolean(value)
    }
}

impl From<i16> for ElValue {
    fn from(value: i16) -> Self {
        ElValue::Number(Number::Short(value))
    }
}

impl From<i32> for ElValue {
    fn from(value: i32) -> Self {
        ElValue::Number(Number::Integer(value))
    }
}

impl From<i64> for ElValue {
    fn from(value: i64) -> Self {
        ElValue::Number(Number::Long(value))
    }
}

impl From<f64> for ElValue {
    fn from(value: f64) -> Self {
        ElValue::Number(Number::Double(value))
    }
}

impl From<Decimal> for ElValue {
    fn from(value: Decimal) -> Self {
        ElValue::Number(Number::BigDecimal(value))
    }
}

impl From<Number> for ElValue {
    fn from(value: Number) -> Self {
        ElValue::Number(value)
    }
}

impl From<&str> for ElValue {
    fn from(value: &str) -> Self {
        ElValue::String(value.to_string())
    }
}

impl From<String> for ElValue {
    fn from(value: String) -> Self {
        ElValue::String(value)
    }
}

impl From<EnumConstant> for ElValue {
    fn from(value: EnumConstant) -> Self {
        ElValue::Enum(value)
    }
}

impl From<JsonNode> for ElValue {
    fn from(value: JsonNode) -> Self {
        ElValue::Json(value)
    }
}

impl From<SharedContainer> for ElValue {
    fn from(value: SharedContainer) -> Self {
        ElValue::Container(value)
    }
}

impl<T: Into<ElValue>> From<Option<T>> for ElValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ElValue::Null)
    }
}
