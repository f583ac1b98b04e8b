//! JSON node abstraction
//!
//! Workflow variables may hold JSON documents coming from different JSON
//! libraries. Expressions see them through one tagged node type; a
//! [`JsonAdapter`] converts from and to each concrete library.

use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use indexmap::IndexMap;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::number::Number;
use super::value::{ElValue, number_to_json};

/// Numeric sub-kinds of a JSON number node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JsonNumber {
    /// 32-bit integer
    Int(i32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
    /// Large integer
    BigInteger(i128),
    /// Arbitrary precision decimal
    BigDecimal(Decimal),
}

impl JsonNumber {
    /// The number as an EL number
    pub fn to_number(self) -> Number {
        match self {
            JsonNumber::Int(v) => Number::Integer(v),
            JsonNumber::Long(v) => Number::Long(v),
            JsonNumber::Double(v) => Number::Double(v),
            JsonNumber::BigInteger(v) => Number::BigInteger(v),
            JsonNumber::BigDecimal(v) => Number::BigDecimal(v),
        }
    }

    /// Whether the number has no fractional part by kind
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            JsonNumber::Int(_) | JsonNumber::Long(_) | JsonNumber::BigInteger(_)
        )
    }
}

/// Shared array node storage
pub type JsonArray = Arc<RwLock<Vec<JsonNode>>>;

/// Shared object node storage
pub type JsonObject = Arc<RwLock<IndexMap<String, JsonNode>>>;

/// A JSON node
///
/// Container nodes share their storage, so a node read from a variable and
/// modified through an expression is modified in the variable as well.
#[derive(Debug, Clone, Default)]
pub enum JsonNode {
    /// Absent node returned by [`path`](JsonNode::path)
    #[default]
    Missing,
    /// JSON `null`
    Null,
    /// Boolean
    Boolean(bool),
    /// Number
    Number(JsonNumber),
    /// Text
    String(String),
    /// Binary content, rendered as base64 text
    Binary(Vec<u8>),
    /// Array
    Array(JsonArray),
    /// Object
    Object(JsonObject),
}

impl JsonNode {
    /// New empty object node
    pub fn object() -> Self {
        JsonNode::Object(Arc::new(RwLock::new(IndexMap::new())))
    }

    /// New empty array node
    pub fn array() -> Self {
        JsonNode::Array(Arc::new(RwLock::new(Vec::new())))
    }

    /// Field of an object node
    pub fn get(&self, field: &str) -> Option<JsonNode> {
        match self {
            JsonNode::Object(entries) => entries.read().get(field).cloned(),
            _ => None,
        }
    }

    /// Element of an array node
    pub fn get_index(&self, index: usize) -> Option<JsonNode> {
        match self {
            JsonNode::Array(items) => items.read().get(index).cloned(),
            _ => None,
        }
    }

    /// Field of an object node, or a missing node
    pub fn path(&self, field: &str) -> JsonNode {
        self.get(field).unwrap_or(JsonNode::Missing)
    }

    /// Whether an object node has the field
    pub fn has(&self, field: &str) -> bool {
        match self {
            JsonNode::Object(entries) => entries.read().contains_key(field),
            _ => false,
        }
    }

    /// Set a field of an object node; `false` when this is not an object
    pub fn set(&self, field: &str, value: JsonNode) -> bool {
        match self {
            JsonNode::Object(entries) => {
                entries.write().insert(field.to_string(), value);
                true
            }
            _ => false,
        }
    }

    /// Replace an element of an array node; `false` when this is not an
    /// array or the index is out of bounds
    pub fn set_index(&self, index: usize, value: JsonNode) -> bool {
        match self {
            JsonNode::Array(items) => match items.write().get_mut(index) {
                Some(slot) => {
                    *slot = value;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    /// Append to an array node; `false` when this is not an array
    pub fn push(&self, value: JsonNode) -> bool {
        match self {
            JsonNode::Array(items) => {
                items.write().push(value);
                true
            }
            _ => false,
        }
    }

    /// Number of fields or elements; zero for value nodes
    pub fn size(&self) -> usize {
        match self {
            JsonNode::Object(entries) => entries.read().len(),
            JsonNode::Array(items) => items.read().len(),
            _ => 0,
        }
    }

    /// Field names of an object node
    pub fn field_names(&self) -> Vec<String> {
        match self {
            JsonNode::Object(entries) => entries.read().keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Missing node
    pub fn is_missing(&self) -> bool {
        matches!(self, JsonNode::Missing)
    }

    /// Null node
    pub fn is_null(&self) -> bool {
        matches!(self, JsonNode::Null)
    }

    /// Boolean node
    pub fn is_boolean(&self) -> bool {
        matches!(self, JsonNode::Boolean(_))
    }

    /// Number node
    pub fn is_number(&self) -> bool {
        matches!(self, JsonNode::Number(_))
    }

    /// Integral number node
    pub fn is_integral_number(&self) -> bool {
        matches!(self, JsonNode::Number(n) if n.is_integral())
    }

    /// Text node
    pub fn is_string(&self) -> bool {
        matches!(self, JsonNode::String(_))
    }

    /// Binary node
    pub fn is_binary(&self) -> bool {
        matches!(self, JsonNode::Binary(_))
    }

    /// Array node
    pub fn is_array(&self) -> bool {
        matches!(self, JsonNode::Array(_))
    }

    /// Object node
    pub fn is_object(&self) -> bool {
        matches!(self, JsonNode::Object(_))
    }

    /// Array or object node
    pub fn is_container(&self) -> bool {
        self.is_array() || self.is_object()
    }

    /// Text of a text node
    pub fn text_value(&self) -> Option<&str> {
        match self {
            JsonNode::String(s) => Some(s),
            _ => None,
        }
    }

    /// Display text of a node: `"null"` for null nodes, base64 for binary
    /// content, empty for missing and container nodes
    pub fn as_text(&self) -> String {
        match self {
            JsonNode::Missing | JsonNode::Array(_) | JsonNode::Object(_) => String::new(),
            JsonNode::Null => "null".to_string(),
            JsonNode::Boolean(b) => b.to_string(),
            JsonNode::Number(n) => n.to_number().to_string(),
            JsonNode::String(s) => s.clone(),
            JsonNode::Binary(bytes) => BASE64.encode(bytes),
        }
    }

    /// Compact JSON serialization
    pub fn to_json_string(&self) -> String {
        self.to_serde().to_string()
    }

    /// Create the node matching a typed value
    ///
    /// `int`, `long`, `double`, `boolean`, `BigDecimal`, `BigInteger`,
    /// `String` and `byte[]` map to the corresponding node kind; a node is
    /// taken as is; everything else, `null` included, becomes a null node.
    pub fn from_el_value(value: &ElValue) -> JsonNode {
        match value {
            ElValue::Boolean(b) => JsonNode::Boolean(*b),
            ElValue::Number(n) => JsonNode::Number(match *n {
                Number::Byte(v) => JsonNumber::Int(v as i32),
                Number::Short(v) => JsonNumber::Int(v as i32),
                Number::Integer(v) => JsonNumber::Int(v),
                Number::Long(v) => JsonNumber::Long(v),
                Number::Float(v) => JsonNumber::Double(v as f64),
                Number::Double(v) => JsonNumber::Double(v),
                Number::BigInteger(v) => JsonNumber::BigInteger(v),
                Number::BigDecimal(v) => JsonNumber::BigDecimal(v),
            }),
            ElValue::String(s) => JsonNode::String(s.clone()),
            ElValue::Bytes(bytes) => JsonNode::Binary(bytes.clone()),
            ElValue::Json(node) => node.clone(),
            _ => JsonNode::Null,
        }
    }

    /// Value seen by expressions when reading this node: value nodes are
    /// unwrapped, null and missing nodes read as `null`, containers stay
    /// nodes
    pub fn to_el_value(&self) -> ElValue {
        match self {
            JsonNode::Missing | JsonNode::Null => ElValue::Null,
            JsonNode::Boolean(b) => ElValue::Boolean(*b),
            JsonNode::Number(n) => ElValue::Number(n.to_number()),
            JsonNode::String(s) => ElValue::String(s.clone()),
            JsonNode::Binary(bytes) => ElValue::Bytes(bytes.clone()),
            JsonNode::Array(_) | JsonNode::Object(_) => ElValue::Json(self.clone()),
        }
    }

    /// Convert from a `serde_json` value
    pub fn from_serde(value: &serde_json::Value) -> JsonNode {
        SerdeJsonAdapter.to_node(value)
    }

    /// Convert to a `serde_json` value
    pub fn to_serde(&self) -> serde_json::Value {
        SerdeJsonAdapter.from_node(self)
    }
}

impl PartialEq for JsonNode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (JsonNode::Missing, JsonNode::Missing) | (JsonNode::Null, JsonNode::Null) => true,
            (JsonNode::Boolean(a), JsonNode::Boolean(b)) => a == b,
            (JsonNode::Number(a), JsonNode::Number(b)) => a == b,
            (JsonNode::String(a), JsonNode::String(b)) => a == b,
            (JsonNode::Binary(a), JsonNode::Binary(b)) => a == b,
            (JsonNode::Array(a), JsonNode::Array(b)) => Arc::ptr_eq(a, b) || *a.read() == *b.read(),
            (JsonNode::Object(a), JsonNode::Object(b)) => {
                Arc::ptr_eq(a, b) || *a.read() == *b.read()
            }
            _ => false,
        }
    }
}

/// Conversion between [`JsonNode`] and a concrete JSON library
pub trait JsonAdapter {
    /// The library's node type
    type Native;

    /// Wrap a native node
    fn to_node(&self, native: &Self::Native) -> JsonNode;

    /// Produce a native node
    fn from_node(&self, node: &JsonNode) -> Self::Native;
}

/// Adapter for `serde_json::Value`
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonAdapter;

impl JsonAdapter for SerdeJsonAdapter {
    type Native = serde_json::Value;

    fn to_node(&self, native: &serde_json::Value) -> JsonNode {
        use serde_json::Value;
        match native {
            Value::Null => JsonNode::Null,
            Value::Bool(b) => JsonNode::Boolean(*b),
            Value::Number(n) => JsonNode::Number(if let Some(i) = n.as_i64() {
                match i32::try_from(i) {
                    Ok(i) => JsonNumber::Int(i),
                    Err(_) => JsonNumber::Long(i),
                }
            } else if let Some(u) = n.as_u64() {
                JsonNumber::BigInteger(u as i128)
            } else {
                JsonNumber::Double(n.as_f64().unwrap_or(f64::NAN))
            }),
            Value::String(s) => JsonNode::String(s.clone()),
            Value::Array(items) => JsonNode::Array(Arc::new(RwLock::new(
                items.iter().map(|item| self.to_node(item)).collect(),
            ))),
            Value::Object(entries) => JsonNode::Object(Arc::new(RwLock::new(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.to_node(v)))
                    .collect(),
            ))),
        }
    }

    fn from_node(&self, node: &JsonNode) -> serde_json::Value {
        use serde_json::Value;
        match node {
            JsonNode::Missing | JsonNode::Null => Value::Null,
            JsonNode::Boolean(b) => Value::Bool(*b),
            JsonNode::Number(n) => number_to_json(&n.to_number()),
            JsonNode::String(s) => Value::String(s.clone()),
            JsonNode::Binary(bytes) => Value::String(BASE64.encode(bytes)),
            JsonNode::Array(items) => {
                Value::Array(items.read().iter().map(|n| self.from_node(n)).collect())
            }
            JsonNode::Object(entries) => Value::Object(
                entries
                    .read()
                    .iter()
                    .map(|(k, v)| (k.clone(), self.from_node(v)))
                    .collect(),
            ),
        }
    }
}
