//! Method tables of the built-in value classes

use regex::Regex;
use rust_decimal::Decimal;

use super::class::{ClassBuilder, ClassDescriptor, HostResult, OBJECT_CLASS, TypeRegistry};
use crate::model::{
    ElArray, ElType, ElValue, JsonNode, Number, ObjectError, PrimitiveKind, TypeCoercion,
    VariableContainer,
};

/// Register `Object`, `String`, `Number`, `Boolean`, `BigDecimal`, `List`,
/// `Map`, `Enum`, `JsonNode` and `VariableContainer`
pub fn register_builtin_classes(registry: &mut TypeRegistry) {
    registry.register(object_class());
    registry.register(string_class());
    registry.register(number_class());
    registry.register(boolean_class());
    registry.register(big_decimal_class());
    registry.register(list_class());
    registry.register(map_class());
    registry.register(enum_class());
    registry.register(json_node_class());
    registry.register(variable_container_class());
}

fn host_error(message: impl Into<String>) -> ObjectError {
    ObjectError::new(message)
}

fn display(value: &ElValue) -> HostResult<String> {
    TypeCoercion::display_string(value).map_err(|e| host_error(e.to_string()))
}

fn text<'a>(value: &'a ElValue, what: &str) -> HostResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| host_error(format!("{what} is not a String: {}", value.class_name())))
}

fn int(value: &ElValue) -> HostResult<i64> {
    value
        .as_number()
        .and_then(|n| n.to_i64())
        .ok_or_else(|| host_error(format!("{} is not an int", value.class_name())))
}

fn index(value: &ElValue, len: usize) -> HostResult<usize> {
    let i = int(value)?;
    usize::try_from(i)
        .ok()
        .filter(|i| *i < len)
        .ok_or_else(|| host_error(format!("Index {i} out of bounds for length {len}")))
}

fn number(value: &ElValue) -> HostResult<Number> {
    value
        .as_number()
        .ok_or_else(|| host_error(format!("{} is not a Number", value.class_name())))
}

fn object_class() -> ClassDescriptor {
    ClassBuilder::new(OBJECT_CLASS)
        .method("toString", [], ElType::String, |target, _| {
            display(target).map(ElValue::String)
        })
        .method("equals", [ElType::Object], ElType::BOOLEAN, |target, args| {
            Ok(ElValue::Boolean(*target == args[0]))
        })
        .build()
}

fn string_class() -> ClassDescriptor {
    let s = |target: &ElValue| -> HostResult<String> { text(target, "target").map(str::to_string) };
    ClassBuilder::new("java.lang.String")
        .method("length", [], ElType::INT, move |t, _| {
            Ok(ElValue::from(s(t)?.chars().count() as i32))
        })
        .method("isEmpty", [], ElType::BOOLEAN, move |t, _| {
            Ok(ElValue::Boolean(s(t)?.is_empty()))
        })
        .method("toUpperCase", [], ElType::String, move |t, _| {
            Ok(ElValue::String(s(t)?.to_uppercase()))
        })
        .method("toLowerCase", [], ElType::String, move |t, _| {
            Ok(ElValue::String(s(t)?.to_lowercase()))
        })
        .method("trim", [], ElType::String, move |t, _| {
            Ok(ElValue::String(s(t)?.trim().to_string()))
        })
        .method("contains", [ElType::String], ElType::BOOLEAN, move |t, a| {
            Ok(ElValue::Boolean(s(t)?.contains(text(&a[0], "argument")?)))
        })
        .method("startsWith", [ElType::String], ElType::BOOLEAN, move |t, a| {
            Ok(ElValue::Boolean(s(t)?.starts_with(text(&a[0], "argument")?)))
        })
        .method("endsWith", [ElType::String], ElType::BOOLEAN, move |t, a| {
            Ok(ElValue::Boolean(s(t)?.ends_with(text(&a[0], "argument")?)))
        })
        .method(
            "equalsIgnoreCase",
            [ElType::String],
            ElType::BOOLEAN,
            move |t, a| {
                let other = a[0].as_str().unwrap_or_default();
                Ok(ElValue::Boolean(
                    !a[0].is_null() && s(t)?.to_lowercase() == other.to_lowercase(),
                ))
            },
        )
        .method("indexOf", [ElType::String], ElType::INT, move |t, a| {
            let haystack = s(t)?;
            let found = haystack
                .find(text(&a[0], "argument")?)
                .map(|byte| haystack[..byte].chars().count() as i32)
                .unwrap_or(-1);
            Ok(ElValue::from(found))
        })
        .method("substring", [ElType::INT], ElType::String, move |t, a| {
            let chars: Vec<char> = s(t)?.chars().collect();
            let begin = int(&a[0])?;
            substring(&chars, begin, chars.len() as i64)
        })
        .method(
            "substring",
            [ElType::INT, ElType::INT],
            ElType::String,
            move |t, a| {
                let chars: Vec<char> = s(t)?.chars().collect();
                substring(&chars, int(&a[0])?, int(&a[1])?)
            },
        )
        .method(
            "replace",
            [ElType::String, ElType::String],
            ElType::String,
            move |t, a| {
                Ok(ElValue::String(s(t)?.replace(
                    text(&a[0], "target")?,
                    text(&a[1], "replacement")?,
                )))
            },
        )
        .method("concat", [ElType::String], ElType::String, move |t, a| {
            Ok(ElValue::String(format!("{}{}", s(t)?, text(&a[0], "argument")?)))
        })
        .method("matches", [ElType::String], ElType::BOOLEAN, move |t, a| {
            let pattern = anchored(text(&a[0], "regex")?)?;
            Ok(ElValue::Boolean(pattern.is_match(&s(t)?)))
        })
        .method(
            "split",
            [ElType::String],
            ElType::array_of(ElType::String),
            move |t, a| {
                let pattern = Regex::new(text(&a[0], "regex")?)
                    .map_err(|e| host_error(format!("Invalid regex: {e}")))?;
                let value = s(t)?;
                let mut parts: Vec<&str> = pattern.split(&value).collect();
                while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
                    parts.pop();
                }
                Ok(ElValue::Array(ElArray::new(
                    ElType::String,
                    parts.into_iter().map(ElValue::from).collect(),
                )))
            },
        )
        .build()
}

fn anchored(pattern: &str) -> HostResult<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|e| host_error(format!("Invalid regex: {e}")))
}

fn substring(chars: &[char], begin: i64, end: i64) -> HostResult<ElValue> {
    let len = chars.len() as i64;
    if begin < 0 || end > len || begin > end {
        return Err(host_error(format!(
            "begin {begin}, end {end}, length {len}"
        )));
    }
    Ok(ElValue::String(
        chars[begin as usize..end as usize].iter().collect(),
    ))
}

fn number_class() -> ClassDescriptor {
    fn wide(target: &ElValue) -> HostResult<i128> {
        Ok(number(target)?.to_i128().unwrap_or(0))
    }
    ClassBuilder::new("java.lang.Number")
        .method("intValue", [], ElType::INT, |t, _| {
            Ok(ElValue::from(wide(t)? as i32))
        })
        .method("longValue", [], ElType::LONG, |t, _| {
            Ok(ElValue::from(wide(t)? as i64))
        })
        .method(
            "shortValue",
            [],
            ElType::Primitive(PrimitiveKind::Short),
            |t, _| Ok(ElValue::from(wide(t)? as i16)),
        )
        .method(
            "byteValue",
            [],
            ElType::Primitive(PrimitiveKind::Byte),
            |t, _| Ok(ElValue::Number(Number::Byte(wide(t)? as i8))),
        )
        .method("doubleValue", [], ElType::DOUBLE, |t, _| {
            Ok(ElValue::from(number(t)?.to_f64()))
        })
        .method(
            "floatValue",
            [],
            ElType::Primitive(PrimitiveKind::Float),
            |t, _| Ok(ElValue::Number(Number::Float(number(t)?.to_f64() as f32))),
        )
        .build()
}

fn boolean_class() -> ClassDescriptor {
    ClassBuilder::new("java.lang.Boolean")
        .method("booleanValue", [], ElType::BOOLEAN, |t, _| {
            t.as_bool()
                .map(ElValue::Boolean)
                .ok_or_else(|| host_error("not a Boolean"))
        })
        .build()
}

fn big_decimal_class() -> ClassDescriptor {
    fn decimal(value: &ElValue) -> HostResult<Decimal> {
        match value.as_number() {
            Some(Number::BigDecimal(d)) => Ok(d),
            _ => Err(host_error(format!(
                "{} is not a BigDecimal",
                value.class_name()
            ))),
        }
    }
    fn arithmetic(
        op: fn(Decimal, Decimal) -> Option<Decimal>,
    ) -> impl Fn(&ElValue, &[ElValue]) -> HostResult<ElValue> + Send + Sync + 'static {
        move |t, a| {
            op(decimal(t)?, decimal(&a[0])?)
                .map(ElValue::from)
                .ok_or_else(|| host_error("BigDecimal overflow"))
        }
    }
    ClassBuilder::new("java.math.BigDecimal")
        .method(
            "add",
            [ElType::BigDecimal],
            ElType::BigDecimal,
            arithmetic(Decimal::checked_add),
        )
        .method(
            "subtract",
            [ElType::BigDecimal],
            ElType::BigDecimal,
            arithmetic(Decimal::checked_sub),
        )
        .method(
            "multiply",
            [ElType::BigDecimal],
            ElType::BigDecimal,
            arithmetic(Decimal::checked_mul),
        )
        .method("negate", [], ElType::BigDecimal, |t, _| {
            Ok(ElValue::from(-decimal(t)?))
        })
        .method("scale", [], ElType::INT, |t, _| {
            Ok(ElValue::from(decimal(t)?.scale() as i32))
        })
        .build()
}

fn list_class() -> ClassDescriptor {
    fn items(target: &ElValue) -> HostResult<Vec<ElValue>> {
        match target {
            ElValue::List(items) => Ok(items.read().clone()),
            ElValue::Array(array) => Ok(array.to_vec()),
            other => Err(host_error(format!("{} is not a List", other.class_name()))),
        }
    }
    ClassBuilder::new("java.util.List")
        .method("size", [], ElType::INT, |t, _| {
            Ok(ElValue::from(items(t)?.len() as i32))
        })
        .method("isEmpty", [], ElType::BOOLEAN, |t, _| {
            Ok(ElValue::Boolean(items(t)?.is_empty()))
        })
        .method("get", [ElType::INT], ElType::Object, |t, a| {
            let items = items(t)?;
            Ok(items[index(&a[0], items.len())?].clone())
        })
        .method("contains", [ElType::Object], ElType::BOOLEAN, |t, a| {
            Ok(ElValue::Boolean(items(t)?.contains(&a[0])))
        })
        .method("indexOf", [ElType::Object], ElType::INT, |t, a| {
            let position = items(t)?.iter().position(|item| *item == a[0]);
            Ok(ElValue::from(position.map(|p| p as i32).unwrap_or(-1)))
        })
        .method("add", [ElType::Object], ElType::BOOLEAN, |t, a| match t {
            ElValue::List(items) => {
                items.write().push(a[0].clone());
                Ok(ElValue::Boolean(true))
            }
            other => Err(host_error(format!(
                "add is not supported on {}",
                other.class_name()
            ))),
        })
        .build()
}

fn map_class() -> ClassDescriptor {
    fn entries(target: &ElValue) -> HostResult<&crate::model::ElMap> {
        match target {
            ElValue::Map(entries) => Ok(entries),
            other => Err(host_error(format!("{} is not a Map", other.class_name()))),
        }
    }
    fn key(value: &ElValue) -> HostResult<String> {
        TypeCoercion::coerce_to_string(value).map_err(|e| host_error(e.to_string()))
    }
    ClassBuilder::new("java.util.Map")
        .method("size", [], ElType::INT, |t, _| {
            Ok(ElValue::from(entries(t)?.read().len() as i32))
        })
        .method("isEmpty", [], ElType::BOOLEAN, |t, _| {
            Ok(ElValue::Boolean(entries(t)?.read().is_empty()))
        })
        .method("get", [ElType::Object], ElType::Object, |t, a| {
            let key = key(&a[0])?;
            Ok(entries(t)?.read().get(&key).cloned().unwrap_or_default())
        })
        .method("containsKey", [ElType::Object], ElType::BOOLEAN, |t, a| {
            let key = key(&a[0])?;
            Ok(ElValue::Boolean(entries(t)?.read().contains_key(&key)))
        })
        .method(
            "containsValue",
            [ElType::Object],
            ElType::BOOLEAN,
            |t, a| {
                Ok(ElValue::Boolean(
                    entries(t)?.read().values().any(|v| *v == a[0]),
                ))
            },
        )
        .method(
            "put",
            [ElType::Object, ElType::Object],
            ElType::Object,
            |t, a| {
                let key = key(&a[0])?;
                Ok(entries(t)?
                    .write()
                    .insert(key, a[1].clone())
                    .unwrap_or_default())
            },
        )
        .method("remove", [ElType::Object], ElType::Object, |t, a| {
            let key = key(&a[0])?;
            Ok(entries(t)?.write().shift_remove(&key).unwrap_or_default())
        })
        .method("keySet", [], ElType::List, |t, _| {
            Ok(ElValue::list(
                entries(t)?.read().keys().cloned().map(ElValue::String),
            ))
        })
        .method("values", [], ElType::List, |t, _| {
            Ok(ElValue::list(entries(t)?.read().values().cloned()))
        })
        .build()
}

fn enum_class() -> ClassDescriptor {
    fn constant(target: &ElValue) -> HostResult<&crate::model::EnumConstant> {
        match target {
            ElValue::Enum(constant) => Ok(constant),
            other => Err(host_error(format!("{} is not an Enum", other.class_name()))),
        }
    }
    ClassBuilder::new("java.lang.Enum")
        .method("name", [], ElType::String, |t, _| {
            Ok(ElValue::String(constant(t)?.name.to_string()))
        })
        .method("ordinal", [], ElType::INT, |t, _| {
            Ok(ElValue::from(constant(t)?.ordinal))
        })
        .method("toString", [], ElType::String, |t, _| {
            Ok(ElValue::String(constant(t)?.display_string().to_string()))
        })
        .build()
}

fn json_node_class() -> ClassDescriptor {
    fn node(target: &ElValue) -> HostResult<&JsonNode> {
        match target {
            ElValue::Json(node) => Ok(node),
            other => Err(host_error(format!(
                "{} is not a JsonNode",
                other.class_name()
            ))),
        }
    }
    fn or_null(node: Option<JsonNode>) -> ElValue {
        node.map(ElValue::Json).unwrap_or_default()
    }
    fn predicate(
        test: fn(&JsonNode) -> bool,
    ) -> impl Fn(&ElValue, &[ElValue]) -> HostResult<ElValue> + Send + Sync + 'static {
        move |t, _| Ok(ElValue::Boolean(test(node(t)?)))
    }
    fn put(t: &ElValue, a: &[ElValue]) -> HostResult<ElValue> {
        let target = node(t)?;
        let field = text(&a[0], "field name")?;
        if target.set(field, JsonNode::from_el_value(&a[1])) {
            Ok(t.clone())
        } else {
            Err(host_error("put is only supported on object nodes"))
        }
    }

    let mut builder = ClassBuilder::new("JsonNode")
        .method("get", [ElType::String], ElType::JsonNode, |t, a| {
            Ok(or_null(node(t)?.get(text(&a[0], "field name")?)))
        })
        .method("get", [ElType::INT], ElType::JsonNode, |t, a| {
            let i = int(&a[0])?;
            Ok(or_null(
                usize::try_from(i)
                    .ok()
                    .and_then(|i| node(t).ok().and_then(|n| n.get_index(i))),
            ))
        })
        .method("path", [ElType::String], ElType::JsonNode, |t, a| {
            Ok(ElValue::Json(node(t)?.path(text(&a[0], "field name")?)))
        })
        .method("has", [ElType::String], ElType::BOOLEAN, |t, a| {
            Ok(ElValue::Boolean(node(t)?.has(text(&a[0], "field name")?)))
        })
        .method("size", [], ElType::INT, |t, _| {
            Ok(ElValue::from(node(t)?.size() as i32))
        })
        .method("isNull", [], ElType::BOOLEAN, predicate(JsonNode::is_null))
        .method(
            "isMissingNode",
            [],
            ElType::BOOLEAN,
            predicate(JsonNode::is_missing),
        )
        .method("isTextual", [], ElType::BOOLEAN, predicate(JsonNode::is_string))
        .method("isNumber", [], ElType::BOOLEAN, predicate(JsonNode::is_number))
        .method(
            "isIntegralNumber",
            [],
            ElType::BOOLEAN,
            predicate(JsonNode::is_integral_number),
        )
        .method("isBoolean", [], ElType::BOOLEAN, predicate(JsonNode::is_boolean))
        .method("isBinary", [], ElType::BOOLEAN, predicate(JsonNode::is_binary))
        .method("isArray", [], ElType::BOOLEAN, predicate(JsonNode::is_array))
        .method("isObject", [], ElType::BOOLEAN, predicate(JsonNode::is_object))
        .method(
            "isContainerNode",
            [],
            ElType::BOOLEAN,
            predicate(JsonNode::is_container),
        )
        .method("asText", [], ElType::String, |t, _| {
            Ok(ElValue::String(node(t)?.as_text()))
        })
        .method("textValue", [], ElType::String, |t, _| {
            Ok(node(t)?
                .text_value()
                .map(ElValue::from)
                .unwrap_or_default())
        })
        .method("asInt", [], ElType::INT, |t, _| {
            Ok(ElValue::from(json_number(node(t)?).to_i128().unwrap_or(0) as i32))
        })
        .method("asLong", [], ElType::LONG, |t, _| {
            Ok(ElValue::from(json_number(node(t)?).to_i128().unwrap_or(0) as i64))
        })
        .method("asDouble", [], ElType::DOUBLE, |t, _| {
            Ok(ElValue::from(json_number(node(t)?).to_f64()))
        })
        .method("asBoolean", [], ElType::BOOLEAN, |t, _| {
            Ok(ElValue::Boolean(match node(t)? {
                JsonNode::Boolean(b) => *b,
                JsonNode::String(s) => s.trim() == "true",
                JsonNode::Number(n) => !n.to_number().is_zero(),
                _ => false,
            }))
        })
        .method("toString", [], ElType::String, |t, _| {
            Ok(ElValue::String(node(t)?.to_json_string()))
        })
        .method(
            "set",
            [ElType::String, ElType::JsonNode],
            ElType::JsonNode,
            put,
        )
        .method("putNull", [ElType::String], ElType::JsonNode, |t, a| {
            put(t, &[a[0].clone(), ElValue::Null])
        });

    for value_type in [
        ElType::String,
        ElType::INT,
        ElType::INTEGER_OBJECT,
        ElType::LONG,
        ElType::LONG_OBJECT,
        ElType::DOUBLE,
        ElType::DOUBLE_OBJECT,
        ElType::BOOLEAN,
        ElType::BOOLEAN_OBJECT,
        ElType::BigDecimal,
        ElType::BigInteger,
        ElType::array_of(ElType::Primitive(PrimitiveKind::Byte)),
    ] {
        builder = builder.method("put", [ElType::String, value_type], ElType::JsonNode, put);
    }
    builder.build()
}

/// Numeric view of a node the way `asInt`/`asDouble` read it: text is
/// parsed, anything else is zero
fn json_number(node: &JsonNode) -> Number {
    match node {
        JsonNode::Number(n) => n.to_number(),
        JsonNode::Boolean(true) => Number::Integer(1),
        JsonNode::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Number::Double)
            .unwrap_or(Number::Integer(0)),
        _ => Number::Integer(0),
    }
}

/// Scope methods; host classes extending `VariableContainer` inherit them
fn variable_container_class() -> ClassDescriptor {
    fn scope(target: &ElValue) -> HostResult<&dyn VariableContainer> {
        target
            .as_variable_container()
            .ok_or_else(|| host_error(format!("{} is not a VariableContainer", target.class_name())))
    }
    fn name(value: &ElValue) -> HostResult<String> {
        TypeCoercion::coerce_to_string(value).map_err(|e| host_error(e.to_string()))
    }
    ClassBuilder::new(ElType::VariableContainer.name())
        .method("getVariable", [ElType::String], ElType::Object, |t, a| {
            Ok(scope(t)?.get_variable(&name(&a[0])?).unwrap_or_default())
        })
        .method("hasVariable", [ElType::String], ElType::BOOLEAN, |t, a| {
            Ok(ElValue::Boolean(scope(t)?.has_variable(&name(&a[0])?)))
        })
        .method(
            "setVariable",
            [ElType::String, ElType::Object],
            ElType::Object,
            |t, a| {
                scope(t)?.set_variable(&name(&a[0])?, a[1].clone())?;
                Ok(ElValue::Null)
            },
        )
        .method("getVariableNames", [], ElType::List, |t, _| {
            Ok(ElValue::list(
                scope(t)?.variable_names().into_iter().map(ElValue::String),
            ))
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TypeHierarchy;

    fn call(registry: &TypeRegistry, target: &ElValue, name: &str, args: &[ElValue]) -> ElValue {
        let ty = target.el_type().unwrap();
        let method = registry
            .methods_named(&ty, name)
            .into_iter()
            .find(|m| m.arity() == args.len())
            .unwrap();
        method.invoke(target, args).unwrap()
    }

    #[test]
    fn test_string_methods() {
        let registry = TypeRegistry::new();
        let value = ElValue::from("Hello, World");
        assert_eq!(call(&registry, &value, "length", &[]), ElValue::from(12));
        assert_eq!(
            call(&registry, &value, "substring", &[ElValue::from(7)]),
            ElValue::from("World")
        );
        assert_eq!(
            call(&registry, &value, "matches", &[ElValue::from("H.*d")]),
            ElValue::Boolean(true)
        );
        assert_eq!(
            call(&registry, &value, "toString", &[]),
            ElValue::from("Hello, World")
        );
    }

    #[test]
    fn test_enum_name_and_to_string() {
        let mut registry = TypeRegistry::new();
        registry.register(
            ClassBuilder::enumeration("Fruit", ["APPLE"])
                .display_names([("APPLE", "An apple")])
                .build(),
        );
        let apple = ElValue::Enum(registry.enum_constant("Fruit", "APPLE").unwrap());
        assert_eq!(call(&registry, &apple, "name", &[]), ElValue::from("APPLE"));
        assert_eq!(
            call(&registry, &apple, "toString", &[]),
            ElValue::from("An apple")
        );
    }

    #[test]
    fn test_json_put_overloads_create_typed_nodes() {
        let registry = TypeRegistry::new();
        let puts = registry.methods_named(&ElType::JsonNode, "put");
        assert_eq!(puts.len(), 12);
        let doc = ElValue::Json(JsonNode::object());
        call(
            &registry,
            &doc,
            "putNull",
            &[ElValue::from("nothing")],
        );
        let ElValue::Json(node) = &doc else {
            unreachable!()
        };
        assert!(node.path("nothing").is_null());
    }

    #[test]
    fn test_variable_container_methods() {
        let registry = TypeRegistry::new();
        let scope = ElValue::container(
            crate::model::MapVariableContainer::new().with_variable("x", 5),
        );
        assert_eq!(call(&registry, &scope, "getVariable", &["x".into()]), ElValue::from(5));
        assert_eq!(call(&registry, &scope, "getVariable", &["y".into()]), ElValue::Null);
        assert_eq!(
            call(&registry, &scope, "hasVariable", &["y".into()]),
            ElValue::Boolean(false)
        );
        call(&registry, &scope, "setVariable", &["y".into(), true.into()]);
        assert_eq!(
            call(&registry, &scope, "getVariableNames", &[]),
            ElValue::list(vec!["x".into(), "y".into()])
        );
    }
}
