//! Bean properties of host objects

use super::{ElResolver, Resolution, ResolverContext, property_name};
use crate::evaluator::error::{EvaluationError, EvaluationResult};
use crate::evaluator::method_resolver::MethodResolver;
use crate::model::{ElType, ElValue, TypeCoercion};
use crate::registry::TypeRegistry;

/// `getX()` / `isX()` getters, then public fields; writes go through
/// `setX(value)`, then writable fields
///
/// Only host objects and enum constants are handled.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeanResolver;

pub(super) fn accessor(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("{prefix}{}{}", first.to_uppercase(), chars.as_str()),
        None => prefix.to_string(),
    }
}

/// Call the no-argument `getX()` or boolean `isX()` of `ty` on `base`;
/// `None` when the type declares neither
pub(super) fn read_getter(
    types: &TypeRegistry,
    ty: &ElType,
    base: &ElValue,
    property: &str,
) -> EvaluationResult<Option<ElValue>> {
    let getter = types
        .methods_named(ty, &accessor("get", property))
        .into_iter()
        .find(|m| m.arity() == 0)
        .or_else(|| {
            types
                .methods_named(ty, &accessor("is", property))
                .into_iter()
                .find(|m| m.arity() == 0 && m.return_type.is_boolean())
        });
    let Some(getter) = getter else {
        return Ok(None);
    };
    getter
        .invoke(base, &[])
        .map(Some)
        .map_err(|source| EvaluationError::Invocation {
            target: getter.to_string(),
            source,
        })
}

fn is_bean(base: Option<&ElValue>) -> Option<&ElValue> {
    base.filter(|b| matches!(b, ElValue::Object(_) | ElValue::Enum(_)))
}

impl ElResolver for BeanResolver {
    fn name(&self) -> &str {
        "bean"
    }

    fn get_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
    ) -> EvaluationResult<Resolution> {
        let Some(base) = is_bean(base) else {
            return Ok(Resolution::NotHandled);
        };
        let name = property_name(property)?;
        let ty = base.el_type().unwrap_or(ElType::Object);
        let types = context.types;

        if let Some(value) = read_getter(types, &ty, base, &name)? {
            return Ok(Resolution::Handled(value));
        }

        match types.field(&ty, &name) {
            Some(field) => field
                .get(base)
                .map(Resolution::Handled)
                .map_err(|source| EvaluationError::Invocation {
                    target: format!("{}.{}", ty.name(), field.name),
                    source,
                }),
            None => Ok(Resolution::NotHandled),
        }
    }

    fn set_value(
        &self,
        context: &ResolverContext<'_>,
        base: Option<&ElValue>,
        property: &ElValue,
        value: ElValue,
    ) -> EvaluationResult<bool> {
        let Some(base) = is_bean(base) else {
            return Ok(false);
        };
        let name = property_name(property)?;
        let ty = base.el_type().unwrap_or(ElType::Object);
        let types = context.types;

        let setter_name = accessor("set", &name);
        let has_setter = types
            .methods_named(&ty, &setter_name)
            .iter()
            .any(|m| m.arity() == 1);
        if has_setter {
            MethodResolver::new(types).invoke(base, &setter_name, None, &[value])?;
            return Ok(true);
        }

        let Some(field) = types.field(&ty, &name) else {
            return Ok(false);
        };
        if !field.is_writable() {
            return Err(EvaluationError::PropertyNotWritable {
                property: name,
                class: ty.name(),
            });
        }
        let value = TypeCoercion::coerce_to_type(&value, &field.field_type, types)?;
        field
            .set(base, value)
            .map_err(|source| EvaluationError::Invocation {
                target: format!("{}.{}", ty.name(), field.name),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ElObject;
    use crate::registry::{ClassBuilder, TypeRegistry};
    use parking_lot::RwLock;
    use std::any::Any;

    #[derive(Default)]
    struct Person {
        name: RwLock<String>,
    }

    impl ElObject for Person {
        fn class_name(&self) -> &str {
            "Person"
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register(
            ClassBuilder::new("Person")
                .method_on::<Person, _>("getName", [], ElType::String, |p, _| {
                    Ok(ElValue::from(p.name.read().clone()))
                })
                .method_on::<Person, _>("setName", [ElType::String], ElType::Object, |p, args| {
                    *p.name.write() = args[0].as_str().unwrap_or_default().to_string();
                    Ok(ElValue::Null)
                })
                .method_on::<Person, _>("isActive", [], ElType::BOOLEAN, |_, _| {
                    Ok(ElValue::Boolean(true))
                })
                .field("kind", ElType::String, |_| Ok(ElValue::from("human")))
                .build(),
        );
        types
    }

    #[test]
    fn test_getters_fields_and_setters() {
        let types = types();
        let context = ResolverContext {
            types: &types,
            root: None,
            principal: None,
        };
        let person = ElValue::object(Person::default());
        let get = |name: &str| BeanResolver.get_value(&context, Some(&person), &name.into()).unwrap();

        assert!(BeanResolver
            .set_value(&context, Some(&person), &"name".into(), "Kermit".into())
            .unwrap());
        assert_eq!(get("name"), Resolution::Handled("Kermit".into()));
        assert_eq!(get("active"), Resolution::Handled(true.into()));
        assert_eq!(get("kind"), Resolution::Handled("human".into()));
        assert_eq!(get("missing"), Resolution::NotHandled);

        let err = BeanResolver
            .set_value(&context, Some(&person), &"kind".into(), "frog".into())
            .unwrap_err();
        assert!(matches!(err, EvaluationError::PropertyNotWritable { .. }));
    }
}
