//! Overload resolution for method calls on host values
//!
//! Candidates are the registered methods with a matching name. Each one is
//! placed in the first applicability tier it satisfies:
//!
//! 1. [`Tier::Exact`]: every argument's runtime type equals the parameter type
//! 2. [`Tier::Assignable`]: subtyping, primitive widening, boxing, unboxing
//! 3. [`Tier::Coercible`]: EL coercion (`"5"` to `int`, enum to `String`)
//! 4. [`Tier::Varargs`]: trailing arguments packed into the array parameter
//!
//! Only the best non-empty tier is considered. Within it the strictly most
//! specific candidate wins; if there is none the call is ambiguous.

use std::sync::Arc;

use log::trace;

use super::error::{EvaluationError, EvaluationResult};
use crate::model::{ElArray, ElType, ElValue, TypeCoercion};
use crate::registry::{MethodDescriptor, TypeRegistry};

/// Applicability tier of a candidate, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Parameter types equal the argument types
    Exact,
    /// Method invocation conversion without varargs
    Assignable,
    /// EL coercion without varargs
    Coercible,
    /// Variable-arity expansion
    Varargs,
}

/// A candidate method that accepts the arguments
#[derive(Debug, Clone)]
pub struct MethodCandidate {
    /// The method
    pub method: Arc<MethodDescriptor>,
    /// Tier the method was accepted in
    pub tier: Tier,
    /// Parameter type at each argument position, varargs expanded
    pub positional_types: Vec<ElType>,
}

/// The chosen method together with its converted arguments
#[derive(Debug, Clone)]
pub struct ResolvedMethod {
    /// Method to invoke
    pub method: Arc<MethodDescriptor>,
    /// Arguments converted to the parameter types, varargs packed
    pub arguments: Vec<ElValue>,
}

/// Resolves method calls against a [`TypeRegistry`]
pub struct MethodResolver<'a> {
    types: &'a TypeRegistry,
}

impl<'a> MethodResolver<'a> {
    /// Create a resolver over the registry
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self { types }
    }

    /// Find the method `name` of `target` for the given arguments
    ///
    /// With `declared` parameter types only the method with exactly that
    /// signature is considered.
    pub fn resolve(
        &self,
        target: &ElValue,
        name: &str,
        declared: Option<&[ElType]>,
        args: &[ElValue],
    ) -> EvaluationResult<ResolvedMethod> {
        let target_type = target.el_type().unwrap_or(ElType::Object);
        let methods = self.types.methods_named(&target_type, name);

        if let Some(declared) = declared {
            let method = methods
                .into_iter()
                .find(|m| m.parameter_types.as_slice() == declared)
                .ok_or_else(|| self.not_found(target, name, args))?;
            let positional = self
                .positional_types(&method, args.len())
                .ok_or_else(|| self.not_found(target, name, args))?;
            let candidate = MethodCandidate {
                tier: if method.varargs { Tier::Varargs } else { Tier::Exact },
                method,
                positional_types: positional,
            };
            return self.convert(candidate, args);
        }

        let mut candidates: Vec<MethodCandidate> = methods
            .into_iter()
            .filter_map(|method| self.classify(method, args))
            .collect();
        if candidates.is_empty() {
            return Err(self.not_found(target, name, args));
        }

        let best_tier = candidates.iter().map(|c| c.tier).min().unwrap_or(Tier::Varargs);
        candidates.retain(|c| c.tier == best_tier);

        let winner = self.most_specific(&candidates).ok_or_else(|| {
            EvaluationError::AmbiguousMethod {
                class: target.class_name(),
                method: name.to_string(),
                arguments: argument_classes(args),
            }
        })?;
        trace!("resolved {name} on {} to {} ({:?})", target.class_name(), winner.method, winner.tier);
        self.convert(winner.clone(), args)
    }

    /// Resolve and invoke in one step
    pub fn invoke(
        &self,
        target: &ElValue,
        name: &str,
        declared: Option<&[ElType]>,
        args: &[ElValue],
    ) -> EvaluationResult<ElValue> {
        let resolved = self.resolve(target, name, declared, args)?;
        resolved
            .method
            .invoke(target, &resolved.arguments)
            .map_err(|source| EvaluationError::Invocation {
                target: resolved.method.to_string(),
                source,
            })
    }

    fn not_found(&self, target: &ElValue, name: &str, args: &[ElValue]) -> EvaluationError {
        EvaluationError::MethodNotFound {
            class: target.class_name(),
            method: name.to_string(),
            arguments: argument_classes(args),
        }
    }

    /// Parameter type per argument position, or `None` if the arity does
    /// not fit
    fn positional_types(&self, method: &MethodDescriptor, count: usize) -> Option<Vec<ElType>> {
        let arity = method.arity();
        if !method.varargs {
            return (arity == count).then(|| method.parameter_types.clone());
        }
        let element = method.varargs_element()?;
        if count + 1 < arity {
            return None;
        }
        let mut types = method.parameter_types[..arity - 1].to_vec();
        types.extend(std::iter::repeat_n(element.clone(), count + 1 - arity));
        Some(types)
    }

    fn classify(&self, method: Arc<MethodDescriptor>, args: &[ElValue]) -> Option<MethodCandidate> {
        if method.arity() == args.len() {
            let params = &method.parameter_types;
            let tier = if self.all(params, args, |p, a| self.is_exact(p, a)) {
                Some(Tier::Exact)
            } else if self.all(params, args, |p, a| self.is_assignable(p, a)) {
                Some(Tier::Assignable)
            } else if self.all(params, args, |p, a| self.is_coercible(p, a)) {
                Some(Tier::Coercible)
            } else {
                None
            };
            if let Some(tier) = tier {
                return Some(MethodCandidate {
                    positional_types: params.clone(),
                    method,
                    tier,
                });
            }
        }

        if !method.varargs {
            return None;
        }
        let positional = self.positional_types(&method, args.len())?;
        self.all(&positional, args, |p, a| self.is_coercible(p, a))
            .then_some(MethodCandidate {
                method,
                tier: Tier::Varargs,
                positional_types: positional,
            })
    }

    fn all(
        &self,
        params: &[ElType],
        args: &[ElValue],
        test: impl Fn(&ElType, &ElValue) -> bool,
    ) -> bool {
        params.len() == args.len() && params.iter().zip(args).all(|(p, a)| test(p, a))
    }

    fn is_exact(&self, param: &ElType, arg: &ElValue) -> bool {
        arg.el_type().is_some_and(|t| &t == param)
    }

    fn is_assignable(&self, param: &ElType, arg: &ElValue) -> bool {
        match arg.el_type() {
            Some(arg_type) => param.is_convertible_from(&arg_type, self.types),
            None => !param.is_primitive(),
        }
    }

    fn is_coercible(&self, param: &ElType, arg: &ElValue) -> bool {
        self.is_assignable(param, arg) || TypeCoercion::is_coercible(arg, param, self.types)
    }

    /// `a` is at least as specific as `b` at every position
    fn at_least_as_specific(&self, a: &MethodCandidate, b: &MethodCandidate) -> bool {
        a.positional_types
            .iter()
            .zip(&b.positional_types)
            .all(|(pa, pb)| pb.is_convertible_from(pa, self.types))
    }

    fn most_specific<'c>(&self, candidates: &'c [MethodCandidate]) -> Option<&'c MethodCandidate> {
        let mut winners = candidates.iter().enumerate().filter(|(i, a)| {
            candidates
                .iter()
                .enumerate()
                .all(|(j, b)| *i == j || self.at_least_as_specific(a, b))
        });
        match (winners.next(), winners.next()) {
            (Some((_, winner)), None) => Some(winner),
            _ => None,
        }
    }

    fn convert(&self, candidate: MethodCandidate, args: &[ElValue]) -> EvaluationResult<ResolvedMethod> {
        let method = candidate.method;
        let mut converted = Vec::with_capacity(args.len());
        for (param, arg) in candidate.positional_types.iter().zip(args) {
            converted.push(self.convert_argument(param, arg)?);
        }

        if method.varargs {
            let fixed = method.arity() - 1;
            let last_param = method.parameter_types.last();
            let passes_array = converted.len() == method.arity()
                && last_param.is_some_and(|p| self.is_assignable(p, &args[fixed]));
            if !passes_array {
                let rest = converted.split_off(fixed);
                let element = method.varargs_element().cloned().unwrap_or(ElType::Object);
                converted.push(ElValue::Array(ElArray::new(element, rest)));
            }
        }

        Ok(ResolvedMethod {
            method,
            arguments: converted,
        })
    }

    /// `null` passes through untouched; it never becomes `""` or zero here
    fn convert_argument(&self, param: &ElType, arg: &ElValue) -> EvaluationResult<ElValue> {
        match arg.el_type() {
            None => Ok(ElValue::Null),
            Some(arg_type) if param.is_assignable_from(&arg_type, self.types) => Ok(arg.clone()),
            Some(_) => Ok(TypeCoercion::coerce_to_type(arg, param, self.types)?),
        }
    }
}

/// Class names of actual arguments, `null` for null arguments
fn argument_classes(args: &[ElValue]) -> Vec<String> {
    args.iter().map(ElValue::class_name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EnumConstant;
    use crate::registry::ClassBuilder;
    use pretty_assertions::assert_eq;

    struct Marker;

    impl crate::model::ElObject for Marker {
        fn class_name(&self) -> &str {
            "Bean"
        }
        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    fn label(text: &'static str) -> impl Fn(&ElValue, &[ElValue]) -> crate::registry::HostResult<ElValue> {
        move |_, _| Ok(ElValue::from(text))
    }

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register(ClassBuilder::enumeration("Fruit", ["APPLE", "PEAR"]).build());
        types.register(
            ClassBuilder::new("Bean")
                .method("doTest", vec![ElType::String], ElType::String, label("one"))
                .method(
                    "doTest",
                    vec![ElType::String, ElType::String],
                    ElType::String,
                    label("two"),
                )
                .varargs_method(
                    "doTest",
                    vec![ElType::String, ElType::String],
                    ElType::String,
                    |_, args| Ok(ElValue::from(format!("varargs:{:?}", args.get(1)))),
                )
                .method("fruit", vec![ElType::class("Fruit")], ElType::String, label("enum"))
                .method("fruit", vec![ElType::String], ElType::String, label("string"))
                .method("text", vec![ElType::String], ElType::String, |_, args| {
                    Ok(ElValue::from(format!("{:?}", args[0])))
                })
                .method("number", vec![ElType::INT], ElType::INT, |_, args| Ok(args[0].clone()))
                .build(),
        );
        types
    }

    fn bean() -> ElValue {
        ElValue::object(Marker)
    }

    #[test]
    fn test_exact_arity_beats_varargs() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        assert_eq!(
            resolver.invoke(&bean(), "doTest", None, &["apple".into()]).unwrap(),
            ElValue::from("one")
        );
        assert_eq!(
            resolver
                .invoke(&bean(), "doTest", None, &["apple".into(), "pear".into()])
                .unwrap(),
            ElValue::from("two")
        );
        let resolved = resolver
            .resolve(
                &bean(),
                "doTest",
                None,
                &["a".into(), "b".into(), "c".into()],
            )
            .unwrap();
        assert!(resolved.method.varargs);
        assert_eq!(resolved.arguments.len(), 2);
        assert!(matches!(&resolved.arguments[1], ElValue::Array(array) if array.len() == 2));
    }

    #[test]
    fn test_enum_overload_wins_over_string() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        let apple = ElValue::Enum(EnumConstant::new("Fruit", "APPLE", 0));
        assert_eq!(
            resolver.invoke(&bean(), "fruit", None, &[apple.clone()]).unwrap(),
            ElValue::from("enum")
        );
        // only a String overload: the constant's name is passed
        assert_eq!(
            resolver.invoke(&bean(), "text", None, &[apple]).unwrap(),
            ElValue::from("String(\"APPLE\")")
        );
    }

    #[test]
    fn test_null_is_passed_through() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        assert_eq!(
            resolver.invoke(&bean(), "text", None, &[ElValue::Null]).unwrap(),
            ElValue::from("Null")
        );
    }

    #[test]
    fn test_coercible_tier_converts_arguments() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        let resolved = resolver.resolve(&bean(), "number", None, &["42".into()]).unwrap();
        assert_eq!(resolved.arguments, vec![ElValue::from(42)]);
    }

    #[test]
    fn test_declared_signature() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        assert_eq!(
            resolver
                .invoke(&bean(), "fruit", Some(&[ElType::String]), &["APPLE".into()])
                .unwrap(),
            ElValue::from("string")
        );
        let err = resolver
            .resolve(&bean(), "fruit", Some(&[ElType::LONG]), &[1.into()])
            .unwrap_err();
        assert!(matches!(err, EvaluationError::MethodNotFound { .. }));
    }

    #[test]
    fn test_not_found_message() {
        let types = types();
        let resolver = MethodResolver::new(&types);
        let err = resolver
            .resolve(&bean(), "missing", None, &["a".into(), ElValue::Null])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Method not found: class Bean.missing(java.lang.String, null)"
        );
    }
}
