//! Expression manager - the main entry point
//!
//! The manager owns the runtime (classes, functions, resolvers), the
//! enhancer chain and the template cache. Creating an expression runs the
//! enhancers over the raw text, parses the result and caches the tree under
//! the raw text; evaluating it builds a fresh context per call.

use std::sync::Arc;

use log::debug;

use crate::ast::Template;
use crate::cache::{CacheStats, ExpressionCache};
use crate::config::EngineConfig;
use crate::enhancer::{EnhancerChain, ExpressionEnhancer};
use crate::error::ElResult;
use crate::evaluator::{ElResolver, ElRuntime, EvaluationContext, ResolverChain, ScopeResolver};
use crate::expression::{MethodExpression, ValueExpression};
use crate::model::{ElType, ElValue, SharedContainer};
use crate::parser::parse_template;
use crate::registry::{FunctionRegistry, TypeRegistry};

/// Parses, caches and evaluates expressions
#[derive(Debug, Clone)]
pub struct ExpressionManager {
    config: EngineConfig,
    runtime: Arc<ElRuntime>,
    enhancers: EnhancerChain,
    cache: Option<Arc<ExpressionCache>>,
}

impl Default for ExpressionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionManager {
    /// Manager with the default configuration and standard registries
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Manager with the given configuration and standard registries
    pub fn with_config(config: EngineConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// Start building a manager
    pub fn builder() -> ExpressionManagerBuilder {
        ExpressionManagerBuilder::default()
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared evaluation machinery
    pub fn runtime(&self) -> &Arc<ElRuntime> {
        &self.runtime
    }

    /// Registered classes
    pub fn types(&self) -> &TypeRegistry {
        &self.runtime.types
    }

    /// Registered functions
    pub fn functions(&self) -> &FunctionRegistry {
        &self.runtime.functions
    }

    /// Enhancer chain applied before parsing
    pub fn enhancers(&self) -> &EnhancerChain {
        &self.enhancers
    }

    /// Run the enhancers over `source`; unchanged when they are disabled
    pub fn enhance(&self, source: &str) -> String {
        if self.config.enable_enhancers {
            self.enhancers.enhance(source)
        } else {
            source.to_string()
        }
    }

    /// Enhance and parse `source`, going through the cache when enabled
    pub fn parse(&self, source: &str) -> ElResult<Arc<Template>> {
        let parse = || {
            let enhanced = self.enhance(source);
            debug!("parsing '{enhanced}'");
            parse_template(&enhanced)
        };
        match &self.cache {
            Some(cache) => Ok(cache.get_or_try_insert(source, parse)?),
            None => Ok(Arc::new(parse()?)),
        }
    }

    /// Value expression for `source`, coercing results to `expected_type`
    pub fn create_value_expression(
        &self,
        source: &str,
        expected_type: Option<ElType>,
    ) -> ElResult<ValueExpression> {
        let template = self.parse(source)?;
        Ok(ValueExpression::new(
            source,
            template,
            expected_type,
            Arc::clone(&self.runtime),
        ))
    }

    /// Method expression for `source`
    pub fn create_method_expression(
        &self,
        source: &str,
        parameter_types: Option<Vec<ElType>>,
        expected_type: Option<ElType>,
    ) -> ElResult<MethodExpression> {
        let template = self.parse(source)?;
        Ok(MethodExpression::new(
            source,
            template,
            parameter_types,
            expected_type,
            Arc::clone(&self.runtime),
        ))
    }

    /// Evaluate `source` against a variable scope
    pub fn evaluate(&self, source: &str, container: SharedContainer) -> ElResult<ElValue> {
        self.create_value_expression(source, None)?.get_value(container)
    }

    /// Evaluate `source` against any root value on behalf of `principal`
    pub fn evaluate_with(
        &self,
        source: &str,
        root: ElValue,
        principal: Option<&str>,
    ) -> ElResult<ElValue> {
        let expression = self.create_value_expression(source, None)?;
        let mut context = EvaluationContext::new(&self.runtime).with_root(root);
        context.principal = principal.map(str::to_string);
        expression.get_value_in(&context)
    }

    /// Cache counters; `None` when caching is disabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.stats())
    }

    /// Drop all cached templates
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}

/// Builder for [`ExpressionManager`]
#[derive(Default)]
pub struct ExpressionManagerBuilder {
    config: EngineConfig,
    types: Option<TypeRegistry>,
    functions: Option<FunctionRegistry>,
    resolvers: Vec<Arc<dyn ElResolver>>,
    enhancers: Vec<Arc<dyn ExpressionEnhancer>>,
}

impl ExpressionManagerBuilder {
    /// Use `config`
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the class registry
    pub fn types(mut self, types: TypeRegistry) -> Self {
        self.types = Some(types);
        self
    }

    /// Replace the function registry
    pub fn functions(mut self, functions: FunctionRegistry) -> Self {
        self.functions = Some(functions);
        self
    }

    /// Add a resolver queried after the scope resolver and before the
    /// built-in ones
    pub fn resolver<R: ElResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    /// Add an enhancer run after the standard one
    pub fn enhancer<E: ExpressionEnhancer + 'static>(mut self, enhancer: E) -> Self {
        self.enhancers.push(Arc::new(enhancer));
        self
    }

    /// Build the manager
    pub fn build(self) -> ExpressionManager {
        let config = self.config;
        let scope = ScopeResolver::new(&config.scope_variable, &config.principal_variable);
        let runtime = ElRuntime::new(
            self.types.unwrap_or_default(),
            self.functions.unwrap_or_else(FunctionRegistry::standard),
        )
        .with_resolvers(ResolverChain::standard(scope, self.resolvers));

        let mut enhancers = EnhancerChain::standard(&config.scope_variable);
        for enhancer in self.enhancers {
            enhancers.push_shared(enhancer);
        }

        let cache = config
            .enable_expression_cache
            .then(|| Arc::new(ExpressionCache::new(config.max_cache_size)));

        ExpressionManager {
            config,
            runtime: Arc::new(runtime),
            enhancers,
            cache,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MapVariableContainer;
    use pretty_assertions::assert_eq;

    fn scope() -> SharedContainer {
        Arc::new(
            MapVariableContainer::new()
                .with_variable("status", "open")
                .with_variable("count", 3),
        )
    }

    #[test]
    fn test_shorthand_evaluates_through_enhancer() {
        let manager = ExpressionManager::new();
        assert_eq!(
            manager.evaluate("${var:eq(status, 'open')}", scope()).unwrap(),
            ElValue::Boolean(true)
        );
        assert_eq!(
            manager.evaluate("${vars:gt(count, 5)}", scope()).unwrap(),
            ElValue::Boolean(false)
        );
    }

    #[test]
    fn test_enhancers_can_be_disabled() {
        let manager = ExpressionManager::with_config(EngineConfig::default().with_enhancers(false));
        assert_eq!(manager.enhance("${var:eq(a, 1)}"), "${var:eq(a, 1)}");
        assert!(manager.evaluate("${var:eq(status, 'open')}", scope()).is_err());
    }

    #[test]
    fn test_cache_is_keyed_by_source() {
        let manager = ExpressionManager::new();
        manager.evaluate("${count}", scope()).unwrap();
        manager.evaluate("${count}", scope()).unwrap();
        let stats = manager.cache_stats().unwrap();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));

        let uncached = ExpressionManager::with_config(EngineConfig::uncached());
        assert!(uncached.cache_stats().is_none());
    }

    #[test]
    fn test_custom_scope_variable() {
        let manager = ExpressionManager::with_config(
            EngineConfig::default().with_scope_variable("execution"),
        );
        assert_eq!(
            manager.enhance("${var:exists(status)}"),
            "${variables:exists(execution,'status')}"
        );
        assert_eq!(
            manager.evaluate("${var:exists(status)}", scope()).unwrap(),
            ElValue::Boolean(true)
        );
    }

    #[test]
    fn test_principal() {
        let manager = ExpressionManager::new();
        assert_eq!(
            manager
                .evaluate_with("${authenticatedUserId}", ElValue::Null, Some("kermit"))
                .unwrap(),
            ElValue::from("kermit")
        );
    }
}
