//! Compiled expressions handed to the workflow engine
//!
//! A [`ValueExpression`] reads, writes or references the value a template
//! designates. A [`MethodExpression`] invokes the method it designates.
//! Both are cheap to clone and safe to share between threads; every call
//! evaluates in a fresh [`EvaluationContext`].

use std::fmt;
use std::sync::Arc;

use crate::ast::Template;
use crate::error::ElResult;
use crate::evaluator::{
    ElRuntime, EvaluationContext, EvaluationError, Evaluator, ValueReference,
};
use crate::model::{ElType, ElValue, SharedContainer, TypeCoercion};

/// An expression evaluated for its value
#[derive(Clone)]
pub struct ValueExpression {
    source: Arc<str>,
    template: Arc<Template>,
    expected_type: Option<ElType>,
    runtime: Arc<ElRuntime>,
}

impl ValueExpression {
    pub(crate) fn new(
        source: &str,
        template: Arc<Template>,
        expected_type: Option<ElType>,
        runtime: Arc<ElRuntime>,
    ) -> Self {
        Self {
            source: Arc::from(source),
            template,
            expected_type,
            runtime,
        }
    }

    /// Source text as written, before enhancement
    pub fn expression_string(&self) -> &str {
        &self.source
    }

    /// Parsed template
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// Type the result is coerced to, if any
    pub fn expected_type(&self) -> Option<&ElType> {
        self.expected_type.as_ref()
    }

    /// Whether the template is plain text
    pub fn is_literal_text(&self) -> bool {
        self.template.is_literal_text()
    }

    /// Fresh evaluation context rooted at `container`
    pub fn context(&self, container: SharedContainer) -> EvaluationContext<'_> {
        EvaluationContext::for_container(&self.runtime, container)
    }

    /// Evaluate against a variable scope
    pub fn get_value(&self, container: SharedContainer) -> ElResult<ElValue> {
        self.get_value_in(&self.context(container))
    }

    /// Evaluate in a prepared context
    pub fn get_value_in(&self, context: &EvaluationContext<'_>) -> ElResult<ElValue> {
        let value = Evaluator::new(context).evaluate_template(&self.template)?;
        match &self.expected_type {
            Some(target) => Ok(TypeCoercion::coerce_to_type(&value, target, &self.runtime.types)?),
            None => Ok(value),
        }
    }

    /// Assign `value` to the property the expression designates
    pub fn set_value(&self, container: SharedContainer, value: ElValue) -> ElResult<()> {
        self.set_value_in(&self.context(container), value)
    }

    /// Assign in a prepared context
    pub fn set_value_in(&self, context: &EvaluationContext<'_>, value: ElValue) -> ElResult<()> {
        let node = self
            .template
            .single_expression()
            .ok_or_else(|| EvaluationError::NotAssignable {
                expression: self.source.to_string(),
            })?;
        Ok(Evaluator::new(context).set_value(node, value)?)
    }

    /// Base and property the expression designates; `None` unless the
    /// template is a single identifier, property or index expression
    pub fn value_reference(&self, container: SharedContainer) -> ElResult<Option<ValueReference>> {
        let context = self.context(container);
        match self.template.single_expression() {
            Some(node) => Ok(Evaluator::new(&context).value_reference(node)?),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueExpression")
            .field("source", &self.source)
            .field("expected_type", &self.expected_type)
            .finish()
    }
}

impl fmt::Display for ValueExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// An expression evaluated for the method it designates
///
/// `${bean.check}` invokes `check` on `bean` with the parameters passed to
/// [`invoke`](Self::invoke); `${bean.check('x')}` uses its own arguments.
/// Declared parameter types pin the overload.
#[derive(Clone)]
pub struct MethodExpression {
    source: Arc<str>,
    template: Arc<Template>,
    parameter_types: Option<Vec<ElType>>,
    expected_type: Option<ElType>,
    runtime: Arc<ElRuntime>,
}

impl MethodExpression {
    pub(crate) fn new(
        source: &str,
        template: Arc<Template>,
        parameter_types: Option<Vec<ElType>>,
        expected_type: Option<ElType>,
        runtime: Arc<ElRuntime>,
    ) -> Self {
        Self {
            source: Arc::from(source),
            template,
            parameter_types: parameter_types.filter(|types| !types.is_empty()),
            expected_type,
            runtime,
        }
    }

    /// Source text as written, before enhancement
    pub fn expression_string(&self) -> &str {
        &self.source
    }

    /// Declared parameter types, if any
    pub fn parameter_types(&self) -> Option<&[ElType]> {
        self.parameter_types.as_deref()
    }

    /// Whether the template is plain text
    pub fn is_literal_text(&self) -> bool {
        self.template.is_literal_text()
    }

    /// Whether the expression supplies its own arguments
    pub fn is_parameters_provided(&self) -> bool {
        matches!(
            self.template.single_expression(),
            Some(crate::ast::ExpressionNode::MethodCall(call)) if !call.arguments.is_empty()
        )
    }

    /// Fresh evaluation context rooted at `container`
    pub fn context(&self, container: SharedContainer) -> EvaluationContext<'_> {
        EvaluationContext::for_container(&self.runtime, container)
    }

    /// Invoke against a variable scope
    pub fn invoke(&self, container: SharedContainer, params: &[ElValue]) -> ElResult<ElValue> {
        self.invoke_in(&self.context(container), params)
    }

    /// Invoke in a prepared context
    ///
    /// Plain text is returned as the result, coerced to the expected type.
    pub fn invoke_in(&self, context: &EvaluationContext<'_>, params: &[ElValue]) -> ElResult<ElValue> {
        let value = if self.template.is_literal_text() {
            Evaluator::new(context).evaluate_template(&self.template)?
        } else {
            let node = self.template.single_expression().ok_or_else(|| {
                EvaluationError::NotAMethod {
                    expression: self.source.to_string(),
                }
            })?;
            Evaluator::new(context).invoke_method(node, self.parameter_types(), params)?
        };
        match &self.expected_type {
            Some(target) => Ok(TypeCoercion::coerce_to_type(&value, target, &self.runtime.types)?),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for MethodExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodExpression")
            .field("source", &self.source)
            .field("parameter_types", &self.parameter_types)
            .field("expected_type", &self.expected_type)
            .finish()
    }
}

impl fmt::Display for MethodExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
