//! Tree-walking evaluator
//!
//! Evaluates parsed templates and expression trees against an
//! [`EvaluationContext`]. Besides plain reads it supports the two other
//! uses of an lvalue: assignment and value references, and method
//! expressions invoked with caller-supplied parameters.

use log::trace;

use super::context::{EvaluationContext, MappedVariable};
use super::error::{EvaluationError, EvaluationResult};
use super::method_resolver::MethodResolver;
use super::operators::{apply_binary, apply_unary};
use super::resolver::Resolution;
use crate::ast::{
    BinaryOperator, ExpressionNode, FunctionCallNode, LiteralValue, Template, TemplatePart,
};
use crate::model::{ElType, ElValue, Number, TypeCoercion};
use crate::registry::qualified_name;

/// The base object and property an lvalue expression designates
#[derive(Debug, Clone, PartialEq)]
pub struct ValueReference {
    /// Object holding the property; `None` for a bare identifier
    pub base: Option<ElValue>,
    /// Property name or index
    pub property: ElValue,
}

/// Evaluates nodes within one evaluation context
pub struct Evaluator<'c> {
    context: &'c EvaluationContext<'c>,
}

impl<'c> Evaluator<'c> {
    /// Evaluator bound to a context
    pub fn new(context: &'c EvaluationContext<'c>) -> Self {
        Self { context }
    }

    /// Evaluate a template
    ///
    /// A template that is exactly one embedded expression yields that
    /// expression's value unchanged. Otherwise every part is rendered as
    /// text and the result is a string; `null` renders as the empty string.
    pub fn evaluate_template(&self, template: &Template) -> EvaluationResult<ElValue> {
        if let Some(expr) = template.single_expression() {
            return self.evaluate(expr);
        }
        let mut text = String::new();
        for part in &template.parts {
            match part {
                TemplatePart::Text(literal) => text.push_str(literal),
                TemplatePart::Eval(expr) => {
                    let value = self.evaluate(expr)?;
                    text.push_str(&TypeCoercion::coerce_to_string(&value)?);
                }
            }
        }
        Ok(ElValue::String(text))
    }

    /// Evaluate an expression node
    pub fn evaluate(&self, node: &ExpressionNode) -> EvaluationResult<ElValue> {
        match node {
            ExpressionNode::Literal(literal) => Ok(literal_value(literal)),
            ExpressionNode::Identifier(name) => self.identifier(name),
            ExpressionNode::FunctionCall(call) => self.function_call(call),
            ExpressionNode::MethodCall(call) => {
                let target = self.target(&call.object)?;
                let args = self.evaluate_all(&call.arguments)?;
                MethodResolver::new(self.context.types()).invoke(&target, &call.method, None, &args)
            }
            ExpressionNode::PropertyAccess(access) => {
                let base = self.evaluate(&access.object)?;
                self.property(base, ElValue::String(access.property.clone()))
            }
            ExpressionNode::IndexAccess(access) => {
                let base = self.evaluate(&access.object)?;
                if base.is_null() {
                    return Ok(ElValue::Null);
                }
                let index = self.evaluate(&access.index)?;
                if index.is_null() {
                    return Ok(ElValue::Null);
                }
                self.property(base, index)
            }
            ExpressionNode::BinaryOperation(op) => match op.operator {
                BinaryOperator::And => {
                    if !self.condition(&op.left)? {
                        return Ok(ElValue::Boolean(false));
                    }
                    Ok(ElValue::Boolean(self.condition(&op.right)?))
                }
                BinaryOperator::Or => {
                    if self.condition(&op.left)? {
                        return Ok(ElValue::Boolean(true));
                    }
                    Ok(ElValue::Boolean(self.condition(&op.right)?))
                }
                operator => {
                    let left = self.evaluate(&op.left)?;
                    let right = self.evaluate(&op.right)?;
                    apply_binary(operator, &left, &right, self.context.types())
                }
            },
            ExpressionNode::UnaryOperation(op) => {
                let operand = self.evaluate(&op.operand)?;
                apply_unary(op.operator, &operand)
            }
            ExpressionNode::Conditional(cond) => {
                if self.condition(&cond.condition)? {
                    self.evaluate(&cond.then_branch)
                } else {
                    self.evaluate(&cond.else_branch)
                }
            }
        }
    }

    /// Assign `value` to the lvalue `node`
    pub fn set_value(&self, node: &ExpressionNode, value: ElValue) -> EvaluationResult<()> {
        let reference = self
            .value_reference(node)?
            .ok_or_else(|| EvaluationError::NotAssignable {
                expression: node.to_string(),
            })?;
        let resolver_context = self.context.resolver_context();
        let written = self.context.runtime.resolvers.set_value(
            &resolver_context,
            reference.base.as_ref(),
            &reference.property,
            value,
        )?;
        if written {
            return Ok(());
        }
        let property = TypeCoercion::display_string(&reference.property)?;
        Err(match reference.base {
            Some(base) => EvaluationError::PropertyNotFound {
                property,
                class: base.class_name(),
            },
            None => EvaluationError::PropertyNotWritable {
                property,
                class: "scope".to_string(),
            },
        })
    }

    /// Base and property designated by an lvalue; `None` for other nodes
    pub fn value_reference(&self, node: &ExpressionNode) -> EvaluationResult<Option<ValueReference>> {
        let reference = match node {
            ExpressionNode::Identifier(name) => ValueReference {
                base: None,
                property: ElValue::String(name.clone()),
            },
            ExpressionNode::PropertyAccess(access) => ValueReference {
                base: Some(self.target(&access.object)?),
                property: ElValue::String(access.property.clone()),
            },
            ExpressionNode::IndexAccess(access) => ValueReference {
                base: Some(self.target(&access.object)?),
                property: self.evaluate(&access.index)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(reference))
    }

    /// Invoke the method `node` designates
    ///
    /// For `a.b(x)` the arguments written in the expression are used unless
    /// the call has none; for `a.b` or `a['b']` the supplied `params` are
    /// the arguments. `declared` pins the overload by parameter types.
    pub fn invoke_method(
        &self,
        node: &ExpressionNode,
        declared: Option<&[ElType]>,
        params: &[ElValue],
    ) -> EvaluationResult<ElValue> {
        let (object, method, args) = match node {
            ExpressionNode::MethodCall(call) => {
                let args = if call.arguments.is_empty() {
                    params.to_vec()
                } else {
                    self.evaluate_all(&call.arguments)?
                };
                (&call.object, call.method.clone(), args)
            }
            ExpressionNode::PropertyAccess(access) => {
                (&access.object, access.property.clone(), params.to_vec())
            }
            ExpressionNode::IndexAccess(access) => {
                let name = self.evaluate(&access.index)?;
                let name = TypeCoercion::coerce_to_string(&name)?;
                (&access.object, name, params.to_vec())
            }
            _ => {
                return Err(EvaluationError::NotAMethod {
                    expression: node.to_string(),
                });
            }
        };
        let target = self.target(object)?;
        MethodResolver::new(self.context.types()).invoke(&target, &method, declared, &args)
    }

    fn evaluate_all(&self, nodes: &[ExpressionNode]) -> EvaluationResult<Vec<ElValue>> {
        nodes.iter().map(|node| self.evaluate(node)).collect()
    }

    fn condition(&self, node: &ExpressionNode) -> EvaluationResult<bool> {
        let value = self.evaluate(node)?;
        Ok(TypeCoercion::coerce_to_boolean(&value)?)
    }

    /// Evaluate a node that must not be `null`
    fn target(&self, node: &ExpressionNode) -> EvaluationResult<ElValue> {
        let value = self.evaluate(node)?;
        if value.is_null() {
            return Err(EvaluationError::TargetUnreachable {
                expression: node.to_string(),
            });
        }
        Ok(value)
    }

    fn identifier(&self, name: &str) -> EvaluationResult<ElValue> {
        match self.context.variables.get(name) {
            Some(MappedVariable::Value(value)) => return Ok(value.clone()),
            Some(MappedVariable::Expression(template)) => {
                return self.evaluate_template(template);
            }
            None => {}
        }
        let resolver_context = self.context.resolver_context();
        let property = ElValue::String(name.to_string());
        match self
            .context
            .runtime
            .resolvers
            .get_value(&resolver_context, None, &property)?
        {
            Resolution::Handled(value) => Ok(value),
            Resolution::NotHandled => {
                trace!("identifier '{name}' is undefined, evaluating to null");
                Ok(ElValue::Null)
            }
        }
    }

    fn property(&self, base: ElValue, property: ElValue) -> EvaluationResult<ElValue> {
        if base.is_null() {
            return Ok(ElValue::Null);
        }
        let resolver_context = self.context.resolver_context();
        match self
            .context
            .runtime
            .resolvers
            .get_value(&resolver_context, Some(&base), &property)?
        {
            Resolution::Handled(value) => Ok(value),
            Resolution::NotHandled => Err(EvaluationError::PropertyNotFound {
                property: TypeCoercion::display_string(&property)?,
                class: base.class_name(),
            }),
        }
    }

    fn function_call(&self, call: &FunctionCallNode) -> EvaluationResult<ElValue> {
        let function = self
            .context
            .runtime
            .functions
            .resolve(call.prefix.as_deref(), &call.name)
            .ok_or_else(|| EvaluationError::FunctionNotFound {
                name: qualified_name(call.prefix.as_deref().unwrap_or_default(), &call.name),
            })?;
        let args = self.evaluate_all(&call.arguments)?;
        function.validate_args(&args, self.context.types())?;
        Ok(function.evaluate(&args, &self.context.function_context())?)
    }
}

fn literal_value(literal: &LiteralValue) -> ElValue {
    match literal {
        LiteralValue::Null => ElValue::Null,
        LiteralValue::Boolean(b) => ElValue::Boolean(*b),
        LiteralValue::Long(n) => ElValue::Number(Number::Long(*n)),
        LiteralValue::Double(n) => ElValue::Number(Number::Double(*n)),
        LiteralValue::String(s) => ElValue::String(s.clone()),
    }
}
