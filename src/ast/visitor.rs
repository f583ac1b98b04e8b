// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Visitor pattern for AST traversal

use super::expression::{ExpressionNode, FunctionCallNode, LiteralValue};
use super::operator::{BinaryOperator, UnaryOperator};

/// Trait for visiting AST nodes; every method walks into the children by
/// default
pub trait Visitor: Sized {
    /// Visit an expression node
    fn visit_expression(&mut self, expr: &ExpressionNode) {
        walk_expression(self, expr)
    }

    /// Visit a literal expression
    fn visit_literal(&mut self, _literal: &LiteralValue) {}

    /// Visit an identifier
    fn visit_identifier(&mut self, _name: &str) {}

    /// Visit a function call
    fn visit_function_call(&mut self, call: &FunctionCallNode) {
        for arg in &call.arguments {
            self.visit_expression(arg);
        }
    }

    /// Visit a method call
    fn visit_method_call(&mut self, base: &ExpressionNode, _method: &str, args: &[ExpressionNode]) {
        self.visit_expression(base);
        for arg in args {
            self.visit_expression(arg);
        }
    }

    /// Visit a property access
    fn visit_property(&mut self, base: &ExpressionNode, _property: &str) {
        self.visit_expression(base);
    }

    /// Visit an index access
    fn visit_index(&mut self, base: &ExpressionNode, index: &ExpressionNode) {
        self.visit_expression(base);
        self.visit_expression(index);
    }

    /// Visit a binary operation
    fn visit_binary_op(
        &mut self,
        _op: BinaryOperator,
        left: &ExpressionNode,
        right: &ExpressionNode,
    ) {
        self.visit_expression(left);
        self.visit_expression(right);
    }

    /// Visit a unary operation
    fn visit_unary_op(&mut self, _op: UnaryOperator, operand: &ExpressionNode) {
        self.visit_expression(operand);
    }

    /// Visit a conditional expression
    fn visit_conditional(
        &mut self,
        condition: &ExpressionNode,
        then_expr: &ExpressionNode,
        else_expr: &ExpressionNode,
    ) {
        self.visit_expression(condition);
        self.visit_expression(then_expr);
        self.visit_expression(else_expr);
    }
}

/// Default implementation of walking an expression tree
pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &ExpressionNode) {
    match expr {
        ExpressionNode::Literal(lit) => visitor.visit_literal(lit),
        ExpressionNode::Identifier(name) => visitor.visit_identifier(name),
        ExpressionNode::FunctionCall(call) => visitor.visit_function_call(call),
        ExpressionNode::MethodCall(n) => visitor.visit_method_call(&n.object, &n.method, &n.arguments),
        ExpressionNode::PropertyAccess(n) => visitor.visit_property(&n.object, &n.property),
        ExpressionNode::IndexAccess(n) => visitor.visit_index(&n.object, &n.index),
        ExpressionNode::BinaryOperation(n) => visitor.visit_binary_op(n.operator, &n.left, &n.right),
        ExpressionNode::UnaryOperation(n) => visitor.visit_unary_op(n.operator, &n.operand),
        ExpressionNode::Conditional(n) => {
            visitor.visit_conditional(&n.condition, &n.then_branch, &n.else_branch)
        }
    }
}

/// Collects the identifiers and qualified function names an expression
/// refers to, in first-seen order
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReferenceCollector {
    /// Bare identifiers
    pub identifiers: Vec<String>,
    /// `prefix:name` (or `name`) of called functions
    pub functions: Vec<String>,
}

impl Visitor for ReferenceCollector {
    fn visit_identifier(&mut self, name: &str) {
        if !self.identifiers.iter().any(|i| i == name) {
            self.identifiers.push(name.to_string());
        }
    }

    fn visit_function_call(&mut self, call: &FunctionCallNode) {
        let name = match &call.prefix {
            Some(prefix) => format!("{prefix}:{}", call.name),
            None => call.name.clone(),
        };
        if !self.functions.contains(&name) {
            self.functions.push(name);
        }
        for arg in &call.arguments {
            self.visit_expression(arg);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_collector() {
        let expr = ExpressionNode::binary_op(
            ExpressionNode::function_call(
                Some("variables".to_string()),
                "get",
                vec![
                    ExpressionNode::identifier("planItemInstance"),
                    ExpressionNode::literal(LiteralValue::String("x".into())),
                ],
            ),
            BinaryOperator::Add,
            ExpressionNode::property_access(ExpressionNode::identifier("order"), "total"),
        );
        let mut collector = ReferenceCollector::default();
        collector.visit_expression(&expr);
        assert_eq!(collector.identifiers, vec!["planItemInstance", "order"]);
        assert_eq!(collector.functions, vec!["variables:get"]);
    }
}
