//! Expression AST nodes

use std::fmt;

use super::operator::{BinaryOperator, UnaryOperator};
use crate::model::Number;

/// A node of a parsed expression
///
/// Trees are immutable once built; evaluation never writes to them.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionNode {
    /// Literal value (string, number, boolean, null)
    Literal(LiteralValue),

    /// Bare identifier, resolved against the variable scope
    Identifier(String),

    /// Function call (e.g., "variables:get(planItemInstance, 'x')")
    FunctionCall(FunctionCallNode),

    /// Method call (e.g., "bean.doTest('apple')")
    MethodCall(MethodCallNode),

    /// Property navigation (e.g., "customer.name")
    PropertyAccess(PropertyAccessNode),

    /// Index access (e.g., "items[0]", "map['key']")
    IndexAccess(IndexAccessNode),

    /// Binary operation (e.g., "a > 1")
    BinaryOperation(BinaryOperationNode),

    /// Unary operation (e.g., "-5", "not active", "empty list")
    UnaryOperation(UnaryOperationNode),

    /// Ternary conditional (e.g., "cond ? a : b")
    Conditional(ConditionalNode),
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `null`
    Null,
    /// `true` / `false`
    Boolean(bool),
    /// Integer literal
    Long(i64),
    /// Floating point literal
    Double(f64),
    /// String literal
    String(String),
}

/// Function call with an optional namespace prefix
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallNode {
    /// Namespace prefix; `None` for `name(...)`
    pub prefix: Option<String>,
    /// Local function name
    pub name: String,
    /// Function arguments
    pub arguments: Vec<ExpressionNode>,
}

/// Method call on an object
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCallNode {
    /// Target expression
    pub object: Box<ExpressionNode>,
    /// Method name
    pub method: String,
    /// Method arguments
    pub arguments: Vec<ExpressionNode>,
}

/// Property access (dot notation)
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessNode {
    /// Base expression
    pub object: Box<ExpressionNode>,
    /// Property name
    pub property: String,
}

/// Index access (bracket notation)
#[derive(Debug, Clone, PartialEq)]
pub struct IndexAccessNode {
    /// Base expression
    pub object: Box<ExpressionNode>,
    /// Index expression
    pub index: Box<ExpressionNode>,
}

/// Binary operation
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperationNode {
    /// Left operand
    pub left: Box<ExpressionNode>,
    /// Binary operator
    pub operator: BinaryOperator,
    /// Right operand
    pub right: Box<ExpressionNode>,
}

/// Unary operation
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperationNode {
    /// Unary operator
    pub operator: UnaryOperator,
    /// Operand expression
    pub operand: Box<ExpressionNode>,
}

/// Ternary conditional
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalNode {
    /// Condition
    pub condition: Box<ExpressionNode>,
    /// Value when the condition holds
    pub then_branch: Box<ExpressionNode>,
    /// Value otherwise
    pub else_branch: Box<ExpressionNode>,
}

impl ExpressionNode {
    /// Create a literal node
    pub fn literal(value: LiteralValue) -> Self {
        Self::Literal(value)
    }

    /// Create an identifier node
    pub fn identifier(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a function call node
    pub fn function_call(
        prefix: Option<String>,
        name: impl Into<String>,
        arguments: Vec<ExpressionNode>,
    ) -> Self {
        Self::FunctionCall(FunctionCallNode {
            prefix,
            name: name.into(),
            arguments,
        })
    }

    /// Create a method call node
    pub fn method_call(
        object: ExpressionNode,
        method: impl Into<String>,
        arguments: Vec<ExpressionNode>,
    ) -> Self {
        Self::MethodCall(MethodCallNode {
            object: Box::new(object),
            method: method.into(),
            arguments,
        })
    }

    /// Create a property access node
    pub fn property_access(object: ExpressionNode, property: impl Into<String>) -> Self {
        Self::PropertyAccess(PropertyAccessNode {
            object: Box::new(object),
            property: property.into(),
        })
    }

    /// Create an index access node
    pub fn index_access(object: ExpressionNode, index: ExpressionNode) -> Self {
        Self::IndexAccess(IndexAccessNode {
            object: Box::new(object),
            index: Box::new(index),
        })
    }

    /// Create a binary operation node
    pub fn binary_op(left: ExpressionNode, operator: BinaryOperator, right: ExpressionNode) -> Self {
        Self::BinaryOperation(BinaryOperationNode {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        })
    }

    /// Create a unary operation node
    pub fn unary_op(operator: UnaryOperator, operand: ExpressionNode) -> Self {
        Self::UnaryOperation(UnaryOperationNode {
            operator,
            operand: Box::new(operand),
        })
    }

    /// Create a conditional node
    pub fn conditional(
        condition: ExpressionNode,
        then_branch: ExpressionNode,
        else_branch: ExpressionNode,
    ) -> Self {
        Self::Conditional(ConditionalNode {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// Whether the node can be the target of an assignment
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_) | Self::PropertyAccess(_) | Self::IndexAccess(_)
        )
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[ExpressionNode]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{arg}")?;
    }
    Ok(())
}

impl fmt::Display for ExpressionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Identifier(name) => write!(f, "{name}"),
            Self::FunctionCall(n) => {
                if let Some(prefix) = &n.prefix {
                    write!(f, "{prefix}:")?;
                }
                write!(f, "{}(", n.name)?;
                write_args(f, &n.arguments)?;
                write!(f, ")")
            }
            Self::MethodCall(n) => {
                write!(f, "{}.{}(", n.object, n.method)?;
                write_args(f, &n.arguments)?;
                write!(f, ")")
            }
            Self::PropertyAccess(n) => write!(f, "{}.{}", n.object, n.property),
            Self::IndexAccess(n) => write!(f, "{}[{}]", n.object, n.index),
            Self::BinaryOperation(n) => write!(f, "({} {} {})", n.left, n.operator, n.right),
            Self::UnaryOperation(n) => write!(f, "{}{}", n.operator, n.operand),
            Self::Conditional(n) => write!(
                f,
                "({} ? {} : {})",
                n.condition, n.then_branch, n.else_branch
            ),
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{}", Number::Double(*v)),
            Self::String(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\\' => write!(f, "\\\\")?,
                        '\'' => write!(f, "\\'")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "'")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_canonical() {
        let node = ExpressionNode::conditional(
            ExpressionNode::binary_op(
                ExpressionNode::identifier("a"),
                BinaryOperator::GreaterThan,
                ExpressionNode::literal(LiteralValue::Long(1)),
            ),
            ExpressionNode::function_call(
                Some("variables".to_string()),
                "get",
                vec![
                    ExpressionNode::identifier("planItemInstance"),
                    ExpressionNode::literal(LiteralValue::String("it's".to_string())),
                ],
            ),
            ExpressionNode::unary_op(
                UnaryOperator::Empty,
                ExpressionNode::property_access(ExpressionNode::identifier("x"), "items"),
            ),
        );
        assert_eq!(
            node.to_string(),
            r"((a > 1) ? variables:get(planItemInstance, 'it\'s') : empty x.items)"
        );
    }
}
