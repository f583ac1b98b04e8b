//! Operator semantics
//!
//! Numeric operators promote both operands to a common kind before
//! applying the operation:
//!
//! | operands contain                          | promoted to  |
//! |-------------------------------------------|--------------|
//! | a `BigDecimal`                            | `BigDecimal` |
//! | a float/double or text like `1.5`, `1e3`  | `Double` (`BigDecimal` next to a `BigInteger`) |
//! | a `BigInteger`                            | `BigInteger` |
//! | anything else                             | `Long`       |
//!
//! `null` operands count as zero. `Long` arithmetic wraps on overflow;
//! `BigInteger` and `BigDecimal` arithmetic reports it.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use super::error::{EvaluationError, EvaluationResult};
use crate::ast::{BinaryOperator, UnaryOperator};
use crate::model::{
    CoercionError, ElValue, JsonNode, Number, NumberKind, TypeCoercion, TypeHierarchy,
};

/// Common kind both operands are promoted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Promotion {
    Long,
    Double,
    BigInteger,
    BigDecimal,
}

impl Promotion {
    fn number_kind(self) -> NumberKind {
        match self {
            Promotion::Long => NumberKind::Long,
            Promotion::Double => NumberKind::Double,
            Promotion::BigInteger => NumberKind::BigInteger,
            Promotion::BigDecimal => NumberKind::BigDecimal,
        }
    }
}

fn number_kind_of(value: &ElValue) -> Option<NumberKind> {
    match value {
        ElValue::Number(n) => Some(n.kind()),
        _ => None,
    }
}

fn is_decimal_text(value: &ElValue) -> bool {
    value
        .as_str()
        .is_some_and(|s| s.contains(['.', 'e', 'E']))
}

fn promotion(left: &ElValue, right: &ElValue) -> Promotion {
    let kinds = [number_kind_of(left), number_kind_of(right)];
    let has = |kind: NumberKind| kinds.contains(&Some(kind));

    if has(NumberKind::BigDecimal) {
        Promotion::BigDecimal
    } else if kinds.iter().flatten().any(|k| k.is_floating())
        || is_decimal_text(left)
        || is_decimal_text(right)
    {
        if has(NumberKind::BigInteger) {
            Promotion::BigDecimal
        } else {
            Promotion::Double
        }
    } else if has(NumberKind::BigInteger) {
        Promotion::BigInteger
    } else {
        Promotion::Long
    }
}

/// JSON value nodes take part in operators as the plain value they hold
fn unwrap_json(value: &ElValue) -> std::borrow::Cow<'_, ElValue> {
    match value {
        ElValue::Json(node) if !matches!(node, JsonNode::Array(_) | JsonNode::Object(_)) => {
            std::borrow::Cow::Owned(node.to_el_value())
        }
        other => std::borrow::Cow::Borrowed(other),
    }
}

fn operands(
    left: &ElValue,
    right: &ElValue,
    promotion: Promotion,
) -> EvaluationResult<(Number, Number)> {
    let kind = promotion.number_kind();
    Ok((
        TypeCoercion::coerce_to_number(left, kind)?,
        TypeCoercion::coerce_to_number(right, kind)?,
    ))
}

fn overflow(kind: &str) -> EvaluationError {
    EvaluationError::arithmetic(format!("{kind} overflow"))
}

fn division_by_zero() -> EvaluationError {
    EvaluationError::arithmetic("Division by zero")
}

fn big_integer(n: Number) -> i128 {
    n.to_i128().unwrap_or_default()
}

fn big_decimal(n: Number) -> Decimal {
    n.to_decimal().unwrap_or_default()
}

/// `+`, `-` and `*`
fn additive(op: BinaryOperator, left: &ElValue, right: &ElValue) -> EvaluationResult<ElValue> {
    if left.is_null() && right.is_null() {
        return Ok(ElValue::Number(Number::Long(0)));
    }
    let promotion = promotion(left, right);
    let (a, b) = operands(left, right, promotion)?;

    let result = match promotion {
        Promotion::Long => {
            let (x, y) = (a.to_i64().unwrap_or_default(), b.to_i64().unwrap_or_default());
            Number::Long(match op {
                BinaryOperator::Add => x.wrapping_add(y),
                BinaryOperator::Subtract => x.wrapping_sub(y),
                _ => x.wrapping_mul(y),
            })
        }
        Promotion::Double => {
            let (x, y) = (a.to_f64(), b.to_f64());
            Number::Double(match op {
                BinaryOperator::Add => x + y,
                BinaryOperator::Subtract => x - y,
                _ => x * y,
            })
        }
        Promotion::BigInteger => {
            let (x, y) = (big_integer(a), big_integer(b));
            let value = match op {
                BinaryOperator::Add => x.checked_add(y),
                BinaryOperator::Subtract => x.checked_sub(y),
                _ => x.checked_mul(y),
            };
            Number::BigInteger(value.ok_or_else(|| overflow("BigInteger"))?)
        }
        Promotion::BigDecimal => {
            let (x, y) = (big_decimal(a), big_decimal(b));
            let value = match op {
                BinaryOperator::Add => x.checked_add(y),
                BinaryOperator::Subtract => x.checked_sub(y),
                _ => x.checked_mul(y),
            };
            Number::BigDecimal(value.ok_or_else(|| overflow("BigDecimal"))?)
        }
    };
    Ok(ElValue::Number(result))
}

/// `/` and `div`: `Double`, or `BigDecimal` when either side is a big number
fn divide(left: &ElValue, right: &ElValue) -> EvaluationResult<ElValue> {
    if left.is_null() && right.is_null() {
        return Ok(ElValue::Number(Number::Long(0)));
    }
    let big = [left, right].iter().any(|v| {
        matches!(
            number_kind_of(v),
            Some(NumberKind::BigDecimal | NumberKind::BigInteger)
        )
    });
    if big {
        let (a, b) = operands(left, right, Promotion::BigDecimal)?;
        let (x, y) = (big_decimal(a), big_decimal(b));
        if y.is_zero() {
            return Err(division_by_zero());
        }
        let quotient = x.checked_div(y).ok_or_else(|| overflow("BigDecimal"))?;
        return Ok(ElValue::Number(Number::BigDecimal(quotient)));
    }
    let (a, b) = operands(left, right, Promotion::Double)?;
    Ok(ElValue::Number(Number::Double(a.to_f64() / b.to_f64())))
}

/// `%` and `mod`
fn modulo(left: &ElValue, right: &ElValue) -> EvaluationResult<ElValue> {
    if left.is_null() && right.is_null() {
        return Ok(ElValue::Number(Number::Long(0)));
    }
    let promotion = match promotion(left, right) {
        Promotion::BigDecimal | Promotion::Double => Promotion::Double,
        other => other,
    };
    let (a, b) = operands(left, right, promotion)?;
    let result = match promotion {
        Promotion::Double => Number::Double(a.to_f64() % b.to_f64()),
        Promotion::BigInteger => {
            let (x, y) = (big_integer(a), big_integer(b));
            Number::BigInteger(x.checked_rem(y).ok_or_else(division_by_zero)?)
        }
        _ => {
            let (x, y) = (a.to_i64().unwrap_or_default(), b.to_i64().unwrap_or_default());
            if y == 0 {
                return Err(division_by_zero());
            }
            Number::Long(x.wrapping_rem(y))
        }
    };
    Ok(ElValue::Number(result))
}

/// `+=`: string concatenation, `null` contributes nothing
fn concatenate(left: &ElValue, right: &ElValue) -> EvaluationResult<ElValue> {
    let mut text = TypeCoercion::coerce_to_string(left)?;
    text.push_str(&TypeCoercion::coerce_to_string(right)?);
    Ok(ElValue::String(text))
}

/// Apply a binary operator whose operands are both already evaluated
///
/// `&&` and `||` are handled here without short-circuiting; the evaluator
/// short-circuits before reaching this point.
pub fn apply_binary(
    op: BinaryOperator,
    left: &ElValue,
    right: &ElValue,
    types: &dyn TypeHierarchy,
) -> EvaluationResult<ElValue> {
    let left = unwrap_json(left);
    let right = unwrap_json(right);
    let (left, right) = (left.as_ref(), right.as_ref());

    match op {
        BinaryOperator::Add | BinaryOperator::Subtract | BinaryOperator::Multiply => {
            additive(op, left, right)
        }
        BinaryOperator::Divide => divide(left, right),
        BinaryOperator::Modulo => modulo(left, right),
        BinaryOperator::Concatenate => concatenate(left, right),
        BinaryOperator::Equal => equals(left, right, types).map(ElValue::Boolean),
        BinaryOperator::NotEqual => equals(left, right, types).map(|eq| ElValue::Boolean(!eq)),
        BinaryOperator::LessThan
        | BinaryOperator::LessThanOrEqual
        | BinaryOperator::GreaterThan
        | BinaryOperator::GreaterThanOrEqual => {
            if left.is_null() || right.is_null() {
                return Ok(ElValue::Boolean(false));
            }
            let ordering = compare(left, right, types)?;
            Ok(ElValue::Boolean(match op {
                BinaryOperator::LessThan => ordering == Ordering::Less,
                BinaryOperator::LessThanOrEqual => ordering != Ordering::Greater,
                BinaryOperator::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOperator::And => Ok(ElValue::Boolean(
            TypeCoercion::coerce_to_boolean(left)? && TypeCoercion::coerce_to_boolean(right)?,
        )),
        BinaryOperator::Or => Ok(ElValue::Boolean(
            TypeCoercion::coerce_to_boolean(left)? || TypeCoercion::coerce_to_boolean(right)?,
        )),
    }
}

/// Apply a unary operator
pub fn apply_unary(op: UnaryOperator, operand: &ElValue) -> EvaluationResult<ElValue> {
    let operand = unwrap_json(operand);
    match op {
        UnaryOperator::Not => Ok(ElValue::Boolean(!TypeCoercion::coerce_to_boolean(&operand)?)),
        UnaryOperator::Empty => Ok(ElValue::Boolean(is_empty(&operand))),
        UnaryOperator::Negate => negate(&operand),
    }
}

fn negate(operand: &ElValue) -> EvaluationResult<ElValue> {
    let number = match operand {
        ElValue::Null => Number::Long(0),
        ElValue::String(_) => {
            let kind = if is_decimal_text(operand) {
                NumberKind::Double
            } else {
                NumberKind::Long
            };
            TypeCoercion::coerce_to_number(operand, kind)?
        }
        ElValue::Number(n) => *n,
        other => {
            return Err(CoercionError::IncompatibleTypes {
                from: other.class_name(),
                to: "java.lang.Number".to_string(),
            }
            .into());
        }
    };
    let negated = match number {
        Number::Byte(v) => Number::Byte(v.wrapping_neg()),
        Number::Short(v) => Number::Short(v.wrapping_neg()),
        Number::Integer(v) => Number::Integer(v.wrapping_neg()),
        Number::Long(v) => Number::Long(v.wrapping_neg()),
        Number::Float(v) => Number::Float(-v),
        Number::Double(v) => Number::Double(-v),
        Number::BigInteger(v) => Number::BigInteger(v.checked_neg().ok_or_else(|| overflow("BigInteger"))?),
        Number::BigDecimal(v) => Number::BigDecimal(-v),
    };
    Ok(ElValue::Number(negated))
}

/// `==` semantics
///
/// A number on either side compares numerically after promotion; a text
/// that does not read as a number is simply unequal. Otherwise booleans,
/// enums and strings are compared after coercing the other side to the
/// same type, and anything else by value equality.
pub fn equals(
    left: &ElValue,
    right: &ElValue,
    types: &dyn TypeHierarchy,
) -> EvaluationResult<bool> {
    let left = unwrap_json(left);
    let right = unwrap_json(right);
    let (left, right) = (left.as_ref(), right.as_ref());

    match (left, right) {
        (ElValue::Null, ElValue::Null) => return Ok(true),
        (ElValue::Null, _) | (_, ElValue::Null) => return Ok(false),
        _ => {}
    }

    if matches!(left, ElValue::Number(_)) || matches!(right, ElValue::Number(_)) {
        return Ok(match operands(left, right, promotion(left, right)) {
            Ok((a, b)) => a.compare(&b) == Some(Ordering::Equal),
            Err(_) => false,
        });
    }

    match (left, right) {
        (ElValue::Boolean(_), _) | (_, ElValue::Boolean(_)) => {
            match (
                TypeCoercion::coerce_to_boolean(left),
                TypeCoercion::coerce_to_boolean(right),
            ) {
                (Ok(a), Ok(b)) => Ok(a == b),
                _ => Ok(false),
            }
        }
        (ElValue::Enum(a), ElValue::Enum(b)) => Ok(a == b),
        (ElValue::Enum(constant), ElValue::String(name))
        | (ElValue::String(name), ElValue::Enum(constant)) => Ok(types
            .enum_constant(&constant.type_name, name)
            .is_some_and(|c| c == *constant)),
        (ElValue::String(_), _) | (_, ElValue::String(_)) => Ok(
            TypeCoercion::coerce_to_string(left)? == TypeCoercion::coerce_to_string(right)?,
        ),
        _ => Ok(left == right),
    }
}

/// Relational comparison, as used by `<`, `<=`, `>` and `>=`
///
/// Numbers compare after promotion, strings lexicographically, enums of
/// the same class by ordinal and booleans with `false < true`. Any other
/// pairing, `null` included, is an error.
pub fn compare(
    left: &ElValue,
    right: &ElValue,
    _types: &dyn TypeHierarchy,
) -> EvaluationResult<Ordering> {
    let left = unwrap_json(left);
    let right = unwrap_json(right);
    let (left, right) = (left.as_ref(), right.as_ref());

    let incomparable = || {
        EvaluationError::Coercion(CoercionError::IncompatibleTypes {
            from: left.class_name(),
            to: right.class_name(),
        })
    };

    if left.is_null() || right.is_null() {
        return Err(incomparable());
    }

    if matches!(left, ElValue::Number(_)) || matches!(right, ElValue::Number(_)) {
        let (a, b) = operands(left, right, promotion(left, right))?;
        return a.compare(&b).ok_or_else(|| {
            EvaluationError::arithmetic(format!("Cannot compare {a} with {b}"))
        });
    }

    match (left, right) {
        (ElValue::String(_), _) | (_, ElValue::String(_)) => {
            let a = TypeCoercion::coerce_to_string(left)?;
            let b = TypeCoercion::coerce_to_string(right)?;
            Ok(a.cmp(&b))
        }
        (ElValue::Enum(a), ElValue::Enum(b)) if a.type_name == b.type_name => {
            Ok(a.ordinal.cmp(&b.ordinal))
        }
        (ElValue::Boolean(a), ElValue::Boolean(b)) => Ok(a.cmp(b)),
        _ => Err(incomparable()),
    }
}

/// `empty` semantics: `null`, `""` and empty collections are empty
pub fn is_empty(value: &ElValue) -> bool {
    match value {
        ElValue::Null => true,
        ElValue::String(s) => s.is_empty(),
        ElValue::Bytes(bytes) => bytes.is_empty(),
        ElValue::List(items) => items.read().is_empty(),
        ElValue::Array(array) => array.is_empty(),
        ElValue::Map(entries) => entries.read().is_empty(),
        ElValue::Json(node) => match node {
            JsonNode::Missing | JsonNode::Null => true,
            JsonNode::String(s) => s.is_empty(),
            JsonNode::Array(_) | JsonNode::Object(_) => node.size() == 0,
            _ => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ClassBuilder, TypeRegistry};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn types() -> TypeRegistry {
        let mut types = TypeRegistry::new();
        types.register(ClassBuilder::enumeration("Fruit", ["APPLE", "PEAR"]).build());
        types
    }

    fn binary(op: BinaryOperator, left: impl Into<ElValue>, right: impl Into<ElValue>) -> ElValue {
        apply_binary(op, &left.into(), &right.into(), &types()).unwrap()
    }

    #[rstest]
    #[case(BinaryOperator::Add, 1, 2, Number::Long(3))]
    #[case(BinaryOperator::Multiply, 6, 7, Number::Long(42))]
    #[case(BinaryOperator::Subtract, 1, 2, Number::Long(-1))]
    #[case(BinaryOperator::Modulo, 7, 3, Number::Long(1))]
    fn test_integral_arithmetic_is_long(
        #[case] op: BinaryOperator,
        #[case] left: i32,
        #[case] right: i32,
        #[case] expected: Number,
    ) {
        assert_eq!(binary(op, left, right), ElValue::Number(expected));
    }

    #[test]
    fn test_promotion() {
        assert_eq!(
            binary(BinaryOperator::Add, 1, 1.5),
            ElValue::Number(Number::Double(2.5))
        );
        assert_eq!(
            binary(BinaryOperator::Add, "1.5", 1),
            ElValue::Number(Number::Double(2.5))
        );
        assert_eq!(
            binary(BinaryOperator::Add, "2", 1),
            ElValue::Number(Number::Long(3))
        );
        assert_eq!(
            binary(BinaryOperator::Add, Decimal::new(110, 2), 1),
            ElValue::Number(Number::BigDecimal(Decimal::new(210, 2)))
        );
        assert_eq!(
            binary(BinaryOperator::Divide, 7, 2),
            ElValue::Number(Number::Double(3.5))
        );
        assert_eq!(
            binary(BinaryOperator::Add, ElValue::Null, ElValue::Null),
            ElValue::Number(Number::Long(0))
        );
        assert_eq!(
            binary(BinaryOperator::Add, i64::MAX, 1),
            ElValue::Number(Number::Long(i64::MIN))
        );
    }

    #[test]
    fn test_division_by_zero() {
        let types = types();
        assert!(apply_binary(BinaryOperator::Modulo, &1.into(), &0.into(), &types).is_err());
        assert_eq!(
            binary(BinaryOperator::Divide, 1, 0),
            ElValue::Number(Number::Double(f64::INFINITY))
        );
    }

    #[test]
    fn test_equality_coercion() {
        let types = types();
        let apple = types.enum_constant("Fruit", "APPLE").unwrap();
        assert!(equals(&123.into(), &"123".into(), &types).unwrap());
        assert!(equals(&123.into(), &123.0.into(), &types).unwrap());
        assert!(!equals(&123.into(), &"abc".into(), &types).unwrap());
        assert!(equals(&ElValue::Enum(apple.clone()), &"APPLE".into(), &types).unwrap());
        assert!(!equals(&ElValue::Enum(apple), &"PEAR".into(), &types).unwrap());
        assert!(equals(&true.into(), &"TRUE".into(), &types).unwrap());
        assert!(equals(&ElValue::Null, &ElValue::Null, &types).unwrap());
        assert!(!equals(&ElValue::Null, &"".into(), &types).unwrap());
    }

    #[test]
    fn test_relational() {
        assert_eq!(binary(BinaryOperator::LessThan, 1, 2), ElValue::Boolean(true));
        assert_eq!(binary(BinaryOperator::GreaterThan, "b", "a"), ElValue::Boolean(true));
        assert_eq!(
            binary(BinaryOperator::LessThanOrEqual, ElValue::Null, 1),
            ElValue::Boolean(false)
        );
        assert!(apply_binary(BinaryOperator::LessThan, &true.into(), &1.into(), &types()).is_err());
    }

    #[test]
    fn test_unary() {
        assert_eq!(
            apply_unary(UnaryOperator::Negate, &ElValue::from(5)).unwrap(),
            ElValue::Number(Number::Integer(-5))
        );
        assert_eq!(
            apply_unary(UnaryOperator::Negate, &ElValue::from("2.5")).unwrap(),
            ElValue::Number(Number::Double(-2.5))
        );
        assert_eq!(
            apply_unary(UnaryOperator::Empty, &ElValue::list(Vec::new())).unwrap(),
            ElValue::Boolean(true)
        );
        assert_eq!(
            apply_unary(UnaryOperator::Not, &ElValue::Null).unwrap(),
            ElValue::Boolean(true)
        );
    }

    #[test]
    fn test_concatenate() {
        assert_eq!(binary(BinaryOperator::Concatenate, "a", 1), ElValue::from("a1"));
        assert_eq!(
            binary(BinaryOperator::Concatenate, ElValue::Null, "b"),
            ElValue::from("b")
        );
    }
}
