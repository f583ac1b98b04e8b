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

//! End-to-end evaluation of templates through the expression manager

use std::sync::Arc;

use caseflow_el::model::{ElType, JsonNode};
use caseflow_el::{
    ElError, ElValue, EvaluationError, ExpressionManager, MapVariableContainer, SharedContainer,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;

fn scope() -> SharedContainer {
    Arc::new(
        MapVariableContainer::new()
            .with_variable("amount", 250)
            .with_variable("rate", 0.5)
            .with_variable("price", Decimal::new(1999, 2))
            .with_variable("status", "open")
            .with_variable("closed", false)
            .with_variable("nothing", ElValue::Null)
            .with_variable("emptyText", "")
            .with_variable(
                "items",
                ElValue::list(vec!["a".into(), "b".into(), "c".into()]),
            )
            .with_variable("noItems", ElValue::list(vec![]))
            .with_variable(
                "customer",
                ElValue::map([
                    ("name", ElValue::from("Kermit")),
                    ("tier", ElValue::from("gold")),
                ]),
            )
            .with_variable(
                "order",
                ElValue::Json(JsonNode::from_serde(&json!({
                    "id": "o-1",
                    "lines": [{"qty": 2}, {"qty": 3}],
                    "express": true
                }))),
            ),
    )
}

fn eval(source: &str) -> Result<ElValue, ElError> {
    ExpressionManager::new().evaluate(source, scope())
}

#[rstest]
#[case("${1 + 2 * 3}", ElValue::from(7i64))]
#[case("${(1 + 2) * 3}", ElValue::from(9i64))]
#[case("${10 / 4}", ElValue::from(2.5))]
#[case("${10 div 4}", ElValue::from(2.5))]
#[case("${10 mod 3}", ElValue::from(1i64))]
#[case("${-amount}", ElValue::from(-250))]
#[case("${amount * rate}", ElValue::from(125.0))]
#[case("${price + 1}", ElValue::from(Decimal::new(2099, 2)))]
#[case("${null + 1}", ElValue::from(1i64))]
fn test_arithmetic(#[case] source: &str, #[case] expected: ElValue) {
    assert_eq!(eval(source).unwrap(), expected);
}

#[rstest]
#[case("${amount > 100}", true)]
#[case("${amount gt 300}", false)]
#[case("${amount == '250'}", true)]
#[case("${status eq 'open' and not closed}", true)]
#[case("${status != 'open' || closed}", false)]
#[case("${nothing == null}", true)]
#[case("${missingVariable == null}", true)]
#[case("${empty nothing}", true)]
#[case("${empty emptyText}", true)]
#[case("${empty noItems}", true)]
#[case("${empty items}", false)]
#[case("${!empty customer}", true)]
#[case("${'abc' < 'abd'}", true)]
fn test_boolean_operators(#[case] source: &str, #[case] expected: bool) {
    assert_eq!(eval(source).unwrap(), ElValue::Boolean(expected));
}

#[rstest]
#[case("${customer.name}", ElValue::from("Kermit"))]
#[case("${customer['tier']}", ElValue::from("gold"))]
#[case("${customer.missing}", ElValue::Null)]
#[case("${items[0]}", ElValue::from("a"))]
#[case("${items['2']}", ElValue::from("c"))]
#[case("${items[10]}", ElValue::Null)]
#[case("${order.id}", ElValue::from("o-1"))]
#[case("${order.lines[1].qty}", ElValue::from(3))]
#[case("${order.express}", ElValue::from(true))]
#[case("${order.unknown}", ElValue::Null)]
#[case("${nothing.anything}", ElValue::Null)]
#[case("${planItemInstance.status}", ElValue::from("open"))]
fn test_member_access(#[case] source: &str, #[case] expected: ElValue) {
    assert_eq!(eval(source).unwrap(), expected);
}

#[rstest]
#[case("Amount: ${amount}", "Amount: 250")]
#[case("${customer.name} (${customer.tier})", "Kermit (gold)")]
#[case("[${nothing}]", "[]")]
#[case("#{status}-#{closed}", "open-false")]
#[case("no expressions", "no expressions")]
#[case(r"price: \${amount}", "price: ${amount}")]
#[case("${'a' += 'b' += 1}", "ab1")]
fn test_templates(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval(source).unwrap(), ElValue::from(expected));
}

#[test]
fn test_single_expression_keeps_type() {
    assert_eq!(eval("${amount}").unwrap(), ElValue::from(250));
    assert_eq!(eval("${nothing}").unwrap(), ElValue::Null);
    assert!(matches!(eval("${items}").unwrap(), ElValue::List(_)));
}

#[test]
fn test_conditional_only_evaluates_chosen_branch() {
    assert_eq!(
        eval("${closed ? nothing.fail() : 'fine'}").unwrap(),
        ElValue::from("fine")
    );
}

#[test]
fn test_expected_type_coercion() {
    let manager = ExpressionManager::new();
    let as_string = manager
        .create_value_expression("${amount + 1}", Some(ElType::String))
        .unwrap();
    assert_eq!(as_string.get_value(scope()).unwrap(), ElValue::from("251"));

    let as_bool = manager
        .create_value_expression("${nothing}", Some(ElType::BOOLEAN))
        .unwrap();
    assert_eq!(as_bool.get_value(scope()).unwrap(), ElValue::Boolean(false));

    let as_int = manager
        .create_value_expression("${status}", Some(ElType::INT))
        .unwrap();
    assert!(matches!(
        as_int.get_value(scope()),
        Err(ElError::Coercion(_))
    ));
}

#[test]
fn test_set_value() {
    let manager = ExpressionManager::new();
    let container = scope();

    manager
        .create_value_expression("${customer.name}", None)
        .unwrap()
        .set_value(container.clone(), "Gonzo".into())
        .unwrap();
    manager
        .create_value_expression("${items[0]}", None)
        .unwrap()
        .set_value(container.clone(), "z".into())
        .unwrap();
    manager
        .create_value_expression("${order.id}", None)
        .unwrap()
        .set_value(container.clone(), "o-2".into())
        .unwrap();
    manager
        .create_value_expression("${newVariable}", None)
        .unwrap()
        .set_value(container.clone(), 5.into())
        .unwrap();

    let read = |source: &str| manager.evaluate(source, container.clone()).unwrap();
    assert_eq!(read("${customer.name}"), ElValue::from("Gonzo"));
    assert_eq!(read("${items[0]}"), ElValue::from("z"));
    assert_eq!(read("${order.id}"), ElValue::from("o-2"));
    assert_eq!(read("${newVariable}"), ElValue::from(5));

    let err = manager
        .create_value_expression("${amount + 1}", None)
        .unwrap()
        .set_value(container.clone(), 1.into())
        .unwrap_err();
    assert!(matches!(
        err,
        ElError::Evaluation(EvaluationError::NotAssignable { .. })
    ));

    let err = manager
        .create_value_expression("${nothing.field}", None)
        .unwrap()
        .set_value(container, 1.into())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Target unreachable, 'nothing' returned null"
    );
}

#[test]
fn test_value_reference() {
    let manager = ExpressionManager::new();
    let reference = manager
        .create_value_expression("${customer['name']}", None)
        .unwrap()
        .value_reference(scope())
        .unwrap()
        .unwrap();
    assert!(matches!(reference.base, Some(ElValue::Map(_))));
    assert_eq!(reference.property, ElValue::from("name"));

    let none = manager
        .create_value_expression("${amount > 1}", None)
        .unwrap()
        .value_reference(scope())
        .unwrap();
    assert_eq!(none, None);
}

#[test]
fn test_parse_errors() {
    let err = eval("${'abc}").unwrap_err();
    assert!(err.is_parse_error());
    assert_eq!(err.position(), Some(2));
    assert_eq!(
        err.to_string(),
        "Error parsing '${'abc}': unterminated string literal at position 2"
    );
    assert!(eval("${a} #{b}").unwrap_err().is_parse_error());
    assert!(eval("${1 +}").unwrap_err().is_parse_error());
    assert!(eval("${a = 1}").unwrap_err().is_parse_error());
}

#[test]
fn test_evaluation_errors() {
    assert!(matches!(
        eval("${amount / 0 == 1}"),
        Ok(ElValue::Boolean(false))
    ));
    assert!(matches!(
        eval("${amount mod 0}"),
        Err(ElError::Evaluation(EvaluationError::Arithmetic { .. }))
    ));
    assert!(matches!(
        eval("${fn:unknown()}"),
        Err(ElError::Evaluation(EvaluationError::FunctionNotFound { .. }))
    ));
    assert!(matches!(
        eval("${status.unknownProperty}"),
        Err(ElError::Evaluation(EvaluationError::PropertyNotFound { .. }))
    ));
}

#[rstest]
#[case(r"C:\temp\${status}", r"C:\temp${status}")]
#[case(r"a\b", r"a\b")]
#[case(r"\\", r"\\")]
#[case(r"\#{status} is #{status}", "#{status} is open")]
fn test_backslash_only_escapes_delimiters(#[case] source: &str, #[case] expected: &str) {
    assert_eq!(eval(source).unwrap(), ElValue::from(expected));
}

#[rstest]
#[case("${closed?'yes':'no'}")]
#[case("${closed ? 'yes' : 'no'}")]
#[case("${ closed\t?\n'yes'   :'no' }")]
#[case("${closed ? 'yes' : closed ? 'maybe' : 'no'}")]
fn test_ternary_whitespace(#[case] source: &str) {
    assert_eq!(eval(source).unwrap(), ElValue::from("no"));
}

#[test]
fn test_numeric_boundaries_round_trip() {
    let scope: SharedContainer = Arc::new(
        MapVariableContainer::new()
            .with_variable("intMin", i32::MIN)
            .with_variable("shortMin", i16::MIN)
            .with_variable("negative", -1.5),
    );
    let manager = ExpressionManager::new();
    let read = |source: &str| manager.evaluate(source, scope.clone()).unwrap();

    assert_eq!(read("${intMin}"), ElValue::from(i32::MIN));
    assert_eq!(read("${shortMin}"), ElValue::from(i16::MIN));
    assert_eq!(read("${negative}"), ElValue::from(-1.5));
    assert_eq!(read("${intMin == -2147483648}"), ElValue::Boolean(true));
    assert_eq!(read("${shortMin == -32768}"), ElValue::Boolean(true));
    assert_eq!(read("${negative == -1.5}"), ElValue::Boolean(true));
}

#[test]
fn test_scope_methods() {
    let manager = ExpressionManager::new();
    let scope: SharedContainer = Arc::new(MapVariableContainer::new().with_variable("x", 5));
    let eval = |source: &str| manager.evaluate(source, scope.clone()).unwrap();

    assert_eq!(eval("${planItemInstance.getVariable('x')}"), ElValue::from(5));
    assert_eq!(eval("${planItemInstance.getVariable('y')}"), ElValue::Null);
    assert_eq!(eval("${planItemInstance.hasVariable('x')}"), ElValue::Boolean(true));
    assert_eq!(eval("${planItemInstance.hasVariable('y')}"), ElValue::Boolean(false));

    assert_eq!(eval("${planItemInstance.setVariable('y', x + 1)}"), ElValue::Null);
    assert_eq!(eval("${y}"), ElValue::from(6i64));
    assert_eq!(
        eval("${planItemInstance.variableNames}"),
        ElValue::list(vec!["x".into(), "y".into()])
    );
    assert_eq!(
        eval("${planItemInstance.getVariableNames().size()}"),
        ElValue::from(2)
    );
    assert_eq!(eval("${planItemInstance.missing}"), ElValue::Null);
}
