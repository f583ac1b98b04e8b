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

//! `variables:*` functions through the shorthand syntax

use std::sync::Arc;

use caseflow_el::{
    ElError, ElValue, EngineConfig, ExpressionManager, JsonNode, MapVariableContainer,
    SharedContainer,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn case_variables() -> MapVariableContainer {
    MapVariableContainer::new()
        .with_variable("status", "open")
        .with_variable("priority", 3)
        .with_variable("amount", 12.5)
        .with_variable("blank", "")
        .with_variable("nothing", ElValue::Null)
        .with_variable("tags", ElValue::list(vec!["urgent".into(), "vip".into()]))
        .with_variable("noTags", ElValue::list(Vec::new()))
        .with_variable(
            "customer",
            ElValue::Json(JsonNode::from_serde(&json!({
                "name": "Kermit",
                "roles": ["frog", "host"]
            }))),
        )
}

fn scope() -> SharedContainer {
    let parent = MapVariableContainer::new().with_variable("level", 2);
    Arc::new(case_variables().with_variable("parent", ElValue::container(parent)))
}

fn eval(source: &str) -> ElValue {
    ExpressionManager::new()
        .evaluate(source, scope())
        .unwrap_or_else(|e| panic!("{source}: {e}"))
}

#[rstest]
#[case("${var:eq(status, 'open')}", true)]
#[case("${variables:equals(status, 'closed')}", false)]
#[case("${var:eq(missing, 'open')}", false)]
#[case("${var:eq(priority, 3)}", true)]
#[case("${var:eq(priority, '3')}", true)]
#[case("${var:ne(status, 'closed')}", true)]
#[case("${var:ne(missing, 'closed')}", false)]
#[case("${var:exists(status)}", true)]
#[case("${var:exists(nothing)}", false)]
#[case("${var:exist(missing)}", false)]
#[case("${var:lt(priority, 5)}", true)]
#[case("${var:lte(priority, 3)}", true)]
#[case("${var:gt(amount, 12)}", true)]
#[case("${var:gte(amount, 13)}", false)]
#[case("${var:lessThan(missing, 5)}", false)]
#[case("${var:empty(blank)}", true)]
#[case("${var:isEmpty(missing)}", true)]
#[case("${var:isEmpty(noTags)}", true)]
#[case("${var:notEmpty(tags)}", true)]
#[case("${var:isNotEmpty(nothing)}", false)]
#[case("${var:contains(tags, 'vip')}", true)]
#[case("${var:contains(tags, 'vip', 'urgent')}", true)]
#[case("${var:contains(tags, 'vip', 'gold')}", false)]
#[case("${var:contains(status, 'pe')}", true)]
#[case("${var:containsAny(tags, 'gold', 'vip')}", true)]
#[case("${var:containsAny(tags, 'gold')}", false)]
#[case("${var:containsAny(missing, 'gold')}", false)]
fn test_shorthand_functions(#[case] source: &str, #[case] expected: bool) {
    assert_eq!(eval(source), ElValue::Boolean(expected));
}

#[rstest]
#[case("${var:get(status)}", ElValue::from("open"))]
#[case("${var:get(missing)}", ElValue::Null)]
#[case("${var:getOrDefault(missing, 'none')}", ElValue::from("none"))]
#[case("${var:getOrDefault(nothing, 7)}", ElValue::from(7))]
#[case("${var:getOrDefault(status, 'none')}", ElValue::from("open"))]
#[case("${var:get(customer).name}", ElValue::from("Kermit"))]
fn test_value_functions(#[case] source: &str, #[case] expected: ElValue) {
    assert_eq!(eval(source), expected);
}

#[test]
fn test_explicit_scope_variable() {
    assert_eq!(
        eval("${variables:contains(planItemInstance, 'tags', 'urgent')}"),
        ElValue::Boolean(true)
    );
}

#[test]
fn test_container_form_reads_other_scope() {
    assert_eq!(eval("${var:get(parent, 'level')}"), ElValue::from(2));
    assert_eq!(eval("${var:eq(parent, 'level', 2)}"), ElValue::Boolean(true));
    assert_eq!(eval("${var:exists(parent, 'status')}"), ElValue::Boolean(false));
}

#[test]
fn test_combined_conditions() {
    assert_eq!(
        eval("${var:eq(status, 'open') && var:gt(priority, 2) && !var:empty(tags)}"),
        ElValue::Boolean(true)
    );
    assert_eq!(
        eval("#{var:exists(missing) ? 'yes' : 'no'}"),
        ElValue::from("no")
    );
    assert_eq!(
        eval("Priority ${var:get(priority)} for ${var:get(status)} case"),
        ElValue::from("Priority 3 for open case")
    );
}

#[test]
fn test_canonical_calls_without_enhancers() {
    let manager = ExpressionManager::with_config(EngineConfig::default().with_enhancers(false));
    assert_eq!(
        manager
            .evaluate("${variables:equals(planItemInstance, 'status', 'open')}", scope())
            .unwrap(),
        ElValue::Boolean(true)
    );
    let err = manager.evaluate("${var:eq(status, 'open')}", scope()).unwrap_err();
    assert!(matches!(err, ElError::Evaluation(_)), "{err:?}");
}
