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

//! One manager shared across threads

use std::sync::Arc;
use std::thread;

use caseflow_el::{ElValue, EngineConfig, ExpressionManager, MapVariableContainer};
use pretty_assertions::assert_eq;

const EXPRESSIONS: &[&str] = &[
    "${var:eq(status, 'open')}",
    "${priority * 2 > 5}",
    "${var:getOrDefault(owner, 'nobody')}",
    "Case ${id} is ${status}",
];

#[test]
fn test_shared_manager_across_threads() {
    let manager = Arc::new(ExpressionManager::new());

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let scope = Arc::new(
                    MapVariableContainer::new()
                        .with_variable("id", worker as i32)
                        .with_variable("status", "open")
                        .with_variable("priority", worker as i32),
                );
                for _ in 0..50 {
                    for source in EXPRESSIONS {
                        manager.evaluate(source, scope.clone()).unwrap();
                    }
                }
                (
                    manager.evaluate("${priority * 2 > 5}", scope.clone()).unwrap(),
                    manager.evaluate("Case ${id} is ${status}", scope).unwrap(),
                )
            })
        })
        .collect();

    for (worker, handle) in handles.into_iter().enumerate() {
        let (comparison, text) = handle.join().unwrap();
        assert_eq!(comparison, ElValue::Boolean(worker * 2 > 5));
        assert_eq!(text, ElValue::from(format!("Case {worker} is open")));
    }

    let stats = manager.cache_stats().unwrap();
    assert_eq!(stats.entries, EXPRESSIONS.len());
    assert_eq!(stats.hits + stats.misses, 8 * (50 * EXPRESSIONS.len() as u64 + 2));
}

#[test]
fn test_tiny_cache_under_contention() {
    let manager = Arc::new(ExpressionManager::with_config(
        EngineConfig::default().with_max_cache_size(2),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let scope = Arc::new(MapVariableContainer::new().with_variable("n", 1));
                (0..20)
                    .map(|i| manager.evaluate(&format!("${{n + {i}}}"), scope.clone()).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        let values = handle.join().unwrap();
        let expected: Vec<ElValue> = (1..=20).map(ElValue::from).collect();
        assert_eq!(values, expected);
    }
    assert!(manager.cache_stats().unwrap().evictions > 0);
}
