use std::hint::black_box;
use std::sync::Arc;

use caseflow_el::enhancer::{ExpressionEnhancer, VariableFunctionEnhancer};
use caseflow_el::parser::parse_template;
use caseflow_el::{
    ElValue, EngineConfig, ExpressionManager, MapVariableContainer, SharedContainer,
};
use criterion::{Criterion, criterion_group, criterion_main};

const EXPRESSIONS: &[&str] = &[
    "${amount > 100}",
    "${customer.name == 'Kermit' && !closed}",
    "${items[1] += '-' += customer.tier}",
    "${var:eq(status, 'open') && vars:gte(amount, 50)}",
    "Dear ${customer.name}, your total is ${amount * 1.21}",
];

fn scope() -> SharedContainer {
    Arc::new(
        MapVariableContainer::new()
            .with_variable("amount", 250)
            .with_variable("status", "open")
            .with_variable("closed", false)
            .with_variable(
                "items",
                ElValue::list(vec!["a".into(), "b".into(), "c".into()]),
            )
            .with_variable(
                "customer",
                ElValue::map([
                    ("name", ElValue::from("Kermit")),
                    ("tier", ElValue::from("gold")),
                ]),
            ),
    )
}

fn benchmark_parser(c: &mut Criterion) {
    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_parse"), |b| {
            b.iter(|| black_box(parse_template(black_box(expression))))
        });
    }
}

fn benchmark_enhancer(c: &mut Criterion) {
    let enhancer = VariableFunctionEnhancer::new("planItemInstance");
    c.bench_function("enhance_shorthand", |b| {
        b.iter(|| black_box(enhancer.enhance(black_box(EXPRESSIONS[3]))))
    });
}

fn benchmark_evaluation(c: &mut Criterion) {
    let cached = ExpressionManager::new();
    let uncached = ExpressionManager::with_config(EngineConfig::uncached());
    let scope = scope();

    for (i, expression) in EXPRESSIONS.iter().enumerate() {
        c.bench_function(&format!("expr_{i}_evaluate_cached"), |b| {
            b.iter(|| black_box(cached.evaluate(black_box(expression), scope.clone())))
        });
        c.bench_function(&format!("expr_{i}_evaluate_uncached"), |b| {
            b.iter(|| black_box(uncached.evaluate(black_box(expression), scope.clone())))
        });
    }
}

criterion_group!(
    benches,
    benchmark_parser,
    benchmark_enhancer,
    benchmark_evaluation
);
criterion_main!(benches);
