use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::backend::SharedBackend;
use crate::test_utils::{CountingBackend, init_test_logging};
use crate::{EvalContext, Type, Value};

fn compiler() -> TemplateExpressionCompiler<CountingBackend> {
    TemplateExpressionCompiler::new(
        SharedBackend::new(CountingBackend::default()),
        CompilerOptions {
            conversion_cache_idle: Duration::from_secs(60),
            ..CompilerOptions::default()
        },
    )
}

fn int_literal(text: &str) -> ExpressionDefinition {
    ExpressionDefinition::new(Arc::new(Profile::new("p", Type::Any)), text)
        .template()
        .with_result_type(Type::Int)
}

#[test]
fn reset_invalidates_cache_and_forwards() {
    init_test_logging();
    let compiler = compiler();

    compiler.compile_expression(&int_literal("1")).unwrap();
    compiler.compile_expression(&int_literal("2")).unwrap();
    assert_eq!(compiler.backend().with_backend(|b| b.unit_compiles), 1);

    compiler.reset();
    assert!(compiler.conversion_cache().is_empty());
    assert_eq!(compiler.backend().with_backend(|b| b.resets), 1);

    compiler.compile_expression(&int_literal("3")).unwrap();
    compiler.compile_expression(&int_literal("4")).unwrap();
    assert_eq!(compiler.backend().with_backend(|b| b.unit_compiles), 2);
}

#[test]
fn disabled_optimization_always_delegates() {
    let compiler = TemplateExpressionCompiler::new(
        SharedBackend::new(CountingBackend::default()),
        CompilerOptions {
            optimize_templates: false,
            ..CompilerOptions::default()
        },
    );

    let expr = compiler.compile_expression(&int_literal("42")).unwrap();
    assert!(expr.is_delegated());
    assert_eq!(expr.evaluate(&EvalContext::new()).unwrap(), Value::str("42"));
    assert_eq!(compiler.backend().with_backend(|b| b.unit_compiles), 0);
}

#[test]
fn get_errors_reports_literal_conversion() {
    let compiler = compiler();
    assert!(compiler.get_errors(&int_literal("42")).unwrap().is_empty());

    let errors = compiler.get_errors(&int_literal("abc")).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].source_snippet, "abc");
}

#[test]
fn evaluation_does_not_need_the_lock() {
    let compiler = compiler();
    let expr = compiler.compile_expression(&int_literal("42")).unwrap();

    // Holding the compilation lock must not block evaluation.
    compiler.backend().with_backend(|_| {
        std::thread::scope(|scope| {
            let handle = scope.spawn(|| expr.evaluate(&EvalContext::new()));
            assert_eq!(handle.join().unwrap(), Ok(Value::Int(42)));
        });
    });
}
