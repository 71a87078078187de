//! Evaluation limits: runaway bodies are cut off, not served.

use thistle_foundation::{ErrorKind, Result, ScriptLimit, Value};
use thistle_script::{Env, Interpreter, Limits, NullHost};

fn eval_with(source: &str, limits: Limits) -> Result<Value> {
    let mut host = NullHost;
    let mut env = Env::new();
    Interpreter::with_limits(&mut host, limits).eval_source(source, &mut env)
}

#[test]
fn step_budget_cuts_off_long_bodies() {
    let body = "(+ 1 1) ".repeat(50);
    let limits = Limits {
        max_steps: 20,
        ..Limits::default()
    };
    let err = eval_with(&body, limits).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(ScriptLimit::MaxSteps { limit: 20 })
    ));
}

#[test]
fn depth_budget_cuts_off_deep_nesting() {
    let mut body = String::from("1");
    for _ in 0..40 {
        body = format!("(+ 1 {body})");
    }
    let limits = Limits {
        max_depth: 8,
        ..Limits::default()
    };
    let err = eval_with(&body, limits).unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::LimitExceeded(ScriptLimit::MaxDepth { limit: 8 })
    ));
}

#[test]
fn default_limits_admit_ordinary_bodies() {
    let body = "(let [total (+ 1 2 3 4 5)] (* total 2))";
    assert_eq!(eval_with(body, Limits::default()).unwrap(), Value::Int(30));
}

#[test]
fn budget_is_per_body_not_cumulative() {
    let limits = Limits {
        max_steps: 50,
        ..Limits::default()
    };
    // Two separate interpreters each get a fresh budget.
    for _ in 0..2 {
        assert!(eval_with("(+ 1 2 3)", limits).is_ok());
    }
}
